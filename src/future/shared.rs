use std::fmt;
use std::task::Context;

use futures::executor::block_on;
use futures::future::{FutureExt, Shared};
use futures::task::noop_waker_ref;

use crate::error::Failure;
use crate::future::future::Future;
use crate::future::resolve::{failing, resolved, Resolve, Resolving};
use crate::then::Thenable;

/// A read-many handle. Copies are cheap, and every copy observes the same outcome.
pub struct SharedFuture<T> {
    inner: Option<Shared<Resolving<T>>>,
    /// The work runs on whichever copy first reads it, so polling must not start it.
    deferred: bool,
}

impl<T: Clone + Send + Sync + 'static> SharedFuture<T> {
    pub(crate) fn new(work: Resolving<T>, deferred: bool) -> Self {
        SharedFuture {
            inner: Some(work.shared()),
            deferred: deferred,
        }
    }

    pub fn ready(t: T) -> Self {
        SharedFuture::new(resolved(t), false)
    }

    pub fn failed(failure: Failure) -> Self {
        SharedFuture::new(failing(failure), false)
    }

    pub fn valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Never blocks. Work running elsewhere is polled once; deferred work is only ready once
    /// some copy has read it.
    pub fn is_ready(&self) -> bool {
        let shared = match self.inner {
            Some(ref shared) => shared,
            None => return false,
        };
        if shared.peek().is_some() {
            return true;
        }
        if self.deferred {
            return false;
        }
        shared.clone().poll_unpin(&mut Context::from_waker(noop_waker_ref())).is_ready()
    }

    /// Blocks until resolved and returns a copy of the outcome. Can be called any number of
    /// times, from any number of copies.
    pub fn get(&self) -> Result<T, Failure> {
        match self.inner {
            Some(ref shared) => block_on(shared.clone()),
            None => Err(Failure::NoState),
        }
    }

    /// Blocks until resolved.
    pub fn wait(&self) -> Result<(), Failure> {
        match self.inner {
            Some(ref shared) => {
                block_on(shared.clone().map(|_| ()));
                Ok(())
            }
            None => Err(Failure::NoState),
        }
    }

    /// A `Thenable` on one copy of this future; this handle stays readable.
    pub fn thenable(&self) -> Thenable<T> {
        let work = self.to_resolving();
        if self.deferred {
            Thenable::from(Future::deferred(work))
        } else {
            Thenable::from(Future::pending(work))
        }
    }

    pub(crate) fn to_resolving(&self) -> Resolving<T> {
        match self.inner {
            Some(ref shared) => shared.clone().boxed(),
            None => failing(Failure::NoState),
        }
    }
}

impl<T> Clone for SharedFuture<T> {
    fn clone(&self) -> Self {
        SharedFuture {
            inner: self.inner.clone(),
            deferred: self.deferred,
        }
    }
}

impl<T> Default for SharedFuture<T> {
    fn default() -> Self {
        SharedFuture {
            inner: None,
            deferred: false,
        }
    }
}

impl<T> fmt::Debug for SharedFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SharedFuture").field("valid", &self.inner.is_some()).finish()
    }
}

/// Reads this level without consuming other copies, then flattens what it held.
impl<T> Resolve for SharedFuture<T> where T: Resolve + Clone + Sync {
    type Output = T::Output;

    fn resolve(self) -> Resolving<T::Output> {
        async move {
            match self.to_resolving().await {
                Ok(inner) => inner.resolve().await,
                Err(failure) => Err(failure),
            }
        }.boxed()
    }
}
