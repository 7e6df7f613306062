use std::fmt;
use std::future::Future as StdFuture;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use futures::executor::block_on;
use futures::future::{self, FutureExt};
use futures::task::noop_waker_ref;

use crate::error::Failure;
use crate::future::resolve::{Resolve, Resolving};
use crate::future::shared::SharedFuture;
use crate::then::Thenable;

/// What a non-blocking look at a `Future` found.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Ready,
    Pending,
    /// The work will run on whichever thread first reads the future. Looking does not start it.
    Deferred,
}

enum State<T> {
    Empty,
    Deferred(Resolving<T>),
    Pending(Resolving<T>),
    Ready(Result<T, Failure>),
}

/// An exclusive, read-once handle to a value that becomes available later.
///
/// Reading consumes the outcome. Any read after that yields `Failure::NoState`, as does reading a
/// default-constructed future. Dropping a pending `Future` never blocks; the work behind it runs
/// to completion and its outcome is discarded.
///
/// `Future` is also a `std::future::Future`, so async code can `.await` it instead of blocking.
pub struct Future<T> {
    state: State<T>,
}

impl<T> Future<T> {
    pub fn ready(t: T) -> Self {
        Future {
            state: State::Ready(Ok(t)),
        }
    }

    pub fn failed(failure: Failure) -> Self {
        Future {
            state: State::Ready(Err(failure)),
        }
    }

    /// A future whose work starts when it is first read, on the reading thread.
    pub(crate) fn deferred(work: Resolving<T>) -> Self {
        Future {
            state: State::Deferred(work),
        }
    }

    /// A future whose work is already under way somewhere else.
    pub(crate) fn pending(work: Resolving<T>) -> Self {
        Future {
            state: State::Pending(work),
        }
    }

    /// False once the outcome has been consumed, or if this future never had one.
    pub fn valid(&self) -> bool {
        match self.state {
            State::Empty => false,
            _ => true,
        }
    }

    /// Polls once without blocking. Deferred work is reported as such and left unstarted.
    pub fn status(&mut self) -> Result<Status, Failure> {
        let polled = match self.state {
            State::Empty => return Err(Failure::NoState),
            State::Ready(_) => return Ok(Status::Ready),
            State::Deferred(_) => return Ok(Status::Deferred),
            State::Pending(ref mut work) => work.poll_unpin(&mut Context::from_waker(noop_waker_ref())),
        };

        match polled {
            Poll::Ready(outcome) => {
                self.state = State::Ready(outcome);
                Ok(Status::Ready)
            }
            Poll::Pending => Ok(Status::Pending),
        }
    }

    pub fn is_ready(&mut self) -> bool {
        self.status() == Ok(Status::Ready)
    }

    /// Blocks until the outcome is available, without consuming it.
    pub fn wait(&mut self) -> Result<(), Failure> {
        let outcome = match mem::replace(&mut self.state, State::Empty) {
            State::Empty => return Err(Failure::NoState),
            State::Ready(outcome) => outcome,
            State::Deferred(work) | State::Pending(work) => block_on(work),
        };
        self.state = State::Ready(outcome);
        Ok(())
    }

    /// Blocks until the outcome is available and takes it. The future is left without a state.
    pub fn get(&mut self) -> Result<T, Failure> {
        match mem::replace(&mut self.state, State::Empty) {
            State::Empty => Err(Failure::NoState),
            State::Ready(outcome) => outcome,
            State::Deferred(work) | State::Pending(work) => block_on(work),
        }
    }

    /// Converts into a read-many handle. The outcome must be cloneable.
    pub fn share(self) -> SharedFuture<T> where T: Clone + Send + Sync + 'static {
        let deferred = match self.state {
            State::Deferred(_) => true,
            _ => false,
        };
        SharedFuture::new(self.into_resolving(), deferred)
    }

    pub fn thenable(self) -> Thenable<T> {
        Thenable::from(self)
    }

    pub(crate) fn into_resolving(self) -> Resolving<T> where T: Send + 'static {
        match self.state {
            State::Empty => future::ready(Err(Failure::NoState)).boxed(),
            State::Ready(outcome) => future::ready(outcome).boxed(),
            State::Deferred(work) | State::Pending(work) => work,
        }
    }
}

impl<T: Send + 'static> Future<T> {
    /// The read side of a one-shot channel. A dropped sender means a broken promise.
    pub(crate) fn from_receiver(receiver: oneshot::Receiver<Result<T, Failure>>) -> Self {
        Future::pending(receiver.map(|received| match received {
            Ok(outcome) => outcome,
            Err(oneshot::Canceled) => Err(Failure::BrokenPromise),
        }).boxed())
    }
}

impl<T> Default for Future<T> {
    fn default() -> Self {
        Future {
            state: State::Empty,
        }
    }
}

impl<T> fmt::Debug for Future<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = match self.state {
            State::Empty => "Empty",
            State::Deferred(_) => "Deferred",
            State::Pending(_) => "Pending",
            State::Ready(_) => "Ready",
        };
        f.debug_struct("Future").field("state", &state).finish()
    }
}

// The outcome is only ever moved out whole, never pinned in place.
impl<T> Unpin for Future<T> {}

impl<T> StdFuture for Future<T> {
    type Output = Result<T, Failure>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        let this = self.get_mut();
        let outcome = match this.state {
            State::Deferred(ref mut work) | State::Pending(ref mut work) => match work.poll_unpin(cx) {
                Poll::Ready(outcome) => outcome,
                Poll::Pending => return Poll::Pending,
            },
            _ => match mem::replace(&mut this.state, State::Empty) {
                State::Ready(outcome) => outcome,
                _ => Err(Failure::NoState),
            },
        };
        this.state = State::Empty;
        Poll::Ready(outcome)
    }
}

/// Consumes this level and flattens whatever it held.
impl<T: Resolve> Resolve for Future<T> {
    type Output = T::Output;

    fn resolve(self) -> Resolving<T::Output> {
        async move {
            match self.await {
                Ok(inner) => inner.resolve().await,
                Err(failure) => Err(failure),
            }
        }.boxed()
    }
}
