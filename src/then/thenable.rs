use std::future::Future as StdFuture;
use std::ops::{Deref, DerefMut};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::Failure;
use crate::future::{Future, Resolve, Resolving};
use crate::then::{chain, Launch};

/// A `Future` that continuations can be chained onto with method syntax.
///
/// Every chaining method consumes the thenable, the same way the free `then` consumes an
/// exclusive future. It derefs to the wrapped `Future` for reading.
#[derive(Debug)]
pub struct Thenable<T> {
    inner: Future<T>,
}

impl<T> Thenable<T> {
    pub fn into_future(self) -> Future<T> {
        self.inner
    }
}

impl<T: Resolve> Thenable<T> {
    pub fn then<F, R>(self, f: F) -> Thenable<R::Output> where
    F: FnOnce(T::Output) -> R + Send + 'static,
    R: Resolve,
    {
        self.then_with(f, Launch::default())
    }

    pub fn then_with<F, R>(self, f: F, launch: Launch) -> Thenable<R::Output> where
    F: FnOnce(T::Output) -> R + Send + 'static,
    R: Resolve,
    {
        Thenable::from(chain::then_with(self.inner, f, launch))
    }

    pub fn then_void<F, R>(self, f: F) -> Thenable<R::Output> where
    T: Resolve<Output = ()>,
    F: FnOnce() -> R + Send + 'static,
    R: Resolve,
    {
        self.then_void_with(f, Launch::default())
    }

    pub fn then_void_with<F, R>(self, f: F, launch: Launch) -> Thenable<R::Output> where
    T: Resolve<Output = ()>,
    F: FnOnce() -> R + Send + 'static,
    R: Resolve,
    {
        Thenable::from(chain::then_void_with(self.inner, f, launch))
    }
}

impl<T> Default for Thenable<T> {
    fn default() -> Self {
        Thenable {
            inner: Future::default(),
        }
    }
}

impl<T> From<Future<T>> for Thenable<T> {
    fn from(inner: Future<T>) -> Self {
        Thenable {
            inner: inner,
        }
    }
}

impl<T> From<Thenable<T>> for Future<T> {
    fn from(thenable: Thenable<T>) -> Self {
        thenable.inner
    }
}

impl<T> Deref for Thenable<T> {
    type Target = Future<T>;

    fn deref(&self) -> &Future<T> {
        &self.inner
    }
}

impl<T> DerefMut for Thenable<T> {
    fn deref_mut(&mut self) -> &mut Future<T> {
        &mut self.inner
    }
}

impl<T> StdFuture for Thenable<T> {
    type Output = Result<T, Failure>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context) -> Poll<Self::Output> {
        Pin::new(&mut self.inner).poll(cx)
    }
}

impl<T: Resolve> Resolve for Thenable<T> {
    type Output = T::Output;

    fn resolve(self) -> Resolving<T::Output> {
        self.inner.resolve()
    }
}
