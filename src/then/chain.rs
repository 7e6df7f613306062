//! `then`: attach a continuation to an antecedent, get a future for its flattened outcome.
//!
//! The antecedent may be an exclusive future, a shared future, or a promise, by value or by
//! reference; see [`Antecedent`]. None of these functions ever block. They schedule the
//! continuation on the process-wide executor and return immediately.

use std::mem;

use crate::executor;
use crate::future::{Future, Promise, Resolve, SharedFuture};
use crate::then::{Launch, Thenable};

/// Anything a continuation can be attached to.
pub trait Antecedent {
    /// The handle the scheduled work ends up owning.
    type Handle: Resolve;

    fn into_handle(self) -> Self::Handle;
}

impl<T: Resolve> Antecedent for Future<T> {
    type Handle = Future<T>;

    fn into_handle(self) -> Future<T> {
        self
    }
}

/// Takes the future away from the caller, leaving a future with no state behind.
impl<'a, T: Resolve> Antecedent for &'a mut Future<T> {
    type Handle = Future<T>;

    fn into_handle(self) -> Future<T> {
        mem::take(self)
    }
}

impl<T> Antecedent for SharedFuture<T> where T: Resolve + Clone + Sync {
    type Handle = SharedFuture<T>;

    fn into_handle(self) -> SharedFuture<T> {
        self
    }
}

/// The scheduled work gets its own copy. The caller's copy stays readable.
impl<'a, T> Antecedent for &'a SharedFuture<T> where T: Resolve + Clone + Sync {
    type Handle = SharedFuture<T>;

    fn into_handle(self) -> SharedFuture<T> {
        self.clone()
    }
}

/// Acquires the promise's future and leaves the promise with its owner, to be written later.
/// If the future was already acquired, the continuation sees `FutureAlreadyRetrieved`.
impl<'a, T: Resolve> Antecedent for &'a Promise<T> {
    type Handle = Future<T>;

    fn into_handle(self) -> Future<T> {
        match self.future() {
            Ok(future) => future,
            Err(failure) => Future::failed(failure),
        }
    }
}

impl<T: Resolve> Antecedent for Thenable<T> {
    type Handle = Future<T>;

    fn into_handle(self) -> Future<T> {
        self.into_future()
    }
}

impl<'a, T: Resolve> Antecedent for &'a mut Thenable<T> {
    type Handle = Future<T>;

    fn into_handle(self) -> Future<T> {
        mem::take(self).into_future()
    }
}

/// Runs `f` with the flattened value of `antecedent`, under the default launch policy.
pub fn then<A, F, R>(antecedent: A, f: F) -> Future<R::Output> where
A: Antecedent,
F: FnOnce(<A::Handle as Resolve>::Output) -> R + Send + 'static,
R: Resolve,
{
    then_with(antecedent, f, Launch::default())
}

pub fn then_with<A, F, R>(antecedent: A, f: F, launch: Launch) -> Future<R::Output> where
A: Antecedent,
F: FnOnce(<A::Handle as Resolve>::Output) -> R + Send + 'static,
R: Resolve,
{
    executor::global().then_with(antecedent, f, launch)
}

/// Runs `f` once `antecedent`, which carries no value, has resolved successfully.
pub fn then_void<A, F, R>(antecedent: A, f: F) -> Future<R::Output> where
A: Antecedent,
A::Handle: Resolve<Output = ()>,
F: FnOnce() -> R + Send + 'static,
R: Resolve,
{
    then_void_with(antecedent, f, Launch::default())
}

pub fn then_void_with<A, F, R>(antecedent: A, f: F, launch: Launch) -> Future<R::Output> where
A: Antecedent,
A::Handle: Resolve<Output = ()>,
F: FnOnce() -> R + Send + 'static,
R: Resolve,
{
    executor::global().then_void_with(antecedent, f, launch)
}

/// `then_with`, wrapped so the result can be chained further.
pub fn thenable<A, F, R>(antecedent: A, f: F, launch: Launch) -> Thenable<R::Output> where
A: Antecedent,
F: FnOnce(<A::Handle as Resolve>::Output) -> R + Send + 'static,
R: Resolve,
{
    Thenable::from(then_with(antecedent, f, launch))
}

pub fn thenable_void<A, F, R>(antecedent: A, f: F, launch: Launch) -> Thenable<R::Output> where
A: Antecedent,
A::Handle: Resolve<Output = ()>,
F: FnOnce() -> R + Send + 'static,
R: Resolve,
{
    Thenable::from(then_void_with(antecedent, f, launch))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::error::Failure;
    use crate::future::channel;
    use crate::testlib;

    #[test]
    fn by_mutable_reference_takes_ownership() {
        let mut antecedent = Future::ready(4i32);
        let mut f = then(&mut antecedent, |x| x * 2);

        assert!(!antecedent.valid());
        assert_eq!(antecedent.get(), Err(Failure::NoState));
        assert_eq!(f.get(), Ok(8));
    }

    #[test]
    fn shared_reference_leaves_the_caller_a_copy() {
        let antecedent = Future::ready(String::from("kept")).share();
        let mut f = then(&antecedent, |s| s.len());

        assert_eq!(f.get(), Ok(4));
        assert_eq!(antecedent.get(), Ok(String::from("kept")));
    }

    #[test]
    fn shared_future_feeds_several_chains() {
        let antecedent = testlib::slow(5i32, Duration::from_millis(20)).share();
        let mut plus = then(&antecedent, |x| x + 1);
        let mut times = then(antecedent.clone(), |x| x * 3);
        let mut minus = then(antecedent, |x| x - 1);

        assert_eq!(plus.get(), Ok(6));
        assert_eq!(times.get(), Ok(15));
        assert_eq!(minus.get(), Ok(4));
    }

    #[test]
    fn promise_stays_with_its_owner() {
        let promise = Promise::<u32>::new();
        let mut f = then(&promise, |x| x + 1);

        promise.set_value(41).unwrap();
        assert_eq!(f.get(), Ok(42));
        assert!(promise.is_satisfied());
    }

    #[test]
    fn promise_whose_future_is_gone() {
        let promise: Promise<i32> = Promise::new();
        let _taken = promise.future().unwrap();
        let mut f = then(&promise, |x| x);
        assert_eq!(f.get(), Err(Failure::FutureAlreadyRetrieved));
    }

    #[test]
    fn broken_promise_reaches_the_chain() {
        let (promise, antecedent) = channel::<i32>();
        let mut f = then(antecedent, |x| x + 1);
        drop(promise);
        assert_eq!(f.get(), Err(Failure::BrokenPromise));
    }

    #[test]
    fn every_policy_gives_the_same_outcome() {
        for &launch in &[Launch::Auto, Launch::Deferred, Launch::Async, Launch::Detached] {
            let antecedent = testlib::slow(Future::ready(6i32), Duration::from_millis(10));
            let mut f = then_with(antecedent, |x| Future::ready(x * 7).share(), launch);
            assert_eq!(f.get(), Ok(42), "under {}", launch);
        }
    }

    #[test]
    fn void_chain() {
        let (promise, antecedent) = channel::<()>();
        let mut f = then_void_with(antecedent, || "after", Launch::Async);
        promise.set_value(()).unwrap();
        assert_eq!(f.get(), Ok("after"));
    }

    #[test]
    fn thenable_constructors() {
        let mut a = thenable(Future::ready(1i32), |x| x + 1, Launch::Deferred);
        assert_eq!(a.get(), Ok(2));

        let mut b = thenable_void(Future::ready(()), || 9i32, Launch::Async).then(|x| x + 1);
        assert_eq!(b.get(), Ok(10));
    }

    #[test]
    fn thenable_antecedents() {
        let owned = Future::ready(6i32).thenable();
        let mut f = then(owned, |x| x + 1);
        assert_eq!(f.get(), Ok(7));

        let mut borrowed = testlib::slow(8i32, Duration::from_millis(10)).thenable();
        let mut g = then_with(&mut borrowed, |x| x * 2, Launch::Detached);
        assert!(!borrowed.valid());
        assert_eq!(borrowed.get(), Err(Failure::NoState));
        assert_eq!(g.get(), Ok(16));
    }
}
