use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::channel::oneshot;

use crate::error::Failure;
use crate::future::future::Future;

type Slot<T> = oneshot::Sender<Result<T, Failure>>;

/// The write side of a `Future`. Written at most once.
///
/// Writes take `&self`, so a promise can be shared (typically through an `Arc`) between the
/// context that hands out its future and the worker that eventually satisfies it.
/// Dropping a promise that was never written breaks its future.
pub struct Promise<T> {
    sender: Mutex<Option<Slot<T>>>,
    receiver: Mutex<Option<oneshot::Receiver<Result<T, Failure>>>>,
}

/// A fresh promise together with its future.
pub fn channel<T: Send + 'static>() -> (Promise<T>, Future<T>) {
    let (sender, receiver) = oneshot::channel();
    let promise = Promise {
        sender: Mutex::new(Some(sender)),
        receiver: Mutex::new(None),
    };
    (promise, Future::from_receiver(receiver))
}

fn lock<X>(m: &Mutex<X>) -> MutexGuard<X> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<T: Send + 'static> Promise<T> {
    pub fn new() -> Self {
        let (sender, receiver) = oneshot::channel();
        Promise {
            sender: Mutex::new(Some(sender)),
            receiver: Mutex::new(Some(receiver)),
        }
    }

    /// Acquires the paired future. The promise itself is untouched and can still be written.
    pub fn future(&self) -> Result<Future<T>, Failure> {
        match lock(&self.receiver).take() {
            Some(receiver) => Ok(Future::from_receiver(receiver)),
            None => Err(Failure::FutureAlreadyRetrieved),
        }
    }

    pub fn set_result(&self, outcome: Result<T, Failure>) -> Result<(), Failure> {
        let sender = match lock(&self.sender).take() {
            Some(sender) => sender,
            None => return Err(Failure::PromiseAlreadySatisfied),
        };

        if sender.send(outcome).is_err() {
            trace!("promise satisfied after its future was dropped");
        }
        Ok(())
    }

    pub fn set_value(&self, t: T) -> Result<(), Failure> {
        self.set_result(Ok(t))
    }

    pub fn set_failure(&self, failure: Failure) -> Result<(), Failure> {
        self.set_result(Err(failure))
    }

    pub fn is_satisfied(&self) -> bool {
        lock(&self.sender).is_none()
    }
}

impl<T: Send + 'static> Default for Promise<T> {
    fn default() -> Self {
        Promise::new()
    }
}

impl<T> fmt::Debug for Promise<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Promise")
            .field("satisfied", &lock(&self.sender).is_none())
            .field("future_retrieved", &lock(&self.receiver).is_none())
            .finish()
    }
}
