//! Detached continuations: one thread per continuation, never joined.
//!
//! The thread blocks on the antecedent and writes the outcome into a promise it shares with
//! the caller's future. Neither the caller nor the returned future ever waits for the thread
//! to start.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread;

use futures::executor::block_on;

use crate::error::Failure;
use crate::future::{channel, Future, Resolve, Resolving};
use crate::then::{chain, Antecedent, Launch};

pub(crate) fn spawn<T: Send + 'static>(name: &str, work: Resolving<T>) -> Future<T> {
    let (promise, future) = channel();
    let promise = Arc::new(promise);
    let worker = Arc::clone(&promise);

    let spawned = thread::Builder::new().name(name.to_string()).spawn(move || {
        trace!("detached continuation started");
        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| block_on(work))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let failure = Failure::panicked(payload);
                warn!("{}", failure);
                Err(failure)
            }
        };
        if let Err(e) = worker.set_result(outcome) {
            warn!("detached continuation could not report: {}", e);
        }
        trace!("detached continuation finished");
    });

    // The JoinHandle is dropped here, which detaches the thread.
    if let Err(e) = spawned {
        error!("could not start a detached continuation: {}", e);
        if let Err(e) = promise.set_failure(Failure::spawn(e)) {
            warn!("{}", e);
        }
    }
    future
}

/// `then_with(antecedent, f, Launch::Detached)`.
pub fn then_detached<A, F, R>(antecedent: A, f: F) -> Future<R::Output> where
A: Antecedent,
F: FnOnce(<A::Handle as Resolve>::Output) -> R + Send + 'static,
R: Resolve,
{
    chain::then_with(antecedent, f, Launch::Detached)
}
