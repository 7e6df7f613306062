//! Failures carried by futures, and errors raised while configuring the executor.

use std::any::Any;
use std::error::Error as StdError;
use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::then::Launch;

/// The outcome of a future that did not produce a value.
///
/// A `Failure` is cheap to clone: every payload lives behind an `Arc`, so all readers of a
/// shared future observe the very same payload.
#[derive(Clone, Debug, Error)]
pub enum Failure {
    /// An error returned by a continuation or written into a promise.
    #[error("{0}")]
    Raised(Arc<dyn StdError + Send + Sync>),
    /// A continuation panicked. Holds the panic message, if it had one.
    #[error("continuation panicked: {0}")]
    Panicked(Arc<str>),
    /// The promise was dropped before anything was written to it.
    #[error("promise dropped without being satisfied")]
    BrokenPromise,
    /// The future was already consumed, or never had a state to begin with.
    #[error("future has no state")]
    NoState,
    #[error("future already retrieved from this promise")]
    FutureAlreadyRetrieved,
    #[error("promise already satisfied")]
    PromiseAlreadySatisfied,
    /// A detached continuation thread could not be started.
    #[error("failed to spawn detached thread: {0}")]
    Spawn(Arc<io::Error>),
    #[error("executor unavailable: {0}")]
    Executor(Arc<ExecutorError>),
}

impl Failure {
    /// Wraps an arbitrary error. A `Failure` passes through unchanged.
    pub fn raise<E>(e: E) -> Self where E: StdError + Send + Sync + 'static {
        if let Some(failure) = (&e as &dyn Any).downcast_ref::<Failure>() {
            return failure.clone();
        }
        Failure::Raised(Arc::new(e))
    }

    /// Builds a failure from a caught panic payload.
    pub fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message: Arc<str> = match payload.downcast::<String>() {
            Ok(s) => Arc::from(s.as_str()),
            Err(payload) => match payload.downcast::<&'static str>() {
                Ok(s) => Arc::from(*s),
                Err(_) => Arc::from("<non-string panic payload>"),
            },
        };
        Failure::Panicked(message)
    }

    pub fn spawn(e: io::Error) -> Self {
        Failure::Spawn(Arc::new(e))
    }

    /// Returns the raised error as a concrete type, if that is what it holds.
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        match *self {
            Failure::Raised(ref e) => (**e).downcast_ref::<E>(),
            _ => None,
        }
    }

    /// The raised payload, shared with every other copy of this failure.
    pub fn payload(&self) -> Option<&Arc<dyn StdError + Send + Sync>> {
        match *self {
            Failure::Raised(ref e) => Some(e),
            _ => None,
        }
    }
}

/// Two failures are equal when they are the same kind of failure and, for failures with a
/// payload, carry the very same payload.
impl PartialEq for Failure {
    fn eq(&self, other: &Failure) -> bool {
        match (self, other) {
            (&Failure::Raised(ref a), &Failure::Raised(ref b)) => Arc::ptr_eq(a, b),
            (&Failure::Panicked(ref a), &Failure::Panicked(ref b)) => a == b,
            (&Failure::Spawn(ref a), &Failure::Spawn(ref b)) => Arc::ptr_eq(a, b),
            (&Failure::Executor(ref a), &Failure::Executor(ref b)) => Arc::ptr_eq(a, b),
            (&Failure::BrokenPromise, &Failure::BrokenPromise)
            | (&Failure::NoState, &Failure::NoState)
            | (&Failure::FutureAlreadyRetrieved, &Failure::FutureAlreadyRetrieved)
            | (&Failure::PromiseAlreadySatisfied, &Failure::PromiseAlreadySatisfied) => true,
            _ => false,
        }
    }
}

impl From<ExecutorError> for Failure {
    fn from(e: ExecutorError) -> Self {
        Failure::Executor(Arc::new(e))
    }
}

/// Problems building or configuring an `Executor`.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("thread pool size must be nonzero")]
    ZeroPoolSize,
    #[error("automatic launch must resolve to Deferred or Async, not {0:?}")]
    InvalidAutoLaunch(Launch),
    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },
    #[error("failed to build thread pool: {0}")]
    Pool(#[from] io::Error),
}
