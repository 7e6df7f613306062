//! Shared helpers for unit and pipeline tests.

use std::error::Error;
use std::fmt;
use std::thread;
use std::time::Duration;

use crate::error::Failure;
use crate::future::{channel, Future};

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A plain error for callbacks to raise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestError(pub &'static str);

impl fmt::Display for TestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "test error: {}", self.0)
    }
}

impl Error for TestError {}

/// A future that a background thread satisfies with `value` after `delay`.
pub fn slow<T: Send + 'static>(value: T, delay: Duration) -> Future<T> {
    slow_result(Ok(value), delay)
}

pub fn slow_failure<T: Send + 'static>(failure: Failure, delay: Duration) -> Future<T> {
    slow_result(Err(failure), delay)
}

fn slow_result<T: Send + 'static>(outcome: Result<T, Failure>, delay: Duration) -> Future<T> {
    let (promise, future) = channel();
    thread::spawn(move || {
        thread::sleep(delay);
        promise.set_result(outcome).unwrap();
    });
    future
}
