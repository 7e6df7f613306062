//! Running one continuation: flatten the antecedent, call back, flatten what the callback returned.
//!
//! Nothing here catches anything. A failed antecedent short-circuits before the callback is
//! called, and a failure from the callback propagates as is; whoever schedules the dispatch
//! captures it into the resulting future.

use futures::future::FutureExt;

use crate::future::{Resolve, Resolving};

/// Dispatch for antecedents that carry a value.
pub fn dispatch<A, F, R>(antecedent: A, f: F) -> Resolving<R::Output> where
A: Resolve,
F: FnOnce(A::Output) -> R + Send + 'static,
R: Resolve,
{
    async move {
        match antecedent.resolve().await {
            Ok(value) => f(value).resolve().await,
            Err(failure) => Err(failure),
        }
    }.boxed()
}

/// Dispatch for antecedents that carry no value: the antecedent is only observed for
/// success or failure, and the callback takes no arguments.
pub fn dispatch_void<A, F, R>(antecedent: A, f: F) -> Resolving<R::Output> where
A: Resolve<Output = ()>,
F: FnOnce() -> R + Send + 'static,
R: Resolve,
{
    async move {
        match antecedent.resolve().await {
            Ok(()) => f().resolve().await,
            Err(failure) => Err(failure),
        }
    }.boxed()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use futures::executor::block_on;

    use crate::error::Failure;
    use crate::future::{Future, SharedFuture};
    use crate::testlib::TestError;

    #[test]
    fn passes_the_flattened_value() {
        let antecedent = Future::ready(Future::ready(SharedFuture::ready(20i32)));
        assert_eq!(block_on(dispatch(antecedent, |x: i32| x + 1)), Ok(21));
    }

    #[test]
    fn flattens_the_callback_result() {
        let work = dispatch(Future::ready(1i32), |x| Future::ready(Future::ready(x * 7)));
        assert_eq!(block_on(work), Ok(7));
    }

    #[test]
    fn void_callback_takes_no_arguments() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let work = dispatch_void(Future::ready(Future::ready(())), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        assert_eq!(block_on(work), Ok(()));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_antecedent_skips_the_callback() {
        let failure = Failure::raise(TestError("antecedent"));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let work = dispatch(Future::<i32>::failed(failure.clone()), move |x| {
            counter.fetch_add(1, Ordering::SeqCst);
            x
        });

        assert_eq!(block_on(work), Err(failure));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn callback_errors_propagate() {
        let work = dispatch(Future::ready(2i32), |_| -> Result<i32, TestError> { Err(TestError("callback")) });
        let failure = block_on(work).unwrap_err();
        assert_eq!(failure.downcast_ref::<TestError>(), Some(&TestError("callback")));
    }
}
