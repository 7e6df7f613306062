//! Flattening: peeling nested futures down to the innermost plain value.
//!
//! Every type that can appear as the value of a future, or as the return value of a continuation,
//! implements [`Resolve`]. Future types peel one level and recurse into their item; plain values
//! resolve to themselves. The nesting depth is part of the static type, so the recursion is
//! unrolled by the compiler and always terminates.
//!
//! Rust has no specialization, so "anything that isn't a future" can't be a blanket impl.
//! Plain types opt in instead, either below or downstream through [`resolve_as_value!`]:
//!
//! ```
//! #[macro_use]
//! extern crate thenable;
//!
//! #[derive(Debug, PartialEq)]
//! struct Reading(u32);
//!
//! resolve_as_value!(Reading);
//!
//! # fn main() {
//! let nested = thenable::Future::ready(thenable::Future::ready(Reading(7)));
//! assert_eq!(thenable::flatten(nested).unwrap(), Reading(7));
//! # }
//! ```

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use futures::executor::block_on;
use futures::future::{self, BoxFuture, FutureExt};

use crate::error::Failure;

/// A boxed computation yielding a flattened value or the failure of some level.
pub type Resolving<T> = BoxFuture<'static, Result<T, Failure>>;

/// A value that can be flattened to `Output`, waiting on as many futures as it takes.
///
/// Failures are never translated: the first failed level ends the recursion and its failure is
/// what `resolve` yields.
pub trait Resolve: Send + Sized + 'static {
    /// The innermost non-future type.
    type Output: Send + 'static;

    fn resolve(self) -> Resolving<Self::Output>;
}

/// Lifts an already-known value into a `Resolving`.
pub fn resolved<T: Send + 'static>(t: T) -> Resolving<T> {
    future::ready(Ok(t)).boxed()
}

pub(crate) fn failing<T: Send + 'static>(failure: Failure) -> Resolving<T> {
    future::ready(Err(failure)).boxed()
}

/// Blocks the calling thread until `r` is flattened.
///
/// Deferred work anywhere in the nesting runs inline on this thread.
/// Must not be called from inside a thread pool task.
pub fn flatten<R: Resolve>(r: R) -> Result<R::Output, Failure> {
    block_on(r.resolve())
}

/// Implements [`Resolve`] as the identity for the given types.
#[macro_export]
macro_rules! resolve_as_value {
    ($($t:ty),* $(,)*) => {
        $(
            impl $crate::Resolve for $t {
                type Output = $t;

                fn resolve(self) -> $crate::Resolving<$t> {
                    $crate::resolved(self)
                }
            }
        )*
    }
}

resolve_as_value!(
    (), bool, char,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64,
    String, &'static str, Duration,
);

macro_rules! resolve_container_as_value {
    ($($c:ident),*) => {
        $(
            impl<T: Send + 'static> Resolve for $c<T> {
                type Output = Self;

                fn resolve(self) -> Resolving<Self> {
                    resolved(self)
                }
            }
        )*
    }
}

resolve_container_as_value!(Vec, Option, Box);

impl<T: Send + Sync + 'static> Resolve for Arc<T> {
    type Output = Self;

    fn resolve(self) -> Resolving<Self> {
        resolved(self)
    }
}

macro_rules! resolve_tuple_as_value {
    ($($name:ident),+) => {
        impl<$($name: Send + 'static),+> Resolve for ($($name,)+) {
            type Output = Self;

            fn resolve(self) -> Resolving<Self> {
                resolved(self)
            }
        }
    }
}

resolve_tuple_as_value!(A);
resolve_tuple_as_value!(A, B);
resolve_tuple_as_value!(A, B, C);
resolve_tuple_as_value!(A, B, C, D);

/// `Ok` flattens further; `Err` becomes a failure. This is how a continuation raises.
impl<V, E> Resolve for Result<V, E> where
V: Resolve,
E: StdError + Send + Sync + 'static,
{
    type Output = V::Output;

    fn resolve(self) -> Resolving<V::Output> {
        match self {
            Ok(v) => v.resolve(),
            Err(e) => failing(Failure::raise(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use quickcheck::{quickcheck, TestResult};

    use crate::future::{Future, SharedFuture};
    use crate::testlib::{self, TestError};

    #[test]
    fn plain_values_are_identity() {
        assert_eq!(flatten(5u8), Ok(5));
        assert_eq!(flatten(String::from("x")), Ok(String::from("x")));
        assert_eq!(flatten(vec![1, 2, 3]), Ok(vec![1, 2, 3]));
        assert_eq!(flatten((1, "two")), Ok((1, "two")));
        assert_eq!(flatten(()), Ok(()));
    }

    #[test]
    fn plain_containers_do_not_peel() {
        // An Option of a future is a value in its own right: it is not waited on.
        let mut inner = flatten(Some(Future::ready(3i32))).unwrap().unwrap();
        assert_eq!(inner.get(), Ok(3));
    }

    #[test]
    fn results_raise_their_errors() {
        let raised: Result<i32, TestError> = Err(TestError("raised"));
        let failure = flatten(raised).unwrap_err();
        assert_eq!(failure.downcast_ref::<TestError>(), Some(&TestError("raised")));

        let nested: Result<Future<i32>, TestError> = Ok(Future::ready(9));
        assert_eq!(flatten(nested), Ok(9));
    }

    #[test]
    fn flattens_pending_levels() {
        testlib::init_logging();

        let inner = testlib::slow(11i32, Duration::from_millis(20));
        let outer = testlib::slow(inner, Duration::from_millis(20));
        assert_eq!(flatten(outer), Ok(11));
    }

    #[test]
    fn flattening_is_uniform_across_shapes() {
        fn prop(v: i64) -> bool {
            let depth0 = flatten(v) == Ok(v);
            let depth1 = flatten(Future::ready(v)) == Ok(v);
            let exclusive = flatten(Future::ready(Future::ready(Future::ready(v)))) == Ok(v);
            let shared = flatten(SharedFuture::ready(SharedFuture::ready(v))) == Ok(v);
            let mixed = flatten(
                Future::ready(SharedFuture::ready(SharedFuture::ready(Future::ready(v).share())))
            ) == Ok(v);
            let deep = flatten(Future::ready(Future::ready(Future::ready(Future::ready(v))))) == Ok(v);

            depth0 && depth1 && exclusive && shared && mixed && deep
        }

        quickcheck(prop as fn(i64) -> bool);
    }

    #[test]
    fn failure_at_any_level_surfaces_unchanged() {
        fn prop(level: u8) -> TestResult {
            let failure = Failure::raise(TestError("level"));
            let expected = failure.payload().cloned();

            let nested: Future<Future<Future<i32>>> = match level % 3 {
                0 => Future::failed(failure),
                1 => Future::ready(Future::failed(failure)),
                _ => Future::ready(Future::ready(Future::failed(failure))),
            };

            let got = flatten(nested).unwrap_err();
            match (got.payload(), expected.as_ref()) {
                (Some(a), Some(b)) => TestResult::from_bool(Arc::ptr_eq(a, b)),
                _ => TestResult::failed(),
            }
        }

        quickcheck(prop as fn(u8) -> TestResult);
    }
}
