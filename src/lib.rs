//! Continuation chaining for single-assignment futures.
//!
//! `then(antecedent, f)` schedules `f` to run on the value of `antecedent` once it is available,
//! and immediately returns a future for `f`'s outcome. Antecedents may be nested arbitrarily deep
//! (a future of a shared future of a future...), and so may what `f` returns: both are flattened,
//! so `f` always sees the innermost value and the resulting future always holds one.
//!
//! ```
//! use thenable::{then_void, then_with, Future, Launch};
//!
//! let nested = Future::ready(Future::ready(3i32).share());
//! let mut f = then_with(nested, |x| Future::ready(x + 1), Launch::Async);
//! assert_eq!(f.get().unwrap(), 4);
//!
//! let mut g = then_void(Future::ready(()), || "no arguments");
//! assert_eq!(g.get().unwrap(), "no arguments");
//! ```
//!
//! Failures travel down a chain untouched; a stage whose antecedent failed is never called.

#[macro_use]
extern crate log;
#[macro_use]
extern crate lazy_static;

mod error;
pub use crate::error::{ExecutorError, Failure};

pub mod executor;
pub use crate::executor::{Executor, ExecutorConfig};

pub mod future;
pub use crate::future::{channel, flatten, resolved, Future, Promise, Resolve, Resolving, SharedFuture, Status};

pub mod then;
pub use crate::then::{
    then, then_detached, then_void, then_void_with, then_with, thenable, thenable_void,
    Antecedent, Launch, Thenable,
};

#[cfg(test)]
mod testlib;
