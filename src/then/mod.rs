//! Continuations: chaining work onto futures and promises.

mod launch;
pub use self::launch::Launch;

mod dispatch;
pub use self::dispatch::{dispatch, dispatch_void};

mod chain;
pub use self::chain::{then, then_void, then_void_with, then_with, thenable, thenable_void, Antecedent};

pub(crate) mod detached;
pub use self::detached::then_detached;

mod thenable;
pub use self::thenable::Thenable;
