//! The single-assignment future/promise primitive, and flattening of nested futures.

mod future;
pub use self::future::{Future, Status};

mod promise;
pub use self::promise::{channel, Promise};

mod resolve;
pub use self::resolve::{flatten, resolved, Resolve, Resolving};

mod shared;
pub use self::shared::SharedFuture;
