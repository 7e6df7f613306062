//! The execution substrate continuations are scheduled on.
//!
//! Deferred work is kept unstarted inside the returned future. Pooled work goes to a
//! `futures` thread pool. Detached work gets a thread of its own (see `then::detached`).
//! Whatever the policy, a panicking continuation is caught here and becomes the resulting
//! future's failure.
//!
//! There is one process-wide executor, built lazily from the environment on first use. It can be
//! replaced with [`install`]; independent executors can be built with [`Executor::new`].

use std::env;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use futures::channel::oneshot;
use futures::executor::ThreadPool;
use futures::future::FutureExt;

use crate::error::{ExecutorError, Failure};
use crate::future::{Future, Resolve, Resolving};
use crate::then::{dispatch, dispatch_void, detached, Antecedent, Launch};

pub const POOL_SIZE_VAR: &str = "THENABLE_POOL_SIZE";
pub const POOL_NAME_VAR: &str = "THENABLE_POOL_NAME";
pub const DETACHED_NAME_VAR: &str = "THENABLE_DETACHED_NAME";
pub const AUTO_LAUNCH_VAR: &str = "THENABLE_AUTO_LAUNCH";

/// Settings for an `Executor`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Worker threads in the pool. `None` leaves it to the pool, one per CPU.
    pub pool_size: Option<usize>,
    pub pool_name_prefix: String,
    /// Name given to every detached continuation thread.
    pub detached_name: String,
    /// What `Launch::Auto` means: `Deferred` or `Async`.
    pub auto_launch: Launch,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        ExecutorConfig {
            pool_size: None,
            pool_name_prefix: String::from("thenable-pool-"),
            detached_name: String::from("thenable-detached"),
            auto_launch: Launch::Async,
        }
    }
}

impl ExecutorConfig {
    pub fn pool_size(mut self, size: usize) -> Self {
        self.pool_size = Some(size);
        self
    }

    pub fn pool_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.pool_name_prefix = prefix.into();
        self
    }

    pub fn detached_name<S: Into<String>>(mut self, name: S) -> Self {
        self.detached_name = name.into();
        self
    }

    pub fn auto_launch(mut self, launch: Launch) -> Self {
        self.auto_launch = launch;
        self
    }

    /// The defaults, overridden by whichever `THENABLE_*` variables are set.
    pub fn from_env() -> Result<Self, ExecutorError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    fn from_lookup<L>(lookup: L) -> Result<Self, ExecutorError> where L: Fn(&'static str) -> Option<String> {
        let mut config = ExecutorConfig::default();

        if let Some(value) = lookup(POOL_SIZE_VAR) {
            match value.trim().parse::<usize>() {
                Ok(size) => config.pool_size = Some(size),
                Err(_) => return Err(ExecutorError::InvalidEnv { var: POOL_SIZE_VAR, value: value }),
            }
        }
        if let Some(value) = lookup(POOL_NAME_VAR) {
            config.pool_name_prefix = value;
        }
        if let Some(value) = lookup(DETACHED_NAME_VAR) {
            config.detached_name = value;
        }
        if let Some(value) = lookup(AUTO_LAUNCH_VAR) {
            match value.parse::<Launch>() {
                Ok(launch) => config.auto_launch = launch,
                Err(_) => return Err(ExecutorError::InvalidEnv { var: AUTO_LAUNCH_VAR, value: value }),
            }
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.pool_size == Some(0) {
            return Err(ExecutorError::ZeroPoolSize);
        }
        match self.auto_launch {
            Launch::Deferred | Launch::Async => Ok(()),
            other => Err(ExecutorError::InvalidAutoLaunch(other)),
        }
    }
}

/// Schedules continuations according to a `Launch` policy.
pub struct Executor {
    config: ExecutorConfig,
    pool: Result<ThreadPool, Arc<ExecutorError>>,
}

impl Executor {
    /// Builds an executor and its thread pool. Fails on an invalid config or if the pool
    /// can't be created.
    pub fn new(config: ExecutorConfig) -> Result<Self, ExecutorError> {
        config.validate()?;
        let pool = build_pool(&config)?;
        debug!("executor ready: {:?}", config);

        Ok(Executor {
            config: config,
            pool: Ok(pool),
        })
    }

    /// Never fails. Without a pool, `Auto` degrades to `Deferred` and `Async` work fails.
    fn degraded(config: ExecutorConfig) -> Self {
        let pool = build_pool(&config).map_err(|e| {
            warn!("no thread pool, automatic launches will be deferred: {}", e);
            Arc::new(e)
        });

        Executor {
            config: config,
            pool: pool,
        }
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// The policy `launch` stands for on this executor.
    pub fn effective_launch(&self, launch: Launch) -> Launch {
        match launch {
            Launch::Auto => match self.pool {
                Ok(_) => self.config.auto_launch,
                Err(_) => Launch::Deferred,
            },
            other => other,
        }
    }

    /// Schedules `work`, capturing panics, and returns the future of its outcome.
    /// Never blocks.
    pub fn schedule<T: Send + 'static>(&self, launch: Launch, work: Resolving<T>) -> Future<T> {
        let launch = self.effective_launch(launch);
        trace!("scheduling continuation: {}", launch);

        match launch {
            Launch::Deferred => Future::deferred(capture(work)),
            Launch::Detached => detached::spawn(&self.config.detached_name, work),
            _ => match self.pool {
                Ok(ref pool) => {
                    let (sender, receiver) = oneshot::channel();
                    let work = capture(work);
                    pool.spawn_ok(async move {
                        // The reader may be gone already, which is fine.
                        let _ = sender.send(work.await);
                    });
                    Future::from_receiver(receiver)
                }
                Err(ref e) => Future::failed(Failure::Executor(Arc::clone(e))),
            },
        }
    }

    /// `then::then_with`, on this executor.
    pub fn then_with<A, F, R>(&self, antecedent: A, f: F, launch: Launch) -> Future<R::Output> where
    A: Antecedent,
    F: FnOnce(<A::Handle as Resolve>::Output) -> R + Send + 'static,
    R: Resolve,
    {
        self.schedule(launch, dispatch(antecedent.into_handle(), f))
    }

    /// `then::then_void_with`, on this executor.
    pub fn then_void_with<A, F, R>(&self, antecedent: A, f: F, launch: Launch) -> Future<R::Output> where
    A: Antecedent,
    A::Handle: Resolve<Output = ()>,
    F: FnOnce() -> R + Send + 'static,
    R: Resolve,
    {
        self.schedule(launch, dispatch_void(antecedent.into_handle(), f))
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Executor")
            .field("config", &self.config)
            .field("pool", &self.pool.is_ok())
            .finish()
    }
}

fn build_pool(config: &ExecutorConfig) -> Result<ThreadPool, ExecutorError> {
    let mut builder = ThreadPool::builder();
    builder.name_prefix(config.pool_name_prefix.clone());
    if let Some(size) = config.pool_size {
        builder.pool_size(size);
    }
    Ok(builder.create()?)
}

/// Turns a panic anywhere inside `work` into its failure.
pub(crate) fn capture<T: Send + 'static>(work: Resolving<T>) -> Resolving<T> {
    AssertUnwindSafe(work).catch_unwind().map(|caught| match caught {
        Ok(outcome) => outcome,
        Err(payload) => {
            let failure = Failure::panicked(payload);
            warn!("{}", failure);
            Err(failure)
        }
    }).boxed()
}

type Slot = RwLock<Option<Arc<Executor>>>;

lazy_static! {
    static ref GLOBAL: Slot = RwLock::new(None);
}

fn read_slot(slot: &Slot) -> RwLockReadGuard<Option<Arc<Executor>>> {
    slot.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_slot(slot: &Slot) -> RwLockWriteGuard<Option<Arc<Executor>>> {
    slot.write().unwrap_or_else(PoisonError::into_inner)
}

/// The executor in `slot`, created from the environment if there is none yet.
fn get_or_create(slot: &Slot) -> Arc<Executor> {
    {
        let current = read_slot(slot);
        if let Some(ref executor) = *current {
            return Arc::clone(executor);
        }
    }

    let mut current = write_slot(slot);
    let executor = current.get_or_insert_with(|| {
        let config = ExecutorConfig::from_env().unwrap_or_else(|e| {
            warn!("ignoring executor environment: {}", e);
            ExecutorConfig::default()
        });
        debug!("creating the process-wide executor");
        Arc::new(Executor::degraded(config))
    });
    Arc::clone(executor)
}

/// The process-wide executor, created from the environment on first use.
///
/// A bad environment is logged and ignored in favor of the defaults.
pub fn global() -> Arc<Executor> {
    get_or_create(&GLOBAL)
}

/// Replaces the process-wide executor. Continuations already scheduled keep running where they
/// were scheduled.
pub fn install(config: ExecutorConfig) -> Result<(), ExecutorError> {
    let executor = Executor::new(config)?;
    *write_slot(&GLOBAL) = Some(Arc::new(executor));
    Ok(())
}
