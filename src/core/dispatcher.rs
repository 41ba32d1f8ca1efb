//! # Dispatcher: binds tasks to callbacks and hands them to the pool.
//!
//! Thin composition layer with no scheduling state of its own. Every dispatch
//! carries `merge(global, local)`, so a caller that supplies only local callbacks
//! can never bypass the global ones.
//!
//! ```text
//! dispatch(spec, Some(local))
//!     └─► CallbackSet::merge(global, local) ──► WorkerPool::submit(spec, merged) ──► JobHandle
//! dispatch(spec, None)
//!     └─► global.clone() ─────────────────────► WorkerPool::submit(spec, global)  ──► JobHandle
//! ```

use std::sync::Arc;

use crate::callbacks::{Callback, CallbackSet};
use crate::core::builder::DispatcherBuilder;
use crate::core::config::PoolConfig;
use crate::core::job::JobHandle;
use crate::core::pool::WorkerPool;
use crate::error::DispatchError;
use crate::tasks::TaskSpec;

/// Submission façade with pool-wide ("global") callbacks.
///
/// ## Example
/// ```rust
/// use std::sync::{Arc, Mutex};
/// use serde_json::json;
/// use taskagent::{CallbackSet, Dispatcher, Event, EventKind, PoolConfig, TaskContext, TaskError, TaskFn, TaskRef};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let seen = Arc::new(Mutex::new(Vec::new()));
///     let log = Arc::clone(&seen);
///     let global = CallbackSet::new().on(EventKind::Finished, move |ev: &Event| {
///         log.lock().unwrap().push(ev.task.to_string());
///     });
///
///     let dispatcher = Dispatcher::builder(PoolConfig::with_capacity(1))
///         .with_global_callbacks(global)
///         .build()?;
///
///     let task: TaskRef = TaskFn::arc("ping", |_ctx: TaskContext| async move {
///         Ok::<_, TaskError>(json!("pong"))
///     });
///     dispatcher.dispatch(task, None).finished().await;
///
///     assert_eq!(*seen.lock().unwrap(), vec!["ping".to_string()]);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Dispatcher {
    pool: WorkerPool,
    global: Arc<CallbackSet>,
}

impl Dispatcher {
    /// Returns a builder that creates the pool together with the dispatcher.
    pub fn builder(cfg: PoolConfig) -> DispatcherBuilder {
        DispatcherBuilder::new(cfg)
    }

    /// Wraps an existing pool.
    pub fn new(pool: WorkerPool, global: CallbackSet) -> Self {
        Self {
            pool,
            global: Arc::new(global),
        }
    }

    /// Submits `spec` with the global callbacks followed by `local` ones.
    pub fn dispatch(&self, spec: impl Into<TaskSpec>, local: Option<CallbackSet>) -> JobHandle {
        let callbacks = match local {
            Some(local) => CallbackSet::merge(&self.global, &local),
            None => CallbackSet::clone(&self.global),
        };
        self.pool.submit(spec.into(), callbacks)
    }

    /// Like [`dispatch`](Self::dispatch), with local callbacks keyed by name.
    ///
    /// Keys are validated before anything is submitted; an unknown key fails with
    /// [`DispatchError::InvalidCallbackKey`] and the task is not run.
    pub fn dispatch_keyed<I, K>(&self, spec: impl Into<TaskSpec>, local: I) -> Result<JobHandle, DispatchError>
    where
        I: IntoIterator<Item = (K, Callback)>,
        K: AsRef<str>,
    {
        let local = CallbackSet::from_keyed(local)?;
        Ok(self.dispatch(spec, Some(local)))
    }

    pub fn global_callbacks(&self) -> &CallbackSet {
        &self.global
    }

    /// The pool behind this dispatcher.
    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    pub fn active_count(&self) -> usize {
        self.pool.active_count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.capacity()
    }

    /// See [`WorkerPool::configure`].
    pub fn set_capacity(&self, capacity: usize) -> Result<(), DispatchError> {
        self.pool.configure(capacity)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pool", &self.pool)
            .field("global", &self.global)
            .finish()
    }
}
