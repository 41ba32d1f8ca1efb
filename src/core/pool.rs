//! # WorkerPool: bounded concurrent executor with a FIFO pending queue.
//!
//! The pool owns a fixed number of execution slots. Submissions take a free slot
//! right away or wait in the pending queue; a slot that finishes its job pulls the
//! queue head before it is given up.
//!
//! ## Architecture
//! ```text
//! submit(spec, callbacks)                      (any thread, never blocks)
//!     │
//!     ├─ lock ──► SlotTable::try_acquire()
//!     │             ├─ Some(worker) ──► runtime.spawn(run_slot(worker, job))
//!     │             └─ None         ──► SlotTable::enqueue(job)
//!     │                                   └─► Bus.publish(Queued{position})
//!     └─► JobHandle (query only)
//!
//! run_slot(worker, job)
//!     └─► Started → body → Succeeded|Failed → Finished
//!           └─ lock ──► release(worker), next_ready() ──► continue with queue head
//!
//! configure(capacity)
//!     └─ lock ──► set_capacity, drain_ready() ──► spawn every promoted job
//! ```
//!
//! ## Rules
//! - `active_count()` never exceeds the capacity in force when the slot was taken.
//! - Lowering capacity never evicts; raising it promotes queued jobs at once.
//! - The lock is never held while a callback or a task body runs.
//! - A poisoned lock is recovered; the table is only mutated by short,
//!   non-panicking updates.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::callbacks::CallbackSet;
use crate::core::builder::PoolBuilder;
use crate::core::config::PoolConfig;
use crate::core::job::{Job, JobHandle};
use crate::core::slot::{PoolLoad, SlotTable};
use crate::core::worker::run_slot;
use crate::error::DispatchError;
use crate::events::{Bus, JobId, Notification, WorkerId};
use crate::tasks::TaskSpec;

/// State shared between the pool handle and its running slots.
pub(crate) struct PoolShared {
    table: Mutex<SlotTable<Job>>,
    pub(crate) bus: Bus,
    runtime: Handle,
    next_job: AtomicU64,
    load: watch::Sender<PoolLoad>,
}

impl PoolShared {
    fn lock(&self) -> MutexGuard<'_, SlotTable<Job>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Frees `worker` and claims a slot for the queue head, if any.
    pub(crate) fn release_and_promote(&self, worker: WorkerId) -> Option<(WorkerId, Job)> {
        let mut table = self.lock();
        table.release(worker);
        table.next_ready()
    }

    /// Pushes the current occupancy to [`WorkerPool::wait_idle`] waiters.
    pub(crate) fn publish_load(&self) {
        // Sent under the lock so concurrent publishers cannot reorder snapshots.
        let table = self.lock();
        self.load.send_replace(table.load());
    }
}

/// Capacity-bounded executor for [`TaskSpec`]s.
///
/// Cloning is cheap; clones share slots, queue and bus.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use taskagent::{CallbackSet, Outcome, PoolConfig, TaskContext, TaskError, TaskFn, TaskSpec, WorkerPool};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let pool = WorkerPool::builder(PoolConfig::with_capacity(2)).build()?;
///
///     let task = TaskFn::arc("answer", |_ctx: TaskContext| async move {
///         Ok::<_, TaskError>(json!(42))
///     });
///     let handle = pool.submit(TaskSpec::new(task), CallbackSet::new());
///
///     assert_eq!(handle.finished().await, Some(Outcome::Success(json!(42))));
///     assert_eq!(pool.active_count(), 0);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct WorkerPool {
    shared: Arc<PoolShared>,
}

impl WorkerPool {
    /// Returns a builder for a pool with the given configuration.
    pub fn builder(cfg: PoolConfig) -> PoolBuilder {
        PoolBuilder::new(cfg)
    }

    /// Builds a pool on the current tokio runtime.
    pub fn new(cfg: PoolConfig) -> Result<Self, DispatchError> {
        Self::builder(cfg).build()
    }

    pub(crate) fn new_internal(capacity: usize, bus: Bus, runtime: Handle) -> Self {
        let table = SlotTable::new(capacity);
        let (load, _rx) = watch::channel(table.load());
        Self {
            shared: Arc::new(PoolShared {
                table: Mutex::new(table),
                bus,
                runtime,
                next_job: AtomicU64::new(1),
                load,
            }),
        }
    }

    /// Submits a task for asynchronous execution.
    ///
    /// Never blocks and never runs the body on the caller's context. The returned
    /// handle can observe the job but cannot cancel it.
    pub fn submit(&self, spec: TaskSpec, callbacks: CallbackSet) -> JobHandle {
        let id = JobId(self.shared.next_job.fetch_add(1, Ordering::Relaxed));
        let (job, handle) = Job::new(id, spec, callbacks);

        let started = {
            let mut table = self.shared.lock();
            // A free slot with a non-empty queue cannot happen: every release
            // promotes the head under this same lock.
            let started = match table.try_acquire() {
                Some(worker) => Some((worker, job)),
                None => {
                    let task = Arc::clone(&job.name);
                    let position = table.enqueue(job);
                    debug!(job = %id, task = %task, position, "task queued");
                    self.shared.bus.publish(Notification::Queued { job: id, task, position });
                    None
                }
            };
            self.shared.load.send_replace(table.load());
            started
        };

        if let Some((worker, job)) = started {
            self.spawn(worker, job);
        }
        handle
    }

    /// Changes the maximum number of concurrent executions.
    ///
    /// Raising the capacity starts queued jobs on the new slots immediately.
    /// Lowering it lets running jobs finish; no new job starts until the number
    /// of busy slots drops below the new limit.
    pub fn configure(&self, capacity: usize) -> Result<(), DispatchError> {
        if capacity == 0 {
            return Err(DispatchError::ZeroCapacity);
        }
        let (previous, promoted) = {
            let mut table = self.shared.lock();
            let previous = table.capacity();
            table.set_capacity(capacity);
            let promoted = table.drain_ready();
            self.shared.load.send_replace(table.load());
            (previous, promoted)
        };
        info!(previous, capacity, promoted = promoted.len(), "pool capacity changed");

        for (worker, job) in promoted {
            self.spawn(worker, job);
        }
        Ok(())
    }

    /// Maximum number of concurrent executions.
    pub fn capacity(&self) -> usize {
        self.shared.lock().capacity()
    }

    /// Number of tasks currently occupying a slot.
    pub fn active_count(&self) -> usize {
        self.shared.lock().active()
    }

    /// Number of tasks waiting for a slot.
    pub fn pending_count(&self) -> usize {
        self.shared.lock().pending()
    }

    /// Consistent snapshot of active, pending and capacity.
    pub fn load(&self) -> PoolLoad {
        self.shared.lock().load()
    }

    /// Subscribes to lifecycle events and pool notices.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.shared.bus.subscribe()
    }

    /// Waits until nothing is running and nothing is queued.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.load.subscribe();
        // The sender lives in `shared`, which `self` keeps alive.
        let _ = rx.wait_for(PoolLoad::is_idle).await;
    }

    fn spawn(&self, worker: WorkerId, job: Job) {
        job.mark_running(worker);
        self.shared
            .runtime
            .spawn(run_slot(Arc::clone(&self.shared), worker, job));
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool").field("load", &self.load()).finish()
    }
}
