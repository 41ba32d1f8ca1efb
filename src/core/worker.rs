//! # Slot worker: drives jobs through the lifecycle protocol.
//!
//! One worker future runs per occupied slot. It executes its job, releases the
//! slot, and if the pending queue has a head, keeps the slot and continues with
//! that job instead of exiting.
//!
//! ## Event flow
//! ```text
//! loop {
//!   ├─► emit Started(worker)
//!   ├─► run_once(task, name, ctx)
//!   │       ├─ Success ──► emit Succeeded(value)
//!   │       └─ Failure ──► emit Failed(fault)
//!   ├─► emit Finished(worker)                 (unconditionally)
//!   ├─► lock: release slot, pop next pending  (FIFO)
//!   ├─► mark job Done(outcome), publish load
//!   └─► next job? continue : exit
//! }
//! ```
//!
//! ## Rules
//! - Exactly one `Started`, one of `Succeeded`/`Failed`, one `Finished` per job.
//! - The slot is released only after every `Finished` callback has returned, so a
//!   queued job never starts before the previous occupant's `Finished`.
//! - Callbacks run outside the pool lock.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::job::Job;
use crate::core::pool::PoolShared;
use crate::core::runner::run_once;
use crate::events::{Bus, Event, LifecycleEvent, Notification, Outcome, WorkerId};
use crate::tasks::TaskContext;

/// Runs `job` on `worker`, then keeps pulling from the pending queue.
pub(crate) async fn run_slot(shared: Arc<PoolShared>, mut worker: WorkerId, mut job: Job) {
    loop {
        let outcome = execute(&shared.bus, worker, &job).await;

        let next = shared.release_and_promote(worker);
        if let Some((next_worker, next_job)) = &next {
            next_job.mark_running(*next_worker);
        }
        job.mark_done(outcome);
        shared.publish_load();

        match next {
            Some((next_worker, next_job)) => {
                worker = next_worker;
                job = next_job;
            }
            None => break,
        }
    }
}

/// Executes one job on `worker`, delivering all four lifecycle events.
async fn execute(bus: &Bus, worker: WorkerId, job: &Job) -> Outcome {
    debug!(job = %job.id, task = %job.name, worker = %worker, "task started");
    deliver(bus, job, LifecycleEvent::Started(worker));

    let ctx = TaskContext {
        worker,
        job: job.id,
        args: Arc::clone(job.spec.args()),
    };
    let outcome = run_once(job.spec.task().as_ref(), &job.name, ctx).await;

    match &outcome {
        Outcome::Success(value) => {
            debug!(job = %job.id, task = %job.name, worker = %worker, "task succeeded");
            deliver(bus, job, LifecycleEvent::Succeeded(value.clone()));
        }
        Outcome::Failure(fault) => {
            warn!(
                job = %job.id,
                task = %job.name,
                worker = %worker,
                kind = %fault.kind,
                error = %fault.message,
                "task failed"
            );
            deliver(bus, job, LifecycleEvent::Failed(fault.clone()));
        }
    }

    deliver(bus, job, LifecycleEvent::Finished(worker));
    debug!(job = %job.id, task = %job.name, worker = %worker, "task finished");
    outcome
}

/// Invokes the job's callbacks for `lifecycle`, then publishes it on the bus.
fn deliver(bus: &Bus, job: &Job, lifecycle: LifecycleEvent) {
    let ev = Arc::new(Event::new(job.id, Arc::clone(&job.name), lifecycle));
    let report = job.callbacks.emit(&ev, bus);
    if report.panicked > 0 {
        warn!(
            job = %job.id,
            task = %job.name,
            kind = %ev.kind(),
            delivered = report.delivered,
            panicked = report.panicked,
            "event delivered with panicking observers"
        );
    }
    bus.publish(Notification::Lifecycle(ev));
}
