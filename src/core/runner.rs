//! # Run a task body once and capture its outcome.
//!
//! - **Execute** the body with its bound arguments
//! - **Contain** errors and panics: both become a [`Fault`] built right here,
//!   inside the executing slot
//! - **Never** propagate anything to the caller or to pool bookkeeping
//!
//! ## Result mapping
//! ```text
//! task.run() → Ok(value)    → Outcome::Success(value)
//! task.run() → Err(error)   → Outcome::Failure(Fault::from_task_error)
//! task.run() → panic!(..)   → Outcome::Failure(Fault::from_panic)
//! ```

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use crate::events::{Fault, FaultSite, Outcome};
use crate::tasks::{Task, TaskContext};

/// Executes `task` once with `ctx` and converts the result into an [`Outcome`].
///
/// `name` is the name captured at submission; the task is not asked again.
/// Building the future happens inside the guard too, so a `run` that panics
/// before returning its future is contained like any other panic.
pub(crate) async fn run_once<T: Task + ?Sized>(task: &T, name: &str, ctx: TaskContext) -> Outcome {
    let (job, worker) = (ctx.job, ctx.worker);
    let res = AssertUnwindSafe(async move { task.run(ctx).await })
        .catch_unwind()
        .await;

    let site = FaultSite {
        task: name,
        job,
        worker,
    };
    match res {
        Ok(Ok(value)) => Outcome::Success(value),
        Ok(Err(err)) => Outcome::Failure(Fault::from_task_error(&err, site)),
        Err(panic_err) => Outcome::Failure(Fault::from_panic(panic_err.as_ref(), site)),
    }
}
