//! # Task abstraction.
//!
//! This module defines the [`Task`] trait and the [`TaskContext`] a body receives
//! when a slot runs it. The common handle type is [`TaskRef`], an `Arc<dyn Task>`
//! suitable for sharing across the runtime.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TaskError;
use crate::events::{JobId, WorkerId};
use crate::tasks::TaskArgs;

/// # Shared handle to a task object.
pub type TaskRef = Arc<dyn Task>;

/// What a body gets to see about its execution.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Slot the task occupies.
    pub worker: WorkerId,
    /// Submission being executed.
    pub job: JobId,
    /// Arguments bound in the [`TaskSpec`](crate::TaskSpec).
    pub args: Arc<TaskArgs>,
}

/// # Asynchronous unit of work.
///
/// A `Task` has a stable [`name`](Task::name) and an async [`run`](Task::run) method.
/// Returning `Ok(value)` produces a `Succeeded` event; returning an error or
/// panicking produces a `Failed` event. Either way the slot survives.
///
/// # Example
/// ```
/// use async_trait::async_trait;
/// use serde_json::{Value, json};
/// use taskagent::{Task, TaskContext, TaskError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Task for Echo {
///     fn name(&self) -> &str { "echo" }
///
///     async fn run(&self, ctx: TaskContext) -> Result<Value, TaskError> {
///         Ok(json!({ "args": ctx.args.positional() }))
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Returns a stable, human-readable task name.
    fn name(&self) -> &str;

    /// Executes the task to completion.
    ///
    /// May take arbitrary time; it only occupies its own slot. There is no
    /// cancellation: once started, a body always runs to the end.
    async fn run(&self, ctx: TaskContext) -> Result<Value, TaskError>;
}
