//! # Task specification for dispatch.
//!
//! Defines [`TaskSpec`]: the unit handed to the pool, bundling the callable
//! ([`TaskRef`]) with the arguments it will be called with ([`TaskArgs`]).
//!
//! ## Rules
//! - A spec is immutable once built; the pool only reads it.
//! - Cloning is cheap (both parts are behind `Arc`). Submitting the same spec
//!   twice runs the body twice, possibly at the same time on two slots.

use std::sync::Arc;

use crate::tasks::{TaskArgs, TaskRef};

/// Callable plus bound arguments.
///
/// ## Example
/// ```rust
/// use serde_json::json;
/// use taskagent::{TaskArgs, TaskContext, TaskError, TaskFn, TaskSpec};
///
/// let greet = TaskFn::arc("greet", |ctx: TaskContext| async move {
///     let who = ctx.args.require_str(0)?;
///     Ok::<_, TaskError>(json!(format!("hello {who}")))
/// });
///
/// let spec = TaskSpec::new(greet).with_args(TaskArgs::new().arg("world"));
/// assert_eq!(spec.name(), "greet");
/// assert_eq!(spec.args().positional().len(), 1);
/// ```
#[derive(Clone)]
pub struct TaskSpec {
    task: TaskRef,
    args: Arc<TaskArgs>,
}

impl TaskSpec {
    /// Spec without arguments.
    pub fn new(task: TaskRef) -> Self {
        Self {
            task,
            args: Arc::new(TaskArgs::default()),
        }
    }

    /// Returns a new spec with the given arguments bound.
    pub fn with_args(mut self, args: TaskArgs) -> Self {
        self.args = Arc::new(args);
        self
    }

    /// Returns reference to the task.
    pub fn task(&self) -> &TaskRef {
        &self.task
    }

    /// Convenience: returns the task name.
    pub fn name(&self) -> &str {
        self.task.name()
    }

    pub fn args(&self) -> &Arc<TaskArgs> {
        &self.args
    }
}

impl std::fmt::Debug for TaskSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskSpec")
            .field("task", &self.task.name())
            .field("args", &self.args)
            .finish()
    }
}

impl From<TaskRef> for TaskSpec {
    fn from(task: TaskRef) -> Self {
        TaskSpec::new(task)
    }
}
