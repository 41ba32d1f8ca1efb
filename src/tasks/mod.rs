//! # Task abstractions and specifications.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for implementing async units of work
//! - [`TaskFn`] / [`BlockingFn`] - closure-based implementations
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`TaskArgs`] - positional and named arguments bound at construction
//! - [`TaskSpec`] - task plus its arguments, the unit handed to the pool

mod args;
mod spec;
mod task;
mod task_fn;

pub use args::TaskArgs;
pub use spec::TaskSpec;
pub use task::{Task, TaskContext, TaskRef};
pub use task_fn::{BlockingFn, TaskFn};
