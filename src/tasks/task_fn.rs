//! # Function-backed tasks (`TaskFn`, `BlockingFn`)
//!
//! [`TaskFn`] wraps a closure `F: Fn(TaskContext) -> Fut`, producing a fresh
//! future per run. [`BlockingFn`] wraps a synchronous closure and runs it on
//! tokio's blocking thread pool, for bodies that sleep or do CPU-bound work.
//!
//! ## Concurrency semantics
//! - Every run creates a **new** future (or blocking call) owning its own state.
//! - No hidden mutation between runs; shared state goes in an explicit `Arc<...>`
//!   captured by the closure.
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use taskagent::{BlockingFn, TaskContext, TaskError, TaskFn, TaskRef};
//!
//! let hello: TaskRef = TaskFn::arc("hello", |_ctx: TaskContext| async move {
//!     Ok::<_, TaskError>(json!("hi"))
//! });
//! assert_eq!(hello.name(), "hello");
//!
//! let sleeper: TaskRef = BlockingFn::arc("sleeper", |_ctx: TaskContext| {
//!     std::thread::sleep(std::time::Duration::from_millis(5));
//!     Ok::<_, TaskError>(json!(null))
//! });
//! assert_eq!(sleeper.name(), "sleeper");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::TaskError;
use crate::tasks::task::{Task, TaskContext};

/// Async closure task.
#[derive(Debug)]
pub struct TaskFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> TaskFn<F> {
    /// Creates a new function-backed task.
    ///
    /// Prefer [`TaskFn::arc`] when you immediately need a [`TaskRef`](crate::TaskRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the task and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Task for TaskFn<F>
where
    F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, TaskError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext) -> Result<Value, TaskError> {
        (self.f)(ctx).await
    }
}

/// Synchronous closure task, executed via [`tokio::task::spawn_blocking`].
///
/// A panic inside the closure is re-raised in the slot, where it is captured
/// like any other panicking body.
pub struct BlockingFn<F> {
    name: Cow<'static, str>,
    f: Arc<F>,
}

impl<F> BlockingFn<F> {
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f: Arc::new(f),
        }
    }

    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F> Task for BlockingFn<F>
where
    F: Fn(TaskContext) -> Result<Value, TaskError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, ctx: TaskContext) -> Result<Value, TaskError> {
        let f = Arc::clone(&self.f);
        match tokio::task::spawn_blocking(move || f(ctx)).await {
            Ok(res) => res,
            Err(join_err) if join_err.is_panic() => std::panic::resume_unwind(join_err.into_panic()),
            Err(join_err) => Err(TaskError::fail(format!(
                "blocking task did not complete: {join_err}"
            ))),
        }
    }
}
