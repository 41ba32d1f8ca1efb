//! Error types used by the dispatch runtime and by task bodies.
//!
//! This module defines two main error enums:
//!
//! - [`DispatchError`] - errors raised synchronously to the caller while
//!   configuring the pool or registering callbacks.
//! - [`TaskError`] - errors returned by individual task bodies. These never
//!   escape the executing slot; they are converted to a
//!   [`Fault`](crate::Fault) and delivered as a `Failed` event.
//!
//! Both types provide `as_label` for logs and for the `kind` field of a fault.

use thiserror::Error;

use crate::events::EventKind;

/// # Errors produced by the dispatch runtime.
///
/// All of them are reported immediately to the caller, before any task runs.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// A callback was registered under a key that is not a lifecycle event name.
    #[error("invalid callback key `{key}`; valid keys are: {}", EventKind::valid_keys())]
    InvalidCallbackKey {
        /// The rejected key, as supplied.
        key: String,
    },

    /// The pool was configured with zero execution slots.
    #[error("pool capacity must be at least 1")]
    ZeroCapacity,

    /// The pool was built outside of a tokio runtime.
    #[error("no tokio runtime available to run tasks on")]
    NoRuntime,

    /// A configuration value could not be parsed.
    #[error("invalid value {value:?} for {name}")]
    InvalidConfig {
        /// Environment variable or field name.
        name: &'static str,
        /// The rejected raw value.
        value: String,
    },
}

impl DispatchError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use taskagent::DispatchError;
    ///
    /// let err = DispatchError::InvalidCallbackKey { key: "finish".into() };
    /// assert_eq!(err.as_label(), "invalid_callback_key");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            DispatchError::InvalidCallbackKey { .. } => "invalid_callback_key",
            DispatchError::ZeroCapacity => "zero_capacity",
            DispatchError::NoRuntime => "no_runtime",
            DispatchError::InvalidConfig { .. } => "invalid_config",
        }
    }
}

/// # Errors returned by a task body.
///
/// A body signals failure by returning one of these; the slot turns it into
/// a [`Fault`](crate::Fault) and keeps running.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// Task execution failed.
    #[error("execution failed: {reason}")]
    Fail {
        /// Human-readable failure message.
        reason: String,
    },

    /// The task rejected the arguments it was bound with.
    #[error("invalid arguments: {reason}")]
    InvalidArgs {
        /// What was wrong with the arguments.
        reason: String,
    },

    /// Any other error raised by the body.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TaskError {
    /// Shorthand for [`TaskError::Fail`].
    pub fn fail(reason: impl Into<String>) -> Self {
        TaskError::Fail {
            reason: reason.into(),
        }
    }

    /// Shorthand for [`TaskError::InvalidArgs`].
    pub fn invalid_args(reason: impl Into<String>) -> Self {
        TaskError::InvalidArgs {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs and faults.
    ///
    /// # Example
    /// ```
    /// use taskagent::TaskError;
    ///
    /// assert_eq!(TaskError::fail("boom").as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::InvalidArgs { .. } => "task_invalid_args",
            TaskError::Other(_) => "task_error",
        }
    }

    /// Returns the bare message without the variant prefix.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { reason } => reason.clone(),
            TaskError::InvalidArgs { reason } => reason.clone(),
            TaskError::Other(e) => e.to_string(),
        }
    }
}
