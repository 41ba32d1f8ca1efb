//! # Task outcomes and captured faults.
//!
//! A task execution produces exactly one [`Outcome`]. Failures are captured as a
//! [`Fault`]: inert, cloneable data (label, message, trace text) built inside the
//! executing slot. The original error or panic payload never leaves the slot.
//!
//! ## Trace layout
//! ```text
//! task_failed: connection refused
//!   caused by: io error: os error 111
//!   in task "fetch" (job-4) on worker-1
//! stack backtrace:            (only when RUST_BACKTRACE / RUST_LIB_BACKTRACE enable it)
//!    0: ...
//! ```

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt::{self, Write as _};

use serde_json::Value;

use crate::error::TaskError;
use crate::events::{JobId, WorkerId};

/// Fault label used for bodies that panicked instead of returning an error.
pub const PANIC_LABEL: &str = "task_panicked";

/// Structured result of one task execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The body returned a value.
    Success(Value),
    /// The body returned an error or panicked.
    Failure(Fault),
}

impl Outcome {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }
}

/// Where a fault happened; stamped into the trace text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FaultSite<'a> {
    pub task: &'a str,
    pub job: JobId,
    pub worker: WorkerId,
}

/// Display-safe description of a failed execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fault {
    /// Stable snake_case category (`task_failed`, `task_panicked`, ...).
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Formatted trace; never empty.
    pub trace: String,
}

impl Fault {
    /// Captures a [`TaskError`] returned by a body.
    pub(crate) fn from_task_error(err: &TaskError, site: FaultSite<'_>) -> Self {
        let kind = err.as_label().to_string();
        let message = err.as_message();

        let mut trace = format!("{kind}: {message}\n");
        let mut source: Option<&(dyn StdError + 'static)> = err.source();
        while let Some(cause) = source {
            let _ = writeln!(trace, "  caused by: {cause}");
            source = cause.source();
        }
        finish_trace(&mut trace, site);

        Self {
            kind,
            message,
            trace,
        }
    }

    /// Captures a panic payload caught in the slot.
    pub(crate) fn from_panic(payload: &(dyn Any + Send), site: FaultSite<'_>) -> Self {
        let message = panic_message(payload);
        let mut trace = format!("{PANIC_LABEL}: {message}\n");
        finish_trace(&mut trace, site);

        Self {
            kind: PANIC_LABEL.to_string(),
            message,
            trace,
        }
    }

    #[inline]
    pub fn is_panic(&self) -> bool {
        self.kind == PANIC_LABEL
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

fn finish_trace(trace: &mut String, site: FaultSite<'_>) {
    let _ = writeln!(
        trace,
        "  in task {:?} ({}) on {}",
        site.task, site.job, site.worker
    );
    let bt = Backtrace::capture();
    if bt.status() == BacktraceStatus::Captured {
        let _ = write!(trace, "stack backtrace:\n{bt}");
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
