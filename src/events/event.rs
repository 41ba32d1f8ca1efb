//! # Lifecycle events emitted while a task runs.
//!
//! Every execution produces exactly four notifications, in this order:
//! ```text
//! Started(worker) ──► Succeeded(value) ──► Finished(worker)
//!                 └─► Failed(fault)    ──┘
//! ```
//! Each one is wrapped in an [`Event`] carrying the job id, the task name, a
//! wall-clock timestamp and a global sequence number.
//!
//! ## Ordering guarantees
//! `seq` is globally unique and increases monotonically across all jobs. The
//! per-job order above is fixed; across jobs events may interleave freely, so
//! use `seq` when a total order is needed.
//!
//! ## Example
//! ```rust
//! use std::str::FromStr;
//! use taskagent::EventKind;
//!
//! assert_eq!(EventKind::from_str("finished").unwrap(), EventKind::Finished);
//! assert_eq!(EventKind::from_str("complete").unwrap(), EventKind::Finished);
//! assert!(EventKind::from_str("finish").is_err());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use serde_json::Value;

use crate::error::DispatchError;
use crate::events::Fault;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Identifier of one execution slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "worker-{}", self.0)
    }
}

/// Identifier of one submission, unique per pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "job-{}", self.0)
    }
}

/// The four lifecycle event kinds; also the keys of a callback set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    Started,
    Failed,
    Succeeded,
    Finished,
}

impl EventKind {
    /// All kinds, in emission order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Started,
        EventKind::Failed,
        EventKind::Succeeded,
        EventKind::Finished,
    ];

    /// Canonical lowercase key.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Started => "started",
            EventKind::Failed => "failed",
            EventKind::Succeeded => "succeeded",
            EventKind::Finished => "finished",
        }
    }

    #[inline]
    pub(crate) fn index(&self) -> usize {
        match self {
            EventKind::Started => 0,
            EventKind::Failed => 1,
            EventKind::Succeeded => 2,
            EventKind::Finished => 3,
        }
    }

    pub(crate) fn valid_keys() -> &'static str {
        "started, failed, succeeded, finished"
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = DispatchError;

    /// Parses a callback key. `error`, `result` and `complete` are accepted as
    /// aliases of `failed`, `succeeded` and `finished`. Matching is exact:
    /// keys are case-sensitive and never trimmed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(EventKind::Started),
            "failed" | "error" => Ok(EventKind::Failed),
            "succeeded" | "result" => Ok(EventKind::Succeeded),
            "finished" | "complete" => Ok(EventKind::Finished),
            _ => Err(DispatchError::InvalidCallbackKey { key: s.to_string() }),
        }
    }
}

/// A lifecycle notification with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    /// The task occupied a slot and is about to run.
    Started(WorkerId),
    /// The body returned an error or panicked.
    Failed(Fault),
    /// The body returned a value.
    Succeeded(Value),
    /// The slot is done with the task; always the last event.
    Finished(WorkerId),
}

impl LifecycleEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            LifecycleEvent::Started(_) => EventKind::Started,
            LifecycleEvent::Failed(_) => EventKind::Failed,
            LifecycleEvent::Succeeded(_) => EventKind::Succeeded,
            LifecycleEvent::Finished(_) => EventKind::Finished,
        }
    }
}

/// Lifecycle event together with delivery metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Submission this event belongs to.
    pub job: JobId,
    /// Name of the task.
    pub task: Arc<str>,
    /// The notification itself.
    pub lifecycle: LifecycleEvent,
}

impl Event {
    /// Creates a new event with current timestamp and next sequence number.
    pub fn new(job: JobId, task: impl Into<Arc<str>>, lifecycle: LifecycleEvent) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            job,
            task: task.into(),
            lifecycle,
        }
    }

    #[inline]
    pub fn kind(&self) -> EventKind {
        self.lifecycle.kind()
    }

    /// Worker id for `Started`/`Finished`.
    pub fn worker(&self) -> Option<WorkerId> {
        match self.lifecycle {
            LifecycleEvent::Started(w) | LifecycleEvent::Finished(w) => Some(w),
            _ => None,
        }
    }

    /// Returned value for `Succeeded`.
    pub fn value(&self) -> Option<&Value> {
        match &self.lifecycle {
            LifecycleEvent::Succeeded(v) => Some(v),
            _ => None,
        }
    }

    /// Captured fault for `Failed`.
    pub fn fault(&self) -> Option<&Fault> {
        match &self.lifecycle {
            LifecycleEvent::Failed(f) => Some(f),
            _ => None,
        }
    }
}

/// Everything published on the pool [`Bus`](crate::events::Bus).
#[derive(Debug, Clone)]
pub enum Notification {
    /// A lifecycle event (also delivered to callbacks).
    Lifecycle(Arc<Event>),

    /// A submission found no free slot and was queued.
    ///
    /// `position` is the 1-based place in the pending queue at enqueue time.
    Queued {
        job: JobId,
        task: Arc<str>,
        position: usize,
    },

    /// An observer callback panicked while handling an event.
    ObserverPanicked {
        job: JobId,
        kind: EventKind,
        info: String,
    },
}

impl Notification {
    /// Returns the job this notification is about.
    pub fn job(&self) -> JobId {
        match self {
            Notification::Lifecycle(ev) => ev.job,
            Notification::Queued { job, .. } | Notification::ObserverPanicked { job, .. } => *job,
        }
    }

    #[inline]
    pub fn as_lifecycle(&self) -> Option<&Event> {
        match self {
            Notification::Lifecycle(ev) => Some(ev),
            _ => None,
        }
    }
}
