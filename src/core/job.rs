//! # Submitted jobs and their query handles.
//!
//! A [`Job`] is what travels through the pool: the spec, its effective callback
//! set and the write side of a `watch` channel. The caller keeps the read side as
//! a [`JobHandle`], which can observe progress but cannot cancel anything.
//!
//! ```text
//! submit ──► Queued ──► Running(worker) ──► Done(outcome)
//!   └──────────────────► Running(worker) ──┘   (when a slot is free)
//! ```

use std::sync::Arc;

use tokio::sync::watch;

use crate::callbacks::CallbackSet;
use crate::events::{JobId, Outcome, WorkerId};
use crate::tasks::TaskSpec;

/// Where a job is in its life.
#[derive(Debug, Clone, PartialEq)]
pub enum JobState {
    /// Waiting in the pending queue.
    Queued,
    /// Occupying a slot.
    Running(WorkerId),
    /// All four lifecycle events were delivered and the slot was released.
    Done(Outcome),
}

impl JobState {
    #[inline]
    pub fn is_done(&self) -> bool {
        matches!(self, JobState::Done(_))
    }
}

/// Pool-side half of a submission.
pub(crate) struct Job {
    pub id: JobId,
    pub name: Arc<str>,
    pub spec: TaskSpec,
    pub callbacks: CallbackSet,
    state: watch::Sender<JobState>,
}

impl Job {
    pub fn new(id: JobId, spec: TaskSpec, callbacks: CallbackSet) -> (Self, JobHandle) {
        let name: Arc<str> = Arc::from(spec.name());
        let (tx, rx) = watch::channel(JobState::Queued);
        let handle = JobHandle {
            id,
            name: Arc::clone(&name),
            state: rx,
        };
        let job = Self {
            id,
            name,
            spec,
            callbacks,
            state: tx,
        };
        (job, handle)
    }

    pub fn mark_running(&self, worker: WorkerId) {
        self.state.send_replace(JobState::Running(worker));
    }

    pub fn mark_done(&self, outcome: Outcome) {
        self.state.send_replace(JobState::Done(outcome));
    }
}

/// Caller-side, read-only view of a submission.
///
/// Cloning is cheap; all clones observe the same job.
#[derive(Debug, Clone)]
pub struct JobHandle {
    id: JobId,
    name: Arc<str>,
    state: watch::Receiver<JobState>,
}

impl JobHandle {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn task_name(&self) -> &str {
        &self.name
    }

    /// Current state snapshot.
    pub fn state(&self) -> JobState {
        self.state.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.state.borrow().is_done()
    }

    /// Waits until the job is done and returns its outcome.
    ///
    /// Returns `None` if the pool went away before the job ran (for example the
    /// runtime was shut down while it was still queued).
    pub async fn finished(&self) -> Option<Outcome> {
        let mut rx = self.state.clone();
        match rx.wait_for(JobState::is_done).await {
            Ok(state) => match &*state {
                JobState::Done(outcome) => Some(outcome.clone()),
                _ => None,
            },
            Err(_closed) => None,
        }
    }
}
