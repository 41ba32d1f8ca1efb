//! Lifecycle events, outcomes and the notification bus.
//!
//! ## Contents
//! - [`EventKind`], [`LifecycleEvent`], [`Event`] event classification and payload metadata
//! - [`Outcome`], [`Fault`] structured result of running a task
//! - [`Bus`], [`Notification`] broadcast of everything a pool reports
//!
//! ## Quick reference
//! - **Publishers**: slot workers (`core::worker`), the pool (queued notices),
//!   `CallbackSet::emit` (observer panics).
//! - **Consumers**: callbacks registered through a [`CallbackSet`](crate::CallbackSet),
//!   and any receiver obtained from [`WorkerPool::subscribe`](crate::WorkerPool::subscribe).

mod bus;
mod event;
mod outcome;

pub use bus::Bus;
pub use event::{Event, EventKind, JobId, LifecycleEvent, Notification, WorkerId};
pub use outcome::{Fault, Outcome, PANIC_LABEL};

pub(crate) use outcome::{FaultSite, panic_message};
