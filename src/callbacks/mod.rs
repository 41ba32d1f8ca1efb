//! # Observer callbacks for task lifecycle events.
//!
//! ## Architecture
//! ```text
//! Dispatcher::dispatch(spec, local)
//!     └─► CallbackSet::merge(global, local) ──► WorkerPool::submit(spec, merged)
//!                                                    │
//!                  slot emits Started/…/Finished ◄───┘
//!                      └─► merged.emit(&Event)
//!                              ├─► global callbacks (registration order)
//!                              └─► local callbacks  (registration order)
//! ```
//!
//! Callbacks run on the worker's execution context. Anything that must happen on
//! the caller's context (a UI thread, for instance) should be forwarded through a
//! channel, or consumed from [`WorkerPool::subscribe`](crate::WorkerPool::subscribe).

mod set;

pub use set::{Callback, CallbackSet, EmitReport};
