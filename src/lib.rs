//! # taskagent
//!
//! **Taskagent** runs units of work on a capacity-bounded pool of execution slots
//! and reports each one's lifecycle to registered observers.
//!
//! Submission never blocks the caller: a task either takes a free slot or waits
//! in a FIFO queue. Every task produces exactly four notifications, and a task
//! that fails (by error or by panic) is turned into data instead of taking down
//! its slot or the pool.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   TaskSpec   │   │   TaskSpec   │   │   TaskSpec   │
//!     │ (task+args)  │   │ (task+args)  │   │ (task+args)  │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Dispatcher                                                       │
//! │  - global CallbackSet (pool-wide observers)                       │
//! │  - merge(global, local) per dispatch                              │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼ submit(spec, merged)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  WorkerPool                                                       │
//! │  - SlotTable (busy slots, lowest free id first)                   │
//! │  - pending queue (FIFO)                                           │
//! │  - Bus (broadcast notifications)                                  │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │   worker-0   │   │   worker-1   │   │   worker-N   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ Started          │ Started          │ Started
//!      │ Succeeded|Failed │ Succeeded|Failed │ Succeeded|Failed
//!      │ Finished         │ Finished         │ Finished
//!      ▼                  ▼                  ▼
//!   callbacks (global, then local) ──► Bus ──► WorkerPool::subscribe()
//! ```
//!
//! ### Lifecycle
//! ```text
//! submit ──► slot free? ──yes──► Running(worker)
//!              │ no
//!              └──► Queued ──(a slot finishes)──► Running(worker)
//!
//! Running(worker):
//!   ├─► Started(worker)
//!   ├─► body(args)
//!   │     ├─ Ok(value)       ──► Succeeded(value)
//!   │     └─ Err(e) | panic  ──► Failed(fault{kind, message, trace})
//!   ├─► Finished(worker)
//!   └─► release slot, promote queue head ──► Done(outcome)
//! ```
//!
//! ## Features
//! | Area              | Description                                                     | Key types / traits                       |
//! |-------------------|-----------------------------------------------------------------|------------------------------------------|
//! | **Tasks**         | Async or blocking bodies with bound arguments.                  | [`Task`], [`TaskFn`], [`BlockingFn`], [`TaskSpec`] |
//! | **Callbacks**     | Ordered observers per event kind, global and local scopes.      | [`CallbackSet`], [`EventKind`]           |
//! | **Execution**     | Bounded pool with FIFO queue and runtime resizing.              | [`WorkerPool`], [`JobHandle`]            |
//! | **Dispatch**      | Merges global and local callbacks on every submission.          | [`Dispatcher`]                           |
//! | **Events**        | Lifecycle payloads and a broadcast bus.                         | [`Event`], [`Outcome`], [`Notification`] |
//! | **Errors**        | Typed errors for setup and task execution.                      | [`DispatchError`], [`TaskError`]         |
//! | **Configuration** | Capacity and bus sizing, from code or environment.              | [`PoolConfig`]                           |
//!
//! ## Example
//! ```rust
//! use serde_json::json;
//! use taskagent::{
//!     CallbackSet, Dispatcher, Event, EventKind, Outcome, PoolConfig, TaskArgs, TaskContext,
//!     TaskError, TaskFn, TaskSpec,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let global = CallbackSet::new()
//!         .on(EventKind::Started, |ev: &Event| println!("{} started on {:?}", ev.task, ev.worker()))
//!         .on(EventKind::Failed, |ev: &Event| eprintln!("{} failed: {:?}", ev.task, ev.fault()));
//!
//!     let dispatcher = Dispatcher::builder(PoolConfig::with_capacity(2))
//!         .with_global_callbacks(global)
//!         .build()?;
//!
//!     let greet = TaskFn::arc("greet", |ctx: TaskContext| async move {
//!         let who = ctx.args.require_str(0)?;
//!         Ok::<_, TaskError>(json!(format!("hello {who}")))
//!     });
//!     let spec = TaskSpec::new(greet).with_args(TaskArgs::new().arg("world"));
//!
//!     let handle = dispatcher.dispatch(spec, None);
//!     assert_eq!(handle.finished().await, Some(Outcome::Success(json!("hello world"))));
//!     Ok(())
//! }
//! ```
mod callbacks;
mod core;
mod error;
mod events;
mod tasks;

// ---- Public re-exports ----

pub use callbacks::{Callback, CallbackSet, EmitReport};
pub use core::{
    Dispatcher, DispatcherBuilder, ENV_BUS_CAPACITY, ENV_CAPACITY, JobHandle, JobState, PoolBuilder,
    PoolConfig, PoolLoad, WorkerPool, host_parallelism,
};
pub use error::{DispatchError, TaskError};
pub use events::{
    Bus, Event, EventKind, Fault, JobId, LifecycleEvent, Notification, Outcome, PANIC_LABEL, WorkerId,
};
pub use tasks::{BlockingFn, Task, TaskArgs, TaskContext, TaskFn, TaskRef, TaskSpec};
