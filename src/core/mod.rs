//! Runtime core: slots, scheduling and dispatch.
//!
//! The public API from this module is [`WorkerPool`], [`Dispatcher`], their
//! builders, [`PoolConfig`] and the [`JobHandle`] returned by every submission.
//!
//! Internal modules:
//! - [`slot`]: slot table and FIFO pending queue;
//! - [`job`]: a submission travelling through the pool, plus its handle;
//! - [`runner`]: runs a body once and turns the result into an `Outcome`;
//! - [`worker`]: per-slot loop emitting the lifecycle events;
//! - [`pool`]: submission, capacity changes and occupancy queries;
//! - [`dispatcher`]: global/local callback merging in front of the pool.

mod builder;
mod config;
mod dispatcher;
mod job;
mod pool;
mod runner;
mod slot;
mod worker;

pub use builder::{DispatcherBuilder, PoolBuilder};
pub use config::{ENV_BUS_CAPACITY, ENV_CAPACITY, PoolConfig, host_parallelism};
pub use dispatcher::Dispatcher;
pub use job::{JobHandle, JobState};
pub use pool::WorkerPool;
pub use slot::PoolLoad;
