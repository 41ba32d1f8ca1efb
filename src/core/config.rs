//! # Pool configuration.
//!
//! Provides [`PoolConfig`], the settings a [`WorkerPool`](crate::WorkerPool) is built with.
//!
//! ## Sentinel values
//! - `capacity = 0` → one slot per available processing unit
//! - `bus_capacity = 0` → clamped to 1
//!
//! ## Environment
//! [`PoolConfig::from_env`] reads:
//! - `TASKAGENT_CAPACITY`: maximum concurrent executions
//! - `TASKAGENT_BUS_CAPACITY`: notification ring buffer size

use std::num::NonZeroUsize;
use std::thread;

use crate::error::DispatchError;

/// Environment variable for [`PoolConfig::capacity`].
pub const ENV_CAPACITY: &str = "TASKAGENT_CAPACITY";
/// Environment variable for [`PoolConfig::bus_capacity`].
pub const ENV_BUS_CAPACITY: &str = "TASKAGENT_BUS_CAPACITY";

/// Configuration for a worker pool.
///
/// ## Field semantics
/// - `capacity`: Maximum number of tasks executing at once (`0` = host parallelism)
/// - `bus_capacity`: Notification bus ring buffer size (min 1)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolConfig {
    /// Maximum number of concurrently executing tasks.
    ///
    /// Can be changed later with [`WorkerPool::configure`](crate::WorkerPool::configure).
    pub capacity: usize,

    /// Capacity of the notification bus.
    ///
    /// Receivers that lag behind more than `bus_capacity` notifications skip
    /// the oldest ones. Callbacks are not affected.
    pub bus_capacity: usize,
}

impl PoolConfig {
    /// Config with an explicit capacity and default bus size.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Resolves the `0` sentinel to the host's available parallelism.
    pub fn effective_capacity(&self) -> usize {
        match self.capacity {
            0 => host_parallelism(),
            n => n,
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Reads the configuration from environment variables, falling back to
    /// defaults for unset ones.
    pub fn from_env() -> Result<Self, DispatchError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DispatchError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(raw) = lookup(ENV_CAPACITY) {
            cfg.capacity = parse_usize(ENV_CAPACITY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BUS_CAPACITY) {
            cfg.bus_capacity = parse_usize(ENV_BUS_CAPACITY, &raw)?;
        }
        Ok(cfg)
    }
}

impl Default for PoolConfig {
    /// Default configuration:
    ///
    /// - `capacity = 0` (host parallelism)
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            capacity: 0,
            bus_capacity: 1024,
        }
    }
}

/// Number of available processing units, at least 1.
pub fn host_parallelism() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn parse_usize(name: &'static str, raw: &str) -> Result<usize, DispatchError> {
    raw.trim()
        .parse::<usize>()
        .map_err(|_| DispatchError::InvalidConfig {
            name,
            value: raw.to_string(),
        })
}
