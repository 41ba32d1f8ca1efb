use tokio::runtime::Handle;
use tracing::debug;

use crate::callbacks::CallbackSet;
use crate::core::config::PoolConfig;
use crate::error::DispatchError;
use crate::events::Bus;

use super::{dispatcher::Dispatcher, pool::WorkerPool};

/// Builder for a [`WorkerPool`].
pub struct PoolBuilder {
    cfg: PoolConfig,
    runtime: Option<Handle>,
}

impl PoolBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self { cfg, runtime: None }
    }

    /// Runs slots on `runtime` instead of the runtime current at build time.
    ///
    /// Needed when the pool is built (or fed) from a thread that is not inside
    /// a tokio runtime, such as a UI thread.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Builds the pool.
    ///
    /// Fails with [`DispatchError::NoRuntime`] if no runtime was given and the
    /// calling thread is not inside one.
    pub fn build(self) -> Result<WorkerPool, DispatchError> {
        let runtime = match self.runtime {
            Some(handle) => handle,
            None => Handle::try_current().map_err(|_| DispatchError::NoRuntime)?,
        };
        let capacity = self.cfg.effective_capacity();
        if capacity == 0 {
            return Err(DispatchError::ZeroCapacity);
        }
        debug!(capacity, bus_capacity = self.cfg.bus_capacity_clamped(), "worker pool built");

        let bus = Bus::new(self.cfg.bus_capacity_clamped());
        Ok(WorkerPool::new_internal(capacity, bus, runtime))
    }
}

/// Builder for a [`Dispatcher`] and the pool behind it.
pub struct DispatcherBuilder {
    pool: PoolBuilder,
    global: CallbackSet,
}

impl DispatcherBuilder {
    /// Creates a new builder with the given pool configuration.
    pub fn new(cfg: PoolConfig) -> Self {
        Self {
            pool: PoolBuilder::new(cfg),
            global: CallbackSet::new(),
        }
    }

    /// Sets the callbacks attached to every dispatched task.
    ///
    /// They run before any callbacks supplied with an individual dispatch.
    pub fn with_global_callbacks(mut self, global: CallbackSet) -> Self {
        self.global = global;
        self
    }

    /// See [`PoolBuilder::with_runtime`].
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.pool = self.pool.with_runtime(runtime);
        self
    }

    /// Builds the pool, then the dispatcher around it.
    pub fn build(self) -> Result<Dispatcher, DispatchError> {
        let pool = self.pool.build()?;
        Ok(Dispatcher::new(pool, self.global))
    }
}
