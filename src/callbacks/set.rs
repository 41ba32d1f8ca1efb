//! # Ordered observer callbacks keyed by lifecycle event.
//!
//! A [`CallbackSet`] maps each [`EventKind`] to a sequence of callbacks, kept in
//! registration order. A dispatcher holds one set as its **global** scope and
//! merges it with an optional **local** set on every dispatch:
//! ```text
//! global:  started=[g1]        finished=[g2]
//! local:   started=[l1]        failed=[l2]
//! merged:  started=[g1, l1]    failed=[l2]    finished=[g2]
//! ```
//!
//! ## Rules
//! - String keys are validated when the set is built, never at emission time.
//! - Emission runs callbacks **sequentially** on the slot that produced the event.
//! - Each invocation is isolated with `catch_unwind`: a panicking callback is
//!   logged and reported as [`Notification::ObserverPanicked`], is not retried, and
//!   does not prevent the remaining callbacks from running.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a callback panics while holding a lock it shares with other observers.

use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::warn;

use crate::error::DispatchError;
use crate::events::{Bus, Event, EventKind, Notification, panic_message};

/// Observer callback. Runs on the worker that emits the event.
pub type Callback = Arc<dyn Fn(&Event) + Send + Sync + 'static>;

/// Delivery counters returned by [`CallbackSet::emit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Callbacks that returned normally.
    pub delivered: usize,
    /// Callbacks that panicked.
    pub panicked: usize,
}

/// Callbacks per event kind, in registration order.
#[derive(Clone, Default)]
pub struct CallbackSet {
    by_kind: [Vec<Callback>; 4],
}

impl CallbackSet {
    /// Empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback for `kind`.
    #[must_use]
    pub fn on<F>(mut self, kind: EventKind, f: F) -> Self
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.push(kind, Arc::new(f));
        self
    }

    /// Appends a callback under a string key (`"started"`, `"failed"`, ...).
    ///
    /// Fails with [`DispatchError::InvalidCallbackKey`] for unknown keys.
    pub fn on_key<F>(self, key: &str, f: F) -> Result<Self, DispatchError>
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let kind: EventKind = key.parse()?;
        Ok(self.on(kind, f))
    }

    /// Builds a set from `(key, callback)` pairs.
    ///
    /// Every key is validated before anything is registered, so a typo
    /// anywhere rejects the whole set.
    ///
    /// ## Example
    /// ```rust
    /// use std::sync::Arc;
    /// use taskagent::{Callback, CallbackSet, DispatchError, Event};
    ///
    /// let noop: Callback = Arc::new(|_ev: &Event| {});
    /// let ok = CallbackSet::from_keyed([("started", noop.clone()), ("complete", noop.clone())]);
    /// assert_eq!(ok.unwrap().len(), 2);
    ///
    /// let err = CallbackSet::from_keyed([("finish", noop)]).err().unwrap();
    /// assert_eq!(err, DispatchError::InvalidCallbackKey { key: "finish".into() });
    /// ```
    pub fn from_keyed<I, K>(entries: I) -> Result<Self, DispatchError>
    where
        I: IntoIterator<Item = (K, Callback)>,
        K: AsRef<str>,
    {
        let parsed = entries
            .into_iter()
            .map(|(key, cb)| key.as_ref().parse::<EventKind>().map(|kind| (kind, cb)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut set = Self::new();
        for (kind, cb) in parsed {
            set.push(kind, cb);
        }
        Ok(set)
    }

    /// Appends an already shared callback.
    pub fn push(&mut self, kind: EventKind, cb: Callback) {
        self.by_kind[kind.index()].push(cb);
    }

    /// Effective set for one dispatch: `global[kind] ++ local[kind]` for every kind.
    #[must_use]
    pub fn merge(global: &CallbackSet, local: &CallbackSet) -> CallbackSet {
        let mut merged = global.clone();
        for kind in EventKind::ALL {
            merged.by_kind[kind.index()].extend(local.get(kind).iter().cloned());
        }
        merged
    }

    /// Callbacks registered for `kind`, in invocation order.
    pub fn get(&self, kind: EventKind) -> &[Callback] {
        &self.by_kind[kind.index()]
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.by_kind[kind.index()].len()
    }

    /// Total number of callbacks across all kinds.
    pub fn len(&self) -> usize {
        self.by_kind.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_kind.iter().all(Vec::is_empty)
    }

    /// Invokes every callback registered for `event.kind()`, in order.
    ///
    /// Panics are caught per callback and published on `bus`.
    pub fn emit(&self, event: &Event, bus: &Bus) -> EmitReport {
        let mut report = EmitReport::default();

        for cb in self.get(event.kind()) {
            match catch_unwind(AssertUnwindSafe(|| cb(event))) {
                Ok(()) => report.delivered += 1,
                Err(panic_err) => {
                    report.panicked += 1;
                    let info = panic_message(panic_err.as_ref());
                    warn!(
                        job = %event.job,
                        task = %event.task,
                        kind = %event.kind(),
                        info = %info,
                        "observer callback panicked"
                    );
                    bus.publish(Notification::ObserverPanicked {
                        job: event.job,
                        kind: event.kind(),
                        info,
                    });
                }
            }
        }
        report
    }
}

impl fmt::Debug for CallbackSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for kind in EventKind::ALL {
            map.entry(&kind.as_str(), &self.count(kind));
        }
        map.finish()
    }
}
