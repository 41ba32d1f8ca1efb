//! # Broadcast bus for pool notifications.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`]. Slots publish every
//! lifecycle event here in addition to invoking callbacks, so an observer that owns
//! its own execution context (a UI loop, a logger task) can drain a receiver
//! instead of touching shared state from inside a worker.
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks.
//! - **Bounded capacity**: a single ring buffer stores recent notifications for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: notifications are lost if nobody is subscribed at send time.

use tokio::sync::broadcast;

use super::event::Notification;

/// Broadcast channel for pool notifications.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Notification>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Notification>(capacity.max(1));
        Self { tx }
    }

    /// Publishes a notification to all active receivers.
    pub fn publish(&self, n: Notification) {
        let _ = self.tx.send(n);
    }

    /// Creates a new receiver that observes subsequent notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }
}
