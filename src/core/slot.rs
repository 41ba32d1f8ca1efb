//! # Slot table and pending queue.
//!
//! The only mutable scheduling state of a pool. It always lives behind the pool
//! mutex; every method here is a short, non-blocking update.
//!
//! ## Rules
//! - A slot is free when fewer than `capacity` slots are busy; the lowest free
//!   id is handed out first.
//! - Pending items leave the queue strictly in arrival order.
//! - Lowering the capacity never touches busy slots; it only delays promotion
//!   until enough of them are released.

use std::collections::{BTreeSet, VecDeque};

use crate::events::WorkerId;

/// Point-in-time view of pool occupancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolLoad {
    /// Tasks occupying a slot.
    pub active: usize,
    /// Tasks waiting for a slot.
    pub pending: usize,
    /// Configured maximum of concurrent tasks.
    pub capacity: usize,
}

impl PoolLoad {
    /// Nothing running and nothing queued.
    #[inline]
    pub fn is_idle(&self) -> bool {
        self.active == 0 && self.pending == 0
    }
}

/// Busy slots plus FIFO queue of items waiting for one.
pub(super) struct SlotTable<T> {
    capacity: usize,
    busy: BTreeSet<WorkerId>,
    pending: VecDeque<T>,
}

impl<T> SlotTable<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            busy: BTreeSet::new(),
            pending: VecDeque::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn active(&self) -> usize {
        self.busy.len()
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn load(&self) -> PoolLoad {
        PoolLoad {
            active: self.active(),
            pending: self.pending(),
            capacity: self.capacity,
        }
    }

    /// Claims the lowest free slot, if the capacity allows another one.
    pub fn try_acquire(&mut self) -> Option<WorkerId> {
        if self.busy.len() >= self.capacity {
            return None;
        }
        let mut id = WorkerId(0);
        while self.busy.contains(&id) {
            id = WorkerId(id.0 + 1);
        }
        self.busy.insert(id);
        Some(id)
    }

    /// Frees a slot. Releasing a slot that is not busy is a no-op.
    pub fn release(&mut self, id: WorkerId) -> bool {
        self.busy.remove(&id)
    }

    /// Appends to the pending queue; returns the 1-based position.
    pub fn enqueue(&mut self, item: T) -> usize {
        self.pending.push_back(item);
        self.pending.len()
    }

    /// Pops the queue head onto a free slot, if both exist.
    pub fn next_ready(&mut self) -> Option<(WorkerId, T)> {
        if self.pending.is_empty() {
            return None;
        }
        let id = self.try_acquire()?;
        let item = self.pending.pop_front()?;
        Some((id, item))
    }

    /// Drains as many queued items as there are free slots.
    pub fn drain_ready(&mut self) -> Vec<(WorkerId, T)> {
        std::iter::from_fn(|| self.next_ready()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquires_lowest_free_slot() {
        let mut t: SlotTable<()> = SlotTable::new(3);
        assert_eq!(t.try_acquire(), Some(WorkerId(0)));
        assert_eq!(t.try_acquire(), Some(WorkerId(1)));
        assert!(t.release(WorkerId(0)));
        assert_eq!(t.try_acquire(), Some(WorkerId(0)));
        assert_eq!(t.try_acquire(), Some(WorkerId(2)));
        assert_eq!(t.try_acquire(), None);
        assert_eq!(t.active(), 3);
        assert!(!t.release(WorkerId(7)));
    }

    #[test]
    fn pending_is_fifo() {
        let mut t = SlotTable::new(1);
        let w = t.try_acquire().unwrap();
        assert_eq!(t.enqueue("a"), 1);
        assert_eq!(t.enqueue("b"), 2);
        assert_eq!(t.next_ready(), None);

        t.release(w);
        assert_eq!(t.next_ready(), Some((WorkerId(0), "a")));
        assert_eq!(t.next_ready(), None);
        t.release(WorkerId(0));
        assert_eq!(t.next_ready(), Some((WorkerId(0), "b")));
        assert!(t.load().pending == 0 && t.load().active == 1);
    }

    #[test]
    fn next_ready_keeps_slot_free_when_queue_empty() {
        let mut t: SlotTable<u8> = SlotTable::new(1);
        assert_eq!(t.next_ready(), None);
        assert_eq!(t.active(), 0);
    }

    #[test]
    fn lowering_capacity_does_not_evict() {
        let mut t = SlotTable::new(3);
        for _ in 0..3 {
            t.try_acquire().unwrap();
        }
        t.enqueue(1);
        t.set_capacity(1);
        assert_eq!(t.active(), 3);

        t.release(WorkerId(0));
        assert_eq!(t.next_ready(), None);
        t.release(WorkerId(1));
        assert_eq!(t.next_ready(), None);
        t.release(WorkerId(2));
        assert_eq!(t.next_ready(), Some((WorkerId(0), 1)));
    }

    #[test]
    fn raising_capacity_drains_queue() {
        let mut t = SlotTable::new(1);
        t.try_acquire().unwrap();
        for i in 0..4 {
            t.enqueue(i);
        }
        t.set_capacity(3);
        let promoted = t.drain_ready();
        assert_eq!(promoted, vec![(WorkerId(1), 0), (WorkerId(2), 1)]);
        assert_eq!(t.load(), PoolLoad { active: 3, pending: 2, capacity: 3 });
        assert!(!t.load().is_idle());
    }
}
