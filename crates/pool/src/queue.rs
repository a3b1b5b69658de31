use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use protocol::Packet;

/// A bounded FIFO of packets shared between the pool's worker threads and
/// its callers.
///
/// `std::sync::mpsc` has no way to push a value back onto the front of the
/// queue, which the writer loop needs when a send fails partway through and
/// the packet must be retried ahead of anything queued after it. A
/// `Mutex<VecDeque<_>>` plus a `Condvar` gives that for the price of a
/// little more boilerplate.
pub struct BoundedQueue {
    capacity: usize,
    inner: Mutex<VecDeque<Packet>>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl BoundedQueue {
    /// Creates a queue that blocks producers once it holds `capacity`
    /// packets.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        }
    }

    /// Appends `packet` to the back of the queue, blocking while the queue
    /// is at capacity.
    pub fn push_back(&self, packet: Packet) {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        while guard.len() >= self.capacity {
            guard = self.not_full.wait(guard).unwrap_or_else(std::sync::PoisonError::into_inner);
        }
        guard.push_back(packet);
        self.not_empty.notify_one();
    }

    /// Re-inserts `packet` at the front of the queue, bypassing the
    /// capacity check: a retry must never be lost because the queue
    /// happens to be full.
    pub fn push_front(&self, packet: Packet) {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        guard.push_front(packet);
        self.not_empty.notify_one();
    }

    /// Removes and returns the packet at the front of the queue, blocking
    /// until one is available.
    #[must_use]
    pub fn pop_front(&self) -> Packet {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        loop {
            if let Some(packet) = guard.pop_front() {
                self.not_full.notify_one();
                return packet;
            }
            guard = self.not_empty.wait(guard).unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    /// Removes and returns the packet at the front of the queue if one is
    /// immediately available, without blocking.
    pub fn try_pop_front(&self) -> Option<Packet> {
        let mut guard = self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let packet = guard.pop_front();
        if packet.is_some() {
            self.not_full.notify_one();
        }
        packet
    }

    /// Number of packets currently queued.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Whether the queue currently holds no packets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
