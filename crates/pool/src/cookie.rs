use std::collections::{HashMap, VecDeque};

use protocol::{Flag, Packet};

/// Key a sent packet is looked up by when a peer asks for it again.
pub type CookieKey = (Flag, u32, u16);

/// Key of `packet`, as used by a [`Cookie`] cache.
#[must_use]
pub fn key_of(packet: &Packet) -> CookieKey {
    (packet.flag(), packet.chksum(), packet.length())
}

/// A bounded FIFO cache of recently-sent packets, so a peer's `Resend`
/// request can be answered without the sender re-deriving the packet.
///
/// Capacity is fixed at construction; once full, inserting a new entry
/// evicts the oldest one first (`spec.md` §4.2's "FIFO with bounded
/// memory").
pub struct Cookie {
    capacity: usize,
    order: VecDeque<CookieKey>,
    entries: HashMap<CookieKey, Packet>,
}

impl Cookie {
    /// Creates an empty cache holding at most `capacity` packets.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            order: VecDeque::with_capacity(capacity),
            entries: HashMap::with_capacity(capacity),
        }
    }

    /// Records `packet` as sent, evicting the oldest entry if the cache is
    /// already at capacity.
    pub fn record(&mut self, packet: Packet) {
        let key = key_of(&packet);
        if self.entries.contains_key(&key) {
            return;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
        self.order.push_back(key);
        self.entries.insert(key, packet);
    }

    /// Looks up a previously recorded packet by `(flag, chksum, length)`.
    #[must_use]
    pub fn get(&self, key: &CookieKey) -> Option<&Packet> {
        self.entries.get(key)
    }

    /// Number of packets currently cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache currently holds no packets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
