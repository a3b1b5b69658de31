//! Multiplexed connection pool for fcp transfers.
//!
//! # Overview
//!
//! A transfer spreads its packets across several TCP sockets at once
//! (`spec.md` §2/§4.2). [`ConnectionPool`] owns that set of sockets and
//! hides them behind two queues: push a [`protocol::Packet`] in with
//! [`ConnectionPool::send`], pull validated ones out with
//! [`ConnectionPool::recv`]. Nothing above this crate ever reads or writes
//! a socket directly.
//!
//! # Design
//!
//! One reader thread multiplexes readiness across every socket with `mio`,
//! feeding bytes into a per-socket [`protocol::Buffer`] and routing
//! complete frames either into the receive queue or, for a `Resend`
//! request, back onto the send queue from the internal sent-packet cache.
//! One writer thread drains the send queue onto whichever socket is next
//! in round-robin order, falling back to another socket if a write gets
//! stuck. Both queues are bounded to `socket_count * 5` entries
//! (`spec.md` §4.2), so a stalled peer applies backpressure instead of
//! growing memory without limit.
//!
//! # Invariants
//!
//! - A packet is never dropped on `WouldBlock`: a stuck write is retried
//!   on another socket, and a full send queue simply blocks the producer.
//! - A packet that fails to retransmit because every socket is dead is
//!   re-queued at the *front* of the send queue, preserving order once a
//!   socket becomes available again.
//! - A [`Resend`](protocol::Flag::Resend) request is only honoured if the
//!   original frame is still in the sent-packet cache; otherwise it is
//!   logged and dropped rather than silently desynchronising the session.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod cookie;
mod error;
mod pool;
mod queue;
mod socket;

pub use error::PoolError;
pub use pool::{ConnectionPool, DEFAULT_COOKIE_CAPACITY, MAX_SOCKETS, QUEUE_CAPACITY_MULTIPLIER};
