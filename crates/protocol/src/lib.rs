//! Wire packet codec for fcp.
//!
//! # Overview
//!
//! `protocol` is the one crate every other fcp crate depends on. It defines
//! the closed set of [`Flag`] values, the [`Packet`] those flags carry, and
//! the [`Buffer`] state machine that turns a raw byte stream back into
//! packets without assuming reads land on frame boundaries.
//!
//! # Design
//!
//! A frame is `flag(1) | CRC32(body)(4) | length(2) | body`. Every packet
//! constructor here either takes already-typed arguments (a `u16` session
//! id, a path string, chunk bytes) or, for raw/decoded bytes coming off the
//! wire, goes through [`Packet::from_parts`] and [`Packet::decode`], which
//! validate body layout and UTF-8 but never allocate more than the frame
//! declares.
//!
//! # Invariants
//!
//! - `Flag::try_from(byte)` rejects every byte outside the eleven known
//!   tags; there is no silently-ignored packet kind.
//! - A [`Buffer`] holds at most one frame's worth of partial state at a
//!   time, regardless of how the caller chunks its `feed` calls.
//! - [`Packet::pack`] and [`Packet::unpack_head`] are inverses of each
//!   other over the 7-byte head; [`Buffer::feed`] is the corresponding
//!   inverse over the full frame.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod buffer;
mod error;
mod flag;
mod packet;

pub use buffer::Buffer;
pub use error::ProtocolError;
pub use flag::Flag;
pub use packet::{Body, Packet, EOF, LEN_HEAD};

/// Default TCP port `fcpd` binds to on the remote host.
///
/// The upstream source hard-codes this address as a module constant rather
/// than exposing it as a CLI flag; the CLI's `-p` option configures the SSH
/// port, not this one. Kept as a `const` here so every crate that needs to
/// reach the tunnel's remote end agrees on the same value without the CLI
/// hard-coding it a second time.
pub const DEFAULT_SERVER_PORT: u16 = 9000;
