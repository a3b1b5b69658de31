//! Session handshake for fcp transfers.
//!
//! # Overview
//!
//! Before a [`pool::ConnectionPool`] can multiplex packets across several
//! sockets, one of them has to negotiate *which* transfer this is. This
//! crate owns that bootstrap: [`connect`] dials the primary socket, sends
//! `Pull`/`Push`, reads back the session id the server assigns, then dials
//! and attaches the remaining sockets with `Attach(sid)` (`spec.md` §4.3).
//!
//! # Design
//!
//! The handshake runs on plain blocking [`std::net::TcpStream`]s, one
//! packet at a time, before any socket is handed off to a connection pool —
//! there is nothing to multiplex yet. Auxiliary sockets that fail to
//! attach after [`MAX_ATTACH_RETRIES`] are dropped rather than failing the
//! whole session, so a transfer degrades to fewer parallel connections
//! instead of refusing to start.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod error;
mod handshake;

pub use error::SessionError;
pub use handshake::{connect, Handshake, Intent, MAX_ATTACH_RETRIES};
