//! Sender/Receiver protocol state machines for fcp.
//!
//! # Overview
//!
//! This crate turns a connected [`pool::ConnectionPool`] into an actual
//! file transfer. [`Sender`] announces a directory tree and streams file
//! content; [`Receiver`] accepts that stream, verifies each file's
//! whole-file digest, and reports per-file success or failure without
//! aborting the rest of the transfer (`spec.md` §4.4, §4.5, §7).
//!
//! # Design
//!
//! Both sides are generic over small traits, [`ChunkSource`] and
//! [`ChunkSink`], that own the actual filesystem access. That keeps the
//! protocol sequencing testable against an in-memory or loopback-socket
//! fixture without touching disk, while [`FsSource`]/[`FsSink`] supply the
//! real `std::fs`-backed implementation the CLI uses in production.
//! [`Transporter`] wraps [`Sender`]/[`Receiver`] in one enum rather than a
//! trait-object hierarchy, since a session is always exactly one side.
//!
//! Chunks are written at their declared byte offset
//! (`seq * CHUNK_SIZE`) rather than buffered and replayed in order, so a
//! chunk arriving out of sequence — expected, since the pool spreads one
//! file's chunks across several sockets — never has to wait behind an
//! earlier one.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod chunk_io;
mod entry;
mod error;
mod receiver;
mod sender;
mod transporter;

pub use chunk_io::{ChunkSink, ChunkSource, FsSink, FsSource, CHUNK_SIZE};
pub use entry::{DirEntry, FileEntry};
pub use error::{TransferError, TransferReport};
pub use receiver::Receiver;
pub use sender::Sender;
pub use transporter::Transporter;
