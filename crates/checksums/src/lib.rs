#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `checksums` provides the strong whole-file digest used by `fcp` to verify
//! that a transferred file matches the sender's copy byte-for-byte. The
//! protocol carries a 16-byte MD5 digest per file (the `FILE_INFO` packet
//! body, see the `protocol` crate); this crate is the single place that
//! computes and streams that digest.
//!
//! # Design
//!
//! [`strong`] exposes the [`strong::Md5`] streaming hasher together with the
//! [`strong::StrongDigest`] trait other crates use to stay generic over the
//! concrete algorithm. The crate favours a small surface: `fcp` does not
//! negotiate checksum algorithms the way rsync does, so only MD5 is exposed.
//!
//! # Invariants
//!
//! - Digests stream data incrementally and never panic.
//! - [`strong::Md5::digest`] and the streaming API produce identical output
//!   for the same input, regardless of how the input is chunked.
//!
//! # Examples
//!
//! ```
//! use checksums::strong::Md5;
//!
//! let mut md5 = Md5::new();
//! md5.update(b"hello");
//! let digest = md5.finalize();
//! assert_eq!(
//!     digest,
//!     [
//!         0x5d, 0x41, 0x40, 0x2a, 0xbc, 0x4b, 0x2a, 0x76,
//!         0xb9, 0x71, 0x9d, 0x91, 0x10, 0x17, 0xc5, 0x92,
//!     ]
//! );
//! ```

pub mod strong;
