use std::io;

use core::exit_code::{ExitCode, HasExitCode};
use protocol::ProtocolError;
use thiserror::Error;

/// A problem transferring one file. Collected per-file so one bad file
/// never aborts the rest of the transfer (`spec.md` §7).
#[derive(Debug, Error)]
pub enum TransferError {
    /// Local filesystem access failed.
    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),

    /// A received frame could not be decoded.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A frame arrived with a flag that made no sense at this point in the
    /// sequence (e.g. a `FileChunk` before the matching `FileInfo`).
    #[error("unexpected frame at this point in the transfer: {0}")]
    OutOfSequence(String),

    /// The whole-file MD5 computed after receiving a file didn't match the
    /// digest its `FileInfo` declared.
    #[error("checksum mismatch for {path}: declared {declared}, computed {computed}")]
    ChecksumMismatch {
        /// Path of the file that failed verification.
        path: String,
        /// Digest the sender declared, as hex.
        declared: String,
        /// Digest actually computed from the received bytes, as hex.
        computed: String,
    },
}

impl HasExitCode for TransferError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io(_) => ExitCode::FileIo,
            Self::Protocol(_) => ExitCode::Protocol,
            Self::OutOfSequence(_) => ExitCode::Protocol,
            Self::ChecksumMismatch { .. } => ExitCode::PartialTransfer,
        }
    }
}

/// Outcome of a completed `Sender`/`Receiver` run: which files made it and
/// which didn't, without aborting on the first failure.
#[derive(Debug, Default)]
pub struct TransferReport {
    /// Paths that transferred and verified successfully.
    pub succeeded: Vec<String>,
    /// Paths that failed, with a human-readable reason each.
    pub failed: Vec<(String, String)>,
}

impl TransferReport {
    /// Whether every file in the transfer succeeded.
    #[must_use]
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}
