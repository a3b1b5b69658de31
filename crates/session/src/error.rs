use std::io;
use std::net::SocketAddr;

use core::exit_code::{ExitCode, HasExitCode};
use protocol::{Flag, ProtocolError};
use thiserror::Error;

/// Problems establishing or attaching to a transfer session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Dialing the primary or an auxiliary connection failed.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        /// Address that refused or timed out the connection.
        addr: SocketAddr,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// A read or write on the handshake socket failed.
    #[error("socket IO error during handshake: {0}")]
    Io(#[from] io::Error),

    /// A handshake frame failed to decode.
    #[error("protocol error during handshake: {0}")]
    Protocol(#[from] ProtocolError),

    /// The peer closed the connection before completing the handshake.
    #[error("peer closed the connection during handshake")]
    ConnectionClosed,

    /// The server replied with something other than `Sid` to a `Pull`/`Push`.
    #[error("expected a session id in reply, got {0:?}")]
    UnexpectedReply(Flag),

    /// An auxiliary socket could not be attached after exhausting retries.
    #[error("failed to attach auxiliary socket after {attempts} attempt(s): {source}")]
    AttachFailed {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// The last underlying IO error observed.
        #[source]
        source: io::Error,
    },
}

impl HasExitCode for SessionError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Connect { .. } | Self::AttachFailed { .. } | Self::Io(_) | Self::ConnectionClosed => {
                ExitCode::SocketIo
            }
            Self::Protocol(_) | Self::UnexpectedReply(_) => ExitCode::Protocol,
        }
    }
}
