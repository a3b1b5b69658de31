use core::exit_code::{ExitCode, HasExitCode};
use thiserror::Error;

/// Everything that can make the `fcp` binary exit non-zero.
#[derive(Debug, Error)]
pub enum CliError {
    /// Argument parsing failed, or `--help`/`--version` was requested.
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// Source arguments named more than one `[USER@]HOST`.
    #[error("source arguments must share one [USER@]HOST, offending argument: {0}")]
    MixedSources(String),

    /// Neither or both of `SRC.. `/`DST` carried a `[USER@]HOST:` prefix.
    #[error("exactly one of SRC.. or DST must be [USER@]HOST:PATH, never neither or both")]
    AmbiguousDirection,

    /// A push named more than one local source directory.
    ///
    /// `FsSource::scan` walks a single root, so a push transfers exactly
    /// one source tree per invocation.
    #[error("pushing more than one source directory is not supported, got {0}")]
    TooManySources(usize),

    /// A local source or destination path could not be resolved.
    #[error("could not resolve path {path}: {source}")]
    SourcePath {
        /// Path as given on the command line.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The `ssh` tunnel process could not be spawned.
    #[error("could not spawn ssh tunnel: {0}")]
    Tunnel(#[source] std::io::Error),

    /// The tunnel's local forwarded address could not be resolved.
    #[error("could not resolve tunnel address: {0}")]
    TunnelAddr(#[source] std::io::Error),

    /// The connection pool rejected a socket.
    #[error(transparent)]
    Pool(#[from] pool::PoolError),

    /// The session handshake failed.
    #[error(transparent)]
    Session(#[from] session::SessionError),

    /// The transfer itself failed outright (not a per-file warning).
    #[error(transparent)]
    Transfer(#[from] transporter::TransferError),

    /// The transfer completed, but one or more files failed.
    #[error("{0} file(s) failed to transfer")]
    PartialTransfer(usize),
}

impl HasExitCode for CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) | Self::MixedSources(_) | Self::AmbiguousDirection | Self::TooManySources(_) => {
                ExitCode::Syntax
            }
            Self::SourcePath { .. } => ExitCode::FileSelect,
            Self::Tunnel(_) | Self::TunnelAddr(_) | Self::Pool(_) => ExitCode::SocketIo,
            Self::Session(err) => err.exit_code(),
            Self::Transfer(err) => err.exit_code(),
            Self::PartialTransfer(_) => ExitCode::PartialTransfer,
        }
    }
}
