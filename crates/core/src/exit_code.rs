//! Centralized exit code definitions.
//!
//! This module defines the [`ExitCode`] enum returned by the `fcp` binary.
//! The numbering follows the errno-style convention used by most file
//! transfer tools: `0` is success, low numbers are local usage/protocol
//! failures, and the `1x` range is reserved for I/O failures partway through
//! a transfer.

use std::fmt;

/// Exit codes returned by `fcp` and `fcpd`.
///
/// Every fallible code path in the workspace maps its failure onto one of
/// these variants before the binary converts it to a process exit status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Successful completion.
    Ok = 0,

    /// Syntax or usage error.
    ///
    /// Returned when command-line arguments are invalid, such as a
    /// `[USER@]HOST:PATH` argument missing the trailing path.
    Syntax = 1,

    /// Protocol incompatibility.
    ///
    /// Returned when a received packet's flag is unrecognized or a
    /// handshake reply does not match what was expected.
    Protocol = 2,

    /// Errors selecting input/output files or directories.
    ///
    /// Returned when a source path does not exist or cannot be read, or a
    /// destination path cannot be created.
    FileSelect = 3,

    /// Error in socket I/O.
    ///
    /// Returned for network-level failures: connection refused, reset, or
    /// unexpectedly closed while packets were still in flight.
    SocketIo = 10,

    /// Error in file I/O.
    ///
    /// Returned for local filesystem errors while reading source files or
    /// writing received chunks to disk.
    FileIo = 11,

    /// Error in the packet stream.
    ///
    /// Returned when a frame fails its CRC check too many times, or the
    /// stream ends mid-frame.
    StreamIo = 12,

    /// Partial transfer due to error.
    ///
    /// Returned when one or more files failed to transfer but the process
    /// otherwise ran to completion.
    PartialTransfer = 23,

    /// Timeout in data send/receive.
    ///
    /// Returned when a socket produces no data for longer than the
    /// configured read timeout.
    Timeout = 30,
}

impl ExitCode {
    /// Returns the numeric exit code value.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::exit_code::ExitCode;
    ///
    /// assert_eq!(ExitCode::Ok.as_i32(), 0);
    /// assert_eq!(ExitCode::PartialTransfer.as_i32(), 23);
    /// ```
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Returns a human-readable description of this exit code.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::exit_code::ExitCode;
    ///
    /// assert_eq!(ExitCode::PartialTransfer.description(), "partial transfer");
    /// ```
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ok => "success",
            Self::Syntax => "syntax or usage error",
            Self::Protocol => "protocol incompatibility",
            Self::FileSelect => "errors selecting input/output files, dirs",
            Self::SocketIo => "error in socket IO",
            Self::FileIo => "error in file IO",
            Self::StreamIo => "error in packet stream",
            Self::PartialTransfer => "partial transfer",
            Self::Timeout => "timeout in data send/receive",
        }
    }

    /// Returns `true` if this represents a successful exit.
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Ok)
    }

    /// Creates an exit code from an i32 value.
    ///
    /// Returns `None` if the value doesn't correspond to a known exit code.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::exit_code::ExitCode;
    ///
    /// assert_eq!(ExitCode::from_i32(23), Some(ExitCode::PartialTransfer));
    /// assert_eq!(ExitCode::from_i32(999), None);
    /// ```
    #[must_use]
    pub const fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Ok),
            1 => Some(Self::Syntax),
            2 => Some(Self::Protocol),
            3 => Some(Self::FileSelect),
            10 => Some(Self::SocketIo),
            11 => Some(Self::FileIo),
            12 => Some(Self::StreamIo),
            23 => Some(Self::PartialTransfer),
            30 => Some(Self::Timeout),
            _ => None,
        }
    }

    /// Maps a [`std::io::Error`] to the exit code that best describes it.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::exit_code::ExitCode;
    /// use std::io::{Error, ErrorKind};
    ///
    /// let err = Error::from(ErrorKind::NotFound);
    /// assert_eq!(ExitCode::from_io_error(&err), ExitCode::FileSelect);
    ///
    /// let err = Error::from(ErrorKind::ConnectionRefused);
    /// assert_eq!(ExitCode::from_io_error(&err), ExitCode::SocketIo);
    ///
    /// let err = Error::from(ErrorKind::TimedOut);
    /// assert_eq!(ExitCode::from_io_error(&err), ExitCode::Timeout);
    /// ```
    #[must_use]
    pub fn from_io_error(error: &std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::AlreadyExists => {
                Self::FileSelect
            }
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe
            | ErrorKind::AddrInUse
            | ErrorKind::AddrNotAvailable
            | ErrorKind::NotConnected => Self::SocketIo,
            ErrorKind::TimedOut => Self::Timeout,
            ErrorKind::UnexpectedEof | ErrorKind::InvalidData => Self::StreamIo,
            _ => Self::FileIo,
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        let value = code.as_i32().clamp(0, 255) as u8;
        Self::from(value)
    }
}

/// Returns a human-readable description for a given exit code value.
///
/// # Examples
///
/// ```
/// use core::exit_code::exit_code_description;
///
/// assert_eq!(exit_code_description(0), "success");
/// assert_eq!(exit_code_description(23), "partial transfer");
/// assert_eq!(exit_code_description(999), "unknown error code: 999");
/// ```
#[must_use]
pub fn exit_code_description(code: i32) -> String {
    ExitCode::from_i32(code)
        .map(|c| c.description().to_string())
        .unwrap_or_else(|| format!("unknown error code: {code}"))
}

/// Trait for error types that carry an associated exit code.
///
/// Every error type returned from `fcp`'s top-level `run` functions
/// implements this so `main` can convert any failure into a process exit
/// status without a separate mapping table.
pub trait HasExitCode {
    /// Returns the exit code associated with this value.
    fn exit_code(&self) -> ExitCode;
}
