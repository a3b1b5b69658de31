#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `core` collects the small pieces of behaviour shared by every other `fcp`
//! crate that isn't specific to the wire protocol or the connection pool:
//! process exit codes, user-facing diagnostic formatting, and the remote
//! shell plumbing used to reach a host over SSH.
//!
//! # Design
//!
//! [`exit_code`] defines [`exit_code::ExitCode`], the small enum every
//! fallible entry point maps its failure onto before calling
//! [`std::process::exit`]. [`message`] defines the [`message::Message`] type
//! CLI and pool code use to render a single line of user-facing output.
//! [`remote_shell`] parses the `[USER@]HOST:PATH` syntax accepted on the
//! command line and builds the `ssh` invocation used to open a tunnel to the
//! remote `fcpd`.
//!
//! # Invariants
//!
//! - [`exit_code::ExitCode`] values are stable across releases; scripts may
//!   depend on them.
//! - [`message::Message::to_string`] never panics regardless of the
//!   diagnostic text supplied.

/// Process exit codes returned by the `fcp` binary.
pub mod exit_code;
/// User-facing diagnostic message formatting.
pub mod message;
/// Remote shell command construction and `[USER@]HOST:PATH` parsing.
pub mod remote_shell;
