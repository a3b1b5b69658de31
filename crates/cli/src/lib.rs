//! Command-line entry point for `fcp`.
//!
//! # Overview
//!
//! This crate turns `std::env::args_os()` into a running transfer: it
//! parses the `[USER@]HOST:PATH` argument grammar (`spec.md` §6), opens an
//! `ssh -N -L` tunnel to the remote `fcpd`, negotiates a session, and hands
//! the resulting [`pool::ConnectionPool`] to a [`transporter::Sender`] or
//! [`transporter::Receiver`] depending on whether the invocation is a pull
//! or a push.
//!
//! # Design
//!
//! [`run`] never panics on bad input or a failed transfer; every error path
//! is captured in [`error::CliError`], rendered through
//! [`core::message::Message`], and mapped to a [`core::exit_code::ExitCode`]
//! via [`core::exit_code::HasExitCode`]. A file-level failure reported in a
//! [`transporter::TransferReport`] does not stop the other files from being
//! attempted; it surfaces as [`error::CliError::PartialTransfer`] only after
//! every file has had its chance.
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

mod args;
mod error;
mod tunnel;

use std::ffi::OsString;
use std::io::Write;
use std::net::{SocketAddr, ToSocketAddrs};
use std::process::ExitCode as ProcessExitCode;

use core::exit_code::{ExitCode, HasExitCode};
use core::message::{Message, Role as MessageRole};
use core::remote_shell::SshConfig;
use tracing::{info, warn};

pub use args::{Invocation, Role};
pub use error::CliError;

/// Parses arguments, runs the requested transfer, and writes diagnostics to
/// `stdout`/`stderr`.
///
/// Returns the [`ExitCode`] the process should exit with; pass it to
/// [`exit_code_from`] to get a [`std::process::ExitCode`].
pub fn run<I, Out, Err>(args: I, stdout: &mut Out, stderr: &mut Err) -> ExitCode
where
    I: IntoIterator,
    I::Item: Into<OsString>,
    Out: Write,
    Err: Write,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    let invocation = match args::parse(args) {
        Ok(invocation) => invocation,
        Err(CliError::Usage(err))
            if matches!(err.kind(), clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion) =>
        {
            let _ = write!(stdout, "{err}");
            return ExitCode::Ok;
        }
        Err(err) => return report_fatal(stderr, &err),
    };

    logging::init(invocation.verbosity);

    match try_run(invocation, stderr) {
        Ok(code) => code,
        Err(err) => report_fatal(stderr, &err),
    }
}

fn report_fatal<Err: Write>(stderr: &mut Err, err: &CliError) -> ExitCode {
    let code = err.exit_code();
    let rendered = Message::error(code.as_i32(), err.to_string());
    let _ = writeln!(stderr, "{rendered}");
    code
}

/// Converts the [`ExitCode`] returned by [`run`] into the process's exit
/// status.
#[must_use]
pub fn exit_code_from(code: ExitCode) -> ProcessExitCode {
    code.into()
}

fn try_run<Err: Write>(invocation: Invocation, stderr: &mut Err) -> Result<ExitCode, CliError> {
    let ssh_config = SshConfig {
        port: Some(invocation.port),
        identity_file: invocation.identity_file.clone(),
        ssh_options: Vec::new(),
        user: invocation.user.clone(),
    };

    info!(host = %invocation.host, connections = invocation.connections, "opening ssh tunnel");
    let tunnel = tunnel::open(&invocation.host, protocol::DEFAULT_SERVER_PORT, &invocation.ssh_config, &ssh_config)
        .map_err(CliError::Tunnel)?;

    let server_addr: SocketAddr = ("127.0.0.1", tunnel.local_port())
        .to_socket_addrs()
        .map_err(CliError::TunnelAddr)?
        .next()
        .expect("loopback address always resolves");

    let (role, report) = match invocation.intent {
        Role::Pull { remote_paths, local_dst } => {
            info!(dst = %local_dst.display(), "starting pull");
            let handshake = session::connect(server_addr, invocation.connections, session::Intent::Pull(remote_paths))?;
            let pool = pool::ConnectionPool::new(handshake.sockets)?;
            let sink = transporter::FsSink::new(&local_dst)
                .map_err(|source| CliError::SourcePath { path: local_dst.display().to_string(), source })?;
            (MessageRole::Receiver, transporter::Receiver::new(pool, sink).run()?)
        }
        Role::Push { local_srcs, remote_dst } => {
            let root = local_srcs.into_iter().next().expect("args::parse guarantees exactly one source for push");
            info!(src = %root.display(), "starting push");
            let handshake = session::connect(server_addr, invocation.connections, session::Intent::Push(remote_dst))?;
            let pool = pool::ConnectionPool::new(handshake.sockets)?;
            let source = transporter::FsSource::scan(&root)
                .map_err(|source| CliError::SourcePath { path: root.display().to_string(), source })?;
            (MessageRole::Sender, transporter::Sender::new(pool, source).run()?)
        }
    };

    for (path, reason) in &report.failed {
        warn!(%path, %reason, "file failed to transfer");
        let rendered = Message::warning(format!("{path}: {reason}")).with_role(role);
        let _ = writeln!(stderr, "{rendered}");
    }

    if report.is_complete_success() {
        Ok(ExitCode::Ok)
    } else {
        Err(CliError::PartialTransfer(report.failed.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_flag_reports_success_and_writes_to_stdout() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(["fcp", "--help"], &mut stdout, &mut stderr);
        assert_eq!(code, ExitCode::Ok);
        assert!(!stdout.is_empty());
        assert!(stderr.is_empty());
    }

    #[test]
    fn missing_arguments_is_a_syntax_error() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(["fcp"], &mut stdout, &mut stderr);
        assert_eq!(code, ExitCode::Syntax);
    }

    #[test]
    fn ambiguous_direction_is_a_syntax_error() {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let code = run(["fcp", "/local/a", "/local/b"], &mut stdout, &mut stderr);
        assert_eq!(code, ExitCode::Syntax);
        assert!(!stderr.is_empty());
    }
}
