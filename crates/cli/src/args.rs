use std::ffi::OsString;
use std::path::PathBuf;

use clap::Parser;
use core::remote_shell::parse_ssh_uri;

use crate::error::CliError;

/// Hard cap on `-n`, matching `fcp.py`'s argument grammar (`spec.md` §6).
pub const MAX_CONNECTIONS: u32 = 128;

#[derive(Parser, Debug)]
#[command(
    name = "fcp",
    version,
    about = "Parallel file copy over an SSH-tunnelled connection pool",
    long_about = "PULL : fcp [OPTIONS] [USER@]HOST:SRC... DST\nPUSH : fcp [OPTIONS] SRC... [USER@]HOST:DST"
)]
struct RawArgs {
    /// SSH port on the remote host.
    #[arg(short = 'p', default_value_t = 22)]
    port: u16,

    /// SSH private key file.
    #[arg(short = 'i')]
    identity_file: Option<String>,

    /// SSH client config file.
    #[arg(short = 'F', default_value = "~/.ssh/config")]
    ssh_config: String,

    /// Number of parallel connections (capped at 128).
    #[arg(short = 'n', default_value_t = 16)]
    connections: u32,

    /// Verbose output; repeat for more detail.
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Source path(s) followed by the destination path. Exactly one side
    /// must carry a `[USER@]HOST:` prefix.
    #[arg(required = true, num_args = 2..)]
    paths: Vec<String>,
}

/// What the client does once connected: pull files to a local destination,
/// or push a local tree to the remote server.
#[derive(Debug)]
pub enum Role {
    /// Fetch `remote_paths` (comma-joined) into `local_dst`.
    Pull { remote_paths: String, local_dst: PathBuf },
    /// Send `local_srcs` (currently always exactly one root) to `remote_dst`.
    Push { local_srcs: Vec<PathBuf>, remote_dst: String },
}

/// A fully parsed and validated invocation of the `fcp` binary.
#[derive(Debug)]
pub struct Invocation {
    /// Remote host to reach via SSH.
    pub host: String,
    /// Remote login user, if given.
    pub user: Option<String>,
    /// SSH port.
    pub port: u16,
    /// SSH private key file, if given.
    pub identity_file: Option<String>,
    /// SSH client config file.
    pub ssh_config: PathBuf,
    /// Number of parallel connections to request, already clamped to
    /// `[1, MAX_CONNECTIONS]`.
    pub connections: usize,
    /// Verbosity level derived from `-v`'s repeat count.
    pub verbosity: logging::Verbosity,
    /// Pull or push, with resolved paths.
    pub intent: Role,
}

/// Parses and validates `args` into an [`Invocation`].
///
/// # Errors
///
/// Returns [`CliError::Usage`] for malformed arguments (including
/// `--help`/`--version`, which `clap` reports as an error carrying the text
/// to print). Returns [`CliError::AmbiguousDirection`],
/// [`CliError::MixedSources`], or [`CliError::TooManySources`] for a
/// structurally valid but semantically invalid path list.
pub fn parse(args: Vec<OsString>) -> Result<Invocation, CliError> {
    let raw = RawArgs::try_parse_from(args)?;
    let connections = raw.connections.clamp(1, MAX_CONNECTIONS) as usize;
    let verbosity = logging::Verbosity::from_flag_count(raw.verbose);

    let (srcs, dst) = raw.paths.split_at(raw.paths.len() - 1);
    let dst = dst[0].clone();

    let first_src_is_remote = parse_ssh_uri(&srcs[0]).is_some();
    let dst_is_remote = parse_ssh_uri(&dst).is_some();

    let (host, user, intent) = match (first_src_is_remote, dst_is_remote) {
        (true, false) => {
            let (host, user, remote_paths) = resolve_pull_sources(srcs)?;
            (host, user, Role::Pull { remote_paths, local_dst: PathBuf::from(dst) })
        }
        (false, true) => {
            if srcs.len() > 1 {
                return Err(CliError::TooManySources(srcs.len()));
            }
            let (user, host, remote_dst) = parse_ssh_uri(&dst).expect("checked above");
            let local_src = std::fs::canonicalize(&srcs[0])
                .map_err(|source| CliError::SourcePath { path: srcs[0].clone(), source })?;
            (
                host.to_string(),
                user.map(str::to_string),
                Role::Push { local_srcs: vec![local_src], remote_dst: remote_dst.to_string() },
            )
        }
        (true, true) | (false, false) => return Err(CliError::AmbiguousDirection),
    };

    Ok(Invocation {
        host,
        user,
        port: raw.port,
        identity_file: raw.identity_file,
        ssh_config: expand_tilde(&raw.ssh_config),
        connections,
        verbosity,
        intent,
    })
}

fn resolve_pull_sources(srcs: &[String]) -> Result<(String, Option<String>, String), CliError> {
    let mut host: Option<String> = None;
    let mut user: Option<String> = None;
    let mut paths = Vec::with_capacity(srcs.len());

    for src in srcs {
        let (src_user, src_host, path) = parse_ssh_uri(src).ok_or_else(|| CliError::MixedSources(src.clone()))?;
        match &host {
            None => host = Some(src_host.to_string()),
            Some(existing) if existing != src_host => return Err(CliError::MixedSources(src.clone())),
            Some(_) => {}
        }
        match (&user, src_user) {
            (None, u) => user = u.map(str::to_string),
            (Some(existing), Some(u)) if existing != u => return Err(CliError::MixedSources(src.clone())),
            _ => {}
        }
        paths.push(path.to_string());
    }

    paths.sort();
    Ok((host.expect("srcs is non-empty"), user, paths.join(",")))
}

fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(rest);
        }
    }
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(words: &[&str]) -> Vec<OsString> {
        std::iter::once("fcp".to_string()).chain(words.iter().map(|s| s.to_string())).map(OsString::from).collect()
    }

    #[test]
    fn pull_form_joins_same_host_sources() {
        let invocation = parse(args(&["user@example.com:/a", "user@example.com:/b", "/local/dst"])).unwrap();
        assert_eq!(invocation.host, "example.com");
        assert_eq!(invocation.user.as_deref(), Some("user"));
        match invocation.intent {
            Role::Pull { remote_paths, local_dst } => {
                assert_eq!(remote_paths, "/a,/b");
                assert_eq!(local_dst, PathBuf::from("/local/dst"));
            }
            Role::Push { .. } => panic!("expected pull"),
        }
    }

    #[test]
    fn pull_form_rejects_mismatched_hosts() {
        let err = parse(args(&["user@a.example.com:/a", "user@b.example.com:/b", "/local/dst"])).unwrap_err();
        assert!(matches!(err, CliError::MixedSources(_)));
    }

    #[test]
    fn neither_remote_is_ambiguous() {
        let err = parse(args(&["/local/a", "/local/b"])).unwrap_err();
        assert!(matches!(err, CliError::AmbiguousDirection));
    }

    #[test]
    fn both_remote_is_ambiguous() {
        let err = parse(args(&["user@a.example.com:/a", "user@b.example.com:/b"])).unwrap_err();
        assert!(matches!(err, CliError::AmbiguousDirection));
    }

    #[test]
    fn connections_are_clamped_to_the_hard_cap() {
        let invocation = parse(args(&["-n", "9999", "user@example.com:/a", "/local/dst"])).unwrap();
        assert_eq!(invocation.connections, MAX_CONNECTIONS as usize);
    }

    #[test]
    fn push_with_multiple_sources_is_rejected() {
        let err = parse(args(&["/local/a", "/local/b", "user@example.com:/dst"])).unwrap_err();
        assert!(matches!(err, CliError::TooManySources(2)));
    }
}
