use std::io;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::Duration;

use core::remote_shell::{RemoteShell, SshConfig};

/// How long to let `ssh -N -L` establish its forward before dialing it.
///
/// `sshtunnel.SSHTunnelForwarder` (the upstream dependency) exposes a
/// readiness signal once its listener thread is bound; spawning the system
/// `ssh` binary directly has no equivalent, so a fixed settle delay stands
/// in for it.
const TUNNEL_SETTLE_DELAY: Duration = Duration::from_millis(700);

/// A running `ssh -N -L` tunnel to a remote `fcpd`. Killed when dropped.
pub struct Tunnel {
    child: Child,
    local_port: u16,
}

impl Tunnel {
    /// Local TCP port the forwarded end of the tunnel listens on.
    #[must_use]
    pub fn local_port(&self) -> u16 {
        self.local_port
    }
}

impl Drop for Tunnel {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Spawns `ssh -N -L <local>:localhost:<remote_port>` to `host` and waits
/// for it to settle.
///
/// # Errors
///
/// Returns an [`io::Error`] if a local port can't be reserved or the `ssh`
/// process can't be spawned.
pub fn open(host: &str, remote_port: u16, ssh_config_file: &Path, ssh: &SshConfig) -> io::Result<Tunnel> {
    let local_port = reserve_local_port()?;

    let mut rest = ssh.to_args();
    rest.push("-F".to_string());
    rest.push(ssh_config_file.display().to_string());
    rest.push("-L".to_string());
    rest.push(format!("{local_port}:localhost:{remote_port}"));
    let rest_refs: Vec<&str> = rest.iter().map(String::as_str).collect();

    let argv = RemoteShell::default().build_command(host, "-N", &rest_refs);

    let child = Command::new(&argv[0])
        .args(&argv[1..])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    thread::sleep(TUNNEL_SETTLE_DELAY);
    Ok(Tunnel { child, local_port })
}

fn reserve_local_port() -> io::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    listener.local_addr().map(|addr| addr.port())
}
