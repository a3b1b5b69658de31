use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::thread;
use std::time::Duration;

use protocol::{Body, Buffer, Packet};
use tracing::{debug, warn};

use crate::error::SessionError;

/// Upper bound on how many times an auxiliary socket is redialled before
/// the session gives up on reaching the configured connection count.
///
/// `spec.md` §9 leaves the retry budget open; three attempts with a short
/// linear backoff is enough to ride out a transient refused connection
/// without leaving the client hanging if the server is actually down.
pub const MAX_ATTACH_RETRIES: u32 = 3;

const ATTACH_RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// What the client is asking the server to do (`spec.md` §6: `PULL`/`PUSH`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Fetch `path` (or its comma-joined list of paths) from the server.
    Pull(String),
    /// Send to `path` on the server.
    Push(String),
}

/// The outcome of a completed handshake: a session id and every raw socket
/// (primary first) ready to be handed to a [`pool::ConnectionPool`].
pub struct Handshake {
    /// Session id the server assigned in its `Sid` reply.
    pub session_id: u16,
    /// Primary socket followed by every successfully attached auxiliary.
    pub sockets: Vec<TcpStream>,
}

/// Dials `connections` sockets to `server_addr`, negotiates a session on
/// the first one, and attaches the rest to it.
///
/// # Errors
///
/// Returns [`SessionError`] if the primary connection or handshake fails.
/// Auxiliary sockets that never connect after [`MAX_ATTACH_RETRIES`]
/// attempts are dropped with a warning rather than failing the whole
/// session — a transfer with fewer sockets than requested still succeeds,
/// just with less parallelism.
pub fn connect(server_addr: SocketAddr, connections: usize, intent: Intent) -> Result<Handshake, SessionError> {
    let connections = connections.max(1);

    let mut primary = dial(server_addr)?;
    let request = match &intent {
        Intent::Pull(path) => Packet::pull(path).expect("CLI validates path before session::connect"),
        Intent::Push(path) => Packet::push(path).expect("CLI validates path before session::connect"),
    };
    send_packet(&mut primary, &request)?;

    let reply = recv_packet(&mut primary)?;
    let session_id = match reply.decode()? {
        Body::SessionId(sid) => sid,
        _ => return Err(SessionError::UnexpectedReply(reply.flag())),
    };
    debug!(session_id, "primary handshake complete");

    let mut sockets = Vec::with_capacity(connections);
    sockets.push(primary);

    for _ in 1..connections {
        match attach_with_retry(server_addr, session_id) {
            Ok(stream) => sockets.push(stream),
            Err(err) => warn!(error = %err, "could not attach auxiliary socket, continuing with fewer"),
        }
    }

    Ok(Handshake { session_id, sockets })
}

fn attach_with_retry(server_addr: SocketAddr, session_id: u16) -> Result<TcpStream, SessionError> {
    let mut last_err = None;
    for attempt in 0..MAX_ATTACH_RETRIES {
        match TcpStream::connect(server_addr) {
            Ok(mut stream) => match send_packet(&mut stream, &Packet::attach(session_id)) {
                Ok(()) => return Ok(stream),
                Err(err) => last_err = Some(err),
            },
            Err(err) => last_err = Some(SessionError::Connect { addr: server_addr, source: err }),
        }
        thread::sleep(ATTACH_RETRY_BACKOFF * (attempt + 1));
    }
    Err(SessionError::AttachFailed {
        attempts: MAX_ATTACH_RETRIES,
        source: std::io::Error::new(std::io::ErrorKind::Other, last_err.map_or_else(|| "unknown failure".to_string(), |e| e.to_string())),
    })
}

fn dial(addr: SocketAddr) -> Result<TcpStream, SessionError> {
    TcpStream::connect(addr).map_err(|source| SessionError::Connect { addr, source })
}

fn send_packet(stream: &mut TcpStream, packet: &Packet) -> Result<(), SessionError> {
    stream.write_all(&packet.pack())?;
    Ok(())
}

fn recv_packet(stream: &mut TcpStream) -> Result<Packet, SessionError> {
    let mut buffer = Buffer::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            return Err(SessionError::ConnectionClosed);
        }
        let mut packets = buffer.feed(&chunk[..n])?;
        if let Some(packet) = packets.pop() {
            return Ok(packet);
        }
    }
}
