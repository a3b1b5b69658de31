use std::io::{self, Read, Write};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use mio::net::TcpStream;
use mio::Token;

use protocol::Buffer;

/// A socket under pool management: its mio stream, its own inbound
/// reassembly [`Buffer`], and whether it is still usable.
pub(crate) struct Socket {
    pub(crate) token: Token,
    pub(crate) stream: Mutex<TcpStream>,
    pub(crate) inbound: Mutex<Buffer>,
}

impl Socket {
    pub(crate) fn new(token: Token, stream: TcpStream) -> Self {
        Self {
            token,
            stream: Mutex::new(stream),
            inbound: Mutex::new(Buffer::new()),
        }
    }
}

/// Writes `bytes` to `stream` in full, retrying on `WouldBlock` for a short
/// while before giving up. `stream` is non-blocking (required for `mio`
/// registration), so an ordinary `write_all` would fail the instant the
/// kernel's send buffer is momentarily full; this absorbs that without
/// splitting one frame across two sockets mid-write.
pub(crate) fn write_all_patient(stream: &mut TcpStream, bytes: &[u8]) -> io::Result<()> {
    let mut offset = 0;
    let mut retries = 0u32;
    const MAX_RETRIES: u32 = 2000;
    const BACKOFF: Duration = Duration::from_micros(200);

    while offset < bytes.len() {
        match stream.write(&bytes[offset..]) {
            Ok(0) => {
                return Err(io::Error::new(io::ErrorKind::WriteZero, "peer closed the socket"));
            }
            Ok(n) => {
                offset += n;
                retries = 0;
            }
            Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                retries += 1;
                if retries > MAX_RETRIES {
                    return Err(io::Error::new(io::ErrorKind::WouldBlock, "socket did not drain in time"));
                }
                thread::sleep(BACKOFF);
            }
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Reads whatever is currently available from `stream` into `buf`, without
/// blocking past the first `WouldBlock`.
pub(crate) fn read_available(stream: &mut TcpStream, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match stream.read(buf) {
            Ok(n) => return Ok(n),
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}
