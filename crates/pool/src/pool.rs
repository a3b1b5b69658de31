use std::collections::HashMap;
use std::io;
use std::net::TcpStream as StdTcpStream;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use mio::{Events, Interest, Poll, Token};
use tracing::{debug, warn};

use protocol::{Body, Flag, Packet, ProtocolError};

use crate::cookie::Cookie;
use crate::error::PoolError;
use crate::queue::BoundedQueue;
use crate::socket::{read_available, write_all_patient, Socket};

/// Default queue capacity multiplier applied to the socket count
/// (`spec.md` §4.2: bounded at `size * 5`).
pub const QUEUE_CAPACITY_MULTIPLIER: usize = 5;

/// Hard cap on how many sockets a single pool may hold (`spec.md` §5).
pub const MAX_SOCKETS: usize = 128;

/// How many recently-sent packets the [`Cookie`] cache remembers per pool.
pub const DEFAULT_COOKIE_CAPACITY: usize = 256;

struct PoolShared {
    registry: mio::Registry,
    poll: Mutex<Poll>,
    sockets: RwLock<HashMap<Token, Arc<Socket>>>,
    cursor: AtomicUsize,
    next_token: AtomicUsize,
    send_q: BoundedQueue,
    recv_q: BoundedQueue,
    cookie: Mutex<Cookie>,
    running: AtomicBool,
}

impl PoolShared {
    fn live_tokens(&self) -> Vec<Token> {
        self.sockets.read().unwrap_or_else(std::sync::PoisonError::into_inner).keys().copied().collect()
    }

    fn get(&self, token: Token) -> Option<Arc<Socket>> {
        self.sockets
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(&token)
            .cloned()
    }

    fn remove(&self, token: Token) {
        let socket = self
            .sockets
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(&token);
        if let Some(socket) = socket {
            let mut stream = socket.stream.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            let _ = self.registry.deregister(&mut *stream);
            warn!(token = token.0, "removed dead socket from pool");
        }
    }

    fn socket_count(&self) -> usize {
        self.sockets.read().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }

    /// Attempts to write `packet` to any live socket, round-robin, trying
    /// the next one if a socket is fully stuck or dead.
    fn write_packet(&self, packet: &Packet) -> bool {
        let tokens = self.live_tokens();
        if tokens.is_empty() {
            return false;
        }
        let start = self.cursor.fetch_add(1, Ordering::Relaxed) % tokens.len();
        let bytes = packet.pack();

        for offset in 0..tokens.len() {
            let token = tokens[(start + offset) % tokens.len()];
            let Some(socket) = self.get(token) else { continue };
            let mut stream = socket.stream.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            match write_all_patient(&mut stream, &bytes) {
                Ok(()) => {
                    drop(stream);
                    self.cookie.lock().unwrap_or_else(std::sync::PoisonError::into_inner).record(packet.clone());
                    debug!(flag = ?packet.flag(), token = token.0, length = packet.length(), "sent packet");
                    return true;
                }
                Err(err) => {
                    drop(stream);
                    warn!(token = token.0, error = %err, "write failed, trying another socket");
                    self.remove(token);
                }
            }
        }
        false
    }

    fn dispatch_inbound(&self, packet: Packet) {
        if packet.flag() == Flag::Resend {
            match packet.decode() {
                Ok(Body::Resend { flag, chksum, length }) => {
                    let cached = self
                        .cookie
                        .lock()
                        .unwrap_or_else(std::sync::PoisonError::into_inner)
                        .get(&(flag, chksum, length))
                        .cloned();
                    match cached {
                        Some(original) => self.send_q.push_front(original),
                        None => warn!(?flag, chksum, length, "resend requested for an uncached frame"),
                    }
                }
                _ => warn!("malformed resend request"),
            }
            return;
        }
        self.recv_q.push_back(packet);
    }
}

/// A set of sockets a single transfer spreads its packets across.
///
/// Callers never touch sockets directly (`spec.md` §2): enqueue outbound
/// packets with [`ConnectionPool::send`] and dequeue inbound ones with
/// [`ConnectionPool::recv`]. Internally one reader thread multiplexes reads
/// across every socket with `mio`, and one writer thread drains the send
/// queue onto whichever socket is free.
pub struct ConnectionPool {
    shared: Arc<PoolShared>,
    reader: Option<JoinHandle<()>>,
    writer: Option<JoinHandle<()>>,
}

impl ConnectionPool {
    /// Builds a pool around `sockets`, starting its reader and writer
    /// threads immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Register`] if a socket cannot be switched to
    /// non-blocking mode or registered with the readiness poller.
    pub fn new(sockets: Vec<StdTcpStream>) -> Result<Self, PoolError> {
        let socket_count = sockets.len().max(1);
        let queue_capacity = (socket_count * QUEUE_CAPACITY_MULTIPLIER).min(MAX_SOCKETS * QUEUE_CAPACITY_MULTIPLIER);

        let poll = Poll::new().map_err(|source| PoolError::Register { token: 0, source })?;
        let registry = poll
            .registry()
            .try_clone()
            .map_err(|source| PoolError::Register { token: 0, source })?;

        let shared = Arc::new(PoolShared {
            registry,
            poll: Mutex::new(poll),
            sockets: RwLock::new(HashMap::new()),
            cursor: AtomicUsize::new(0),
            next_token: AtomicUsize::new(0),
            send_q: BoundedQueue::new(queue_capacity),
            recv_q: BoundedQueue::new(queue_capacity),
            cookie: Mutex::new(Cookie::new(DEFAULT_COOKIE_CAPACITY)),
            running: AtomicBool::new(true),
        });

        for std_stream in sockets {
            std_stream.set_nonblocking(true).map_err(|source| PoolError::Register { token: 0, source })?;
            let mut mio_stream = mio::net::TcpStream::from_std(std_stream);
            let token = Token(shared.next_token.fetch_add(1, Ordering::Relaxed));
            shared
                .registry
                .register(&mut mio_stream, token, Interest::READABLE)
                .map_err(|source| PoolError::Register { token: token.0, source })?;
            shared
                .sockets
                .write()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .insert(token, Arc::new(Socket::new(token, mio_stream)));
        }

        let reader = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || reader_loop(shared))
        };
        let writer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || writer_loop(shared))
        };

        Ok(Self {
            shared,
            reader: Some(reader),
            writer: Some(writer),
        })
    }

    /// Enqueues `packet` for transmission on whichever socket is next free.
    pub fn send(&self, packet: Packet) {
        self.shared.send_q.push_back(packet);
    }

    /// Blocks until a packet has been received and validated.
    #[must_use]
    pub fn recv(&self) -> Packet {
        self.shared.recv_q.pop_front()
    }

    /// Returns a received packet if one is already queued, without
    /// blocking.
    pub fn try_recv(&self) -> Option<Packet> {
        self.shared.recv_q.try_pop_front()
    }

    /// Number of sockets still considered live.
    #[must_use]
    pub fn socket_count(&self) -> usize {
        self.shared.socket_count()
    }

    /// Stops the reader and writer threads and waits for them to exit.
    pub fn shutdown(mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.writer.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ConnectionPool {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::Release);
        if let Some(handle) = self.reader.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.writer.take() {
            let _ = handle.join();
        }
    }
}

fn reader_loop(shared: Arc<PoolShared>) {
    let mut events = Events::with_capacity(MAX_SOCKETS);
    let mut buf = [0u8; 64 * 1024];

    while shared.running.load(Ordering::Acquire) {
        let poll_result = {
            let mut poll = shared.poll.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            poll.poll(&mut events, Some(Duration::from_millis(200)))
        };
        if let Err(err) = poll_result {
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            warn!(error = %err, "poll failed");
            continue;
        }

        for event in events.iter() {
            if !event.is_readable() {
                continue;
            }
            let token = event.token();
            let Some(socket) = shared.get(token) else { continue };

            loop {
                let read = {
                    let mut stream = socket.stream.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                    read_available(&mut stream, &mut buf)
                };
                match read {
                    Ok(0) => {
                        shared.remove(token);
                        break;
                    }
                    Ok(n) => {
                        let decoded = {
                            let mut inbound = socket.inbound.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
                            inbound.feed(&buf[..n])
                        };
                        match decoded {
                            Ok(packets) => {
                                for packet in packets {
                                    shared.dispatch_inbound(packet);
                                }
                            }
                            Err(ProtocolError::ChecksumMismatch {
                                flag,
                                declared,
                                length,
                                computed,
                            }) => {
                                warn!(token = token.0, ?flag, declared, computed, "checksum mismatch, requesting resend");
                                shared.send_q.push_back(Packet::resend(flag, declared, length));
                            }
                            Err(err) => warn!(token = token.0, error = %err, "dropping corrupt frame"),
                        }
                    }
                    Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => break,
                    Err(err) => {
                        warn!(token = token.0, error = %err, "read failed");
                        shared.remove(token);
                        break;
                    }
                }
            }
        }
    }
}

fn writer_loop(shared: Arc<PoolShared>) {
    while shared.running.load(Ordering::Acquire) {
        let Some(packet) = shared.send_q.try_pop_front() else {
            thread::sleep(Duration::from_millis(5));
            continue;
        };

        if !shared.write_packet(&packet) {
            if shared.socket_count() == 0 {
                warn!("no sockets remain; dropping packet");
                continue;
            }
            shared.send_q.push_front(packet);
            thread::sleep(Duration::from_millis(20));
        }
    }
}
