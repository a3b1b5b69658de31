use std::collections::HashMap;

use pool::ConnectionPool;
use protocol::{Body, Packet};
use tracing::debug;

use crate::chunk_io::ChunkSink;
use crate::error::{TransferError, TransferReport};

struct FileProgress {
    path: String,
    size: u64,
    md5: [u8; 16],
    received: u64,
}

/// Drives the receiving side of a transfer: creates directories as they
/// arrive, accepts files in the order the sender announces them, and
/// verifies each one's whole-file digest once fully received
/// (`spec.md` §4.5).
pub struct Receiver<Sink> {
    pool: ConnectionPool,
    sink: Sink,
}

impl<Sink: ChunkSink> Receiver<Sink> {
    /// Builds a receiver over an already-attached pool and a chunk sink.
    #[must_use]
    pub fn new(pool: ConnectionPool, sink: Sink) -> Self {
        Self { pool, sink }
    }

    /// Runs the full receive sequence, then emits its own `Done` once every
    /// announced file has closed (`spec.md` §4.5 step 4).
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] only for failures that make the session
    /// itself unusable (a malformed frame, an IO error creating a
    /// directory). A per-file digest mismatch is recorded in the returned
    /// [`TransferReport`] instead of aborting the transfer.
    pub fn run(mut self) -> Result<TransferReport, TransferError> {
        let file_count = match self.pool.recv().decode()? {
            Body::FileCount(n) => n,
            other => return Err(TransferError::OutOfSequence(format!("expected FileCount, got {other:?}"))),
        };
        debug!(file_count, "receiver starting");

        let mut report = TransferReport::default();
        let mut in_flight: HashMap<u16, FileProgress> = HashMap::new();
        let mut remaining = file_count as usize;

        while remaining > 0 {
            let packet = self.pool.recv();
            match packet.decode()? {
                Body::DirInfo { perm, path, .. } => {
                    self.sink.create_dir(&path, perm)?;
                }
                Body::FileInfo {
                    file_id,
                    perm,
                    size,
                    mtime,
                    md5,
                    path,
                } => {
                    self.sink.begin_file(file_id, &path, perm, size, mtime)?;
                    in_flight.insert(file_id, FileProgress { path, size, md5, received: 0 });
                    self.pool.send(Packet::file_ready(file_id));
                }
                Body::FileChunk { file_id, seq, chunk } => {
                    let chunk_len = chunk.len() as u64;
                    self.sink.write_chunk(file_id, seq, &chunk)?;

                    let Some(progress) = in_flight.get_mut(&file_id) else {
                        continue;
                    };
                    progress.received += chunk_len;
                    if progress.received >= progress.size {
                        let progress = in_flight.remove(&file_id).expect("just matched");
                        match self.sink.finish_file(file_id, progress.md5) {
                            Ok(()) => report.succeeded.push(progress.path),
                            Err(err) => report.failed.push((progress.path, err.to_string())),
                        }
                        remaining -= 1;
                    }
                }
                other => return Err(TransferError::OutOfSequence(format!("unexpected frame {other:?}"))),
            }
        }

        for (_, progress) in in_flight {
            report.failed.push((progress.path, "transfer ended before file completed".to_string()));
        }

        debug_assert!(file_count as usize >= report.succeeded.len());
        self.pool.send(Packet::done());
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_io::{FsSink, CHUNK_SIZE};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use tempfile::tempdir;

    fn connected_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = thread::spawn(move || TcpStream::connect(addr).unwrap());
        let (server, _) = listener.accept().unwrap();
        (client.join().unwrap(), server)
    }

    #[test]
    fn receives_a_single_small_file_end_to_end() {
        let dst_dir = tempdir().unwrap();
        let sink = FsSink::new(dst_dir.path()).unwrap();

        let (client_sock, server_sock) = connected_pair();
        let sender_pool = ConnectionPool::new(vec![client_sock]).unwrap();
        let receiver_pool = ConnectionPool::new(vec![server_sock]).unwrap();

        let handle = thread::spawn(move || Receiver::new(receiver_pool, sink).run().unwrap());

        let payload = b"hello from the sender";
        let md5 = checksums::strong::Md5::digest(payload);

        sender_pool.send(Packet::file_count(1));
        sender_pool.send(Packet::file_info(1, 0o644, payload.len() as u64, 0.0, md5, "a.txt").unwrap());

        let ready = sender_pool.recv();
        assert_eq!(ready.decode().unwrap(), Body::FileReady(1));

        sender_pool.send(Packet::file_chunk(1, 0, payload).unwrap());

        assert_eq!(sender_pool.recv().decode().unwrap(), Body::Done);

        let report = handle.join().unwrap();
        assert!(report.is_complete_success());
        assert_eq!(std::fs::read(dst_dir.path().join("a.txt")).unwrap(), payload);
    }

    #[test]
    fn digest_mismatch_is_reported_without_aborting() {
        let dst_dir = tempdir().unwrap();
        let sink = FsSink::new(dst_dir.path()).unwrap();

        let (client_sock, server_sock) = connected_pair();
        let sender_pool = ConnectionPool::new(vec![client_sock]).unwrap();
        let receiver_pool = ConnectionPool::new(vec![server_sock]).unwrap();

        let handle = thread::spawn(move || Receiver::new(receiver_pool, sink).run().unwrap());

        sender_pool.send(Packet::file_count(1));
        sender_pool.send(Packet::file_info(1, 0o644, 4, 0.0, [0u8; 16], "bad.txt").unwrap());
        let _ = sender_pool.recv();
        sender_pool.send(Packet::file_chunk(1, 0, b"data").unwrap());

        assert_eq!(sender_pool.recv().decode().unwrap(), Body::Done);

        let report = handle.join().unwrap();
        assert!(!report.is_complete_success());
        assert_eq!(report.failed.len(), 1);
    }

    #[test]
    fn multi_chunk_file_completes_once_all_bytes_arrive() {
        let dst_dir = tempdir().unwrap();
        let sink = FsSink::new(dst_dir.path()).unwrap();

        let (client_sock, server_sock) = connected_pair();
        let sender_pool = ConnectionPool::new(vec![client_sock]).unwrap();
        let receiver_pool = ConnectionPool::new(vec![server_sock]).unwrap();

        let handle = thread::spawn(move || Receiver::new(receiver_pool, sink).run().unwrap());

        let part_a = vec![b'a'; CHUNK_SIZE];
        let part_b = vec![b'b'; 10];
        let mut whole = part_a.clone();
        whole.extend_from_slice(&part_b);
        let md5 = checksums::strong::Md5::digest(&whole);

        sender_pool.send(Packet::file_count(1));
        sender_pool.send(Packet::file_info(1, 0o644, whole.len() as u64, 0.0, md5, "big.txt").unwrap());
        let _ = sender_pool.recv();
        sender_pool.send(Packet::file_chunk(1, 0, &part_a).unwrap());
        sender_pool.send(Packet::file_chunk(1, 1, &part_b).unwrap());

        assert_eq!(sender_pool.recv().decode().unwrap(), Body::Done);

        let report = handle.join().unwrap();
        assert!(report.is_complete_success());
        assert_eq!(std::fs::read(dst_dir.path().join("big.txt")).unwrap(), whole);
    }
}
