use std::collections::{HashMap, VecDeque};

use pool::ConnectionPool;
use protocol::{Body, Packet};
use tracing::debug;

use crate::chunk_io::ChunkSource;
use crate::entry::FileEntry;
use crate::error::{TransferError, TransferReport};

/// Drives the sending side of a transfer: announces the file count and
/// directory tree, then streams file content, interleaving chunks across
/// every file the peer has already signalled ready for (`spec.md` §4.4).
pub struct Sender<Source> {
    pool: ConnectionPool,
    source: Source,
}

impl<Source: ChunkSource> Sender<Source> {
    /// Builds a sender over an already-attached pool and a chunk source.
    #[must_use]
    pub fn new(pool: ConnectionPool, source: Source) -> Self {
        Self { pool, source }
    }

    /// Runs the full send sequence to completion.
    ///
    /// # Errors
    ///
    /// Returns [`TransferError`] for IO failures reading source data or
    /// protocol failures decoding the receiver's acknowledgements. A
    /// `ChecksumMismatch` can't occur on the send side — it only surfaces
    /// from the receiver, reported back in its own [`TransferReport`].
    pub fn run(mut self) -> Result<TransferReport, TransferError> {
        self.pool.send(Packet::file_count(self.source.file_count()));

        for dir in self.source.directories() {
            self.pool.send(Packet::dir_info(dir.file_id, dir.perm, &dir.path)?);
        }

        let files = self.source.files().to_vec();
        for file in &files {
            self.pool
                .send(Packet::file_info(file.file_id, file.perm, file.size, file.mtime, file.md5, &file.path)?);
        }
        let by_id: HashMap<u16, &FileEntry> = files.iter().map(|file| (file.file_id, file)).collect();

        let mut report = TransferReport::default();
        let mut remaining = files.len();
        let mut ready_queue: VecDeque<u16> = VecDeque::new();
        let mut cursors: HashMap<u16, u32> = HashMap::new();

        while remaining > 0 {
            let next_ready = if ready_queue.is_empty() {
                Some(self.pool.recv())
            } else {
                self.pool.try_recv()
            };
            if let Some(packet) = next_ready {
                match packet.decode()? {
                    Body::FileReady(id) => {
                        ready_queue.push_back(id);
                        cursors.entry(id).or_insert(0);
                    }
                    other => return Err(TransferError::OutOfSequence(format!("expected FileReady, got {other:?}"))),
                }
            }

            let Some(file_id) = ready_queue.pop_front() else { continue };
            let file = by_id[&file_id];
            let seq = cursors[&file_id];
            let chunk = self.source.read_chunk(file_id, seq)?;
            if chunk.is_empty() {
                debug!(path = %file.path, chunks = seq, "sent file");
                report.succeeded.push(file.path.clone());
                cursors.remove(&file_id);
                remaining -= 1;
            } else {
                self.pool.send(Packet::file_chunk(file_id, seq, &chunk)?);
                cursors.insert(file_id, seq + 1);
                ready_queue.push_back(file_id);
            }
        }

        self.await_peer_done()?;
        self.pool.send(Packet::done());
        Ok(report)
    }

    /// Blocks until the peer's own `Done` arrives, signalling every file it
    /// expected has been verified and closed (`spec.md` §4.4 step 6).
    fn await_peer_done(&self) -> Result<(), TransferError> {
        match self.pool.recv().decode()? {
            Body::Done => Ok(()),
            other => Err(TransferError::OutOfSequence(format!("expected Done, got {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk_io::FsSource;
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
    fn sends_file_count_tree_and_chunks_then_waits_for_peer_done() {
        let src_dir = tempdir().unwrap();
        std::fs::write(src_dir.path().join("a.txt"), b"hello, sender").unwrap();
        let source = FsSource::scan(src_dir.path()).unwrap();
        let file_id = source.files()[0].file_id;

        let (client_sock, server_sock) = connected_pair();
        let client_pool = ConnectionPool::new(vec![client_sock]).unwrap();
        let server_pool = ConnectionPool::new(vec![server_sock]).unwrap();

        let handle = thread::spawn(move || Sender::new(client_pool, source).run().unwrap());

        assert_eq!(server_pool.recv().decode().unwrap(), Body::FileCount(1));
        let info = server_pool.recv();
        assert!(matches!(info.decode().unwrap(), Body::FileInfo { .. }));

        server_pool.send(Packet::file_ready(file_id));

        let chunk = server_pool.recv();
        assert!(matches!(chunk.decode().unwrap(), Body::FileChunk { .. }));

        server_pool.send(Packet::done());

        let report = handle.join().unwrap();
        assert!(report.is_complete_success());
    }

    #[test]
    fn chunks_from_different_ready_files_interleave() {
        let src_dir = tempdir().unwrap();
        std::fs::write(src_dir.path().join("a.txt"), vec![b'a'; 3]).unwrap();
        std::fs::write(src_dir.path().join("b.txt"), vec![b'b'; 3]).unwrap();
        let source = FsSource::scan(src_dir.path()).unwrap();
        let files = source.files().to_vec();
        let id_a = files.iter().find(|f| f.path == "a.txt").unwrap().file_id;
        let id_b = files.iter().find(|f| f.path == "b.txt").unwrap().file_id;

        let (client_sock, server_sock) = connected_pair();
        let client_pool = ConnectionPool::new(vec![client_sock]).unwrap();
        let server_pool = ConnectionPool::new(vec![server_sock]).unwrap();

        let handle = thread::spawn(move || Sender::new(client_pool, source).run().unwrap());

        assert_eq!(server_pool.recv().decode().unwrap(), Body::FileCount(2));
        for _ in 0..2 {
            assert!(matches!(server_pool.recv().decode().unwrap(), Body::FileInfo { .. }));
        }

        // Mark both files ready before consuming any chunks, so the sender
        // has no choice but to interleave if it's capable of it.
        server_pool.send(Packet::file_ready(id_a));
        server_pool.send(Packet::file_ready(id_b));

        let mut seen_ids = Vec::new();
        loop {
            match server_pool.recv().decode().unwrap() {
                Body::FileChunk { file_id, .. } => seen_ids.push(file_id),
                Body::Done => unreachable!("sender should wait for our Done first"),
                _ => {}
            }
            if seen_ids.len() == 2 {
                break;
            }
        }
        assert!(seen_ids.contains(&id_a));
        assert!(seen_ids.contains(&id_b));

        server_pool.send(Packet::done());
        let report = handle.join().unwrap();
        assert!(report.is_complete_success());
    }
}
