use std::fs;
use std::net::{TcpListener, TcpStream};
use std::thread;

use pool::ConnectionPool;
use tempfile::tempdir;
use transporter::{ChunkSource, FsSink, FsSource, Receiver, Sender, CHUNK_SIZE};

fn connected_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    let client = thread::spawn(move || TcpStream::connect(addr).unwrap());
    let (server, _) = listener.accept().unwrap();
    (client.join().unwrap(), server)
}

fn connected_pools(socket_count: usize) -> (ConnectionPool, ConnectionPool) {
    let mut sender_sockets = Vec::new();
    let mut receiver_sockets = Vec::new();
    for _ in 0..socket_count {
        let (client, server) = connected_pair();
        sender_sockets.push(client);
        receiver_sockets.push(server);
    }
    (
        ConnectionPool::new(sender_sockets).expect("sender pool"),
        ConnectionPool::new(receiver_sockets).expect("receiver pool"),
    )
}

/// S1: a single small file transfers end to end over one socket.
#[test]
fn single_small_file_transfers_over_one_socket() {
    let src_dir = tempdir().unwrap();
    fs::write(src_dir.path().join("greeting.txt"), b"hello from fcp").unwrap();
    let source = FsSource::scan(src_dir.path()).unwrap();

    let dst_dir = tempdir().unwrap();
    let sink = FsSink::new(dst_dir.path()).unwrap();

    let (sender_pool, receiver_pool) = connected_pools(1);

    let sender = thread::spawn(move || Sender::new(sender_pool, source).run().unwrap());
    let receiver = thread::spawn(move || Receiver::new(receiver_pool, sink).run().unwrap());

    let sender_report = sender.join().unwrap();
    let receiver_report = receiver.join().unwrap();

    assert!(sender_report.is_complete_success());
    assert!(receiver_report.is_complete_success());
    assert_eq!(fs::read(dst_dir.path().join("greeting.txt")).unwrap(), b"hello from fcp");
}

/// S2: a directory with nested files transfers with its tree intact; the
/// file count the receiver is told about excludes directories.
#[test]
fn nested_directory_tree_transfers_with_structure_intact() {
    let src_dir = tempdir().unwrap();
    fs::create_dir(src_dir.path().join("sub")).unwrap();
    fs::write(src_dir.path().join("top.txt"), b"top level").unwrap();
    fs::write(src_dir.path().join("sub/nested.txt"), b"nested contents").unwrap();
    let source = FsSource::scan(src_dir.path()).unwrap();
    assert_eq!(source.file_count(), 2, "directories must not be counted as files");

    let dst_dir = tempdir().unwrap();
    let sink = FsSink::new(dst_dir.path()).unwrap();

    let (sender_pool, receiver_pool) = connected_pools(1);
    let sender = thread::spawn(move || Sender::new(sender_pool, source).run().unwrap());
    let receiver = thread::spawn(move || Receiver::new(receiver_pool, sink).run().unwrap());

    assert!(sender.join().unwrap().is_complete_success());
    assert!(receiver.join().unwrap().is_complete_success());

    assert_eq!(fs::read(dst_dir.path().join("top.txt")).unwrap(), b"top level");
    assert_eq!(fs::read(dst_dir.path().join("sub/nested.txt")).unwrap(), b"nested contents");
}

/// S3: a multi-chunk file transfers over a pool of 8 sockets and
/// reassembles byte-for-byte despite chunks landing on whichever socket the
/// writer happened to pick.
#[test]
fn large_file_reassembles_correctly_over_eight_sockets() {
    let src_dir = tempdir().unwrap();
    let mut payload = Vec::with_capacity(CHUNK_SIZE * 3 + 777);
    for i in 0..payload.capacity() {
        payload.push((i % 251) as u8);
    }
    fs::write(src_dir.path().join("big.bin"), &payload).unwrap();
    let source = FsSource::scan(src_dir.path()).unwrap();

    let dst_dir = tempdir().unwrap();
    let sink = FsSink::new(dst_dir.path()).unwrap();

    let (sender_pool, receiver_pool) = connected_pools(8);
    let sender = thread::spawn(move || Sender::new(sender_pool, source).run().unwrap());
    let receiver = thread::spawn(move || Receiver::new(receiver_pool, sink).run().unwrap());

    assert!(sender.join().unwrap().is_complete_success());
    assert!(receiver.join().unwrap().is_complete_success());
    assert_eq!(fs::read(dst_dir.path().join("big.bin")).unwrap(), payload);
}

/// S6: two files pushed in the same session complete with their own
/// content intact, proving the sender's round-robin interleaving and the
/// receiver's per-file bookkeeping don't cross-contaminate.
#[test]
fn two_files_transfer_concurrently_without_cross_contamination() {
    let src_dir = tempdir().unwrap();
    fs::write(src_dir.path().join("a.txt"), vec![b'a'; CHUNK_SIZE + 100]).unwrap();
    fs::write(src_dir.path().join("b.txt"), vec![b'b'; CHUNK_SIZE + 250]).unwrap();
    let source = FsSource::scan(src_dir.path()).unwrap();

    let dst_dir = tempdir().unwrap();
    let sink = FsSink::new(dst_dir.path()).unwrap();

    let (sender_pool, receiver_pool) = connected_pools(2);
    let sender = thread::spawn(move || Sender::new(sender_pool, source).run().unwrap());
    let receiver = thread::spawn(move || Receiver::new(receiver_pool, sink).run().unwrap());

    let sender_report = sender.join().unwrap();
    let receiver_report = receiver.join().unwrap();

    assert!(sender_report.is_complete_success());
    assert!(receiver_report.is_complete_success());
    assert_eq!(receiver_report.succeeded.len(), 2);
    assert_eq!(fs::read(dst_dir.path().join("a.txt")).unwrap(), vec![b'a'; CHUNK_SIZE + 100]);
    assert_eq!(fs::read(dst_dir.path().join("b.txt")).unwrap(), vec![b'b'; CHUNK_SIZE + 250]);
}
