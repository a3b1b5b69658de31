use std::net::{TcpListener, TcpStream};
use std::thread;
use std::time::Duration;

use pool::ConnectionPool;
use protocol::{Body, Packet};

fn connected_pair() -> (TcpStream, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback listener");
    let addr = listener.local_addr().unwrap();
    let client = thread::spawn(move || TcpStream::connect(addr).expect("connect to loopback"));
    let (server, _) = listener.accept().expect("accept loopback connection");
    (client.join().unwrap(), server)
}

#[test]
fn packet_sent_on_one_pool_is_received_on_the_peer_pool() {
    let (client_sock, server_sock) = connected_pair();

    let client_pool = ConnectionPool::new(vec![client_sock]).expect("client pool");
    let server_pool = ConnectionPool::new(vec![server_sock]).expect("server pool");

    client_pool.send(Packet::pull("/srv/data").unwrap());

    let received = server_pool.recv();
    assert_eq!(received.decode().unwrap(), Body::Path("/srv/data".into()));
}

#[test]
fn multiple_sockets_all_carry_traffic() {
    let mut client_sockets = Vec::new();
    let mut server_sockets = Vec::new();
    for _ in 0..4 {
        let (client_sock, server_sock) = connected_pair();
        client_sockets.push(client_sock);
        server_sockets.push(server_sock);
    }

    let client_pool = ConnectionPool::new(client_sockets).expect("client pool");
    let server_pool = ConnectionPool::new(server_sockets).expect("server pool");

    for i in 0..32u16 {
        client_pool.send(Packet::file_ready(i));
    }

    let mut seen = Vec::new();
    for _ in 0..32 {
        let packet = server_pool.recv();
        if let Body::FileReady(id) = packet.decode().unwrap() {
            seen.push(id);
        }
    }
    seen.sort_unstable();
    assert_eq!(seen, (0..32).collect::<Vec<_>>());
}

#[test]
fn pool_reports_dropped_socket_count_after_peer_closes() {
    let (client_sock, server_sock) = connected_pair();
    let client_pool = ConnectionPool::new(vec![client_sock]).expect("client pool");
    drop(server_sock);

    client_pool.send(Packet::done());
    thread::sleep(Duration::from_millis(100));
    // The peer closing the socket should eventually be observed by the
    // writer, dropping the pool to zero live sockets.
    assert!(client_pool.socket_count() <= 1);
}
