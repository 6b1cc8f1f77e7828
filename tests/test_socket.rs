use std::io::Write;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpListener, TcpStream};
use std::os::fd::OwnedFd;

use libc::{c_int, sockaddr, socklen_t};
use trevi::net::{
    AddressFamily, Inet4, ReadOutcome, Socket, SocketError, SocketOption, SocketType,
};

fn loopback(port: u16) -> Inet4 {
    Inet4::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port))
}

fn stream_socket() -> Socket<Inet4> {
    Socket::create(loopback(0), SocketType::Stream).unwrap()
}

/// IPv4 address that reports a family no kernel knows.
struct UnknownFamily(Inet4);

impl AddressFamily for UnknownFamily {
    fn family(&self) -> c_int {
        -1
    }

    fn socklen(&self) -> socklen_t {
        self.0.socklen()
    }

    fn as_ptr(&self) -> *const sockaddr {
        self.0.as_ptr()
    }

    fn to_socket_addr(&self) -> SocketAddr {
        self.0.to_socket_addr()
    }
}

/// Accepted server side of a loopback TCP connection, plus the client.
fn connected_pair() -> (Socket<Inet4>, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, peer) = listener.accept().unwrap();

    let SocketAddr::V4(peer) = peer else {
        panic!("expected an IPv4 peer");
    };
    let socket = Socket::from_owned_fd(OwnedFd::from(server), Inet4::from(peer)).unwrap();
    (socket, client)
}

#[test]
fn test_socket_creation() {
    let socket = stream_socket();

    assert!(socket.is_created());
    assert!(!socket.is_bound());
    assert!(!socket.is_nonblocking());
    assert!(socket.as_raw_fd().is_some());
}

#[test]
fn test_create_with_unknown_family_fails() {
    let result = Socket::create(UnknownFamily(loopback(0)), SocketType::Stream);
    assert!(matches!(result, Err(SocketError::Create(_))));
}

#[test]
fn test_datagram_socket_creation() {
    let socket = Socket::create(loopback(0), SocketType::Datagram).unwrap();
    assert!(socket.is_created());
}

#[test]
fn test_bind_twice_fails_and_stays_bound() {
    let mut socket = stream_socket();

    socket.bind().unwrap();
    assert!(socket.is_bound());

    let second = socket.bind();
    assert!(matches!(second, Err(SocketError::AlreadyBound)));
    assert!(socket.is_bound());
}

#[test]
fn test_bind_to_port_in_use_fails() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();

    let mut socket = Socket::create(loopback(port), SocketType::Stream).unwrap();
    let result = socket.bind();

    assert!(matches!(result, Err(SocketError::Bind(_))));
    assert!(!socket.is_bound());
}

#[test]
fn test_reuse_addr_round_trip() {
    let socket = stream_socket();

    socket
        .set_socket_option(&[SocketOption::ReuseAddr(true)])
        .unwrap();
    assert_ne!(socket.get_socket_option(SocketOption::ReuseAddr(false)).unwrap(), 0);

    socket
        .set_socket_option(&[SocketOption::ReuseAddr(false)])
        .unwrap();
    assert_eq!(socket.get_socket_option(SocketOption::ReuseAddr(true)).unwrap(), 0);
}

#[test]
fn test_set_several_options() {
    let socket = stream_socket();

    socket
        .set_socket_option(&[
            SocketOption::KeepAlive(true),
            SocketOption::OobInline(true),
            SocketOption::RecvBuffer(65536),
        ])
        .unwrap();

    assert_ne!(socket.get_socket_option(SocketOption::KeepAlive(false)).unwrap(), 0);
    assert_ne!(socket.get_socket_option(SocketOption::OobInline(false)).unwrap(), 0);
    assert!(socket.get_socket_option(SocketOption::RecvBuffer(0)).unwrap() > 0);
}

#[cfg(target_os = "linux")]
#[test]
fn test_option_failure_stops_without_rollback() {
    let socket = stream_socket();

    let result = socket.set_socket_option(&[
        SocketOption::ReuseAddr(true),
        SocketOption::NoSigPipe(true),
        SocketOption::KeepAlive(true),
    ]);

    assert!(matches!(
        result,
        Err(SocketError::Unsupported(SocketOption::NoSigPipe(true)))
    ));
    assert_ne!(socket.get_socket_option(SocketOption::ReuseAddr(false)).unwrap(), 0);
    assert_eq!(socket.get_socket_option(SocketOption::KeepAlive(false)).unwrap(), 0);
}

#[test]
fn test_options_on_non_socket_descriptor_fail() {
    let file = tempfile::tempfile().unwrap();
    let socket = Socket::from_owned_fd(OwnedFd::from(file), loopback(0)).unwrap();

    let result = socket.set_socket_option(&[
        SocketOption::ReuseAddr(true),
        SocketOption::KeepAlive(true),
    ]);
    assert!(matches!(
        result,
        Err(SocketError::SetOption {
            option: SocketOption::ReuseAddr(true),
            ..
        })
    ));

    let result = socket.get_socket_option(SocketOption::KeepAlive(false));
    assert!(matches!(
        result,
        Err(SocketError::GetOption {
            option: SocketOption::KeepAlive(false),
            ..
        })
    ));
}

#[test]
fn test_close_is_idempotent() {
    let mut socket = stream_socket();

    assert!(socket.close().is_ok());
    assert!(socket.close().is_ok());
    assert!(!socket.is_created());
}

#[test]
fn test_operations_after_close_report_not_created() {
    let mut socket = stream_socket();
    socket.close().unwrap();

    assert!(matches!(socket.bind(), Err(SocketError::NotCreated)));
    assert!(matches!(
        socket.get_socket_option(SocketOption::ReuseAddr(true)),
        Err(SocketError::NotCreated)
    ));
    assert!(matches!(
        socket.set_nonblocking(true),
        Err(SocketError::NotCreated)
    ));
    assert!(matches!(socket.read(&mut [0; 8]), Err(SocketError::NotCreated)));
}

#[test]
fn test_nonblocking_switches_strategy() {
    let mut socket = stream_socket();
    assert_eq!(socket.strategy().name(), "blocking");

    socket.set_nonblocking(true).unwrap();
    assert!(socket.is_nonblocking());
    assert_eq!(socket.strategy().name(), "nonblocking");

    socket.set_nonblocking(false).unwrap();
    assert!(!socket.is_nonblocking());
    assert_eq!(socket.strategy().name(), "blocking");
}

#[test]
fn test_nonblocking_read_without_data_would_block() {
    let (mut socket, _client) = connected_pair();
    socket.set_nonblocking(true).unwrap();

    let mut buf = [0u8; 64];
    assert_eq!(socket.read(&mut buf).unwrap(), ReadOutcome::WouldBlock);
}

#[test]
fn test_blocking_read_returns_data_then_closed() {
    let (socket, mut client) = connected_pair();
    assert!(!socket.is_nonblocking());

    client.write_all(b"ping").unwrap();
    drop(client);

    let mut buf = [0u8; 64];
    let mut received = Vec::new();
    loop {
        match socket.read(&mut buf).unwrap() {
            ReadOutcome::Data(n) => received.extend_from_slice(&buf[..n]),
            ReadOutcome::Closed => break,
            ReadOutcome::WouldBlock => panic!("blocking read reported WouldBlock"),
        }
    }
    assert_eq!(received, b"ping");
}

#[test]
fn test_adopted_socket_reports_mode() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let _client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();
    server.set_nonblocking(true).unwrap();

    let socket = Socket::from_owned_fd(OwnedFd::from(server), loopback(0)).unwrap();

    assert!(socket.is_nonblocking());
    assert!(socket.is_bound());
}
