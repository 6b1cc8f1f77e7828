use std::io::Write;
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener, TcpStream};
use std::os::fd::OwnedFd;

use trevi::http::{
    Connection, ConnectionError, HeaderInfo, HttpParser, ParseError, ParserHandler, ParserState,
    Progress,
};
use trevi::net::{Inet4, Socket};

#[derive(Default)]
struct Collect {
    urls: Vec<Option<String>>,
    body: Vec<u8>,
    completed: usize,
}

impl ParserHandler for Collect {
    fn on_header(&mut self) {}

    fn on_header_complete(&mut self, info: &HeaderInfo) {
        self.urls.push(info.url.clone());
    }

    fn on_body(&mut self, chunk: &[u8]) {
        self.body.extend_from_slice(chunk);
    }

    fn on_body_complete(&mut self) {
        self.completed += 1;
    }
}

fn connection(buffer_size: usize) -> (Connection<Inet4, Collect>, TcpStream) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
    let (server, _) = listener.accept().unwrap();

    let address = Inet4::from(SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0));
    let socket = Socket::from_owned_fd(OwnedFd::from(server), address).unwrap();
    let parser = HttpParser::new(Collect::default());
    (Connection::new(socket, parser, buffer_size), client)
}

#[test]
fn test_request_over_socket() {
    let (mut conn, mut client) = connection(8);

    client
        .write_all(b"POST /submit HTTP/1.1\r\nHost: localhost\r\nContent-Length: 11\r\n\r\nhello world")
        .unwrap();
    drop(client);

    let progress = conn.run_blocking().unwrap();
    assert_eq!(progress, Progress::Closed);
    assert!(!conn.socket().is_created());

    let handler = conn.parser().handler();
    assert_eq!(handler.urls, vec![Some("/submit".to_string())]);
    assert_eq!(handler.body, b"hello world");
    assert_eq!(handler.completed, 1);
}

#[test]
fn test_invalid_content_length_aborts_connection() {
    let (mut conn, mut client) = connection(4096);

    client
        .write_all(b"POST / HTTP/1.1\r\nContent-Length: lots\r\n\r\n")
        .unwrap();
    drop(client);

    let result = conn.run_blocking();
    assert!(matches!(
        result,
        Err(ConnectionError::Parse(ParseError::InvalidContentLength(_)))
    ));
    assert!(!conn.socket().is_created());
    assert_eq!(conn.parser().handler().completed, 0);
}

#[test]
fn test_peer_close_mid_body_is_truncated() {
    let (mut conn, mut client) = connection(4096);

    client
        .write_all(b"POST / HTTP/1.1\r\nContent-Length: 100\r\n\r\nabc")
        .unwrap();
    drop(client);

    let result = conn.run_blocking();
    assert!(matches!(
        result,
        Err(ConnectionError::Truncated {
            state: ParserState::ParsingBody
        })
    ));
    assert!(!conn.socket().is_created());
    assert_eq!(conn.parser().state(), ParserState::Idle);

    let handler = conn.parser().handler();
    assert_eq!(handler.body, b"abc");
    assert_eq!(handler.completed, 0);
}

#[test]
fn test_peer_close_mid_headers_is_truncated() {
    let (mut conn, mut client) = connection(4096);

    client.write_all(b"GET / HTTP/1.1\r\nHost: loc").unwrap();
    drop(client);

    let result = conn.run_blocking();
    assert!(matches!(
        result,
        Err(ConnectionError::Truncated {
            state: ParserState::ParsingHeaders
        })
    ));
    assert!(!conn.socket().is_created());
    assert!(conn.parser().handler().urls.is_empty());
}

#[test]
fn test_nonblocking_connection_without_data() {
    let (mut conn, _client) = connection(4096);
    conn.socket_mut().set_nonblocking(true).unwrap();

    assert_eq!(conn.read_once().unwrap(), Progress::WouldBlock);
    assert!(conn.socket().is_created());
}
