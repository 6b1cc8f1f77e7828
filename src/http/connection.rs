use thiserror::Error;
use tracing::{error, trace, warn};

use crate::http::handler::ParserHandler;
use crate::http::parser::{HttpParser, ParseError, ParserState};
use crate::net::{AddressFamily, ReadOutcome, Socket, SocketError};

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error(transparent)]
    Socket(#[from] SocketError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("peer closed the connection mid-request ({state:?})")]
    Truncated { state: ParserState },
}

/// What one read-and-parse step achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// This many bytes were read and handed to the parser.
    Parsed(usize),
    /// The socket is nonblocking and has nothing to read yet.
    WouldBlock,
    /// The peer closed the connection between requests; the socket has
    /// been closed too.
    Closed,
}

/// One socket paired with its parser.
///
/// Each step reads through the socket's current read strategy and feeds
/// the bytes to the parser. Accepting connections and waiting for readiness
/// belong to the caller. Any error closes the socket before it is returned,
/// so a broken connection never leaks its descriptor.
pub struct Connection<A, H> {
    socket: Socket<A>,
    parser: HttpParser<H>,
    buffer: Vec<u8>,
}

impl<A: AddressFamily, H: ParserHandler> Connection<A, H> {
    pub fn new(socket: Socket<A>, parser: HttpParser<H>, buffer_size: usize) -> Self {
        Self {
            socket,
            parser,
            buffer: vec![0; buffer_size.max(1)],
        }
    }

    pub fn read_once(&mut self) -> Result<Progress, ConnectionError> {
        let outcome = match self.socket.read(&mut self.buffer) {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.abort(e.into())),
        };

        match outcome {
            ReadOutcome::Data(n) => {
                trace!(bytes = n, "read");
                if let Err(e) = self.parser.execute(&self.buffer[..n]) {
                    return Err(self.abort(e.into()));
                }
                Ok(Progress::Parsed(n))
            }
            ReadOutcome::WouldBlock => Ok(Progress::WouldBlock),
            ReadOutcome::Closed => {
                let state = self.parser.state();
                if state != ParserState::Idle {
                    return Err(self.abort(ConnectionError::Truncated { state }));
                }
                self.socket.close()?;
                Ok(Progress::Closed)
            }
        }
    }

    /// Reads and parses until the peer closes the connection.
    ///
    /// Meant for blocking sockets driven by a dedicated thread. On a
    /// nonblocking socket the loop stops at the first
    /// [`Progress::WouldBlock`] and hands control back to the caller.
    pub fn run_blocking(&mut self) -> Result<Progress, ConnectionError> {
        loop {
            match self.read_once()? {
                Progress::Parsed(_) => continue,
                other => return Ok(other),
            }
        }
    }

    pub fn socket(&self) -> &Socket<A> {
        &self.socket
    }

    pub fn socket_mut(&mut self) -> &mut Socket<A> {
        &mut self.socket
    }

    pub fn parser(&self) -> &HttpParser<H> {
        &self.parser
    }

    pub fn into_parts(self) -> (Socket<A>, HttpParser<H>) {
        (self.socket, self.parser)
    }

    fn abort(&mut self, err: ConnectionError) -> ConnectionError {
        error!(error = %err, "aborting connection");
        self.parser.reset();
        if let Err(e) = self.socket.close() {
            warn!(error = %e, "close after abort failed");
        }
        err
    }
}
