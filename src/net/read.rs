use std::io;
use std::os::fd::RawFd;

use crate::net::error::SocketError;
use crate::net::sys;

/// Result of one read attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// `n` bytes were written to the front of the buffer.
    Data(usize),
    /// The peer closed its side.
    Closed,
    /// Nothing to read right now; retry after the next readiness notification.
    WouldBlock,
}

/// How bytes are pulled from a descriptor.
///
/// [`Socket`](crate::net::Socket) picks the implementation matching its
/// current mode on every read.
pub trait ReadStrategy: Send + Sync {
    fn read(&self, fd: RawFd, buf: &mut [u8]) -> Result<ReadOutcome, SocketError>;

    fn name(&self) -> &'static str;
}

/// Suspends the calling thread until data, EOF or an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blocking;

/// Returns immediately, reporting [`ReadOutcome::WouldBlock`] when idle.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonBlocking;

impl ReadStrategy for Blocking {
    fn read(&self, fd: RawFd, buf: &mut [u8]) -> Result<ReadOutcome, SocketError> {
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        loop {
            match sys::read(fd, buf) {
                Ok(0) => return Ok(ReadOutcome::Closed),
                Ok(n) => return Ok(ReadOutcome::Data(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(SocketError::Read(e)),
            }
        }
    }

    fn name(&self) -> &'static str {
        "blocking"
    }
}

impl ReadStrategy for NonBlocking {
    fn read(&self, fd: RawFd, buf: &mut [u8]) -> Result<ReadOutcome, SocketError> {
        if buf.is_empty() {
            return Ok(ReadOutcome::Data(0));
        }

        loop {
            match sys::read(fd, buf) {
                Ok(0) => return Ok(ReadOutcome::Closed),
                Ok(n) => return Ok(ReadOutcome::Data(n)),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(ReadOutcome::WouldBlock);
                }
                Err(e) => return Err(SocketError::Read(e)),
            }
        }
    }

    fn name(&self) -> &'static str {
        "nonblocking"
    }
}
