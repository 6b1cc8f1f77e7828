use std::os::fd::{AsRawFd, IntoRawFd, OwnedFd, RawFd};

use libc::c_int;
use tracing::{debug, trace, warn};

use crate::net::addr::AddressFamily;
use crate::net::error::SocketError;
use crate::net::option::SocketOption;
use crate::net::read::{Blocking, NonBlocking, ReadOutcome, ReadStrategy};
use crate::net::sys;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketType {
    Stream,
    Datagram,
}

impl SocketType {
    fn as_raw(self) -> c_int {
        match self {
            SocketType::Stream => libc::SOCK_STREAM,
            SocketType::Datagram => libc::SOCK_DGRAM,
        }
    }
}

/// An OS socket descriptor together with the address it serves.
///
/// The descriptor is exclusively owned: it is closed by [`Socket::close`]
/// or, failing that, when the socket is dropped. Once closed, every
/// operation reports [`SocketError::NotCreated`] instead of touching the
/// old descriptor number.
///
/// The nonblocking flag is cached and only updated after `fcntl` succeeded,
/// so [`Socket::read`] always goes through the strategy matching the
/// descriptor's real mode.
#[derive(Debug)]
pub struct Socket<A> {
    fd: Option<OwnedFd>,
    address: A,
    bound: bool,
    nonblocking: bool,
}

impl<A: AddressFamily> Socket<A> {
    /// Allocates a new descriptor in `address`'s family. The socket starts
    /// in blocking mode.
    pub fn create(address: A, ty: SocketType) -> Result<Self, SocketError> {
        let fd = sys::socket(address.family(), ty.as_raw()).map_err(|e| {
            warn!(error = %e, "socket creation failed");
            SocketError::Create(e)
        })?;

        debug!(fd = fd.as_raw_fd(), addr = %address.to_socket_addr(), "socket created");
        Ok(Self {
            fd: Some(fd),
            address,
            bound: false,
            nonblocking: false,
        })
    }

    /// Adopts an already open descriptor, e.g. one returned by `accept`.
    ///
    /// The current mode is read from the descriptor. The socket is treated
    /// as bound, since accepted and connected sockets already have a local
    /// address.
    pub fn from_owned_fd(fd: OwnedFd, address: A) -> Result<Self, SocketError> {
        let flags = sys::get_flags(fd.as_raw_fd()).map_err(SocketError::Flags)?;
        Ok(Self {
            fd: Some(fd),
            address,
            bound: true,
            nonblocking: flags & libc::O_NONBLOCK != 0,
        })
    }

    pub fn is_created(&self) -> bool {
        self.fd.is_some()
    }

    pub fn is_bound(&self) -> bool {
        self.bound
    }

    pub fn address(&self) -> &A {
        &self.address
    }

    /// The open descriptor, if any.
    pub fn as_raw_fd(&self) -> Option<RawFd> {
        self.fd.as_ref().map(AsRawFd::as_raw_fd)
    }

    fn raw_fd(&self) -> Result<RawFd, SocketError> {
        self.as_raw_fd().ok_or(SocketError::NotCreated)
    }

    /// Binds to the socket's address. Succeeds at most once per socket.
    pub fn bind(&mut self) -> Result<(), SocketError> {
        let fd = self.raw_fd()?;
        if self.bound {
            warn!(fd, "socket already bound");
            return Err(SocketError::AlreadyBound);
        }

        sys::bind(fd, &self.address).map_err(|e| {
            warn!(fd, error = %e, "bind failed");
            SocketError::Bind(e)
        })?;

        self.bound = true;
        debug!(fd, addr = %self.address.to_socket_addr(), "socket bound");
        Ok(())
    }

    /// Releases the descriptor. Closing an already closed socket is a no-op.
    pub fn close(&mut self) -> Result<(), SocketError> {
        let Some(fd) = self.fd.take() else {
            return Ok(());
        };

        let raw = fd.into_raw_fd();
        debug!(fd = raw, "socket closed");
        sys::close(raw).map_err(SocketError::Close)
    }

    /// Applies `options` in order, stopping at the first failure.
    ///
    /// Options set before the failing one stay applied.
    pub fn set_socket_option(&self, options: &[SocketOption]) -> Result<(), SocketError> {
        let fd = self.raw_fd()?;

        for option in options {
            let name = option.name().ok_or(SocketError::Unsupported(*option))?;
            sys::setsockopt_int(fd, name, option.value()).map_err(|source| {
                warn!(fd, ?option, error = %source, "failed to set socket option");
                SocketError::SetOption {
                    option: *option,
                    source,
                }
            })?;
            trace!(fd, ?option, "socket option set");
        }
        Ok(())
    }

    /// Reads the current value of `option`'s key. The value carried by
    /// `option` is ignored.
    pub fn get_socket_option(&self, option: SocketOption) -> Result<i32, SocketError> {
        let fd = self.raw_fd()?;
        let name = option.name().ok_or(SocketError::Unsupported(option))?;

        sys::getsockopt_int(fd, name).map_err(|source| {
            warn!(fd, ?option, error = %source, "failed to get socket option");
            SocketError::GetOption { option, source }
        })
    }

    pub fn is_nonblocking(&self) -> bool {
        self.nonblocking
    }

    /// Switches `O_NONBLOCK` on the descriptor, and with it the read strategy.
    pub fn set_nonblocking(&mut self, nonblocking: bool) -> Result<(), SocketError> {
        let fd = self.raw_fd()?;
        let flags = sys::get_flags(fd).map_err(SocketError::Flags)?;
        let updated = if nonblocking {
            flags | libc::O_NONBLOCK
        } else {
            flags & !libc::O_NONBLOCK
        };

        if updated != flags {
            sys::set_flags(fd, updated).map_err(|e| {
                warn!(fd, error = %e, "fcntl failed");
                SocketError::Flags(e)
            })?;
        }

        self.nonblocking = nonblocking;
        debug!(fd, strategy = self.strategy().name(), "read mode set");
        Ok(())
    }

    /// The read strategy for the socket's current mode.
    pub fn strategy(&self) -> &'static dyn ReadStrategy {
        if self.nonblocking {
            &NonBlocking
        } else {
            &Blocking
        }
    }

    /// Reads into `buf` through [`strategy`](Self::strategy).
    pub fn read(&self, buf: &mut [u8]) -> Result<ReadOutcome, SocketError> {
        let fd = self.raw_fd()?;
        self.strategy().read(fd, buf)
    }
}
