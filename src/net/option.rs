use libc::c_int;

use crate::net::sys;

/// Socket-level (`SOL_SOCKET`) options.
///
/// Boolean options are written as `1`/`0`; reading one back yields the
/// integer the OS reports, where any nonzero value means enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOption {
    Broadcast(bool),
    Debug(bool),
    DontRoute(bool),
    OobInline(bool),
    ReuseAddr(bool),
    KeepAlive(bool),
    /// Only available on BSD-family targets.
    NoSigPipe(bool),
    SendBuffer(i32),
    RecvBuffer(i32),
}

impl SocketOption {
    /// The `SO_*` key, or `None` when the platform has no such option.
    pub fn name(&self) -> Option<c_int> {
        match self {
            SocketOption::Broadcast(_) => Some(libc::SO_BROADCAST),
            SocketOption::Debug(_) => Some(libc::SO_DEBUG),
            SocketOption::DontRoute(_) => Some(libc::SO_DONTROUTE),
            SocketOption::OobInline(_) => Some(libc::SO_OOBINLINE),
            SocketOption::ReuseAddr(_) => Some(libc::SO_REUSEADDR),
            SocketOption::KeepAlive(_) => Some(libc::SO_KEEPALIVE),
            SocketOption::NoSigPipe(_) => sys::SO_NOSIGPIPE,
            SocketOption::SendBuffer(_) => Some(libc::SO_SNDBUF),
            SocketOption::RecvBuffer(_) => Some(libc::SO_RCVBUF),
        }
    }

    /// Value written by `setsockopt`.
    pub fn value(&self) -> c_int {
        match *self {
            SocketOption::Broadcast(on)
            | SocketOption::Debug(on)
            | SocketOption::DontRoute(on)
            | SocketOption::OobInline(on)
            | SocketOption::ReuseAddr(on)
            | SocketOption::KeepAlive(on)
            | SocketOption::NoSigPipe(on) => c_int::from(on),
            SocketOption::SendBuffer(size) | SocketOption::RecvBuffer(size) => size,
        }
    }
}
