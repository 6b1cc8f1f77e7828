use std::fmt;
use std::mem;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};

use libc::{c_int, sockaddr, sockaddr_in, sockaddr_in6, socklen_t};

/// A socket address the OS can bind to.
///
/// Implementors expose the address family identifier, the length of the
/// native `sockaddr` structure and a pointer to it. The pointer must stay
/// valid for as long as `&self` is borrowed.
pub trait AddressFamily {
    /// `AF_*` identifier passed to `socket(2)`.
    fn family(&self) -> c_int;

    /// Size of the native structure behind [`as_ptr`](Self::as_ptr).
    fn socklen(&self) -> socklen_t;

    fn as_ptr(&self) -> *const sockaddr;

    /// Raw bytes of the native structure.
    fn as_bytes(&self) -> &[u8] {
        unsafe { std::slice::from_raw_parts(self.as_ptr() as *const u8, self.socklen() as usize) }
    }

    fn to_socket_addr(&self) -> SocketAddr;
}

/// IPv4 address in `sockaddr_in` form.
#[derive(Clone, Copy)]
pub struct Inet4 {
    raw: sockaddr_in,
}

impl From<SocketAddrV4> for Inet4 {
    fn from(addr: SocketAddrV4) -> Self {
        let mut raw: sockaddr_in = unsafe { mem::zeroed() };
        raw.sin_family = libc::AF_INET as libc::sa_family_t;
        raw.sin_port = addr.port().to_be();
        raw.sin_addr.s_addr = u32::from_ne_bytes(addr.ip().octets());
        #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
        {
            raw.sin_len = mem::size_of::<sockaddr_in>() as u8;
        }
        Self { raw }
    }
}

impl AddressFamily for Inet4 {
    fn family(&self) -> c_int {
        libc::AF_INET
    }

    fn socklen(&self) -> socklen_t {
        mem::size_of::<sockaddr_in>() as socklen_t
    }

    fn as_ptr(&self) -> *const sockaddr {
        &self.raw as *const sockaddr_in as *const sockaddr
    }

    fn to_socket_addr(&self) -> SocketAddr {
        let ip = Ipv4Addr::from(self.raw.sin_addr.s_addr.to_ne_bytes());
        SocketAddr::V4(SocketAddrV4::new(ip, u16::from_be(self.raw.sin_port)))
    }
}

impl fmt::Debug for Inet4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Inet4({})", self.to_socket_addr())
    }
}

/// IPv6 address in `sockaddr_in6` form.
#[derive(Clone, Copy)]
pub struct Inet6 {
    raw: sockaddr_in6,
}

impl From<SocketAddrV6> for Inet6 {
    fn from(addr: SocketAddrV6) -> Self {
        let mut raw: sockaddr_in6 = unsafe { mem::zeroed() };
        raw.sin6_family = libc::AF_INET6 as libc::sa_family_t;
        raw.sin6_port = addr.port().to_be();
        raw.sin6_flowinfo = addr.flowinfo();
        raw.sin6_addr.s6_addr = addr.ip().octets();
        raw.sin6_scope_id = addr.scope_id();
        #[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
        {
            raw.sin6_len = mem::size_of::<sockaddr_in6>() as u8;
        }
        Self { raw }
    }
}

impl AddressFamily for Inet6 {
    fn family(&self) -> c_int {
        libc::AF_INET6
    }

    fn socklen(&self) -> socklen_t {
        mem::size_of::<sockaddr_in6>() as socklen_t
    }

    fn as_ptr(&self) -> *const sockaddr {
        &self.raw as *const sockaddr_in6 as *const sockaddr
    }

    fn to_socket_addr(&self) -> SocketAddr {
        SocketAddr::V6(SocketAddrV6::new(
            Ipv6Addr::from(self.raw.sin6_addr.s6_addr),
            u16::from_be(self.raw.sin6_port),
            self.raw.sin6_flowinfo,
            self.raw.sin6_scope_id,
        ))
    }
}

impl fmt::Debug for Inet6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Inet6({})", self.to_socket_addr())
    }
}

/// Either IP family, for addresses only known at runtime (e.g. from config).
#[derive(Debug, Clone, Copy)]
pub enum InetAddr {
    V4(Inet4),
    V6(Inet6),
}

impl From<SocketAddr> for InetAddr {
    fn from(addr: SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(v4) => InetAddr::V4(v4.into()),
            SocketAddr::V6(v6) => InetAddr::V6(v6.into()),
        }
    }
}

impl AddressFamily for InetAddr {
    fn family(&self) -> c_int {
        match self {
            InetAddr::V4(a) => a.family(),
            InetAddr::V6(a) => a.family(),
        }
    }

    fn socklen(&self) -> socklen_t {
        match self {
            InetAddr::V4(a) => a.socklen(),
            InetAddr::V6(a) => a.socklen(),
        }
    }

    fn as_ptr(&self) -> *const sockaddr {
        match self {
            InetAddr::V4(a) => a.as_ptr(),
            InetAddr::V6(a) => a.as_ptr(),
        }
    }

    fn to_socket_addr(&self) -> SocketAddr {
        match self {
            InetAddr::V4(a) => a.to_socket_addr(),
            InetAddr::V6(a) => a.to_socket_addr(),
        }
    }
}
