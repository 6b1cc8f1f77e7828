//! Thin wrappers over the POSIX socket calls.
//!
//! Every platform difference of the socket layer lives in this file; the
//! rest of `net` only sees `io::Result`s.

use std::io;
use std::os::fd::{FromRawFd, OwnedFd, RawFd};

use libc::{c_int, c_void, socklen_t};

use crate::net::addr::AddressFamily;

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
pub const SO_NOSIGPIPE: Option<c_int> = Some(libc::SO_NOSIGPIPE);

// Linux has no socket-level switch; callers pass MSG_NOSIGNAL per send instead.
#[cfg(not(any(target_os = "macos", target_os = "ios", target_os = "freebsd")))]
pub const SO_NOSIGPIPE: Option<c_int> = None;

fn cvt(ret: c_int) -> io::Result<c_int> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(ret)
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
pub fn socket(domain: c_int, ty: c_int) -> io::Result<OwnedFd> {
    let fd = cvt(unsafe { libc::socket(domain, ty | libc::SOCK_CLOEXEC, 0) })?;
    Ok(unsafe { OwnedFd::from_raw_fd(fd) })
}

#[cfg(not(any(target_os = "linux", target_os = "android")))]
pub fn socket(domain: c_int, ty: c_int) -> io::Result<OwnedFd> {
    let fd = cvt(unsafe { libc::socket(domain, ty, 0) })?;
    // Owned from here on so the descriptor is closed if fcntl fails.
    let owned = unsafe { OwnedFd::from_raw_fd(fd) };
    cvt(unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) })?;
    Ok(owned)
}

pub fn bind<A: AddressFamily>(fd: RawFd, address: &A) -> io::Result<()> {
    cvt(unsafe { libc::bind(fd, address.as_ptr(), address.socklen()) })?;
    Ok(())
}

pub fn close(fd: RawFd) -> io::Result<()> {
    cvt(unsafe { libc::close(fd) })?;
    Ok(())
}

pub fn setsockopt_int(fd: RawFd, name: c_int, value: c_int) -> io::Result<()> {
    let len = std::mem::size_of::<c_int>() as socklen_t;
    cvt(unsafe {
        libc::setsockopt(
            fd,
            libc::SOL_SOCKET,
            name,
            &value as *const c_int as *const c_void,
            len,
        )
    })?;
    Ok(())
}

pub fn getsockopt_int(fd: RawFd, name: c_int) -> io::Result<c_int> {
    let mut value: c_int = 0;
    let mut len = std::mem::size_of::<c_int>() as socklen_t;
    cvt(unsafe {
        libc::getsockopt(
            fd,
            libc::SOL_SOCKET,
            name,
            &mut value as *mut c_int as *mut c_void,
            &mut len,
        )
    })?;
    Ok(value)
}

pub fn get_flags(fd: RawFd) -> io::Result<c_int> {
    cvt(unsafe { libc::fcntl(fd, libc::F_GETFL) })
}

pub fn set_flags(fd: RawFd, flags: c_int) -> io::Result<()> {
    cvt(unsafe { libc::fcntl(fd, libc::F_SETFL, flags) })?;
    Ok(())
}

pub fn read(fd: RawFd, buf: &mut [u8]) -> io::Result<usize> {
    let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut c_void, buf.len()) };
    if n < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(n as usize)
    }
}
