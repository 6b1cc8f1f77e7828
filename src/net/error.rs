use std::io;

use thiserror::Error;

use crate::net::option::SocketOption;

/// Failures of socket operations. None of them are retried internally.
#[derive(Debug, Error)]
pub enum SocketError {
    #[error("failed to create socket: {0}")]
    Create(#[source] io::Error),
    #[error("failed to bind socket: {0}")]
    Bind(#[source] io::Error),
    #[error("failed to close socket: {0}")]
    Close(#[source] io::Error),
    #[error("socket is not open")]
    NotCreated,
    #[error("socket is already bound")]
    AlreadyBound,
    #[error("failed to set socket option {option:?}: {source}")]
    SetOption { option: SocketOption, source: io::Error },
    #[error("failed to get socket option {option:?}: {source}")]
    GetOption { option: SocketOption, source: io::Error },
    #[error("socket option {0:?} is not supported on this platform")]
    Unsupported(SocketOption),
    #[error("failed to update descriptor flags: {0}")]
    Flags(#[source] io::Error),
    #[error("read failed: {0}")]
    Read(#[source] io::Error),
}
