//! Trevi - HTTP/1.x parsing core
//!
//! Incremental request parser and the socket layer that feeds it.

pub mod config;
pub mod http;
pub mod net;
