//! HTTP/1.x request parsing.
//!
//! The parser is incremental: bytes arrive in buffers of any size and the
//! parser turns them into events on a [`ParserHandler`].
//!
//! - **`scanner`**: splits buffers into CRLF-terminated lines
//! - **`names`**: well-known header names
//! - **`header`**: `HeaderInfo`, the parsed header section of one request
//! - **`handler`**: the event trait and a closure-based implementation
//! - **`parser`**: the per-connection state machine
//! - **`connection`**: drives a `Socket` into a parser
//!
//! # Events
//!
//! For every request, in order:
//!
//! ```text
//!   on_header            request started
//!   on_header_complete   blank line reached, HeaderInfo finished
//!   on_body              zero or more times, raw body bytes
//!   on_body_complete     Content-Length reached (immediately if 0)
//! ```
//!
//! # Example
//!
//! ```
//! use trevi::http::{Callbacks, HttpParser};
//!
//! let callbacks = Callbacks::builder()
//!     .on_header(|| {})
//!     .on_header_complete(|info| assert_eq!(info.method.as_deref(), Some("GET")))
//!     .on_body(|_| {})
//!     .on_body_complete(|| {})
//!     .build()
//!     .unwrap();
//!
//! let mut parser = HttpParser::new(callbacks);
//! parser.execute(b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
//! ```

pub mod connection;
pub mod handler;
pub mod header;
pub mod names;
pub mod parser;
pub mod scanner;

pub use connection::{Connection, ConnectionError, Progress};
pub use handler::{Callbacks, CallbacksBuilder, MissingCallback, ParserHandler};
pub use header::HeaderInfo;
pub use parser::{HttpParser, ParseError, ParserConfig, ParserState};
