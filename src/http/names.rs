//! Header names and protocol literals the parser matches on.
//!
//! Keys are compared byte for byte, so these spellings are the ones a
//! request has to use.

pub const NEW_LINE: &str = "\r\n";

pub const CONNECTION: &str = "Connection";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const HOST: &str = "Host";
