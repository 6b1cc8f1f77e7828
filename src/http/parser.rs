use std::ops::ControlFlow;

use bytes::BytesMut;
use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::http::handler::ParserHandler;
use crate::http::header::HeaderInfo;
use crate::http::scanner::scan_lines;

const DEFAULT_MAX_HEADER_BYTES: usize = 8192;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("header line contains non-ASCII bytes")]
    NonAscii,
    #[error("malformed request line: {0:?}")]
    MalformedRequestLine(String),
    #[error("invalid Content-Length value: {0:?}")]
    InvalidContentLength(String),
    #[error("header section exceeds {0} bytes")]
    HeaderTooLarge(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Upper bound on header bytes buffered for one request.
    pub max_header_bytes: usize,
    /// Reject request lines that are not `METHOD SP URL SP VERSION`
    /// instead of leaving the fields unset.
    pub strict_request_line: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            strict_request_line: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Idle,
    ParsingHeaders,
    ParsingBody,
}

enum Phase {
    Idle,
    Headers {
        info: HeaderInfo,
        lines: usize,
        /// Header bytes already split into lines.
        size: usize,
        /// Unterminated tail of the previous buffer.
        residue: BytesMut,
    },
    Body {
        info: HeaderInfo,
        expected: usize,
        received: usize,
    },
}

/// Incremental HTTP/1.x request parser.
///
/// One parser serves one connection for its whole lifetime and handles
/// requests one after another: after body-complete it returns to
/// [`ParserState::Idle`] and the next `execute` call starts a new request.
///
/// ```text
///   Idle ──bytes──▶ ParsingHeaders ──blank line──▶ ParsingBody
///    ▲                    │                            │
///    │         no body / body already in buffer        │
///    └────────────────────┴──────── body complete ─────┘
/// ```
///
/// A header block may be split across any number of `execute` calls; the
/// unterminated tail of each buffer is kept until the next call, bounded by
/// [`ParserConfig::max_header_bytes`].
pub struct HttpParser<H> {
    handler: H,
    config: ParserConfig,
    phase: Phase,
}

impl<H: ParserHandler> HttpParser<H> {
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, ParserConfig::default())
    }

    pub fn with_config(handler: H, config: ParserConfig) -> Self {
        Self {
            handler,
            config,
            phase: Phase::Idle,
        }
    }

    /// Feeds one buffer of connection bytes to the parser.
    ///
    /// Events fire synchronously on the handler while this call runs. On
    /// error the in-flight request is dropped and the parser is back to
    /// `Idle`; the caller is expected to abort the connection.
    pub fn execute(&mut self, buf: &[u8]) -> Result<(), ParseError> {
        let result = self.advance(buf);
        if result.is_err() {
            self.reset();
        }
        result
    }

    /// Drops any in-flight request without firing further events.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
    }

    pub fn state(&self) -> ParserState {
        match self.phase {
            Phase::Idle => ParserState::Idle,
            Phase::Headers { .. } => ParserState::ParsingHeaders,
            Phase::Body { .. } => ParserState::ParsingBody,
        }
    }

    /// Header info of the request in flight, if any.
    pub fn header_info(&self) -> Option<&HeaderInfo> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Headers { info, .. } | Phase::Body { info, .. } => Some(info),
        }
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }

    fn advance(&mut self, buf: &[u8]) -> Result<(), ParseError> {
        if let Phase::Idle = self.phase {
            if buf.is_empty() {
                return Ok(());
            }
            debug!("request begin");
            self.phase = Phase::Headers {
                info: HeaderInfo::new(),
                lines: 0,
                size: 0,
                residue: BytesMut::new(),
            };
            self.handler.on_header();
        }

        match self.phase {
            Phase::Body { .. } => {
                self.parse_body(buf);
                Ok(())
            }
            _ => self.parse_headers(buf),
        }
    }

    fn parse_headers(&mut self, buf: &[u8]) -> Result<(), ParseError> {
        let Phase::Headers {
            mut info,
            mut lines,
            mut size,
            mut residue,
        } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return Ok(());
        };

        let data: &[u8] = if residue.is_empty() {
            buf
        } else {
            residue.extend_from_slice(buf);
            &residue[..]
        };

        let strict = self.config.strict_request_line;
        let mut header_end = None;
        let mut failure = None;

        let summary = scan_lines(data, |line| {
            if line.is_empty() {
                header_end = Some(line.consumed);
                return ControlFlow::Break(());
            }

            let text = match line.as_ascii() {
                Ok(text) => text,
                Err(e) => {
                    failure = Some(e);
                    return ControlFlow::Break(());
                }
            };

            if lines == 0 {
                if !info.apply_request_line(text) {
                    if strict {
                        failure = Some(ParseError::MalformedRequestLine(text.to_string()));
                        return ControlFlow::Break(());
                    }
                    debug!(line = text, "request line left unparsed");
                }
            } else {
                info.apply_header_line(text);
            }

            lines += 1;
            ControlFlow::Continue(())
        });

        if let Some(e) = failure {
            return Err(e);
        }

        size += summary.consumed;

        let Some(end) = header_end else {
            let tail = &data[summary.consumed..];
            if size + tail.len() > self.config.max_header_bytes {
                return Err(ParseError::HeaderTooLarge(self.config.max_header_bytes));
            }

            trace!(pending = tail.len(), "header block incomplete");
            self.phase = Phase::Headers {
                info,
                lines,
                size,
                residue: BytesMut::from(tail),
            };
            return Ok(());
        };

        if size > self.config.max_header_bytes {
            return Err(ParseError::HeaderTooLarge(self.config.max_header_bytes));
        }

        self.finish_headers(info, &data[end..])
    }

    fn finish_headers(&mut self, mut info: HeaderInfo, body: &[u8]) -> Result<(), ParseError> {
        let expected = info.content_length()?;

        debug!(
            method = info.method.as_deref().unwrap_or("-"),
            url = info.url.as_deref().unwrap_or("-"),
            content_length = expected,
            "headers complete"
        );
        self.handler.on_header_complete(&info);

        if expected == 0 {
            if !body.is_empty() {
                warn!(discarded = body.len(), "bytes after a request without body");
            }
            self.complete();
            return Ok(());
        }

        let mut received = 0;
        if !body.is_empty() {
            info.has_body = true;
            received = body.len();
            trace!(chunk = received, expected, "body chunk");
            self.handler.on_body(body);
        }

        if received >= expected {
            self.complete();
        } else {
            self.phase = Phase::Body {
                info,
                expected,
                received,
            };
        }
        Ok(())
    }

    fn parse_body(&mut self, buf: &[u8]) {
        let Phase::Body {
            info,
            expected,
            received,
        } = &mut self.phase
        else {
            return;
        };

        if buf.is_empty() {
            return;
        }

        info.has_body = true;
        *received += buf.len();
        trace!(chunk = buf.len(), received = *received, expected = *expected, "body chunk");

        let done = *received >= *expected;
        self.handler.on_body(buf);

        if done {
            self.complete();
        }
    }

    fn complete(&mut self) {
        debug!("body complete");
        self.handler.on_body_complete();
        self.reset();
    }
}
