//! CRLF line scanning over raw byte buffers.
//!
//! The scanner holds no state between calls: every call starts at the
//! beginning of the buffer it is given. Bytes after the last CRLF are never
//! returned as a line, they are reported as residue so the caller can decide
//! whether they are body data or an unfinished header line.

use std::ops::ControlFlow;

use memchr::memmem;

use crate::http::names::NEW_LINE;
use crate::http::parser::ParseError;

const CRLF: &[u8] = NEW_LINE.as_bytes();

/// One CRLF-terminated record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// Record bytes, terminator excluded.
    pub bytes: &'a [u8],
    /// Offset just past this record's CRLF, counted from the start of the buffer.
    pub consumed: usize,
}

impl<'a> Line<'a> {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// A zero-length record, i.e. the blank line ending a header block.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decodes the record as ASCII text.
    ///
    /// Header lines are restricted to single-byte ASCII; anything else is a
    /// hard error rather than a lossy conversion.
    pub fn as_ascii(&self) -> Result<&'a str, ParseError> {
        if !self.bytes.is_ascii() {
            return Err(ParseError::NonAscii);
        }
        std::str::from_utf8(self.bytes).map_err(|_| ParseError::NonAscii)
    }
}

/// Lazy iterator over the CRLF-delimited records of a buffer.
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Lines<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes consumed so far, terminators included.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Everything after the last record handed out.
    pub fn residue(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Line<'a>> {
        let rest = &self.buf[self.pos..];
        let end = memmem::find(rest, CRLF)?;

        let line = Line {
            bytes: &rest[..end],
            consumed: self.pos + end + CRLF.len(),
        };
        self.pos = line.consumed;
        Some(line)
    }
}

/// Where a [`scan_lines`] run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Bytes consumed through the last visited record's CRLF.
    pub consumed: usize,
    /// Bytes left in the buffer after `consumed`.
    pub residue: usize,
    /// `true` when the continuation broke out before the buffer ran dry.
    pub stopped: bool,
}

/// Feeds each record of `buf` to `f` until it returns `ControlFlow::Break`
/// or no complete record is left.
pub fn scan_lines<'a, F>(buf: &'a [u8], mut f: F) -> ScanSummary
where
    F: FnMut(Line<'a>) -> ControlFlow<()>,
{
    let mut lines = Lines::new(buf);
    let mut stopped = false;

    for line in lines.by_ref() {
        if f(line).is_break() {
            stopped = true;
            break;
        }
    }

    ScanSummary {
        consumed: lines.offset(),
        residue: lines.residue().len(),
        stopped,
    }
}
