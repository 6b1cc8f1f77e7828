use std::collections::HashMap;

use url::Url;

use crate::http::names::{CONNECTION, CONTENT_LENGTH, HOST};
use crate::http::parser::ParseError;

/// Parsed header section of one request.
///
/// Request-line fields stay `None` until the request line has been parsed,
/// and remain `None` when it did not split into exactly three tokens.
/// Header names are stored as received, without case folding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderInfo {
    /// Request method token (e.g. "GET")
    pub method: Option<String>,
    /// Request target as written on the request line
    pub url: Option<String>,
    /// Major protocol version ("1" for HTTP/1.1)
    pub version_major: Option<String>,
    /// Minor protocol version ("1" for HTTP/1.1)
    pub version_minor: Option<String>,
    /// Header fields, last write wins
    pub headers: HashMap<String, String>,
    /// Set once the first body chunk has been observed
    pub has_body: bool,
}

impl HeaderInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills method, url and version from a request line.
    ///
    /// Returns `false` and leaves the fields untouched unless the line splits
    /// on single spaces into exactly three tokens.
    pub(crate) fn apply_request_line(&mut self, line: &str) -> bool {
        let parts: Vec<&str> = line.split(' ').collect();
        let [method, url, protocol] = parts.as_slice() else {
            return false;
        };

        let version = protocol.rsplit_once('/').map_or(*protocol, |(_, v)| v);
        let (major, minor) = match version.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (version, None),
        };

        self.method = Some(method.to_string());
        self.url = Some(url.to_string());
        self.version_major = Some(major.to_string());
        self.version_minor = minor.map(str::to_string);
        true
    }

    /// Stores a `Name: value` line. Lines without a colon are ignored.
    pub(crate) fn apply_header_line(&mut self, line: &str) {
        if let Some((name, value)) = line.split_once(':') {
            self.headers
                .insert(name.trim().to_string(), value.trim().to_string());
        }
    }

    /// Retrieves a header value by its exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key).map(|v| v.as_str())
    }

    /// Declared body length.
    ///
    /// Only the literal `Content-Length` key counts. A missing header means
    /// no body. Anything but a plain run of decimal digits is an error, signs
    /// included, since body tracking cannot continue without a trustworthy
    /// length.
    pub fn content_length(&self) -> Result<usize, ParseError> {
        match self.header(CONTENT_LENGTH) {
            None => Ok(0),
            Some(v) if !v.is_empty() && v.bytes().all(|b| b.is_ascii_digit()) => v
                .parse()
                .map_err(|_| ParseError::InvalidContentLength(v.to_string())),
            Some(v) => Err(ParseError::InvalidContentLength(v.to_string())),
        }
    }

    /// Whether the connection should stay open after this request.
    ///
    /// HTTP/1.1 defaults to keep-alive unless `Connection: close` is sent;
    /// HTTP/1.0 only keeps the connection with an explicit `keep-alive`.
    pub fn keep_alive(&self) -> bool {
        let connection = self.header(CONNECTION);
        let is_http10 = self.version_major.as_deref() == Some("1")
            && self.version_minor.as_deref() == Some("0");

        match connection {
            Some(v) if v.eq_ignore_ascii_case("close") => false,
            Some(v) if v.eq_ignore_ascii_case("keep-alive") => true,
            _ => !is_http10,
        }
    }

    /// Resolves the request target into an absolute URL.
    ///
    /// Absolute-form targets are parsed as they are; origin-form targets
    /// ("/path?query") are joined onto `http://<Host>`. Returns `None` when
    /// the request line was not parsed or the result is not a valid URL.
    pub fn request_target(&self) -> Option<Url> {
        let target = self.url.as_deref()?;
        if let Ok(url) = Url::parse(target) {
            return Some(url);
        }

        let host = self.header(HOST).unwrap_or("localhost");
        let base = Url::parse(&format!("http://{}/", host)).ok()?;
        base.join(target).ok()
    }
}
