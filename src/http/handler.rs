use thiserror::Error;

use crate::http::header::HeaderInfo;

/// Receiver of parser events.
///
/// All four methods are required, so a parser can never be built with a
/// missing handler. Events are delivered synchronously on the thread that
/// called [`HttpParser::execute`](crate::http::parser::HttpParser::execute).
pub trait ParserHandler {
    /// A new request has started; fires before any of its bytes are consumed.
    fn on_header(&mut self);

    /// The blank line ending the header block was reached.
    fn on_header_complete(&mut self, info: &HeaderInfo);

    /// A run of body bytes arrived.
    fn on_body(&mut self, chunk: &[u8]);

    /// The declared body length has been reached.
    fn on_body_complete(&mut self);
}

type NotifyFn = Box<dyn FnMut() + Send>;
type HeaderCompleteFn = Box<dyn FnMut(&HeaderInfo) + Send>;
type BodyFn = Box<dyn FnMut(&[u8]) + Send>;

/// Returned by [`CallbacksBuilder::build`] when a callback was never registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no `{0}` callback registered")]
pub struct MissingCallback(pub &'static str);

/// Closure-backed [`ParserHandler`].
///
/// # Example
///
/// ```
/// # use trevi::http::handler::Callbacks;
/// let callbacks = Callbacks::builder()
///     .on_header(|| {})
///     .on_header_complete(|info| println!("{:?}", info.url))
///     .on_body(|chunk| println!("{} bytes", chunk.len()))
///     .on_body_complete(|| {})
///     .build()
///     .unwrap();
/// # drop(callbacks);
/// ```
pub struct Callbacks {
    on_header: NotifyFn,
    on_header_complete: HeaderCompleteFn,
    on_body: BodyFn,
    on_body_complete: NotifyFn,
}

impl Callbacks {
    pub fn builder() -> CallbacksBuilder {
        CallbacksBuilder::new()
    }
}

impl ParserHandler for Callbacks {
    fn on_header(&mut self) {
        (self.on_header)()
    }

    fn on_header_complete(&mut self, info: &HeaderInfo) {
        (self.on_header_complete)(info)
    }

    fn on_body(&mut self, chunk: &[u8]) {
        (self.on_body)(chunk)
    }

    fn on_body_complete(&mut self) {
        (self.on_body_complete)()
    }
}

/// Builder for [`Callbacks`]. Every callback must be set before `build`.
#[derive(Default)]
pub struct CallbacksBuilder {
    on_header: Option<NotifyFn>,
    on_header_complete: Option<HeaderCompleteFn>,
    on_body: Option<BodyFn>,
    on_body_complete: Option<NotifyFn>,
}

impl CallbacksBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_header(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_header = Some(Box::new(f));
        self
    }

    pub fn on_header_complete(mut self, f: impl FnMut(&HeaderInfo) + Send + 'static) -> Self {
        self.on_header_complete = Some(Box::new(f));
        self
    }

    pub fn on_body(mut self, f: impl FnMut(&[u8]) + Send + 'static) -> Self {
        self.on_body = Some(Box::new(f));
        self
    }

    pub fn on_body_complete(mut self, f: impl FnMut() + Send + 'static) -> Self {
        self.on_body_complete = Some(Box::new(f));
        self
    }

    pub fn build(self) -> Result<Callbacks, MissingCallback> {
        Ok(Callbacks {
            on_header: self.on_header.ok_or(MissingCallback("on_header"))?,
            on_header_complete: self
                .on_header_complete
                .ok_or(MissingCallback("on_header_complete"))?,
            on_body: self.on_body.ok_or(MissingCallback("on_body"))?,
            on_body_complete: self
                .on_body_complete
                .ok_or(MissingCallback("on_body_complete"))?,
        })
    }
}
