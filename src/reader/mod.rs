//! Streaming decode into spans.
//!
//! - [`SpanReader`] - turns a byte source into lines and content as
//!   [`Span`]s, decoding through the arena so a line that fits in one
//!   refill costs no copy at all
//!
//! Each refill produces one zero-copy fragment per line segment; the
//! fragments of a line that straddles refills are concatenated through the
//! builder, whose adjacency detection merges them back into a single span
//! when they landed contiguously in the arena.

use std::io::Read;

use crate::builder::SpanBuilder;
use crate::config::ReaderConfig;
use crate::decode::{Encoding, StreamDecoder};
use crate::error::Error;
use crate::span::Span;

/// Reads a byte stream as spans: by line, by char, or all at once.
///
/// The reader owns a [`SpanBuilder`]; every returned span points into that
/// builder's arenas (or, for reassembled pieces, into a backing the
/// builder allocated). Spans stay valid after the reader is dropped.
///
/// Reading is synchronous and blocking. There is no cancellation or
/// timeout plumbing; callers that need either wrap the source itself. To
/// keep the source alive after the reader is done, pass `&mut reader`
/// instead of the reader by value - any `Read` works.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use textspan::SpanReader;
///
/// let mut reader = SpanReader::with_defaults(Cursor::new("one\ntwo\n"));
/// assert_eq!(reader.read_line().unwrap().unwrap(), "one");
/// assert_eq!(reader.read_line().unwrap().unwrap(), "two");
/// assert!(reader.read_line().unwrap().is_none());
/// ```
pub struct SpanReader<R> {
    tap: StreamDecoder<R>,
    builder: SpanBuilder,
    config: ReaderConfig,
}

impl<R> std::fmt::Debug for SpanReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpanReader")
            .field("builder", &self.builder)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<R: Read> SpanReader<R> {
    /// Creates a reader decoding under `encoding` (UTF-8 when `None`).
    pub fn new(
        reader: R,
        encoding: Option<Encoding>,
        config: ReaderConfig,
        builder: SpanBuilder,
    ) -> Self {
        let encoding = encoding.unwrap_or(Encoding::Utf8);
        Self {
            tap: StreamDecoder::new(reader, encoding, config.detect_bom(), config.buffer_size()),
            builder,
            config,
        }
    }

    /// Creates a UTF-8 reader with default configuration and builder.
    pub fn with_defaults(reader: R) -> Self {
        Self::new(reader, None, ReaderConfig::default(), SpanBuilder::default())
    }

    /// Returns the active encoding (it may change once, at the first
    /// refill, when BOM detection fires).
    pub fn encoding(&self) -> Encoding {
        self.tap.encoding()
    }

    /// Returns the next line as a single span, without its terminator.
    ///
    /// `\n`, `\r` and `\r\n` all end a line; `\r\n` counts as one boundary
    /// even when the refill boundary falls between the two bytes. The last
    /// line needs no terminator. `Ok(None)` only at end of stream with
    /// nothing pending.
    pub fn read_line(&mut self) -> Result<Option<Span>, Error> {
        if self.tap.available().is_empty() && self.tap.refill()? == 0 {
            return Ok(None);
        }

        let mut parts = Vec::new();
        loop {
            let text = self.tap.available();
            // Byte scan is sound in UTF-8: \r and \n never appear inside a
            // multi-byte sequence.
            if let Some(at) = text.bytes().position(|b| b == b'\r' || b == b'\n') {
                let ends_with_cr = text.as_bytes()[at] == b'\r';
                parts.push(self.builder.push_str(&text[..at]));
                self.tap.consume(at + 1);
                if ends_with_cr
                    && (!self.tap.available().is_empty() || self.tap.refill()? > 0)
                    && self.tap.available().as_bytes()[0] == b'\n'
                {
                    self.tap.consume(1);
                }
                return Ok(Some(self.builder.concat(&parts)));
            }

            parts.push(self.builder.push_str(text));
            let taken = text.len();
            self.tap.consume(taken);
            if self.tap.refill()? == 0 {
                break;
            }
        }
        Ok(Some(self.builder.concat(&parts)))
    }

    /// Drains the rest of the stream into one span.
    ///
    /// The arena is pre-sized from the configured length hint when one was
    /// given, falling back to four refills' worth for unknowable sources,
    /// so the drained fragments land contiguously and concatenate without
    /// a copy.
    pub fn read_to_end(&mut self) -> Result<Span, Error> {
        let reserve = match self.config.len_hint() {
            Some(bytes) => self
                .tap
                .encoding()
                .worst_case_utf8_len(usize::try_from(bytes).unwrap_or(usize::MAX)),
            None => self.config.buffer_size() * 4,
        };
        self.builder.ensure_space(reserve);

        let mut parts = Vec::new();
        loop {
            let text = self.tap.available();
            if !text.is_empty() {
                parts.push(self.builder.push_str(text));
                let taken = text.len();
                self.tap.consume(taken);
            }
            if self.tap.refill()? == 0 {
                break;
            }
        }
        Ok(self.builder.concat(&parts))
    }

    /// Returns the next character.
    pub fn read_char(&mut self) -> Result<Option<char>, Error> {
        self.tap.next_char()
    }

    /// Returns the next character without consuming it.
    pub fn peek_char(&mut self) -> Result<Option<char>, Error> {
        self.tap.peek_char()
    }

    /// Returns true once the source is exhausted and nothing decoded is
    /// left to consume.
    pub fn at_eof(&self) -> bool {
        self.tap.is_eof() && self.tap.available().is_empty()
    }

    /// Gives back the builder (and with it, ownership of the arenas).
    pub fn into_builder(self) -> SpanBuilder {
        self.builder
    }

    /// Borrows the builder, e.g. to interleave manual span construction.
    pub fn builder_mut(&mut self) -> &mut SpanBuilder {
        &mut self.builder
    }
}
