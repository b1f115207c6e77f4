//! Arena building - manufacture spans without per-token allocations.
//!
//! - [`SpanBuilder`] - copies token text into append-only arena pages and
//!   hands back [`Span`]s over the written ranges
//!
//! Tokens pushed back-to-back land adjacent in one page, so concatenating
//! them later is a zero-copy range merge. That adjacency fast path is the
//! central optimization: a value scanned in one contiguous pass costs no
//! copy at reassembly, while a value built from scattered pieces pays
//! exactly one.

pub(crate) mod arena;

use std::rc::Rc;

use crate::builder::arena::ArenaBuf;
use crate::config::BuilderConfig;
use crate::error::Error;
use crate::span::Span;
use crate::strbuf::StrBuf;

/// Builds spans over append-only arena pages.
///
/// The builder owns the current page. When a page cannot fit the next
/// value it is replaced (never grown); the old page stays alive exactly as
/// long as the longest-lived span pointing into it. A page no span
/// references anymore is rewound and refilled in place.
///
/// # Example
///
/// ```
/// use textspan::{Span, SpanBuilder};
///
/// let mut builder = SpanBuilder::default();
/// let a = builder.push_str("hello ");
/// let b = builder.push_str("world");
///
/// // Adjacent pushes merge without copying.
/// let line = builder.concat(&[a, b]);
/// assert_eq!(line, "hello world");
/// ```
#[derive(Debug)]
pub struct SpanBuilder {
    arena: Rc<ArenaBuf>,
    config: BuilderConfig,
}

impl SpanBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(config: BuilderConfig) -> Self {
        Self {
            arena: Rc::new(ArenaBuf::with_capacity(config.block_size())),
            config,
        }
    }

    /// Returns the configured arena page size.
    pub fn block_size(&self) -> usize {
        self.config.block_size()
    }

    /// Makes sure the current page can take `len` more bytes.
    ///
    /// If it cannot, the page is replaced by one of `max(len, block_size)`
    /// bytes - unless no span references it anymore, in which case it is
    /// rewound and reused in place. Spans already built keep their page
    /// alive and stay valid either way.
    pub fn ensure_space(&mut self, len: usize) {
        if self.arena.remaining() >= len {
            return;
        }
        if Rc::strong_count(&self.arena) == 1 && self.arena.capacity() >= len {
            // Exclusive access proven: nothing can observe the rewind.
            self.arena.rewind();
            return;
        }
        let capacity = len.max(self.config.block_size());
        self.arena = Rc::new(ArenaBuf::with_capacity(capacity));
    }

    /// Copies `text` into the arena and returns a span over the copy.
    pub fn push_str(&mut self, text: &str) -> Span {
        if text.is_empty() {
            return Span::empty();
        }
        self.ensure_space(text.len());
        let start = self.arena.append(text.as_bytes());
        Span::from_arena(self.arena.clone(), start, text.len())
    }

    /// Copies a span's content into the arena.
    ///
    /// Useful for detaching a token from a large short-lived backing.
    pub fn push_span(&mut self, span: &Span) -> Span {
        self.push_str(span.as_str())
    }

    /// Copies `len` bytes starting at `start` out of a scratch buffer.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or off a char boundary,
    /// mirroring `str` slicing.
    pub fn push_strbuf(&mut self, buf: &StrBuf, start: usize, len: usize) -> Span {
        self.push_str(&buf.as_str()[start..start + len])
    }

    /// Decodes Latin-1 bytes into the arena.
    ///
    /// Every byte is the scalar value U+0000..=U+00FF; bytes at or above
    /// 0x80 widen to two UTF-8 bytes, so up to `2 * bytes.len()` arena
    /// space is reserved and the resulting span is trimmed to the actual
    /// decoded size.
    pub fn push_latin1(&mut self, bytes: &[u8]) -> Span {
        if bytes.is_empty() {
            return Span::empty();
        }
        self.ensure_space(bytes.len() * 2);
        let start = self.arena.used();
        let mut scratch = [0u8; 4];
        for &byte in bytes {
            let encoded = char::from(byte).encode_utf8(&mut scratch);
            self.arena.append(encoded.as_bytes());
        }
        let len = self.arena.used() - start;
        Span::from_arena(self.arena.clone(), start, len)
    }

    /// Validates `bytes` as UTF-8 and copies them into the arena.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] on a malformed sequence.
    pub fn push_utf8(&mut self, bytes: &[u8]) -> Result<Span, Error> {
        match std::str::from_utf8(bytes) {
            Ok(text) => Ok(self.push_str(text)),
            Err(_) => Err(Error::Decode {
                message: "invalid utf-8 sequence",
            }),
        }
    }

    /// Concatenates spans, zero-copy when possible.
    ///
    /// Zero or one input returns the input unchanged. When every non-empty
    /// input is a contiguous, in-order range of one backing, the result is
    /// a single zero-copy span over the whole run. Otherwise the total
    /// length is computed, space is ensured once, and every piece is copied
    /// in order into one new contiguous range.
    pub fn concat(&mut self, parts: &[Span]) -> Span {
        match parts {
            [] => Span::empty(),
            [single] => single.clone(),
            _ => {
                if let Some(merged) = contiguous_run(parts) {
                    return merged;
                }
                let total = parts.iter().map(Span::len).sum();
                self.ensure_space(total);
                let start = self.arena.used();
                for part in parts {
                    self.arena.append(part.as_bytes());
                }
                Span::from_arena(self.arena.clone(), start, total)
            }
        }
    }

    /// Starts the builder over on an empty page.
    ///
    /// Spans built so far keep their pages alive and stay valid. The
    /// current page is rewound in place when no span references it,
    /// otherwise replaced.
    pub fn reset(&mut self) {
        if Rc::strong_count(&self.arena) == 1 {
            self.arena.rewind();
        } else {
            self.arena = Rc::new(ArenaBuf::with_capacity(self.config.block_size()));
        }
    }
}

impl Default for SpanBuilder {
    fn default() -> Self {
        Self::new(BuilderConfig::default())
    }
}

/// Folds spans into one zero-copy span when every non-empty element
/// continues the previous one in the same backing.
fn contiguous_run(parts: &[Span]) -> Option<Span> {
    let mut all: Option<Span> = None;
    for part in parts {
        if part.is_empty() {
            continue;
        }
        all = Some(match all {
            None => part.clone(),
            Some(acc) => acc.try_merge(part)?,
        });
    }
    Some(all.unwrap_or_else(Span::empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_str() {
        let mut builder = SpanBuilder::default();
        let span = builder.push_str("token");
        assert_eq!(span, "token");
        assert_eq!(builder.push_str(""), Span::empty());
    }

    #[test]
    fn test_adjacent_pushes_share_a_page() {
        let mut builder = SpanBuilder::default();
        let a = builder.push_str("one");
        let b = builder.push_str("two");
        assert!(a.same_backing(&b));
    }

    #[test]
    fn test_concat_contiguous_is_zero_copy() {
        let mut builder = SpanBuilder::default();
        let parts = vec![
            builder.push_str("ab"),
            builder.push_str("cd"),
            builder.push_str("ef"),
        ];
        let joined = builder.concat(&parts);
        assert_eq!(joined, "abcdef");
        assert!(joined.same_backing(&parts[0]));
    }

    #[test]
    fn test_concat_skips_empty_pieces() {
        let mut builder = SpanBuilder::default();
        let a = builder.push_str("ab");
        let b = builder.push_str("cd");
        let joined = builder.concat(&[a.clone(), Span::empty(), b]);
        assert_eq!(joined, "abcd");
        assert!(joined.same_backing(&a));
    }

    #[test]
    fn test_concat_disjoint_copies_once() {
        let mut builder = SpanBuilder::default();
        let a = builder.push_str("head");
        let b = Span::new("tail");
        let joined = builder.concat(&[a, b.clone()]);
        assert_eq!(joined, "headtail");
        // Copied into the arena, not merged onto b's owned backing.
        assert!(!joined.same_backing(&b));
    }

    #[test]
    fn test_concat_out_of_order_copies() {
        let mut builder = SpanBuilder::default();
        let a = builder.push_str("ab");
        let b = builder.push_str("cd");
        let joined = builder.concat(&[b, a]);
        assert_eq!(joined, "cdab");
    }

    #[test]
    fn test_concat_trivial_inputs() {
        let mut builder = SpanBuilder::default();
        assert_eq!(builder.concat(&[]), "");
        let single = builder.push_str("only");
        let out = builder.concat(&[single.clone()]);
        assert!(out.same_backing(&single));
    }

    #[test]
    fn test_page_rollover_keeps_old_spans_valid() {
        let mut builder = SpanBuilder::new(BuilderConfig::new(8).unwrap());
        let a = builder.push_str("12345678");
        let b = builder.push_str("abcdefgh");
        assert_eq!(a, "12345678");
        assert_eq!(b, "abcdefgh");
        assert!(!a.same_backing(&b));
    }

    #[test]
    fn test_oversized_value_gets_its_own_page() {
        let mut builder = SpanBuilder::new(BuilderConfig::new(4).unwrap());
        let big = builder.push_str("larger than the block");
        assert_eq!(big, "larger than the block");
    }

    #[test]
    fn test_unreferenced_page_is_rewound() {
        let mut builder = SpanBuilder::new(BuilderConfig::new(8).unwrap());
        {
            let _dropped = builder.push_str("12345678");
        }
        // The page is full but unreferenced; the next push reuses it.
        let again = builder.push_str("abcdefgh");
        assert_eq!(again, "abcdefgh");
    }

    #[test]
    fn test_reset_preserves_outstanding_spans() {
        let mut builder = SpanBuilder::default();
        let kept = builder.push_str("survivor");
        builder.reset();
        let fresh = builder.push_str("newcomer");
        assert_eq!(kept, "survivor");
        assert!(!kept.same_backing(&fresh));
    }

    #[test]
    fn test_push_latin1() {
        let mut builder = SpanBuilder::default();
        let span = builder.push_latin1(&[b'a', 0xE9, b'b']);
        assert_eq!(span, "a\u{e9}b");
        assert_eq!(span.len(), 4);

        assert_eq!(builder.push_latin1(b"plain ascii"), "plain ascii");
    }

    #[test]
    fn test_push_utf8() {
        let mut builder = SpanBuilder::default();
        let span = builder.push_utf8("héllo".as_bytes()).unwrap();
        assert_eq!(span, "héllo");

        assert!(builder.push_utf8(&[0xFF, 0xFE]).is_err());
    }

    #[test]
    fn test_push_strbuf() {
        let mut builder = SpanBuilder::default();
        let mut buf = StrBuf::take();
        buf.append_str("scratch text");
        let span = builder.push_strbuf(&buf, 8, 4);
        assert_eq!(span, "text");
    }
}
