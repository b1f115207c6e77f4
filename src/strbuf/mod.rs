//! Pooled mutable scratch buffers.
//!
//! - [`StrBuf`] - a reusable text builder with a logical start offset, so a
//!   prefix can be dropped without moving the remaining bytes
//!
//! Buffers come from a thread-local pool (capacity [`MAX_POOL_SIZE`]) and
//! return to it on drop when the retention predicate approves, so hot loops
//! reuse allocations instead of churning them.

mod pool;

pub use pool::{
    DEFAULT_STRBUF_CAPACITY, MAX_POOL_SIZE, clear_pool, reset_keep_predicate, set_keep_predicate,
};

use std::fmt;

use crate::span::Span;

/// A reusable mutable text buffer with a movable logical start.
///
/// Appends go at the back; [`StrBuf::advance`] trims from the front in O(1)
/// by moving the start offset instead of shifting bytes. Numeric values
/// append allocation-free through [`fmt::Write`]:
///
/// ```
/// use std::fmt::Write;
/// use textspan::StrBuf;
///
/// let mut buf = StrBuf::take();
/// write!(buf, "id-{}", 42).unwrap();
/// assert_eq!(buf.as_str(), "id-42");
/// ```
#[derive(Debug)]
pub struct StrBuf {
    buf: String,
    start: usize,
}

impl StrBuf {
    /// Takes a buffer from the thread-local pool, or allocates one.
    pub fn take() -> Self {
        Self {
            buf: pool::take_buffer(),
            start: 0,
        }
    }

    /// Returns the logical length in bytes.
    pub fn len(&self) -> usize {
        self.buf.len() - self.start
    }

    /// Returns true if the logical content is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the logical content.
    pub fn as_str(&self) -> &str {
        &self.buf[self.start..]
    }

    /// Appends text.
    pub fn append_str(&mut self, text: &str) {
        self.buf.push_str(text);
    }

    /// Appends a span's content.
    pub fn append_span(&mut self, span: &Span) {
        self.buf.push_str(span.as_str());
    }

    /// Appends one character.
    pub fn push(&mut self, ch: char) {
        self.buf.push(ch);
    }

    /// Returns the byte at logical offset `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn byte_at(&self, index: usize) -> u8 {
        self.as_str().as_bytes()[index]
    }

    /// Materializes `[start, start + len)` of the logical content.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or off a char boundary.
    pub fn substring(&self, start: usize, len: usize) -> String {
        self.as_str()[start..start + len].to_owned()
    }

    /// Drops `n` bytes from the front without moving the rest.
    ///
    /// # Panics
    ///
    /// Panics if `n` is out of bounds or off a char boundary.
    pub fn advance(&mut self, n: usize) {
        assert!(
            self.as_str().is_char_boundary(n),
            "advance not on char boundary",
        );
        self.start += n;
    }

    /// Narrows the logical content to `[start, start + len)`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds or off char boundaries.
    pub fn truncate_to(&mut self, start: usize, len: usize) {
        let s = self.as_str();
        assert!(
            s.is_char_boundary(start) && s.is_char_boundary(start + len),
            "truncate_to not on char boundary",
        );
        self.start += start;
        self.buf.truncate(self.start + len);
    }

    /// Empties the buffer and resets the start offset.
    pub fn clear(&mut self) {
        self.buf.clear();
        self.start = 0;
    }
}

impl Default for StrBuf {
    fn default() -> Self {
        Self::take()
    }
}

impl Drop for StrBuf {
    fn drop(&mut self) {
        pool::release_buffer(std::mem::take(&mut self.buf));
    }
}

impl fmt::Write for StrBuf {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

impl fmt::Display for StrBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
