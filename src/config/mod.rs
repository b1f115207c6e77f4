//! Configuration for arena building and stream reading.
//!
//! - [`BuilderConfig`] - Controls the arena page size used by
//!   [`SpanBuilder`](crate::SpanBuilder)
//! - [`ReaderConfig`] - Controls buffering and encoding detection for
//!   [`SpanReader`](crate::SpanReader)
//!
//! # Example
//!
//! ```
//! use textspan::{BuilderConfig, ReaderConfig};
//!
//! let builder = BuilderConfig::new(8192)?;
//!
//! let reader = ReaderConfig::default()
//!     .with_detect_bom(false)
//!     .with_len_hint(1024);
//! # Ok::<(), textspan::Error>(())
//! ```

use crate::error::Error;

/// Default arena page size in bytes (4 KiB).
pub const DEFAULT_BLOCK_SIZE: usize = 4 * 1024;

/// Default byte buffer size for stream reading.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 1024;

/// Smallest permitted byte buffer; smaller requests are clamped up.
pub const MIN_READ_BUFFER_SIZE: usize = 128;

/// Configuration for [`SpanBuilder`](crate::SpanBuilder).
///
/// The block size is the capacity of each arena page. A page is replaced,
/// never grown, when it fills up; larger pages mean fewer replacements and
/// longer zero-copy adjacency runs, at the cost of memory held alive by the
/// longest-lived span pointing into a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BuilderConfig {
    block_size: usize,
}

impl BuilderConfig {
    /// Creates a configuration with the given arena page size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `block_size` is zero.
    pub fn new(block_size: usize) -> Result<Self, Error> {
        if block_size == 0 {
            return Err(Error::InvalidConfig {
                message: "block size must be non-zero",
            });
        }
        Ok(Self { block_size })
    }

    /// Returns the arena page size in bytes.
    pub fn block_size(&self) -> usize {
        self.block_size
    }
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

/// Configuration for [`SpanReader`](crate::SpanReader).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReaderConfig {
    buffer_size: usize,
    detect_bom: bool,
    len_hint: Option<u64>,
}

impl ReaderConfig {
    /// Creates a configuration with the given byte buffer size.
    ///
    /// Sizes below [`MIN_READ_BUFFER_SIZE`] are clamped up rather than
    /// rejected.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(MIN_READ_BUFFER_SIZE),
            detect_bom: true,
            len_hint: None,
        }
    }

    /// Enables or disables byte-order-mark auto-detection.
    ///
    /// When enabled (the default), the first refill sniffs for UTF-16 BE,
    /// UTF-16 LE and UTF-8 marks and switches the decoder accordingly.
    pub fn with_detect_bom(mut self, detect: bool) -> Self {
        self.detect_bom = detect;
        self
    }

    /// Supplies the remaining source length in bytes, when the caller
    /// knows it.
    ///
    /// [`SpanReader::read_to_end`](crate::SpanReader::read_to_end) uses the
    /// hint to pre-size the arena so the drained content lands in one page.
    /// Without a hint it falls back to four times the buffer size.
    pub fn with_len_hint(mut self, bytes: u64) -> Self {
        self.len_hint = Some(bytes);
        self
    }

    /// Returns the byte buffer size.
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Returns whether BOM auto-detection is enabled.
    pub fn detect_bom(&self) -> bool {
        self.detect_bom
    }

    /// Returns the length hint, if set.
    pub fn len_hint(&self) -> Option<u64> {
        self.len_hint
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_READ_BUFFER_SIZE)
    }
}
