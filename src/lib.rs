//! textspan
//!
//! Zero-copy text runtime for high-throughput parsers.
//!
//! `textspan` slices, compares, hashes and selectively deduplicates
//! substrings without allocating an owned string per token. Five pieces
//! form one engine:
//!
//! - [`Span`] - immutable text slice: shared backing + offset + length
//! - [`SpanBuilder`] - arena builder that manufactures spans and fuses
//!   adjacent ones without copying
//! - [`TextCache`] - interning cache that promotes a substring to a shared
//!   canonical string after its second occurrence
//! - [`LazyBuffer`] - pages a sequential source into fixed blocks for
//!   random access, with mid-stream re-encoding
//! - [`SpanReader`] - streams a byte source into line/content spans with
//!   BOM-based encoding detection
//!
//! The decoder feeds the builder, the builder produces spans, and the
//! cache deduplicates content from any indexable source, the lazy buffer
//! included.
//!
//! The crate intentionally:
//! - does NOT replace general string APIs (wrap a [`Span`] when you need one)
//! - does NOT share caches across threads
//! - does NOT shape or normalize text
//! - does NOT decode beyond BOM-detectable encodings plus Latin-1
//!
//! Everything is single-threaded and synchronous: spans share backings via
//! `Rc`, caches and scratch pools are per thread, and only the two
//! stream-facing pieces ever block.
//!
//! # Reading tokens
//!
//! ```
//! use std::io::Cursor;
//! use textspan::SpanReader;
//!
//! let source = Cursor::new("alpha,beta\n1,2\n");
//! let mut reader = SpanReader::with_defaults(source);
//!
//! while let Some(line) = reader.read_line()? {
//!     for field in line.split(',', false) {
//!         // Fields share the line's backing; nothing was copied.
//!         assert!(field.same_backing(&line));
//!     }
//! }
//! # Ok::<(), textspan::Error>(())
//! ```
//!
//! # Interning repeated tokens
//!
//! ```
//! use std::rc::Rc;
//! use textspan::TextCache;
//!
//! let mut cache = TextCache::new();
//! let rows = cache.split_interned("GET,GET,GET", ',', false);
//!
//! // Promoted after the second sighting; one shared instance from then on.
//! assert!(Rc::ptr_eq(&rows[1], &rows[2]));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

mod builder;
mod cache;
mod config;
mod decode;
mod error;
mod lazy;
mod reader;
mod span;
mod strbuf;

//
// Public surface (intentionally tiny)
//

pub use builder::SpanBuilder;
pub use cache::{CacheSource, TextCache, to_lower_fast};
pub use config::{
    BuilderConfig, DEFAULT_BLOCK_SIZE, DEFAULT_READ_BUFFER_SIZE, MIN_READ_BUFFER_SIZE,
    ReaderConfig,
};
pub use decode::Encoding;
pub use error::Error;
pub use lazy::{BLOCK_SIZE, LazyBuffer};
pub use reader::SpanReader;
pub use span::Span;
pub use strbuf::{
    DEFAULT_STRBUF_CAPACITY, MAX_POOL_SIZE, StrBuf, clear_pool, reset_keep_predicate,
    set_keep_predicate,
};
