//! Lazily paged random access over a sequential text source.
//!
//! - [`LazyBuffer`] - materializes a char or byte source into fixed
//!   16384-byte blocks on demand, so a parser can index arbitrarily far
//!   into a stream while only paying for what it actually touches
//!
//! Byte-backed buffers can switch encodings mid-stream: bytes not yet
//! decoded re-decode under the new encoding, already-materialized text is
//! never revisited.

use std::fmt;
use std::io::Read;

use crate::cache::CacheSource;
use crate::decode::{Encoding, StreamDecoder};
use crate::error::Error;

/// Size of one storage block in bytes.
pub const BLOCK_SIZE: usize = 16384;

/// Byte buffer size used when pulling from a byte-backed source.
const STREAM_BUFFER_SIZE: usize = 512;

enum Source {
    /// Pre-decoded text; not re-encodable.
    Chars(Box<dyn Iterator<Item = char>>),
    /// Byte stream through the incremental decoder.
    Stream(StreamDecoder<Box<dyn Read>>),
}

/// A paged buffer that materializes a sequential source on demand.
///
/// Block `i` holds source positions `[i * BLOCK_SIZE, (i + 1) * BLOCK_SIZE)`;
/// a monotonically increasing watermark tracks how much has been
/// materialized. Indexing past the watermark pulls from the source one
/// char at a time until the index is covered.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use textspan::LazyBuffer;
///
/// let mut buffer = LazyBuffer::from_stream(Cursor::new("on demand"), None, true);
/// assert_eq!(buffer.get(3).unwrap(), b'd');
/// // Only the prefix needed to cover index 3 was materialized.
/// assert_eq!(buffer.len_read(), 4);
/// ```
pub struct LazyBuffer {
    source: Source,
    blocks: Vec<Box<[u8]>>,
    read_bytes: usize,
    finished: bool,
}

impl LazyBuffer {
    /// Wraps an already-decoded char source. Not re-encodable.
    pub fn from_chars(chars: impl Iterator<Item = char> + 'static) -> Self {
        Self {
            source: Source::Chars(Box::new(chars)),
            blocks: Vec::new(),
            read_bytes: 0,
            finished: false,
        }
    }

    /// Wraps an owned string as a char source.
    pub fn from_string(text: String) -> Self {
        Self::from_chars(text.chars().collect::<Vec<_>>().into_iter())
    }

    /// Wraps a byte stream decoded under `encoding` (UTF-8 when `None`),
    /// with optional BOM auto-detection on the first read.
    pub fn from_stream(
        reader: impl Read + 'static,
        encoding: Option<Encoding>,
        detect_bom: bool,
    ) -> Self {
        let encoding = encoding.unwrap_or(Encoding::Utf8);
        Self {
            source: Source::Stream(StreamDecoder::new(
                Box::new(reader),
                encoding,
                detect_bom,
                STREAM_BUFFER_SIZE,
            )),
            blocks: Vec::new(),
            read_bytes: 0,
            finished: false,
        }
    }

    /// Returns the number of bytes materialized so far.
    pub fn len_read(&self) -> usize {
        self.read_bytes
    }

    /// Returns true once the source is known to be exhausted.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the active encoding, `None` for char-backed buffers.
    pub fn encoding(&self) -> Option<Encoding> {
        match &self.source {
            Source::Chars(_) => None,
            Source::Stream(tap) => Some(tap.encoding()),
        }
    }

    /// Returns the byte at `index`, pulling from the source as needed.
    ///
    /// # Errors
    ///
    /// [`Error::EndOfData`] when the source is exhausted before covering
    /// `index`; [`Error::Io`] / [`Error::Decode`] from the pull itself.
    pub fn get(&mut self, index: usize) -> Result<u8, Error> {
        while index >= self.read_bytes {
            if self.finished {
                return Err(Error::EndOfData);
            }
            match self.pull_char()? {
                Some(ch) => {
                    let mut scratch = [0u8; 4];
                    let encoded = ch.encode_utf8(&mut scratch);
                    append_bytes(&mut self.blocks, &mut self.read_bytes, encoded.as_bytes());
                }
                None => {
                    self.finished = true;
                    return Err(Error::EndOfData);
                }
            }
        }
        Ok(self.blocks[index / BLOCK_SIZE][index % BLOCK_SIZE])
    }

    /// Non-failing probe: like [`LazyBuffer::get`] but exhaustion is
    /// `Ok(false)` instead of an error. I/O and decode failures still
    /// propagate.
    pub fn contains_index(&mut self, index: usize) -> Result<bool, Error> {
        while index >= self.read_bytes {
            if self.finished {
                return Ok(false);
            }
            match self.pull_char()? {
                Some(ch) => {
                    let mut scratch = [0u8; 4];
                    let encoded = ch.encode_utf8(&mut scratch);
                    append_bytes(&mut self.blocks, &mut self.read_bytes, encoded.as_bytes());
                }
                None => {
                    self.finished = true;
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Drains the source completely. Subsequent calls are no-ops.
    pub fn read_to_end(&mut self) -> Result<(), Error> {
        if self.finished {
            return Ok(());
        }
        loop {
            match &mut self.source {
                Source::Chars(iter) => match iter.next() {
                    Some(ch) => {
                        let mut scratch = [0u8; 4];
                        let encoded = ch.encode_utf8(&mut scratch);
                        append_bytes(&mut self.blocks, &mut self.read_bytes, encoded.as_bytes());
                    }
                    None => break,
                },
                Source::Stream(tap) => {
                    if tap.available().is_empty() && tap.refill()? == 0 {
                        break;
                    }
                    let text = tap.take_decoded();
                    append_bytes(&mut self.blocks, &mut self.read_bytes, text.as_bytes());
                }
            }
        }
        self.finished = true;
        Ok(())
    }

    /// Materializes `[start, start + len)` of the buffered text.
    ///
    /// A range within one block is sliced straight out of it; a range
    /// crossing blocks is reassembled byte-by-byte, an O(len) path that
    /// only boundary-crossing requests pay.
    ///
    /// # Panics
    ///
    /// Panics if the range exceeds the materialized watermark (cover it
    /// first via [`LazyBuffer::get`] or [`LazyBuffer::contains_index`]) or
    /// is off a char boundary.
    pub fn substring(&self, start: usize, len: usize) -> String {
        assert!(
            start + len <= self.read_bytes,
            "substring out of range: {}..{} of {} materialized",
            start,
            start + len,
            self.read_bytes,
        );
        if len == 0 {
            return String::new();
        }
        let first = start / BLOCK_SIZE;
        let last = (start + len - 1) / BLOCK_SIZE;
        if first == last {
            let offset = start % BLOCK_SIZE;
            match std::str::from_utf8(&self.blocks[first][offset..offset + len]) {
                Ok(s) => s.to_owned(),
                Err(_) => panic!("substring range not on char boundary"),
            }
        } else {
            let mut bytes = Vec::with_capacity(len);
            let mut block = first;
            let mut offset = start % BLOCK_SIZE;
            let mut remaining = len;
            while remaining > 0 {
                let n = remaining.min(BLOCK_SIZE - offset);
                bytes.extend_from_slice(&self.blocks[block][offset..offset + n]);
                remaining -= n;
                block += 1;
                offset = 0;
            }
            match String::from_utf8(bytes) {
                Ok(s) => s,
                Err(_) => panic!("substring range not on char boundary"),
            }
        }
    }

    /// Switches the decode encoding for bytes not yet read.
    ///
    /// Applies only to byte-backed buffers; char-backed buffers return
    /// `Ok(false)`, and asking for the already-active encoding is an
    /// `Ok(true)` no-op. Otherwise, everything still decodable from
    /// already-buffered bytes is flushed under the *old* encoding, then a
    /// fresh decoder attaches at the current stream position under the new
    /// one. Already-materialized text is never re-decoded - recovering it
    /// would mean retaining raw byte history.
    pub fn try_set_encoding(&mut self, encoding: Encoding) -> Result<bool, Error> {
        match &self.source {
            Source::Chars(_) => return Ok(false),
            Source::Stream(tap) if tap.encoding() == encoding => return Ok(true),
            Source::Stream(_) => {}
        }
        let replaced = std::mem::replace(
            &mut self.source,
            Source::Chars(Box::new(std::iter::empty())),
        );
        let Source::Stream(mut tap) = replaced else {
            return Ok(false);
        };
        let drained = tap.drain_buffered();
        let text = tap.take_decoded();
        append_bytes(&mut self.blocks, &mut self.read_bytes, text.as_bytes());
        let reader = tap.into_reader();
        self.source = Source::Stream(StreamDecoder::new(
            reader,
            encoding,
            false,
            STREAM_BUFFER_SIZE,
        ));
        drained.map(|()| true)
    }

    fn pull_char(&mut self) -> Result<Option<char>, Error> {
        match &mut self.source {
            Source::Chars(iter) => Ok(iter.next()),
            Source::Stream(tap) => tap.next_char(),
        }
    }
}

fn append_bytes(blocks: &mut Vec<Box<[u8]>>, read_bytes: &mut usize, mut bytes: &[u8]) {
    while !bytes.is_empty() {
        let block = *read_bytes / BLOCK_SIZE;
        let offset = *read_bytes % BLOCK_SIZE;
        if blocks.len() <= block {
            blocks.push(vec![0u8; BLOCK_SIZE].into_boxed_slice());
        }
        let n = bytes.len().min(BLOCK_SIZE - offset);
        blocks[block][offset..offset + n].copy_from_slice(&bytes[..n]);
        *read_bytes += n;
        bytes = &bytes[n..];
    }
}

impl CacheSource for LazyBuffer {
    fn byte_at(&mut self, index: usize) -> u8 {
        match self.get(index) {
            Ok(byte) => byte,
            Err(e) => panic!("cache index {} not available in lazy buffer: {}", index, e),
        }
    }

    fn materialize(&mut self, start: usize, len: usize) -> String {
        if len > 0 {
            if let Err(e) = self.get(start + len - 1) {
                panic!("cache range not available in lazy buffer: {}", e);
            }
        }
        self.substring(start, len)
    }
}

impl fmt::Display for LazyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.substring(0, self.read_bytes))
    }
}

impl fmt::Debug for LazyBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyBuffer")
            .field("read_bytes", &self.read_bytes)
            .field("blocks", &self.blocks.len())
            .field("finished", &self.finished)
            .finish()
    }
}
