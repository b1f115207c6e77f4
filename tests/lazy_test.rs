// Integration tests for LazyBuffer
// Tests cover: indexing equivalence with direct reads, probe semantics,
// block-boundary substrings, mid-stream re-encoding, cache integration

use std::io::{Cursor, Read};
use std::rc::Rc;

use textspan::{BLOCK_SIZE, Encoding, Error, LazyBuffer, TextCache};

/// Hands out one byte per read call, forcing worst-case buffering splits.
struct Trickle<R>(R);

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let take = buf.len().min(1);
        self.0.read(&mut buf[..take])
    }
}

// ============================================================================
// Indexing Equivalence
// ============================================================================

#[test]
fn test_indexing_equals_direct_read() {
    let text = "lazy and eager must agree on every position";
    let mut lazy = LazyBuffer::from_stream(Trickle(Cursor::new(text.to_owned())), None, true);

    // Probe positions out of order; each pulls exactly as far as needed.
    for &pos in &[7, 3, 30, 30, 0, text.len() - 1] {
        assert_eq!(lazy.get(pos).unwrap(), text.as_bytes()[pos]);
    }
}

#[test]
fn test_watermark_advances_only_as_far_as_needed() {
    let mut lazy = LazyBuffer::from_stream(Cursor::new("0123456789"), None, false);
    assert_eq!(lazy.len_read(), 0);
    lazy.get(4).unwrap();
    assert_eq!(lazy.len_read(), 5);
    lazy.get(1).unwrap();
    assert_eq!(lazy.len_read(), 5);
    assert!(!lazy.is_finished());
}

#[test]
fn test_get_past_end_is_end_of_data() {
    let mut lazy = LazyBuffer::from_stream(Cursor::new("abc"), None, false);
    assert!(matches!(lazy.get(10), Err(Error::EndOfData)));
    assert!(lazy.is_finished());
    // Everything materialized on the way stays addressable.
    assert_eq!(lazy.get(2).unwrap(), b'c');
}

// ============================================================================
// Probe Semantics
// ============================================================================

#[test]
fn test_contains_index_probe_does_not_fail() {
    let mut lazy = LazyBuffer::from_stream(Cursor::new("abc"), None, false);
    assert!(lazy.contains_index(0).unwrap());
    assert!(lazy.contains_index(2).unwrap());
    assert!(!lazy.contains_index(3).unwrap());
    assert!(!lazy.contains_index(1000).unwrap());
    // The failed probe drained the source; earlier indexes still hit.
    assert!(lazy.is_finished());
    assert!(lazy.contains_index(1).unwrap());
}

// ============================================================================
// Substring Paths
// ============================================================================

#[test]
fn test_substring_within_and_across_blocks() {
    let text = "0123456789".repeat(3300); // 33000 bytes, three blocks
    let mut lazy = LazyBuffer::from_string(text.clone());
    lazy.read_to_end().unwrap();
    assert_eq!(lazy.len_read(), text.len());

    // Single-block range: direct slice.
    assert_eq!(lazy.substring(100, 50), text[100..150]);
    // Ranges straddling each boundary: byte-by-byte reassembly.
    assert_eq!(
        lazy.substring(BLOCK_SIZE - 7, 14),
        text[BLOCK_SIZE - 7..BLOCK_SIZE + 7]
    );
    assert_eq!(
        lazy.substring(2 * BLOCK_SIZE - 1, 2),
        text[2 * BLOCK_SIZE - 1..2 * BLOCK_SIZE + 1]
    );
    // Whole content, spanning all three blocks.
    assert_eq!(lazy.substring(0, text.len()), text);
}

#[test]
fn test_read_to_end_matches_upfront_read() {
    let text = "complete picture of the stream";
    let mut lazy = LazyBuffer::from_stream(Cursor::new(text.to_owned()), None, true);
    lazy.read_to_end().unwrap();
    assert!(lazy.is_finished());
    assert_eq!(lazy.substring(0, text.len()), text);
    // Second drain is a no-op.
    lazy.read_to_end().unwrap();
    assert_eq!(lazy.len_read(), text.len());
}

// ============================================================================
// Encodings
// ============================================================================

#[test]
fn test_utf16_bom_detected_through_lazy_buffer() {
    let mut data = vec![0xFF, 0xFE];
    for unit in "paged wide text".encode_utf16() {
        data.extend_from_slice(&unit.to_le_bytes());
    }
    let mut lazy = LazyBuffer::from_stream(Cursor::new(data), None, true);
    lazy.read_to_end().unwrap();
    assert_eq!(lazy.encoding(), Some(Encoding::Utf16Le));
    assert_eq!(lazy.substring(0, lazy.len_read()), "paged wide text");
}

#[test]
fn test_char_backed_buffer_rejects_reencoding() {
    let mut lazy = LazyBuffer::from_string("already text".to_owned());
    assert_eq!(lazy.encoding(), None);
    assert!(!lazy.try_set_encoding(Encoding::Latin1).unwrap());
}

#[test]
fn test_reencode_applies_to_unread_bytes_only() {
    // UTF-8 header, then a Latin-1 payload that is not valid UTF-8.
    let mut data = b"len:".to_vec();
    data.extend_from_slice(&[0xE9, 0xE8]); // "éè" in Latin-1
    let mut lazy = LazyBuffer::from_stream(Trickle(Cursor::new(data)), None, false);

    assert_eq!(lazy.get(3).unwrap(), b':');
    assert!(lazy.try_set_encoding(Encoding::Latin1).unwrap());
    assert_eq!(lazy.encoding(), Some(Encoding::Latin1));

    lazy.read_to_end().unwrap();
    assert_eq!(lazy.substring(0, lazy.len_read()), "len:\u{e9}\u{e8}");
}

// ============================================================================
// Cache Integration
// ============================================================================

#[test]
fn test_cache_promotes_repeated_content_from_lazy_source() {
    let mut cache = TextCache::new();
    let mut lazy = LazyBuffer::from_stream(Cursor::new("ref ref ref"), None, false);

    let r1 = cache.substring_cached(&mut lazy, 0, 3);
    let r2 = cache.substring_cached(&mut lazy, 4, 3);
    let r3 = cache.substring_cached(&mut lazy, 8, 3);

    assert_eq!(&*r1, "ref");
    assert!(Rc::ptr_eq(&r2, &r3));
    // The cache pulled only what it needed through the buffer.
    assert_eq!(lazy.len_read(), 11);
}
