//! Substring interning - promote repeated substrings to shared strings.
//!
//! - [`TextCache`] - bucketed two-sighting interning over any
//!   [`CacheSource`]
//!
//! A substring becomes a reusable shared instance only after its second
//! occurrence, which filters out one-off tokens. Each bucket holds at most
//! one unpromoted candidate and five promoted strings, so memory stays
//! bounded no matter how many distinct keys hash into it - recall is
//! traded for a hard ceiling.

mod source;

pub use source::CacheSource;

use std::borrow::Cow;
use std::rc::Rc;

/// Number of hash buckets. Fixed prime, same table size whatever the load.
const TABLE_SIZE: usize = 6841;

/// Promoted strings a bucket will hold before it stops accepting more.
const MAX_PROMOTED: usize = 5;

#[derive(Default)]
struct Bucket {
    /// Seen once, not yet promoted. Replaced on mismatch.
    candidate: Option<Rc<str>>,
    /// Promoted canonical strings, append-only, capped at [`MAX_PROMOTED`].
    list: Vec<Rc<str>>,
}

/// Deduplicates substrings into canonical shared strings.
///
/// The cache is an explicit value owned by whichever execution unit wants
/// one; construction and [`TextCache::clear`] are explicit lifecycle calls.
/// Clear the cache between unrelated logical sessions sharing a thread -
/// that bounds memory and prevents one session's tokens from leaking into
/// the next, which is a correctness requirement, not just cleanup.
///
/// # Example
///
/// ```
/// use std::rc::Rc;
/// use textspan::TextCache;
///
/// let mut cache = TextCache::new();
/// let mut src = "status=ok&status=ok";
///
/// let first = cache.substring_cached(&mut src, 0, 9);
/// let second = cache.substring_cached(&mut src, 10, 9);
/// let third = cache.substring_cached(&mut src, 0, 9);
///
/// // Promoted on the second sighting; canonical from then on.
/// assert!(Rc::ptr_eq(&second, &third));
/// assert_eq!(&*first, "status=ok");
/// ```
pub struct TextCache {
    buckets: Option<Box<[Bucket]>>,
    empty: Rc<str>,
}

impl TextCache {
    /// Creates an empty cache. The bucket table is allocated lazily on the
    /// first lookup.
    pub fn new() -> Self {
        Self {
            buckets: None,
            empty: Rc::from(""),
        }
    }

    /// Returns the canonical substring `[start, start + len)` of `source`.
    ///
    /// Zero-length requests return the canonical empty string immediately.
    /// Otherwise the bucket for `(first byte, last byte, len)` is
    /// consulted: a promoted match is returned as-is; a matching candidate
    /// is promoted and returned; anything else materializes a fresh copy,
    /// which also becomes the new candidate while the bucket has room.
    ///
    /// # Panics
    ///
    /// Panics if the range is not available in `source` (see
    /// [`CacheSource`]) or, for textual materialization, off a char
    /// boundary.
    pub fn substring_cached<S: CacheSource>(
        &mut self,
        source: &mut S,
        start: usize,
        len: usize,
    ) -> Rc<str> {
        if len == 0 {
            return self.empty.clone();
        }

        let first = source.byte_at(start);
        let last = source.byte_at(start + len - 1);
        let index = bucket_index(first, last, len);

        let buckets = self.buckets.get_or_insert_with(|| {
            (0..TABLE_SIZE)
                .map(|_| Bucket::default())
                .collect::<Vec<_>>()
                .into_boxed_slice()
        });
        let bucket = &mut buckets[index];

        let mut promoted_hit = None;
        for text in &bucket.list {
            if text.len() == len && content_matches(source, start, text) {
                promoted_hit = Some(text.clone());
                break;
            }
        }
        if let Some(hit) = promoted_hit {
            return hit;
        }

        let full = bucket.list.len() >= MAX_PROMOTED;
        if !full {
            let candidate_matches = match &bucket.candidate {
                Some(text) => text.len() == len && content_matches(source, start, text),
                None => false,
            };
            if candidate_matches {
                if let Some(text) = bucket.candidate.take() {
                    bucket.list.push(text.clone());
                    return text;
                }
            }
        }

        let fresh: Rc<str> = Rc::from(source.materialize(start, len));
        if !full {
            bucket.candidate = Some(fresh.clone());
        }
        fresh
    }

    /// Interns a whole string.
    pub fn intern(&mut self, text: &str) -> Rc<str> {
        let mut src = text;
        self.substring_cached(&mut src, 0, text.len())
    }

    /// Splits `text` on `delim`, producing each segment through the cache.
    ///
    /// Two passes like [`Span::split`](crate::Span::split): count first,
    /// then fill an exactly-sized vector. Repeated segments (think CSV
    /// column values) come back as shared instances once promoted.
    pub fn split_interned(
        &mut self,
        text: &str,
        delim: char,
        remove_empty: bool,
    ) -> Vec<Rc<str>> {
        let count = if remove_empty {
            let mut count = 0;
            let mut prev_was_delim = true;
            for ch in text.chars() {
                if ch == delim {
                    prev_was_delim = true;
                } else {
                    if prev_was_delim {
                        count += 1;
                    }
                    prev_was_delim = false;
                }
            }
            count
        } else {
            1 + text.chars().filter(|&c| c == delim).count()
        };
        if count == 0 {
            return Vec::new();
        }

        let mut out = Vec::with_capacity(count);
        let mut src = text;
        let mut pos = 0;
        while out.len() < count {
            let idx = text[pos..].find(delim).map(|i| i + pos);
            let seg_len = match idx {
                Some(i) => i - pos,
                None => text.len() - pos,
            };
            if !remove_empty || seg_len != 0 {
                out.push(self.substring_cached(&mut src, pos, seg_len));
            }
            match idx {
                Some(i) => pos = i + delim.len_utf8(),
                None => break,
            }
        }
        out
    }

    /// Drops the whole table: candidates, promoted strings, everything.
    pub fn clear(&mut self) {
        self.buckets = None;
    }

    /// Lists every promoted string, newline-separated. Diagnostic aid.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(buckets) = &self.buckets {
            for bucket in buckets.iter() {
                for text in &bucket.list {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(text);
                }
            }
        }
        out
    }
}

impl Default for TextCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TextCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let promoted: usize = self
            .buckets
            .as_deref()
            .map(|buckets| buckets.iter().map(|b| b.list.len()).sum())
            .unwrap_or(0);
        f.debug_struct("TextCache")
            .field("promoted", &promoted)
            .finish()
    }
}

fn bucket_index(first: u8, last: u8, len: usize) -> usize {
    (first as usize * 0x2971 + last as usize * 0x3847 + len) % TABLE_SIZE
}

fn content_matches<S: CacheSource>(source: &mut S, start: usize, text: &str) -> bool {
    text.bytes()
        .enumerate()
        .all(|(i, byte)| source.byte_at(start + i) == byte)
}

/// Lowercases a string, borrowing when nothing needs to change.
///
/// Pure-ASCII text with no uppercase letters comes back borrowed; anything
/// else takes the full Unicode lowercasing path.
pub fn to_lower_fast(text: &str) -> Cow<'_, str> {
    let unchanged = text.bytes().all(|b| b.is_ascii() && !b.is_ascii_uppercase());
    if unchanged {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.to_lowercase())
    }
}
