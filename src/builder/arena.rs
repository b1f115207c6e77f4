//! Fixed-capacity append-only text page.
//!
//! An [`ArenaBuf`] is a heap buffer whose capacity never changes after
//! allocation, written strictly front-to-back behind a watermark. Spans hold
//! `Rc<ArenaBuf>` and read ranges below the watermark; the builder appends at
//! the watermark. Because the capacity is fixed, the storage never moves, and
//! because the watermark only advances, a published range is never written
//! again. Those two invariants are what make the single `unsafe` read below
//! sound.
//!
//! The buffer is single-threaded (`Rc`-shared, no `Sync`), so watermark reads
//! and writes cannot race.

use std::cell::{Cell, UnsafeCell};

pub(crate) struct ArenaBuf {
    data: Box<[UnsafeCell<u8>]>,
    used: Cell<usize>,
}

impl ArenaBuf {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let data = std::iter::repeat_with(|| UnsafeCell::new(0))
            .take(capacity)
            .collect();
        Self {
            data,
            used: Cell::new(0),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    pub(crate) fn used(&self) -> usize {
        self.used.get()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.data.len() - self.used.get()
    }

    /// Copies `bytes` in at the watermark and advances it. Returns the start
    /// offset of the written range.
    ///
    /// # Panics
    ///
    /// Panics if the page cannot hold `bytes`; callers go through
    /// `SpanBuilder::ensure_space` first.
    pub(crate) fn append(&self, bytes: &[u8]) -> usize {
        let start = self.used.get();
        assert!(
            bytes.len() <= self.data.len() - start,
            "arena page overflow: {} bytes into {} remaining",
            bytes.len(),
            self.data.len() - start,
        );
        // SAFETY: the target range [start, start + len) is at or above the
        // watermark, so no shared reference handed out by `str_at` can
        // overlap it, and `UnsafeCell` permits writing through a shared
        // reference. The range is in bounds per the assert above.
        unsafe {
            let dst = UnsafeCell::raw_get(self.data.as_ptr().add(start));
            std::ptr::copy_nonoverlapping(bytes.as_ptr(), dst, bytes.len());
        }
        self.used.set(start + bytes.len());
        start
    }

    /// Returns the published text at `[start, start + len)`.
    ///
    /// # Safety
    ///
    /// `start + len` must be at or below the watermark, and the range must
    /// have been written as (and sliced on boundaries of) valid UTF-8. Both
    /// hold for every range the builder hands to a `Span`, and `Span`
    /// substring operations re-check boundaries against the derived `&str`.
    pub(crate) unsafe fn str_at(&self, start: usize, len: usize) -> &str {
        debug_assert!(start + len <= self.used.get());
        // SAFETY: the range is below the watermark, so it is initialized and
        // will never be written again; the returned reference therefore
        // points to memory that is immutable for its lifetime. UTF-8
        // validity is the caller's contract.
        unsafe {
            let ptr = self.data.as_ptr().cast::<u8>().add(start);
            let bytes = std::slice::from_raw_parts(ptr, len);
            std::str::from_utf8_unchecked(bytes)
        }
    }

    /// Moves the watermark back to zero so the page can be refilled.
    ///
    /// Callers must hold the only `Rc` to this page (checked by the builder
    /// with `Rc::strong_count`): rewinding while a span still references the
    /// page would let `append` overwrite published text.
    pub(crate) fn rewind(&self) {
        self.used.set(0);
    }
}

impl std::fmt::Debug for ArenaBuf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaBuf")
            .field("capacity", &self.data.len())
            .field("used", &self.used.get())
            .finish()
    }
}
