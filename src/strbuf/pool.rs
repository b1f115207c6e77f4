//! Thread-local scratch-buffer pool.

use std::cell::{Cell, RefCell};

/// Initial capacity for pooled scratch buffers.
pub const DEFAULT_STRBUF_CAPACITY: usize = 1024;

/// Maximum number of scratch buffers kept per thread.
pub const MAX_POOL_SIZE: usize = 4;

// Thread-local free list plus the retention predicate consulted on release.
thread_local! {
    static POOL: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    static KEEP: Cell<fn(&String) -> bool> = const { Cell::new(default_keep) };
}

fn default_keep(buf: &String) -> bool {
    buf.capacity() <= DEFAULT_STRBUF_CAPACITY * 2
}

/// Replaces this thread's "worth keeping" predicate.
///
/// The predicate sees each buffer as it is released and decides whether it
/// returns to the pool; the default rejects buffers that grew past twice
/// the initial capacity.
pub fn set_keep_predicate(keep: fn(&String) -> bool) {
    KEEP.with(|k| k.set(keep));
}

/// Restores the default retention predicate on this thread.
pub fn reset_keep_predicate() {
    KEEP.with(|k| k.set(default_keep));
}

/// Drops every pooled buffer on this thread.
///
/// Call when a thread is repurposed between unrelated sessions so scratch
/// state cannot leak across them.
pub fn clear_pool() {
    POOL.with(|pool| pool.borrow_mut().clear());
}

pub(crate) fn take_buffer() -> String {
    POOL.with(|pool| pool.borrow_mut().pop())
        .unwrap_or_else(|| String::with_capacity(DEFAULT_STRBUF_CAPACITY))
}

pub(crate) fn release_buffer(mut buf: String) {
    if !KEEP.with(|k| k.get())(&buf) {
        return;
    }
    buf.clear();
    POOL.with(|pool| {
        let mut pool = pool.borrow_mut();
        if pool.len() < MAX_POOL_SIZE {
            pool.push(buf);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_release_reuses_capacity() {
        clear_pool();
        let mut buf = take_buffer();
        buf.push_str("some content");
        let grown = buf.capacity();
        release_buffer(buf);

        let reused = take_buffer();
        assert!(reused.is_empty());
        assert_eq!(reused.capacity(), grown);
        clear_pool();
    }

    #[test]
    fn test_pool_is_bounded() {
        clear_pool();
        for _ in 0..8 {
            release_buffer(String::with_capacity(16));
        }
        let held = POOL.with(|pool| pool.borrow().len());
        assert!(held <= MAX_POOL_SIZE);
        clear_pool();
    }

    #[test]
    fn test_keep_predicate_rejects() {
        clear_pool();
        set_keep_predicate(|_| false);
        release_buffer(String::with_capacity(16));
        let held = POOL.with(|pool| pool.borrow().len());
        reset_keep_predicate();
        assert_eq!(held, 0);
    }
}
