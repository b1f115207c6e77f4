// Integration tests for TextCache
// Tests cover: two-sighting promotion, bucket saturation, source
// polymorphism, session isolation via clear()

use std::rc::Rc;

use textspan::{LazyBuffer, Span, StrBuf, TextCache};

// ============================================================================
// Promotion Protocol
// ============================================================================

#[test]
fn test_identity_converges_from_second_sighting() {
    let mut cache = TextCache::new();
    let mut src = "header header header header";

    let sightings: Vec<Rc<str>> = (0..4)
        .map(|i| cache.substring_cached(&mut src, i * 7, 6))
        .collect();

    for s in &sightings {
        assert_eq!(&**s, "header", "content must be correct on every call");
    }
    assert!(
        Rc::ptr_eq(&sightings[1], &sightings[2]),
        "second sighting onward must share one canonical instance"
    );
    assert!(Rc::ptr_eq(&sightings[2], &sightings[3]));
}

#[test]
fn test_independent_caches_do_not_share() {
    let mut a = TextCache::new();
    let mut b = TextCache::new();
    a.intern("token");
    let from_a = a.intern("token");
    b.intern("token");
    let from_b = b.intern("token");
    assert!(!Rc::ptr_eq(&from_a, &from_b));
}

#[test]
fn test_one_off_substrings_are_not_retained() {
    let mut cache = TextCache::new();
    // Single sighting each: everything stays a candidate at most, and the
    // dump of promoted strings stays empty.
    for token in ["alpha", "beta", "gamma"] {
        cache.intern(token);
    }
    assert_eq!(cache.dump(), "");
}

// ============================================================================
// Bucket Saturation
// ============================================================================

#[test]
fn test_sixth_content_in_a_bucket_is_never_cached() {
    let mut cache = TextCache::new();
    // All "nXm" strings share (first byte, last byte, length) and so the
    // bucket.
    for token in ["n1m", "n2m", "n3m", "n4m", "n5m"] {
        cache.intern(token);
        let first = cache.intern(token);
        let second = cache.intern(token);
        assert!(Rc::ptr_eq(&first, &second), "{token} should promote");
    }

    let r1 = cache.intern("n6m");
    let r2 = cache.intern("n6m");
    assert_eq!(&*r1, "n6m", "content stays correct after saturation");
    assert!(
        !Rc::ptr_eq(&r1, &r2),
        "a saturated bucket must return fresh uncached instances"
    );

    // Existing promotions still hit.
    let hit1 = cache.intern("n3m");
    let hit2 = cache.intern("n3m");
    assert!(Rc::ptr_eq(&hit1, &hit2));
}

// ============================================================================
// Source Polymorphism
// ============================================================================

#[test]
fn test_all_sources_feed_one_table() {
    let mut cache = TextCache::new();

    let span = Span::new("mixed");
    let mut buf = StrBuf::take();
    buf.append_str("mixed");
    let mut lazy = LazyBuffer::from_string("mixed".to_owned());
    let mut plain = "mixed";

    let r1 = cache.substring_cached(&mut &span, 0, 5);
    let r2 = cache.substring_cached(&mut &buf, 0, 5);
    let r3 = cache.substring_cached(&mut lazy, 0, 5);
    let r4 = cache.substring_cached(&mut plain, 0, 5);

    assert!(Rc::ptr_eq(&r1, &r2));
    assert!(Rc::ptr_eq(&r2, &r3));
    assert!(Rc::ptr_eq(&r3, &r4));
}

#[test]
fn test_split_interned_dedupes_columns() {
    let mut cache = TextCache::new();
    let mut all = Vec::new();
    for _ in 0..3 {
        all.push(cache.split_interned("GET,/index,200", ',', false));
    }
    // Third row's columns are canonical instances shared with the second.
    for col in 0..3 {
        assert!(Rc::ptr_eq(&all[1][col], &all[2][col]));
    }
}

// ============================================================================
// Session Isolation
// ============================================================================

#[test]
fn test_clear_isolates_sessions() {
    let mut cache = TextCache::new();
    cache.intern("session-token");
    let promoted = cache.intern("session-token");

    cache.clear();

    // A fresh session must not observe the previous session's instances.
    cache.intern("session-token");
    let second_session = cache.intern("session-token");
    assert!(!Rc::ptr_eq(&promoted, &second_session));
    assert_eq!(&*second_session, "session-token");
}
