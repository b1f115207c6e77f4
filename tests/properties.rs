// Property tests: optimized span operations must agree with the naive
// string operations. These stand in for runtime shadow assertions - the
// reference implementation runs here, in the test suite, not in release
// builds.

use quickcheck::{TestResult, quickcheck};
use textspan::{Span, SpanBuilder, TextCache};

quickcheck! {
    fn prop_substring_agrees_with_owned(text: String, start: usize, len: usize) -> TestResult {
        let start = if text.is_empty() { 0 } else { start % (text.len() + 1) };
        let len = if text.len() == start { 0 } else { len % (text.len() - start + 1) };
        if !text.is_char_boundary(start) || !text.is_char_boundary(start + len) {
            return TestResult::discard();
        }
        let span = Span::new(text.clone());
        TestResult::from_bool(span.substring(start, len).to_string() == text[start..start + len])
    }

    fn prop_split_keep_empty_roundtrips(text: String) -> bool {
        let span = Span::new(text.clone());
        let parts: Vec<String> = span.split(',', false).iter().map(|s| s.to_string()).collect();
        parts.join(",") == text
    }

    fn prop_parse_agrees_with_std(digits: Vec<u8>) -> TestResult {
        if digits.is_empty() || digits.len() > 30 {
            return TestResult::discard();
        }
        let text: String = digits.iter().map(|d| char::from(b'0' + d % 10)).collect();
        let span = Span::new(text.clone());
        TestResult::from_bool(span.try_parse_u64() == text.parse::<u64>().ok())
    }

    fn prop_trim_agrees_with_std(text: String) -> bool {
        Span::new(text.clone()).trim().to_string() == text.trim()
    }

    fn prop_replace_agrees_with_std(text: String) -> bool {
        Span::new(text.clone()).replace('a', 'b').to_string() == text.replace('a', "b")
    }

    fn prop_hash_is_content_only(text: String) -> bool {
        let mut builder = SpanBuilder::default();
        let arena = builder.push_str(&text);
        let owned = Span::new(text);
        arena == owned && arena.content_hash() == owned.content_hash()
    }

    fn prop_concat_all_agrees(parts: Vec<String>) -> bool {
        let spans: Vec<Span> = parts.iter().map(|p| Span::new(p.clone())).collect();
        Span::concat_all(&spans).to_string() == parts.concat()
    }

    fn prop_cache_preserves_content(tokens: Vec<String>) -> bool {
        let mut cache = TextCache::new();
        tokens.iter().all(|t| &*cache.intern(t) == t.as_str())
    }
}
