#![no_main]

use libfuzzer_sys::fuzz_target;
use textspan::{Span, TextCache};

fuzz_target!(|text: String| {
    let span = Span::new(text.clone());

    // Trim and split must agree with the naive string operations.
    assert_eq!(span.trim().to_string(), text.trim());

    let parts: Vec<String> = span
        .split(',', false)
        .iter()
        .map(|p| p.to_string())
        .collect();
    assert_eq!(parts.join(","), text);

    // Parsing must agree with std on all-digit inputs.
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        assert_eq!(span.try_parse_u64(), text.parse::<u64>().ok());
    }

    // Interning must never corrupt content, whatever the bucket pressure.
    let mut cache = TextCache::new();
    for piece in span.split(' ', true) {
        let interned = cache.substring_cached(&mut &piece, 0, piece.len());
        assert_eq!(&*interned, piece.as_str());
    }

    // Content hashing is backing-independent.
    let copied = Span::new(span.to_string());
    assert_eq!(span.content_hash(), copied.content_hash());
});
