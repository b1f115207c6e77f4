#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use textspan::{LazyBuffer, SpanReader};

fuzz_target!(|data: Vec<u8>| {
    // Line reading over arbitrary bytes: decode errors are fine, panics
    // are not, and whatever comes back must rejoin into decodable text.
    let mut reader = SpanReader::with_defaults(Cursor::new(data.clone()));
    let mut total = 0usize;
    loop {
        match reader.read_line() {
            Ok(Some(line)) => {
                total += line.len();
                if total > 1 << 20 {
                    break;
                }
            }
            Ok(None) | Err(_) => break,
        }
    }

    // The lazy buffer over the same bytes must agree with itself: indexed
    // reads then substring equals one-shot materialization.
    let mut lazy = LazyBuffer::from_stream(Cursor::new(data), None, true);
    if lazy.read_to_end().is_ok() {
        let len = lazy.len_read();
        if len > 0 {
            let _ = lazy.get(len - 1);
            let text = lazy.substring(0, len);
            assert_eq!(text.len(), len);
        }
    }
});
