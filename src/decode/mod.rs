//! Byte-stream decoding into UTF-8 text.
//!
//! - [`Encoding`] - the BOM-detectable encodings this crate understands
//! - `Decoder` - incremental per-encoding decode state, safe to feed
//!   arbitrary chunk boundaries
//! - `StreamDecoder` - pulls from a [`Read`] source, handles preamble
//!   verification and one-shot BOM auto-detection, and buffers decoded
//!   text for its consumer
//!
//! Malformed input is an error, not a replacement character: a decode
//! failure means the source is not text under the active encoding, and
//! silently papering over that corrupts downstream token content.

use std::io::Read;

use bytes::{Buf, BytesMut};

use crate::error::Error;

/// A text encoding with BOM-based detection support.
///
/// This is deliberately a handful of common encodings, not a general
/// transcoding layer: UTF-8, both UTF-16 byte orders, and Latin-1 for
/// byte-per-char legacy sources (which has no mark to detect).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Encoding {
    /// UTF-8, optionally preceded by EF BB BF.
    Utf8,
    /// UTF-16 little-endian, optionally preceded by FF FE.
    Utf16Le,
    /// UTF-16 big-endian, optionally preceded by FE FF.
    Utf16Be,
    /// ISO-8859-1: every byte is the scalar value U+0000..=U+00FF.
    Latin1,
}

impl Encoding {
    /// Returns the encoding's byte-order mark, empty if it has none.
    pub fn preamble(&self) -> &'static [u8] {
        match self {
            Encoding::Utf8 => &[0xEF, 0xBB, 0xBF],
            Encoding::Utf16Le => &[0xFF, 0xFE],
            Encoding::Utf16Be => &[0xFE, 0xFF],
            Encoding::Latin1 => &[],
        }
    }

    /// Upper bound on UTF-8 output bytes for `bytes` input bytes. Used to
    /// pre-size arenas before draining a source of known length.
    pub(crate) fn worst_case_utf8_len(&self, bytes: usize) -> usize {
        match self {
            Encoding::Utf8 => bytes,
            // A 2-byte BMP unit can widen to 3 UTF-8 bytes; surrogate
            // pairs (4 bytes) stay at 4.
            Encoding::Utf16Le | Encoding::Utf16Be => bytes.saturating_mul(2),
            Encoding::Latin1 => bytes.saturating_mul(2),
        }
    }
}

enum DecodeState {
    Utf8 {
        pending: [u8; 4],
        len: usize,
    },
    Utf16 {
        big_endian: bool,
        lead: Option<u8>,
        high: Option<u16>,
    },
    Latin1,
}

/// Incremental decoder: accepts input split at arbitrary byte boundaries
/// and carries partial sequences across calls.
pub(crate) struct Decoder {
    encoding: Encoding,
    state: DecodeState,
}

impl Decoder {
    pub(crate) fn new(encoding: Encoding) -> Self {
        let state = match encoding {
            Encoding::Utf8 => DecodeState::Utf8 {
                pending: [0; 4],
                len: 0,
            },
            Encoding::Utf16Le => DecodeState::Utf16 {
                big_endian: false,
                lead: None,
                high: None,
            },
            Encoding::Utf16Be => DecodeState::Utf16 {
                big_endian: true,
                lead: None,
                high: None,
            },
            Encoding::Latin1 => DecodeState::Latin1,
        };
        Self { encoding, state }
    }

    pub(crate) fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Decodes `input`, appending the text to `out`. Bytes that end
    /// mid-sequence are carried to the next call.
    pub(crate) fn decode(&mut self, input: &[u8], out: &mut String) -> Result<(), Error> {
        match &mut self.state {
            DecodeState::Utf8 { pending, len } => {
                let mut input = input;
                if *len > 0 {
                    let needed = utf8_seq_len(pending[0]);
                    while *len < needed && !input.is_empty() {
                        pending[*len] = input[0];
                        *len += 1;
                        input = &input[1..];
                    }
                    if *len < needed {
                        return Ok(());
                    }
                    match std::str::from_utf8(&pending[..needed]) {
                        Ok(s) => out.push_str(s),
                        Err(_) => {
                            return Err(Error::Decode {
                                message: "invalid utf-8 sequence",
                            });
                        }
                    }
                    *len = 0;
                }
                match std::str::from_utf8(input) {
                    Ok(s) => out.push_str(s),
                    Err(e) if e.error_len().is_some() => {
                        return Err(Error::Decode {
                            message: "invalid utf-8 sequence",
                        });
                    }
                    Err(e) => {
                        let (head, tail) = input.split_at(e.valid_up_to());
                        if let Ok(s) = std::str::from_utf8(head) {
                            out.push_str(s);
                        }
                        pending[..tail.len()].copy_from_slice(tail);
                        *len = tail.len();
                    }
                }
                Ok(())
            }
            DecodeState::Utf16 {
                big_endian,
                lead,
                high,
            } => {
                for &byte in input {
                    let unit = match lead.take() {
                        None => {
                            *lead = Some(byte);
                            continue;
                        }
                        Some(first) => {
                            if *big_endian {
                                u16::from(first) << 8 | u16::from(byte)
                            } else {
                                u16::from(byte) << 8 | u16::from(first)
                            }
                        }
                    };
                    if let Some(h) = high.take() {
                        if (0xDC00..=0xDFFF).contains(&unit) {
                            let cp = 0x10000
                                + ((u32::from(h) - 0xD800) << 10)
                                + (u32::from(unit) - 0xDC00);
                            match char::from_u32(cp) {
                                Some(ch) => out.push(ch),
                                None => {
                                    return Err(Error::Decode {
                                        message: "invalid utf-16 code point",
                                    });
                                }
                            }
                        } else {
                            return Err(Error::Decode {
                                message: "unpaired utf-16 high surrogate",
                            });
                        }
                    } else if (0xD800..=0xDBFF).contains(&unit) {
                        *high = Some(unit);
                    } else if (0xDC00..=0xDFFF).contains(&unit) {
                        return Err(Error::Decode {
                            message: "unpaired utf-16 low surrogate",
                        });
                    } else {
                        match char::from_u32(u32::from(unit)) {
                            Some(ch) => out.push(ch),
                            None => {
                                return Err(Error::Decode {
                                    message: "invalid utf-16 code point",
                                });
                            }
                        }
                    }
                }
                Ok(())
            }
            DecodeState::Latin1 => {
                for &byte in input {
                    out.push(char::from(byte));
                }
                Ok(())
            }
        }
    }

    /// Signals end of stream. A sequence cut off mid-character means the
    /// source was truncated.
    pub(crate) fn finish(&mut self, _out: &mut String) -> Result<(), Error> {
        match &self.state {
            DecodeState::Utf8 { len, .. } if *len > 0 => Err(Error::Decode {
                message: "truncated utf-8 sequence at end of stream",
            }),
            DecodeState::Utf16 { lead, high, .. } if lead.is_some() || high.is_some() => {
                Err(Error::Decode {
                    message: "truncated utf-16 sequence at end of stream",
                })
            }
            _ => Ok(()),
        }
    }
}

fn utf8_seq_len(lead: u8) -> usize {
    if lead < 0xC0 {
        1
    } else if lead < 0xE0 {
        2
    } else if lead < 0xF0 {
        3
    } else if lead < 0xF8 {
        4
    } else {
        1
    }
}

/// Buffered decoding front-end over a [`Read`] source.
///
/// Owns the raw byte buffer, the preamble/BOM handshake and a buffer of
/// decoded-but-unconsumed text. `LazyBuffer` and `SpanReader` both sit on
/// top of this.
pub(crate) struct StreamDecoder<R> {
    reader: R,
    decoder: Decoder,
    bytes: BytesMut,
    decoded: String,
    pos: usize,
    buffer_size: usize,
    check_preamble: bool,
    preamble_pos: usize,
    detect: bool,
    eof: bool,
}

impl<R: Read> StreamDecoder<R> {
    pub(crate) fn new(reader: R, encoding: Encoding, detect_bom: bool, buffer_size: usize) -> Self {
        Self {
            reader,
            decoder: Decoder::new(encoding),
            bytes: BytesMut::new(),
            decoded: String::new(),
            pos: 0,
            buffer_size,
            check_preamble: !encoding.preamble().is_empty(),
            preamble_pos: 0,
            detect: detect_bom,
            eof: false,
        }
    }

    pub(crate) fn encoding(&self) -> Encoding {
        self.decoder.encoding()
    }

    pub(crate) fn is_eof(&self) -> bool {
        self.eof
    }

    /// Decoded text not yet consumed.
    pub(crate) fn available(&self) -> &str {
        &self.decoded[self.pos..]
    }

    pub(crate) fn consume(&mut self, n: usize) {
        debug_assert!(self.decoded.is_char_boundary(self.pos + n));
        self.pos += n;
    }

    /// Reads and decodes until at least one new char is available or the
    /// source ends. Returns the number of text bytes added.
    pub(crate) fn refill(&mut self) -> Result<usize, Error> {
        if self.pos == self.decoded.len() {
            self.decoded.clear();
        } else {
            self.decoded.drain(..self.pos);
        }
        self.pos = 0;

        let before = self.decoded.len();
        while self.decoded.len() == before && !self.eof {
            let old = self.bytes.len();
            self.bytes.resize(old + self.buffer_size, 0);
            let n = self.reader.read(&mut self.bytes[old..])?;
            self.bytes.truncate(old + n);

            if n == 0 {
                self.eof = true;
                // A partial preamble match at EOF is ordinary content.
                if !self.bytes.is_empty() {
                    let input = self.bytes.split();
                    self.decoder.decode(&input, &mut self.decoded)?;
                }
                self.decoder.finish(&mut self.decoded)?;
                break;
            }

            if self.check_preamble && !self.consume_preamble() {
                // Preamble undecided; buffer more bytes before decoding.
                continue;
            }
            if self.detect && self.bytes.len() >= 2 {
                self.detect_encoding();
            }
            if !self.bytes.is_empty() {
                let input = self.bytes.split();
                self.decoder.decode(&input, &mut self.decoded)?;
            }
        }
        Ok(self.decoded.len() - before)
    }

    pub(crate) fn peek_char(&mut self) -> Result<Option<char>, Error> {
        if self.available().is_empty() && self.refill()? == 0 {
            return Ok(None);
        }
        Ok(self.available().chars().next())
    }

    pub(crate) fn next_char(&mut self) -> Result<Option<char>, Error> {
        match self.peek_char()? {
            Some(ch) => {
                self.pos += ch.len_utf8();
                Ok(Some(ch))
            }
            None => Ok(None),
        }
    }

    /// Decodes every raw byte already buffered under the current encoding,
    /// without touching the reader. A trailing partial sequence is
    /// discarded with the decoder. Used when switching encodings
    /// mid-stream.
    pub(crate) fn drain_buffered(&mut self) -> Result<(), Error> {
        if !self.bytes.is_empty() {
            let input = self.bytes.split();
            self.decoder.decode(&input, &mut self.decoded)?;
        }
        Ok(())
    }

    /// Takes all decoded-but-unconsumed text out of the buffer.
    pub(crate) fn take_decoded(&mut self) -> String {
        let tail = self.decoded.split_off(self.pos);
        self.decoded.clear();
        self.pos = 0;
        tail
    }

    pub(crate) fn into_reader(self) -> R {
        self.reader
    }

    /// Byte-by-byte preamble verification with cross-refill progress.
    /// Returns false while more bytes are needed to decide.
    fn consume_preamble(&mut self) -> bool {
        let preamble = self.decoder.encoding().preamble();
        let limit = preamble.len().min(self.bytes.len());
        while self.preamble_pos < limit {
            if self.bytes[self.preamble_pos] != preamble[self.preamble_pos] {
                // First mismatch: there is no preamble, the bytes are
                // content.
                self.preamble_pos = 0;
                self.check_preamble = false;
                return true;
            }
            self.preamble_pos += 1;
        }
        if self.preamble_pos == preamble.len() {
            self.bytes.advance(preamble.len());
            self.preamble_pos = 0;
            self.check_preamble = false;
            self.detect = false;
            return true;
        }
        false
    }

    /// One-shot BOM sniff, performed on the first refill that buffers at
    /// least two bytes.
    fn detect_encoding(&mut self) {
        if self.bytes.len() < 2 {
            return;
        }
        self.detect = false;
        if self.bytes[0] == 0xFE && self.bytes[1] == 0xFF {
            self.switch_encoding(Encoding::Utf16Be, 2);
        } else if self.bytes[0] == 0xFF && self.bytes[1] == 0xFE {
            // FF FE 00 00 would be a UTF-32 LE mark; unsupported, so only
            // claim UTF-16 when the next two bytes rule that out.
            if self.bytes.len() < 4 || self.bytes[2] != 0 || self.bytes[3] != 0 {
                self.switch_encoding(Encoding::Utf16Le, 2);
            }
        } else if self.bytes.len() >= 3
            && self.bytes[0] == 0xEF
            && self.bytes[1] == 0xBB
            && self.bytes[2] == 0xBF
        {
            self.switch_encoding(Encoding::Utf8, 3);
        } else if self.bytes.len() == 2 {
            // Two bytes match no mark but could begin the UTF-8 one; keep
            // detection armed for the next refill.
            self.detect = true;
        }
    }

    fn switch_encoding(&mut self, encoding: Encoding, bom_len: usize) {
        self.bytes.advance(bom_len);
        self.decoder = Decoder::new(encoding);
    }
}
