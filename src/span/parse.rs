//! Numeric parsing over spans.
//!
//! Digit-by-digit accumulation with an overflow check before every
//! multiply-add. The value is reset to zero on overflow; nothing partial
//! leaks out. A non-digit after at least one digit ends the parse
//! successfully, so `"12px"` parses as 12 - the leading-digit-run
//! convention of tokenizers that slice numbers out of larger text.
//!
//! The `try_parse_*` forms are the hot path and report failure as `None`;
//! the `parse_*` forms wrap them with [`Error::Format`] for callers that
//! treat malformed text as fatal.

use super::Span;
use crate::error::Error;

impl Span {
    /// Parses a leading run of decimal digits as `u64`.
    ///
    /// Fails on an empty span, a non-digit first byte, or overflow.
    ///
    /// # Example
    ///
    /// ```
    /// use textspan::Span;
    ///
    /// assert_eq!(Span::new("18446744073709551615").try_parse_u64(), Some(u64::MAX));
    /// assert_eq!(Span::new("18446744073709551616").try_parse_u64(), None);
    /// assert_eq!(Span::new("12px").try_parse_u64(), Some(12));
    /// assert_eq!(Span::new("px").try_parse_u64(), None);
    /// ```
    pub fn try_parse_u64(&self) -> Option<u64> {
        let bytes = self.as_bytes();
        if bytes.is_empty() {
            return None;
        }

        let mut value: u64 = 0;
        let mut consumed = 0usize;
        for &byte in bytes {
            let digit = byte.wrapping_sub(b'0');
            if digit > 9 {
                if consumed == 0 {
                    return None;
                }
                return Some(value);
            }
            if value > u64::MAX / 10 {
                return None;
            }
            if u64::MAX - value * 10 < u64::from(digit) {
                return None;
            }
            value = value * 10 + u64::from(digit);
            consumed += 1;
        }
        Some(value)
    }

    /// Parses an optionally-negated run of decimal digits as `i64`.
    ///
    /// The magnitude of `i64::MIN` exceeds `i64::MAX`, so it cannot take
    /// the negate-the-positive route and is special-cased.
    ///
    /// # Example
    ///
    /// ```
    /// use textspan::Span;
    ///
    /// assert_eq!(Span::new("-9223372036854775808").try_parse_i64(), Some(i64::MIN));
    /// assert_eq!(Span::new("-9223372036854775809").try_parse_i64(), None);
    /// ```
    pub fn try_parse_i64(&self) -> Option<i64> {
        if self.is_empty() {
            return None;
        }
        if self.as_bytes()[0] == b'-' {
            let magnitude = self.substring_from(1).try_parse_u64()?;
            if magnitude == i64::MIN.unsigned_abs() {
                return Some(i64::MIN);
            }
            if magnitude > i64::MAX as u64 {
                return None;
            }
            Some(-(magnitude as i64))
        } else {
            let value = self.try_parse_u64()?;
            if value > i64::MAX as u64 {
                return None;
            }
            Some(value as i64)
        }
    }

    /// Parses a leading digit run as `u32`; fails if it exceeds `u32`.
    pub fn try_parse_u32(&self) -> Option<u32> {
        let value = self.try_parse_u64()?;
        u32::try_from(value).ok()
    }

    /// Parses an optionally-negated digit run as `i32`; fails on range
    /// overflow.
    pub fn try_parse_i32(&self) -> Option<i32> {
        let value = self.try_parse_i64()?;
        i32::try_from(value).ok()
    }

    /// Like [`Span::try_parse_u64`] but failing with [`Error::Format`].
    pub fn parse_u64(&self) -> Result<u64, Error> {
        self.try_parse_u64().ok_or(Error::Format {
            message: "not an unsigned decimal integer",
        })
    }

    /// Like [`Span::try_parse_i64`] but failing with [`Error::Format`].
    pub fn parse_i64(&self) -> Result<i64, Error> {
        self.try_parse_i64().ok_or(Error::Format {
            message: "not a signed decimal integer",
        })
    }

    /// Like [`Span::try_parse_u32`] but failing with [`Error::Format`].
    pub fn parse_u32(&self) -> Result<u32, Error> {
        self.try_parse_u32().ok_or(Error::Format {
            message: "not an unsigned 32-bit decimal integer",
        })
    }

    /// Like [`Span::try_parse_i32`] but failing with [`Error::Format`].
    pub fn parse_i32(&self) -> Result<i32, Error> {
        self.try_parse_i32().ok_or(Error::Format {
            message: "not a signed 32-bit decimal integer",
        })
    }
}
