// crates/geoindex-core/src/text.rs
//! Key normalization.
//!
//! Every segment of a compiled key goes through [`normalize`]: trimmed,
//! lower-cased and percent-encoded, so `"  Kyiv Oblast "` becomes
//! `"kyiv%20oblast"`. The output only ever holds `[a-z0-9]`, `%` and the
//! uppercase hex digits of escapes, which leaves every other byte free for
//! key glue.
//!
//! Input is percent-decoded first, so feeding an already normalized string
//! back in is a no-op.

use percent_encoding::{percent_decode_str, utf8_percent_encode, NON_ALPHANUMERIC};
use std::borrow::Cow;

/// `percent_encode(lowercase(trim(s)))`.
pub fn normalize(s: &str) -> String {
    let plain = decode(s);
    utf8_percent_encode(&plain.trim().to_lowercase(), NON_ALPHANUMERIC).to_string()
}

/// Inverse of the percent-encoding step. Invalid UTF-8 is replaced, never
/// rejected, so any phrase can be scored.
pub fn decode(s: &str) -> Cow<'_, str> {
    percent_decode_str(s).decode_utf8_lossy()
}

/// Non-overlapping occurrences of `needle` in `haystack`.
#[inline]
pub(crate) fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        0
    } else {
        haystack.matches(needle).count()
    }
}
