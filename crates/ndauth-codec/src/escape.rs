//! Percent-escaping for query string keys and values.
//!
//! RFC 3986 reserves the general delimiters `:#[]@?/` and the sub-delimiters
//! `!$&'()*+,;=`. Section 3.4 allows `?` and `/` to appear unescaped in a
//! query so that a query can carry a URL; every other reserved character is
//! escaped. The result is ALPHA / DIGIT / `-._~?/` plus `%XX` triplets.
//!
//! The whole input is encoded in one pass.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Bytes that are escaped inside a query component.
pub const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'?')
    .remove(b'/');

/// Percent-escape a query string key or value.
pub fn escape(s: &str) -> String {
    utf8_percent_encode(s, QUERY_COMPONENT).to_string()
}

/// Decode `%XX` triplets once. Malformed triplets are kept literally and
/// invalid UTF-8 is replaced with U+FFFD.
///
/// `+` is left alone: query items are not form bodies.
pub fn unescape(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
