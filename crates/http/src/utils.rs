//! Utility macros and functions for the HTTP crate.
//!
//! This module provides helper macros and functions that are used internally
//! by the codec and the HTTP/2 translation layer.

use std::borrow::Cow;

use bytes::{BufMut, BytesMut};

/// A macro for early returns with an error if a condition is not met.
///
/// This is similar to the `assert!` macro, but returns an error instead of panicking.
/// It's useful for validation checks where you want to return early with an error
/// if some condition is not satisfied.
///
/// # Arguments
///
/// * `$predicate` - A boolean expression that should evaluate to true
/// * `$error` - The error value to return if the predicate is false
///
/// # Example
///
/// ```ignore
/// ensure!(src.len() <= max_size, ParseError::too_large_header(src.len(), max_size));
/// ```
macro_rules! ensure {
    ($predicate:expr, $error:expr) => {
        if !$predicate {
            return Err($error);
        }
    };
}

pub(crate) use ensure;

/// Decodes wire bytes as ISO-8859-1, one byte per char.
///
/// Header bytes are not guaranteed to be UTF-8. Mapping every byte to the char
/// with the same code point keeps them intact through a decode/encode cycle.
pub(crate) fn latin1_to_string(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Writes `text` back as ISO-8859-1 bytes.
///
/// Chars outside of the latin-1 range can only come from callers building
/// messages by hand; they are written as `?`.
pub(crate) fn put_latin1(dst: &mut BytesMut, text: &str) {
    dst.put_slice(&latin1_to_bytes(text));
}

/// Same as [`put_latin1`], for callers that need the bytes on their own.
pub(crate) fn latin1_to_bytes(text: &str) -> Cow<'_, [u8]> {
    if text.is_ascii() {
        return Cow::Borrowed(text.as_bytes());
    }
    Cow::Owned(text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect())
}

/// Case-insensitive substring search over ASCII.
pub(crate) fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.as_bytes();
    if needle.is_empty() {
        return true;
    }
    haystack.as_bytes().windows(needle.len()).any(|window| window.eq_ignore_ascii_case(needle))
}
