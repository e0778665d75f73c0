//! Structural check of an HPACK header block.
//!
//! Walks every field representation and validates its prefixed integers and
//! string lengths before the block reaches the HPACK decoder, which aborts on
//! a malformed dynamic table size update instead of returning an error.

use crate::h2::error::{ErrorCode, Http2Error};

/// Longest integer accepted, prefix octet included.
const MAX_INTEGER_OCTETS: usize = 5;

pub(crate) fn check_block(mut block: &[u8]) -> Result<(), Http2Error> {
    while let Some(&first) = block.first() {
        block = match first {
            // indexed field
            b if b & 0x80 == 0x80 => integer(block, 7)?.1,
            // literal with incremental indexing
            b if b & 0xC0 == 0x40 => literal(block, 6)?,
            b if b & 0xE0 == 0x20 => integer(block, 5)
                .map_err(|e| compression_error(format!("bad dynamic table size update: {}", e.reason())))?
                .1,
            // literal without indexing, or never indexed
            _ => literal(block, 4)?,
        };
    }
    Ok(())
}

fn literal(block: &[u8], prefix: u32) -> Result<&[u8], Http2Error> {
    let (index, rest) = integer(block, prefix)?;
    let rest = if index == 0 { string(rest)? } else { rest };
    string(rest)
}

fn string(block: &[u8]) -> Result<&[u8], Http2Error> {
    let (len, rest) = integer(block, 7)?;
    rest.get(len..).ok_or_else(|| compression_error(format!("string literal of {len} bytes runs past the block")))
}

fn integer(block: &[u8], prefix: u32) -> Result<(usize, &[u8]), Http2Error> {
    let mask = (1_u8 << prefix) - 1;
    let (&first, mut rest) = block.split_first().ok_or_else(|| compression_error("missing integer"))?;

    let mut value = usize::from(first & mask);
    if value < usize::from(mask) {
        return Ok((value, rest));
    }

    let mut shift = 0;
    for _ in 1..MAX_INTEGER_OCTETS {
        let (&byte, tail) = rest.split_first().ok_or_else(|| compression_error("integer runs past the block"))?;
        rest = tail;
        value += usize::from(byte & 0x7F) << shift;
        shift += 7;
        if byte & 0x80 == 0 {
            return Ok((value, rest));
        }
    }
    Err(compression_error(format!("integer longer than {MAX_INTEGER_OCTETS} octets")))
}

fn compression_error(reason: impl Into<String>) -> Http2Error {
    Http2Error::connection(ErrorCode::CompressionError, reason)
}
