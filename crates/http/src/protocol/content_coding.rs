//! Content codings of a message body.
//!
//! Decoders record the codings named by `Content-Encoding` as soon as they
//! read a head, see [`HttpMessage::content_codings`](crate::protocol::HttpMessage::content_codings).
//! The body itself stays as it was received. Undoing the codings is left to
//! [`HttpMessage::decoded_body`](crate::protocol::HttpMessage::decoded_body),
//! so a forwarded message keeps its original bytes.

use std::borrow::Cow;
use std::fmt;
use std::io::Read;

use flate2::read::{DeflateDecoder, MultiGzDecoder, ZlibDecoder};
use http::header::CONTENT_ENCODING;
use tracing::trace;

use crate::protocol::{ContentCodingError, HeaderFields};

const BROTLI_BUFFER_SIZE: usize = 4096;

/// One token of a `Content-Encoding` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ContentCoding {
    Gzip,
    Deflate,
    Brotli,
    Zstd,
    Identity,
    /// A coding this crate can't undo, kept with its original spelling.
    Other(String),
}

impl ContentCoding {
    pub fn parse(token: &str) -> Self {
        let token = token.trim();
        if token.eq_ignore_ascii_case("gzip") || token.eq_ignore_ascii_case("x-gzip") {
            Self::Gzip
        } else if token.eq_ignore_ascii_case("deflate") {
            Self::Deflate
        } else if token.eq_ignore_ascii_case("br") {
            Self::Brotli
        } else if token.eq_ignore_ascii_case("zstd") {
            Self::Zstd
        } else if token.eq_ignore_ascii_case("identity") {
            Self::Identity
        } else {
            Self::Other(token.to_owned())
        }
    }

    /// Every coding named by the `Content-Encoding` fields, in the order they
    /// were applied.
    pub fn from_headers(headers: &HeaderFields) -> Vec<Self> {
        headers
            .get_all(CONTENT_ENCODING)
            .flat_map(|value| value.split(','))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(Self::parse)
            .collect()
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Gzip => "gzip",
            Self::Deflate => "deflate",
            Self::Brotli => "br",
            Self::Zstd => "zstd",
            Self::Identity => "identity",
            Self::Other(name) => name,
        }
    }

    fn decode(&self, data: &[u8]) -> Result<Vec<u8>, ContentCodingError> {
        let mut out = Vec::with_capacity(data.len().saturating_mul(2));
        let result = match self {
            Self::Gzip => MultiGzDecoder::new(data).read_to_end(&mut out),
            Self::Deflate => match ZlibDecoder::new(data).read_to_end(&mut out) {
                Ok(read) => Ok(read),
                // raw deflate without the zlib wrapper is common enough
                Err(_) => {
                    out.clear();
                    DeflateDecoder::new(data).read_to_end(&mut out)
                }
            },
            Self::Brotli => brotli::Decompressor::new(data, BROTLI_BUFFER_SIZE).read_to_end(&mut out),
            Self::Zstd => zstd::stream::read::Decoder::new(data).and_then(|mut decoder| decoder.read_to_end(&mut out)),
            Self::Identity => {
                out.extend_from_slice(data);
                Ok(data.len())
            }
            Self::Other(name) => return Err(ContentCodingError::Unsupported { coding: name.clone() }),
        };

        result.map_err(|source| ContentCodingError::Corrupt { coding: self.to_string(), source })?;
        trace!(coding = %self, encoded_size = data.len(), decoded_size = out.len(), "decoded body");
        Ok(out)
    }
}

impl fmt::Display for ContentCoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Undoes `codings` on `body`, last applied first.
pub(crate) fn decode_body<'a>(codings: &[ContentCoding], body: &'a [u8]) -> Result<Cow<'a, [u8]>, ContentCodingError> {
    let mut decoded = Cow::Borrowed(body);
    for coding in codings.iter().rev() {
        if *coding != ContentCoding::Identity {
            decoded = Cow::Owned(coding.decode(&decoded)?);
        }
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use flate2::Compression;
    use flate2::write::{DeflateEncoder, GzEncoder, ZlibEncoder};

    const TEXT: &[u8] = b"the quick brown fox jumps over the lazy dog, twice: the quick brown fox";

    fn gzip(data: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    fn brotli(data: &[u8]) -> Vec<u8> {
        let mut writer = brotli::CompressorWriter::new(Vec::new(), BROTLI_BUFFER_SIZE, 5, 22);
        writer.write_all(data).unwrap();
        writer.into_inner()
    }

    #[test]
    fn codings_are_read_across_fields() {
        let headers: HeaderFields =
            [("Content-Encoding", "gzip, X-Custom"), ("content-encoding", " BR ")].into_iter().collect();

        let codings = ContentCoding::from_headers(&headers);
        assert_eq!(codings, vec![ContentCoding::Gzip, ContentCoding::Other("X-Custom".into()), ContentCoding::Brotli]);
        assert!(ContentCoding::from_headers(&HeaderFields::new()).is_empty());
    }

    #[test]
    fn each_supported_coding_is_undone() {
        let mut zlib = ZlibEncoder::new(Vec::new(), Compression::default());
        zlib.write_all(TEXT).unwrap();
        let mut raw = DeflateEncoder::new(Vec::new(), Compression::default());
        raw.write_all(TEXT).unwrap();

        let cases = [
            (ContentCoding::Gzip, gzip(TEXT)),
            (ContentCoding::Deflate, zlib.finish().unwrap()),
            (ContentCoding::Deflate, raw.finish().unwrap()),
            (ContentCoding::Brotli, brotli(TEXT)),
            (ContentCoding::Zstd, zstd::encode_all(TEXT, 3).unwrap()),
        ];
        for (coding, encoded) in cases {
            let decoded = decode_body(std::slice::from_ref(&coding), &encoded).unwrap();
            assert_eq!(&decoded[..], TEXT, "{coding}");
        }
    }

    #[test]
    fn stacked_codings_are_undone_in_reverse() {
        let encoded = brotli(&gzip(TEXT));
        let decoded = decode_body(&[ContentCoding::Gzip, ContentCoding::Identity, ContentCoding::Brotli], &encoded).unwrap();
        assert_eq!(&decoded[..], TEXT);
    }

    #[test]
    fn no_coding_borrows_the_body() {
        let decoded = decode_body(&[ContentCoding::Identity], TEXT).unwrap();
        assert!(matches!(decoded, Cow::Borrowed(_)));
    }

    #[test]
    fn unknown_and_corrupt_bodies_fail() {
        let e = decode_body(&[ContentCoding::parse("compress")], TEXT).unwrap_err();
        assert_eq!(e.to_string(), "unsupported content coding compress");

        let e = decode_body(&[ContentCoding::Gzip], TEXT).unwrap_err();
        assert!(matches!(e, ContentCodingError::Corrupt { ref coding, .. } if coding == "gzip"));
    }
}
