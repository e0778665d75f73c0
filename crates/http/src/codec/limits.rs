//! Resource bounds applied while decoding.
//!
//! Every byte the decoder buffers before it can make progress is bounded by
//! one of these limits, so a slow or hostile peer can't make it hold an
//! unbounded amount of memory.

/// Maximum size in bytes of a message head (start line and header fields).
pub const DEFAULT_MAX_HEADER_BYTES: usize = 64 * 1024;

/// Maximum size in bytes of a chunk-size line, a chunk delimiter or a trailer line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 8 * 1024;

/// Maximum number of body bytes moved in one decoding step.
pub const DEFAULT_MAX_STEP_BYTES: usize = 8 * 1024;

/// Limits used by [`MessageDecoder`](crate::codec::MessageDecoder).
///
/// ```
/// use intercept_http::codec::DecoderLimits;
///
/// let limits = DecoderLimits::default().with_max_header_bytes(16 * 1024);
/// assert_eq!(limits.max_header_bytes(), 16 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderLimits {
    max_header_bytes: usize,
    max_line_bytes: usize,
    max_step_bytes: usize,
}

impl DecoderLimits {
    /// Bounds the head, and also the whole trailer section of a chunked body.
    #[must_use]
    pub fn with_max_header_bytes(mut self, max_header_bytes: usize) -> Self {
        self.max_header_bytes = max_header_bytes.max(1);
        self
    }

    #[must_use]
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes.max(1);
        self
    }

    #[must_use]
    pub fn with_max_step_bytes(mut self, max_step_bytes: usize) -> Self {
        self.max_step_bytes = max_step_bytes.max(1);
        self
    }

    pub fn max_header_bytes(&self) -> usize {
        self.max_header_bytes
    }

    pub fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }

    pub fn max_step_bytes(&self) -> usize {
        self.max_step_bytes
    }
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self {
            max_header_bytes: DEFAULT_MAX_HEADER_BYTES,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            max_step_bytes: DEFAULT_MAX_STEP_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_limits_are_raised_to_one() {
        let limits = DecoderLimits::default().with_max_line_bytes(0).with_max_step_bytes(0);
        assert_eq!(limits.max_line_bytes(), 1);
        assert_eq!(limits.max_step_bytes(), 1);
        assert_eq!(limits.max_header_bytes(), DEFAULT_MAX_HEADER_BYTES);
    }
}
