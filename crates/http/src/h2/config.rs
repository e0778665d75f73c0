//! Settings for the HTTP/2 translation and frame codec.

/// Frame payload size every peer must accept (RFC 9113 §4.2).
pub const DEFAULT_MAX_FRAME_SIZE: usize = 16 * 1024;

/// Largest frame payload size that can be negotiated.
pub const MAX_ALLOWED_FRAME_SIZE: usize = (1 << 24) - 1;

/// Maximum size in bytes of one header block, before HPACK decoding.
pub const DEFAULT_MAX_HEADER_LIST_BYTES: usize = 64 * 1024;

/// Scheme used for `:scheme` when a request target doesn't carry one.
pub const DEFAULT_SCHEME: &str = "https";

/// Configuration shared by [`to_http2_headers`](crate::h2::to_http2_headers),
/// the outbound framing and the frame codec.
///
/// ```
/// use intercept_http::h2::Http2Config;
///
/// let config = Http2Config::default().with_default_scheme("http").with_max_frame_size(32 * 1024);
/// assert_eq!(config.default_scheme(), "http");
/// assert_eq!(config.max_frame_size(), 32 * 1024);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Http2Config {
    default_scheme: String,
    max_frame_size: usize,
    max_header_list_bytes: usize,
}

impl Http2Config {
    pub fn with_default_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.default_scheme = scheme.into();
        self
    }

    /// Sets the frame payload bound, kept within the range RFC 9113 allows.
    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size.clamp(DEFAULT_MAX_FRAME_SIZE, MAX_ALLOWED_FRAME_SIZE);
        self
    }

    pub fn with_max_header_list_bytes(mut self, bytes: usize) -> Self {
        self.max_header_list_bytes = bytes.max(1);
        self
    }

    pub fn default_scheme(&self) -> &str {
        &self.default_scheme
    }

    pub fn max_frame_size(&self) -> usize {
        self.max_frame_size
    }

    pub fn max_header_list_bytes(&self) -> usize {
        self.max_header_list_bytes
    }
}

impl Default for Http2Config {
    fn default() -> Self {
        Self {
            default_scheme: DEFAULT_SCHEME.to_owned(),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            max_header_list_bytes: DEFAULT_MAX_HEADER_LIST_BYTES,
        }
    }
}
