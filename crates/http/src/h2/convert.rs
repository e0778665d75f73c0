//! Translation between HTTP/2 header blocks and [`HttpMessage`]s.
//!
//! Decoding builds an HTTP/1 shaped head from the pseudo-headers (an absolute
//! form target for requests, the `HTTP/2` version label) and copies the
//! regular fields. Encoding goes the other way and makes the field list fit
//! the HTTP/2 rules: lower-case names, no connection-specific fields, one
//! `cookie` field per cookie pair.

use http::header::{COOKIE, HOST, TRANSFER_ENCODING};
use http::uri::PathAndQuery;
use http::{Method, StatusCode, Uri, Version};
use tracing::trace;

use crate::h2::config::Http2Config;
use crate::h2::error::{ErrorCode, Http2Error};
use crate::h2::headers::{Http2Headers, PseudoHeaders};
use crate::protocol::{Head, HeaderFields, HttpMessage, RequestHead, ResponseHead};

/// Fields that only make sense on an HTTP/1 connection (RFC 9113 §8.2.2).
const CONNECTION_SPECIFIC_FIELDS: [&str; 5] = ["connection", "keep-alive", "proxy-connection", "transfer-encoding", "upgrade"];

/// Request methods whose message drops `Content-Length` instead of stating an
/// empty body.
const BODYLESS_METHODS: [Method; 5] = [Method::GET, Method::HEAD, Method::DELETE, Method::CONNECT, Method::TRACE];

/// The HTTP/2 side of a [`Head`].
pub trait Http2Head: Head {
    /// Whether a stream map receiving this half accepts `PUSH_PROMISE` frames.
    ///
    /// Only clients receive pushed streams.
    const ACCEPTS_PUSH_PROMISE: bool;

    /// Builds the head from the pseudo-headers received on `stream_id`.
    fn from_pseudo_headers(stream_id: u32, pseudo: &PseudoHeaders) -> Result<Self, Http2Error>;

    /// Fills the pseudo-headers needed to send this head.
    fn to_pseudo_headers(&self, fields: &HeaderFields, config: &Http2Config) -> PseudoHeaders;

    /// Returns true if a complete message with an empty body must not carry
    /// `Content-Length` at all.
    fn omits_empty_content_length(&self) -> bool {
        false
    }
}

impl Http2Head for RequestHead {
    const ACCEPTS_PUSH_PROMISE: bool = false;

    fn from_pseudo_headers(stream_id: u32, pseudo: &PseudoHeaders) -> Result<Self, Http2Error> {
        let method = present(pseudo.method()).ok_or_else(|| missing(stream_id, "a method"))?;
        let method = Method::from_bytes(method.as_bytes()).map_err(|_| {
            Http2Error::stream(stream_id, ErrorCode::ProtocolError, format!("Invalid HTTP/2 method {method:?}."))
        })?;

        let target = if method == Method::CONNECT {
            present(pseudo.authority()).ok_or_else(|| missing(stream_id, "an authority"))?.to_owned()
        } else {
            let scheme = present(pseudo.scheme()).ok_or_else(|| missing(stream_id, "a scheme"))?;
            let authority = present(pseudo.authority()).ok_or_else(|| missing(stream_id, "an authority"))?;
            match present(pseudo.path()).unwrap_or("/") {
                "*" if method == Method::OPTIONS => "*".to_owned(),
                path => format!("{scheme}://{authority}{path}"),
            }
        };

        Ok(RequestHead::new(method, target, Version::HTTP_2))
    }

    fn to_pseudo_headers(&self, fields: &HeaderFields, config: &Http2Config) -> PseudoHeaders {
        let uri = self.uri();
        let mut pseudo = PseudoHeaders::default();
        pseudo.set_method(self.method().as_str());

        let authority = fields
            .get(HOST)
            .map(str::to_owned)
            .or_else(|| uri.as_ref().and_then(Uri::authority).map(|authority| authority.as_str().to_owned()));

        if *self.method() == Method::CONNECT {
            pseudo.set_authority(authority.unwrap_or_else(|| self.target().to_owned()));
            return pseudo;
        }

        pseudo.set_scheme(uri.as_ref().and_then(Uri::scheme_str).unwrap_or(config.default_scheme()));

        let path = uri
            .as_ref()
            .and_then(Uri::path_and_query)
            .map(PathAndQuery::as_str)
            .or_else(|| Some(self.target()).filter(|target| target.starts_with('/')))
            .filter(|path| !path.is_empty())
            .unwrap_or("/");
        pseudo.set_path(path);

        if let Some(authority) = authority {
            pseudo.set_authority(authority);
        }
        pseudo
    }

    fn omits_empty_content_length(&self) -> bool {
        BODYLESS_METHODS.contains(self.method())
    }
}

impl Http2Head for ResponseHead {
    const ACCEPTS_PUSH_PROMISE: bool = true;

    fn from_pseudo_headers(stream_id: u32, pseudo: &PseudoHeaders) -> Result<Self, Http2Error> {
        let status = present(pseudo.status()).ok_or_else(|| missing(stream_id, "a status"))?;
        let status = StatusCode::from_bytes(status.as_bytes()).map_err(|_| {
            Http2Error::stream(stream_id, ErrorCode::ProtocolError, format!("Invalid HTTP/2 status code {status:?}."))
        })?;

        Ok(ResponseHead::new(Version::HTTP_2, status))
    }

    fn to_pseudo_headers(&self, _fields: &HeaderFields, _config: &Http2Config) -> PseudoHeaders {
        let mut pseudo = PseudoHeaders::default();
        pseudo.set_status(self.status().as_str());
        pseudo
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

fn missing(stream_id: u32, what: &str) -> Http2Error {
    Http2Error::stream(stream_id, ErrorCode::ProtocolError, format!("HTTP/2 headers does not have {what}."))
}

/// Builds a message from the first header block of a stream.
///
/// Fails with a stream `PROTOCOL_ERROR` when a required pseudo-header is
/// missing or invalid.
pub fn to_message<H: Http2Head>(stream_id: u32, headers: &Http2Headers) -> Result<HttpMessage<H>, Http2Error> {
    let head = H::from_pseudo_headers(stream_id, headers.pseudo())?;
    let mut message = HttpMessage::new(head);
    add_fields(headers.fields(), message.headers_mut());
    message.record_content_codings();
    Ok(message)
}

/// Copies regular HTTP/2 fields into an HTTP/1 field list.
///
/// `transfer-encoding` is dropped. All `cookie` fields are folded into a
/// single `cookie` field appended after the others, the non-empty values
/// joined with `"; "`.
pub fn add_fields(src: &HeaderFields, dst: &mut HeaderFields) {
    let mut cookies: Option<Vec<&str>> = None;

    for field in src {
        if field.is(TRANSFER_ENCODING.as_str()) {
            continue;
        }
        if field.is(COOKIE.as_str()) {
            let cookies = cookies.get_or_insert_with(Vec::new);
            if !field.value().is_empty() {
                cookies.push(field.value());
            }
            continue;
        }
        dst.append(field.name(), field.value());
    }

    if let Some(cookies) = cookies {
        dst.append(COOKIE.as_str(), cookies.join("; "));
    }
}

/// Builds the header block that sends `message` over HTTP/2.
///
/// ```
/// use intercept_http::h2::{to_http2_headers, Http2Config};
/// use intercept_http::protocol::{Request, RequestHead};
/// use http::{Method, Version};
///
/// let mut request = Request::new(RequestHead::new(Method::GET, "/a?b=1", Version::HTTP_11));
/// request.headers_mut().append("Host", "example.com");
///
/// let headers = to_http2_headers(&request, &Http2Config::default());
/// assert_eq!(headers.pseudo().scheme(), Some("https"));
/// assert_eq!(headers.pseudo().path(), Some("/a?b=1"));
/// assert_eq!(headers.pseudo().authority(), Some("example.com"));
/// assert_eq!(headers.fields().get("host"), Some("example.com"));
/// ```
pub fn to_http2_headers<H: Http2Head>(message: &HttpMessage<H>, config: &Http2Config) -> Http2Headers {
    let pseudo = message.head().to_pseudo_headers(message.headers(), config);
    let mut fields = HeaderFields::with_capacity(message.headers().len());

    for field in message.headers() {
        let name = field.name().to_ascii_lowercase();
        if CONNECTION_SPECIFIC_FIELDS.contains(&name.as_str()) {
            trace!(name = %name, "dropping connection-specific field");
            continue;
        }
        if name == COOKIE.as_str() {
            split_cookie(field.value(), &mut fields);
            continue;
        }
        fields.append(name, field.value());
    }

    Http2Headers::from_parts(pseudo, fields)
}

/// Builds the trailing header block for `trailers`.
pub fn trailers_to_http2(trailers: &HeaderFields) -> Http2Headers {
    let fields = trailers.iter().map(|field| (field.name().to_ascii_lowercase(), field.value().to_owned())).collect();
    Http2Headers::from_parts(PseudoHeaders::default(), fields)
}

fn split_cookie(value: &str, fields: &mut HeaderFields) {
    let mut crumbs = value.split(';').map(str::trim).filter(|crumb| !crumb.is_empty()).peekable();
    if crumbs.peek().is_none() {
        fields.append(COOKIE.as_str(), value.trim());
        return;
    }
    for crumb in crumbs {
        fields.append(COOKIE.as_str(), crumb);
    }
}
