//! Outgoing HTTP response type.
//!
//! A [`Response`] is handed to every controller pre-allocated (`200`, no
//! headers, empty body). Controllers shape it, usually through one of the
//! helpers on [`Context`](crate::Context), and give it back.
//!
//! Headers are stored as plain strings and only validated when the response
//! crosses into hyper (see [`Response::into_http`]). Shaping never fails
//! because of a header.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use http_body_util::Full;
use tracing::warn;

use crate::message::{Outbound, checked_status};

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with `raw`.
///
/// Anything that is `AsRef<str>` is accepted as a mime type; these are just
/// the ones nobody should have to spell out.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ContentType {
    Csv,          // text/csv
    EventStream,  // text/event-stream  (SSE)
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream  (binary / file download)
    Pdf,          // application/pdf
    Text,         // text/plain; charset=utf-8
    Xml,          // application/xml
}

impl ContentType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv         => "text/csv",
            Self::EventStream => "text/event-stream",
            Self::Html        => "text/html; charset=utf-8",
            Self::Json        => "application/json",
            Self::OctetStream => "application/octet-stream",
            Self::Pdf         => "application/pdf",
            Self::Text        => "text/plain; charset=utf-8",
            Self::Xml         => "application/xml",
        }
    }
}

impl AsRef<str> for ContentType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use perch::{Outbound, Response};
///
/// let mut res = Response::new();
/// res.set_status(404);
/// res.merge_header("content-type", "text/plain");
/// res.set_body("not here".into());
///
/// assert_eq!(res.status(), 404);
/// assert_eq!(res.header("Content-Type"), Some("text/plain"));
/// ```
#[derive(Clone, Debug)]
pub struct Response {
    body: Bytes,
    headers: Vec<(String, String)>,
    status: u16,
}

impl Response {
    /// `200 OK`, no headers, empty body.
    pub fn new() -> Self {
        Self::with_status(200u16)
    }

    /// Response with no body. Out-of-range codes become `500`, as with
    /// [`Outbound::set_status`].
    pub fn with_status(code: impl Into<u16>) -> Self {
        Self { body: Bytes::new(), headers: Vec::new(), status: checked_status(code.into()) }
    }

    pub fn status(&self) -> u16 { self.status }
    pub fn headers(&self) -> &[(String, String)] { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Converts into the type hyper writes to the wire.
    ///
    /// The status was already checked when it was set. A header whose name
    /// or value cannot be sent is dropped and logged.
    pub fn into_http(self) -> http::Response<Full<Bytes>> {
        let mut out = http::Response::new(Full::new(self.body));
        *out.status_mut() = StatusCode::from_u16(self.status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let headers = out.headers_mut();
        for (name, value) in self.headers {
            match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => warn!(header = %name, "header not representable, dropped"),
            }
        }
        out
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))
    }

    fn remove_header(&mut self, name: &str) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }
}

impl Default for Response {
    fn default() -> Self { Self::new() }
}

impl Outbound for Response {
    fn set_status(&mut self, code: u16) {
        self.status = checked_status(code);
    }

    // Keeps the header where it first appeared.
    fn merge_header(&mut self, name: &str, value: &str) {
        match self.position(name) {
            Some(at) => {
                self.headers[at].1 = value.to_owned();
                let first = self.headers.remove(at);
                self.remove_header(name);
                self.headers.insert(at, first);
            }
            None => self.headers.push((name.to_owned(), value.to_owned())),
        }
    }

    fn set_header(&mut self, name: &str, value: &str) {
        self.remove_header(name);
        self.headers.push((name.to_owned(), value.to_owned()));
    }

    fn set_body(&mut self, body: Bytes) {
        self.body = body;
    }
}
