//! The request/response abstractions a controller works against.
//!
//! perch does not parse requests and does not own a wire format. It needs
//! exactly two capabilities from whatever carries the HTTP exchange:
//!
//! | Side | Trait | Used by |
//! |---|---|---|
//! | request | [`Inbound`] | `input`, `file` |
//! | response | [`Outbound`] | `success`, `error`, `redirect`, `raw` |
//!
//! [`Request`](crate::Request) and [`Response`](crate::Response) implement
//! them. So does `http::Response<Bytes>`, so the shaping helpers can be used
//! on the `http` crate's own type without going through perch's.

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::StatusCode;
use tracing::warn;

/// Read access to the decoded input of a request.
pub trait Inbound {
    /// Whatever the embedding framework hands out for an uploaded file.
    type File;

    /// A form field by name. `None` when the request has no such field.
    fn form_field(&self, name: &str) -> Option<&str>;

    /// An uploaded file by name. `None` when the request has no such file.
    fn uploaded_file(&self, name: &str) -> Option<&Self::File>;
}

/// Write access to the three parts of an outgoing response.
pub trait Outbound {
    /// Sets the status code. A code outside `100..=999` is replaced by `500`
    /// right here, on every implementation, so a response never holds a
    /// status that cannot be sent.
    fn set_status(&mut self, code: u16);

    /// Add `name: value` to the header set. Any earlier value under the same
    /// name is replaced; every other header is left alone.
    fn merge_header(&mut self, name: &str, value: &str);

    /// Overwrite `name` with `value`.
    fn set_header(&mut self, name: &str, value: &str);

    fn set_body(&mut self, body: Bytes);
}

/// `code` if it can go on the wire, `500` otherwise.
pub(crate) fn checked_status(code: u16) -> u16 {
    if (100..=999).contains(&code) {
        code
    } else {
        warn!(code, "status code out of range, using 500");
        500
    }
}

// ── http::Response<Bytes> ─────────────────────────────────────────────────────

// The `http` types validate eagerly. Anything they refuse is logged and
// skipped so the shaping helpers stay infallible on this type too.

impl Outbound for http::Response<Bytes> {
    fn set_status(&mut self, code: u16) {
        *self.status_mut() = StatusCode::from_u16(checked_status(code))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    }

    fn merge_header(&mut self, name: &str, value: &str) {
        self.set_header(name, value);
    }

    fn set_header(&mut self, name: &str, value: &str) {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            warn!(header = name, "header not representable, dropped");
            return;
        };
        self.headers_mut().insert(name, value);
    }

    fn set_body(&mut self, body: Bytes) {
        *self.body_mut() = body;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_response_takes_status_and_headers() {
        let mut res = http::Response::new(Bytes::new());
        res.headers_mut().insert("x-trace", HeaderValue::from_static("abc"));

        res.set_status(201);
        res.merge_header("Content-Type", "text/html");
        res.merge_header("Content-Type", "application/json");
        res.set_body(Bytes::from_static(b"{}"));

        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(res.headers().get_all("content-type").iter().count(), 1);
        assert_eq!(res.headers()["content-type"], "application/json");
        assert_eq!(res.headers()["x-trace"], "abc");
        assert_eq!(res.body().as_ref(), b"{}");
    }

    #[test]
    fn http_response_skips_what_it_cannot_hold() {
        let mut res = http::Response::new(Bytes::new());

        res.set_status(42);
        res.set_header("Location", "/next\r\nx-injected: 1");

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(res.headers().is_empty());
    }

    #[test]
    fn out_of_range_status_is_500_on_every_outbound() {
        let data = serde_json::json!({ "ok": false });

        let ours = crate::shape::success(crate::Response::new(), &data, 42u16).unwrap();
        let theirs = crate::shape::success(http::Response::new(Bytes::new()), &data, 42u16).unwrap();

        assert_eq!(ours.status(), 500);
        assert_eq!(theirs.status().as_u16(), 500);
        assert_eq!(checked_status(1000), 500);
        assert_eq!(checked_status(999), 999);
        assert_eq!(checked_status(100), 100);
    }
}
