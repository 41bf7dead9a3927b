//! Incoming HTTP request type.
//!
//! perch never decodes a body. Form fields and uploaded files are handed in
//! already decoded by whoever builds the [`Request`], and controllers only
//! look them up by name.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use http::header::{HeaderName, HeaderValue};

use crate::message::Inbound;

/// A file received with the request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { file_name: file_name.into(), content_type: None, data: data.into() }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// The name the client gave the file. Not sanitised.
    pub fn file_name(&self) -> &str { &self.file_name }
    pub fn content_type(&self) -> Option<&str> { self.content_type.as_deref() }
    pub fn data(&self) -> &Bytes { &self.data }
    pub fn len(&self) -> usize { self.data.len() }
    pub fn is_empty(&self) -> bool { self.data.is_empty() }
}

/// An incoming HTTP request.
#[derive(Debug)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    form: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl Request {
    pub fn builder() -> RequestBuilder {
        RequestBuilder { request: Self::from_parts(http::Request::new(()).into_parts().0, Bytes::new()) }
    }

    /// Wraps what hyper produced. The form and file bags start empty.
    pub fn from_parts(parts: http::request::Parts, body: Bytes) -> Self {
        Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            form: HashMap::new(),
            files: HashMap::new(),
        }
    }

    /// Turns a request back into a builder, e.g. to attach decoded form
    /// fields and files to what [`from_parts`](Request::from_parts) produced.
    pub fn into_builder(self) -> RequestBuilder {
        RequestBuilder { request: self }
    }

    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn path(&self) -> &str { self.uri.path() }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    /// Header lookup. Values that are not visible ASCII read as `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn form_fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.form.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &UploadedFile)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Inbound for Request {
    type File = UploadedFile;

    fn form_field(&self, name: &str) -> Option<&str> {
        self.form.get(name).map(String::as_str)
    }

    fn uploaded_file(&self, name: &str) -> Option<&UploadedFile> {
        self.files.get(name)
    }
}

// ── RequestBuilder ────────────────────────────────────────────────────────────

/// Fluent builder for [`Request`]. Defaults to `GET /` with nothing attached.
///
/// ```rust
/// use perch::{Inbound, Request, UploadedFile};
///
/// let req = Request::builder()
///     .method(http::Method::POST)
///     .uri(http::Uri::from_static("/avatars"))
///     .form_field("user", "alice")
///     .file("avatar", UploadedFile::new("me.png", &b"\x89PNG"[..]))
///     .build();
///
/// assert_eq!(req.form_field("user"), Some("alice"));
/// assert_eq!(req.uploaded_file("avatar").map(|f| f.len()), Some(4));
/// ```
pub struct RequestBuilder {
    request: Request,
}

impl RequestBuilder {
    pub fn method(mut self, method: Method) -> Self {
        self.request.method = method;
        self
    }

    pub fn uri(mut self, uri: Uri) -> Self {
        self.request.uri = uri;
        self
    }

    /// Appends a header. Invalid names or values are ignored.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.request.headers.append(name, value);
        }
        self
    }

    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.request.body = body.into();
        self
    }

    pub fn form_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.form.insert(name.into(), value.into());
        self
    }

    pub fn file(mut self, name: impl Into<String>, file: UploadedFile) -> Self {
        self.request.files.insert(name.into(), file);
        self
    }

    pub fn build(self) -> Request {
        self.request
    }
}

impl From<Request> for RequestBuilder {
    fn from(request: Request) -> Self {
        request.into_builder()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_input_is_none() {
        let req = Request::builder().form_field("name", "alice").build();

        assert_eq!(req.form_field("name"), Some("alice"));
        assert_eq!(req.form_field("missing_key"), None);
        assert!(req.uploaded_file("missing_key").is_none());
    }

    #[test]
    fn from_parts_keeps_the_wire_data() {
        let (parts, ()) = http::Request::post("/upload?x=1")
            .header("content-type", "multipart/form-data; boundary=b")
            .body(())
            .unwrap()
            .into_parts();

        let req = Request::from_parts(parts, Bytes::from_static(b"--b--"));
        assert_eq!(*req.method(), Method::POST);
        assert_eq!(req.path(), "/upload");
        assert_eq!(req.header("Content-Type"), Some("multipart/form-data; boundary=b"));
        assert_eq!(req.body().as_ref(), b"--b--");
        assert_eq!(req.form_fields().count(), 0);
    }

    #[test]
    fn into_builder_keeps_parts_and_adds_input() {
        let (parts, ()) = http::Request::post("/login").body(()).unwrap().into_parts();
        let req = Request::from_parts(parts, Bytes::from_static(b"user=alice"))
            .into_builder()
            .form_field("user", "alice")
            .build();

        assert_eq!(*req.method(), Method::POST);
        assert_eq!(req.path(), "/login");
        assert_eq!(req.body().as_ref(), b"user=alice");
        assert_eq!(req.form_field("user"), Some("alice"));

        let again = RequestBuilder::from(req).file("a", UploadedFile::new("a.txt", "x")).build();
        assert_eq!(again.form_field("user"), Some("alice"));
        assert!(again.uploaded_file("a").is_some());
    }

    #[test]
    fn uploaded_file_accessors() {
        let file = UploadedFile::new("report.csv", "a,b\n1,2\n").with_content_type("text/csv");
        let req = Request::builder().file("report", file).build();

        let got = req.uploaded_file("report").unwrap();
        assert_eq!(got.file_name(), "report.csv");
        assert_eq!(got.content_type(), Some("text/csv"));
        assert_eq!(got.len(), 8);
        assert!(!got.is_empty());
        assert_eq!(req.files().map(|(k, _)| k).collect::<Vec<_>>(), ["report"]);
    }
}
