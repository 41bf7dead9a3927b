//! The four ways a controller finishes a response.
//!
//! | Helper | Status | Headers | Body |
//! |---|---|---|---|
//! | [`success`] | given | merges `Content-Type: application/json` | `{"success": data}` |
//! | [`error`] | given | merges `Content-Type: application/json` | `{"error": data}` |
//! | [`redirect`] | given | overwrites `Location` | untouched |
//! | [`raw`] | given | merges `Content-Type: <mime>` | bytes, verbatim |
//!
//! Each helper takes the response by value and hands it back, so a shaped
//! response always has exactly one owner. [`Context`](crate::Context) wraps
//! these with the usual default codes.
//!
//! JSON envelopes are pretty-printed with four-space indentation, and the
//! key order of `data` is kept exactly as it serializes.

use bytes::Bytes;
use serde::Serialize;
use serde::ser::{SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;

use crate::error::Error;
use crate::message::Outbound;
use crate::response::ContentType;

pub const SUCCESS_STATUS: u16 = 200;
pub const ERROR_STATUS: u16 = 500;
pub const REDIRECT_STATUS: u16 = 302;
pub const RAW_STATUS: u16 = 200;

/// `{"success": data}` as JSON.
///
/// Serialization happens before the response is touched. On failure the
/// response is dropped unchanged and the serde error comes back.
pub fn success<O, T>(response: O, data: &T, code: impl Into<u16>) -> Result<O, Error>
where
    O: Outbound,
    T: Serialize + ?Sized,
{
    envelope(response, "success", data, code.into())
}

/// `{"error": data}` as JSON.
pub fn error<O, T>(response: O, data: &T, code: impl Into<u16>) -> Result<O, Error>
where
    O: Outbound,
    T: Serialize + ?Sized,
{
    envelope(response, "error", data, code.into())
}

/// Points the client at `url`. The url is not checked.
pub fn redirect<O: Outbound>(mut response: O, url: &str, code: impl Into<u16>) -> O {
    response.set_status(code.into());
    response.set_header("Location", url);
    response
}

/// Sends `data` as-is, labelled `mime`.
pub fn raw<O: Outbound>(
    mut response: O,
    data: impl Into<Bytes>,
    mime: impl AsRef<str>,
    code: impl Into<u16>,
) -> O {
    response.set_status(code.into());
    response.merge_header("Content-Type", mime.as_ref());
    response.set_body(data.into());
    response
}

fn envelope<O, T>(mut response: O, key: &'static str, data: &T, code: u16) -> Result<O, Error>
where
    O: Outbound,
    T: Serialize + ?Sized,
{
    let body = to_pretty_json(&Envelope { key, data })?;
    response.set_status(code);
    response.merge_header("Content-Type", ContentType::Json.as_str());
    response.set_body(body.into());
    Ok(response)
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// A one-entry object, `{key: data}`, serialized without an intermediate
/// `Value`.
struct Envelope<'a, T: ?Sized> {
    key: &'static str,
    data: &'a T,
}

impl<T: Serialize + ?Sized> Serialize for Envelope<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.key, self.data)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::{Map, Value, json};

    use super::*;
    use crate::Response;

    fn body_str(res: &Response) -> &str {
        std::str::from_utf8(res.body()).unwrap()
    }

    #[test]
    fn success_wraps_and_pretty_prints() {
        let res = success(Response::new(), &json!({"name": "alice", "id": 1}), 201u16).unwrap();

        assert_eq!(res.status(), 201);
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(
            body_str(&res),
            "{\n    \"success\": {\n        \"name\": \"alice\",\n        \"id\": 1\n    }\n}"
        );
    }

    #[test]
    fn empty_success_is_an_empty_object() {
        let res = success(Response::new(), &Map::new(), SUCCESS_STATUS).unwrap();

        assert_eq!(res.status(), 200);
        assert_eq!(body_str(&res), "{\n    \"success\": {}\n}");
        let parsed: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(parsed, json!({"success": {}}));
    }

    #[test]
    fn error_uses_its_own_key() {
        let res = error(Response::new(), &json!({"message": "boom"}), ERROR_STATUS).unwrap();

        assert_eq!(res.status(), 500);
        assert_eq!(res.header("Content-Type"), Some("application/json"));
        let parsed: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(parsed, json!({"error": {"message": "boom"}}));
    }

    #[test]
    fn key_order_follows_the_data() {
        let mut data = Map::new();
        data.insert("zeta".into(), json!(1));
        data.insert("alpha".into(), json!(2));
        data.insert("mid".into(), json!(3));

        let res = success(Response::new(), &data, SUCCESS_STATUS).unwrap();
        let body = body_str(&res);
        let z = body.find("zeta").unwrap();
        let a = body.find("alpha").unwrap();
        let m = body.find("mid").unwrap();
        assert!(z < a && a < m);

        let sorted: BTreeMap<&str, i32> = [("b", 1), ("a", 2)].into();
        let res = success(Response::new(), &sorted, SUCCESS_STATUS).unwrap();
        assert!(body_str(&res).find("\"a\"").unwrap() < body_str(&res).find("\"b\"").unwrap());
    }

    #[test]
    fn json_content_type_replaces_previous_and_keeps_the_rest() {
        let mut res = Response::new();
        res.merge_header("Content-Type", "text/html");
        res.merge_header("Cache-Control", "no-store");

        let res = error(res, &json!({}), 422u16).unwrap();
        assert_eq!(res.header("content-type"), Some("application/json"));
        assert_eq!(res.header("cache-control"), Some("no-store"));
        assert_eq!(res.headers().len(), 2);
    }

    #[test]
    fn redirect_sets_location_and_leaves_body() {
        let mut res = Response::new();
        res.set_header("Location", "/old");
        res.set_body(Bytes::from_static(b"kept"));

        let res = redirect(res, "https://example.com", 301u16);
        assert_eq!(res.status(), 301);
        assert_eq!(res.header("location"), Some("https://example.com"));
        assert_eq!(res.headers().len(), 1);
        assert_eq!(res.body().as_ref(), b"kept");
    }

    #[test]
    fn redirect_accepts_anything() {
        let res = redirect(Response::new(), "not a url at all", REDIRECT_STATUS);
        assert_eq!(res.status(), 302);
        assert_eq!(res.header("Location"), Some("not a url at all"));
    }

    #[test]
    fn raw_is_verbatim() {
        let res = raw(Response::new(), "hello", "text/plain", RAW_STATUS);
        assert_eq!(res.status(), 200);
        assert_eq!(res.header("content-type"), Some("text/plain"));
        assert_eq!(res.body().as_ref(), b"hello");

        let res = raw(Response::new(), "<a href=\"x\">&</a>", ContentType::Html, http::StatusCode::OK);
        assert_eq!(body_str(&res), "<a href=\"x\">&</a>");
        assert_eq!(res.header("content-type"), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn unserializable_data_is_an_error() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1u8], "key is not a string");

        let err = success(Response::new(), &bad, SUCCESS_STATUS).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn shapes_http_responses_too() {
        let res = success(http::Response::new(Bytes::new()), &json!({"ok": true}), 202u16).unwrap();
        assert_eq!(res.status(), http::StatusCode::ACCEPTED);
        assert_eq!(res.headers()["content-type"], "application/json");
    }
}
