//! Controllers, the per-dispatch [`Context`], and path [`Args`].
//!
//! # One capability
//!
//! A controller is anything that can turn a [`Context`] into a response:
//!
//! ```text
//! controller.dispatch(&request, response, &args)
//!        ↓ binds all three
//! Context { request, response, args }
//!        ↓ moved into
//! controller.handle(cx)              ← the only method you write
//!        ↓ usually ends with
//! cx.success(..) / cx.error(..) / cx.redirect(..) / cx.raw(..)
//! ```
//!
//! Dependencies live on the controller value itself, passed in through its
//! own constructor. There is no container to look things up in.
//!
//! ```rust
//! use perch::{Args, Context, Controller, Request, Response};
//! use serde_json::json;
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! impl Controller for Greeter {
//!     type Error = perch::Error;
//!
//!     fn handle(&self, cx: Context<'_>) -> Result<Response, Self::Error> {
//!         let name = cx.input("name").unwrap_or("stranger");
//!         cx.success(&json!({ "message": format!("{}, {name}", self.greeting) }))
//!     }
//! }
//!
//! let greeter = Greeter { greeting: "hello".into() };
//! let req = Request::builder().form_field("name", "alice").build();
//! let res = greeter.dispatch(&req, Response::new(), &Args::default()).unwrap();
//! assert_eq!(res.status(), 200);
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Error;
use crate::message::{Inbound, Outbound};
use crate::request::Request;
use crate::response::Response;
use crate::shape;

// ── Args ──────────────────────────────────────────────────────────────────────

/// Route parameters, resolved by whatever routed the request.
///
/// For a route `/users/{id}` matched against `/users/42`,
/// `args.get("id")` is `Some("42")`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Args(HashMap<String, String>);

impl Args {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Args {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<HashMap<String, String>> for Args {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

// ── Context ───────────────────────────────────────────────────────────────────

/// Everything bound for one dispatch.
///
/// The request and args are borrowed for the dispatch; the response is owned
/// and leaves through one of the shaping methods or
/// [`into_response`](Context::into_response).
pub struct Context<'a, I = Request, O = Response> {
    request: &'a I,
    response: O,
    args: &'a Args,
}

impl<'a, I: Inbound, O: Outbound> Context<'a, I, O> {
    pub fn new(request: &'a I, response: O, args: &'a Args) -> Self {
        Self { request, response, args }
    }

    pub fn request(&self) -> &'a I { self.request }
    pub fn args(&self) -> &'a Args { self.args }

    /// A single route parameter.
    pub fn arg(&self, name: &str) -> Option<&'a str> {
        self.args.get(name)
    }

    /// A form field from the request, `None` if absent.
    pub fn input(&self, key: &str) -> Option<&'a str> {
        self.request.form_field(key)
    }

    /// An uploaded file from the request, `None` if absent.
    pub fn file(&self, key: &str) -> Option<&'a I::File> {
        self.request.uploaded_file(key)
    }

    pub fn response(&self) -> &O { &self.response }
    pub fn response_mut(&mut self) -> &mut O { &mut self.response }

    /// Gives the response back untouched by any helper.
    pub fn into_response(self) -> O {
        self.response
    }

    /// `200` with `{"success": data}`.
    pub fn success<T: Serialize + ?Sized>(self, data: &T) -> Result<O, Error> {
        self.success_with_status(data, shape::SUCCESS_STATUS)
    }

    pub fn success_with_status<T: Serialize + ?Sized>(
        self,
        data: &T,
        code: impl Into<u16>,
    ) -> Result<O, Error> {
        shape::success(self.response, data, code)
    }

    /// `500` with `{"error": data}`.
    pub fn error<T: Serialize + ?Sized>(self, data: &T) -> Result<O, Error> {
        self.error_with_status(data, shape::ERROR_STATUS)
    }

    pub fn error_with_status<T: Serialize + ?Sized>(
        self,
        data: &T,
        code: impl Into<u16>,
    ) -> Result<O, Error> {
        shape::error(self.response, data, code)
    }

    /// `302 Found` to `url`.
    pub fn redirect(self, url: &str) -> O {
        self.redirect_with_status(url, shape::REDIRECT_STATUS)
    }

    pub fn redirect_with_status(self, url: &str, code: impl Into<u16>) -> O {
        shape::redirect(self.response, url, code)
    }

    /// `200` with `data` sent as-is.
    pub fn raw(self, data: impl Into<bytes::Bytes>, mime: impl AsRef<str>) -> O {
        self.raw_with_status(data, mime, shape::RAW_STATUS)
    }

    pub fn raw_with_status(
        self,
        data: impl Into<bytes::Bytes>,
        mime: impl AsRef<str>,
        code: impl Into<u16>,
    ) -> O {
        shape::raw(self.response, data, mime, code)
    }
}

// ── Controller ────────────────────────────────────────────────────────────────

/// Decides the response for a request.
///
/// Implement [`handle`](Controller::handle); call
/// [`dispatch`](Controller::dispatch). Plain functions taking a [`Context`]
/// are controllers already:
///
/// ```rust
/// use perch::{Args, Context, Controller, Request, Response};
///
/// fn moved(cx: Context<'_>) -> Result<Response, perch::Error> {
///     Ok(cx.redirect_with_status("/new-home", 301u16))
/// }
///
/// let res = moved.dispatch(&Request::builder().build(), Response::new(), &Args::default()).unwrap();
/// assert_eq!(res.header("location"), Some("/new-home"));
/// ```
pub trait Controller<I: Inbound = Request, O: Outbound = Response> {
    /// Whatever `handle` can fail with. `dispatch` hands it back unchanged.
    type Error;

    fn handle(&self, cx: Context<'_, I, O>) -> Result<O, Self::Error>;

    /// Binds `request`, `response` and `args`, then runs
    /// [`handle`](Controller::handle).
    fn dispatch(&self, request: &I, response: O, args: &Args) -> Result<O, Self::Error> {
        self.handle(Context::new(request, response, args))
    }
}

impl<F, I, O, E> Controller<I, O> for F
where
    F: Fn(Context<'_, I, O>) -> Result<O, E>,
    I: Inbound,
    O: Outbound,
{
    type Error = E;

    fn handle(&self, cx: Context<'_, I, O>) -> Result<O, E> {
        self(cx)
    }
}
