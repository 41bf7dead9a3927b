//! # perch
//!
//! Controllers for HTTP services. A controller gets a request, a response
//! that is already allocated, and the route arguments; it decides what the
//! response says and hands it back.
//!
//! ## What perch does
//!
//! - Dispatch: bind request, response and args, call [`Controller::handle`]
//! - Shape: four helpers that set status, headers and body in one call
//! - Read input: form fields and uploaded files, by name
//!
//! ## What perch leaves to others
//!
//! - **Routing**: the router that produced the [`Args`]
//! - **Body decoding**: whatever fills the form and file bags of a [`Request`]
//! - **Middleware, sessions, auth**: the framework around it
//!
//! The bundled [`Server`] exists so a single controller can be put on a
//! socket without any of the above.
//!
//! ## Shaping contract
//!
//! | Call | Status | Header | Body |
//! |---|---|---|---|
//! | `success(data)` | 200 | `Content-Type: application/json` (merged) | `{"success": data}` pretty |
//! | `error(data)` | 500 | `Content-Type: application/json` (merged) | `{"error": data}` pretty |
//! | `redirect(url)` | 302 | `Location: url` (overwritten) | untouched |
//! | `raw(data, mime)` | 200 | `Content-Type: mime` (merged) | `data` verbatim |
//!
//! Each has a `*_with_status` twin taking any `Into<u16>`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use perch::{Context, Controller, Response, Server};
//! use serde_json::json;
//!
//! struct Users {
//!     default_name: String,
//! }
//!
//! impl Controller for Users {
//!     type Error = perch::Error;
//!
//!     fn handle(&self, cx: Context<'_>) -> Result<Response, perch::Error> {
//!         match cx.input("name") {
//!             Some(name) => cx.success_with_status(&json!({ "name": name }), 201u16),
//!             None if cx.request().path() == "/me" => {
//!                 cx.success(&json!({ "name": self.default_name }))
//!             }
//!             None => cx.error_with_status(&json!({ "message": "name is required" }), 422u16),
//!         }
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), perch::Error> {
//!     let users = Users { default_name: "alice".into() };
//!     Server::bind("0.0.0.0:3000")?.serve(users).await
//! }
//! ```

mod controller;
mod error;
mod message;
mod request;
mod response;
mod server;

pub mod shape;

pub use controller::{Args, Context, Controller};
pub use error::Error;
pub use message::{Inbound, Outbound};
pub use request::{Request, RequestBuilder, UploadedFile};
pub use response::{ContentType, Response};
pub use server::Server;
