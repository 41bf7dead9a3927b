//! Minimal perch example: one controller, every shaping helper.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!   curl -i http://localhost:3000/old
//!   curl -i http://localhost:3000/robots.txt
//!   curl -i http://localhost:3000/boom

use perch::{ContentType, Context, Controller, Response, Server};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize)]
struct Status<'a> {
    service: &'a str,
    version: &'a str,
}

// Dependencies come in through the constructor, not a container.
struct Site {
    name: String,
}

impl Controller for Site {
    type Error = perch::Error;

    fn handle(&self, cx: Context<'_>) -> Result<Response, perch::Error> {
        match cx.request().path() {
            "/" => cx.success(&Status { service: &self.name, version: env!("CARGO_PKG_VERSION") }),
            "/old" => Ok(cx.redirect_with_status("/", 301u16)),
            "/robots.txt" => Ok(cx.raw("User-agent: *\nDisallow:\n", ContentType::Text)),
            "/boom" => cx.error(&json!({ "message": "something broke" })),
            _ => cx.error_with_status(&json!({ "message": "not found" }), 404u16),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), perch::Error> {
    tracing_subscriber::fmt::init();

    let site = Site { name: "perch-demo".into() };
    Server::bind("0.0.0.0:3000")?.serve(site).await
}
