//! Unified error type.

use std::fmt;
use std::net::AddrParseError;

/// The error type returned by perch's fallible operations.
///
/// Failures raised by a controller's own `handle` are *not* wrapped in this
/// type; they keep the controller's associated error type all the way out of
/// [`Controller::dispatch`](crate::Controller::dispatch).
#[derive(Debug)]
pub enum Error {
    /// `Server::bind` was given something that is not a `host:port` pair.
    Addr(AddrParseError),
    /// Binding the listener failed.
    Io(std::io::Error),
    /// A JSON envelope could not be serialized. The response was not touched.
    Json(serde_json::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(e) => write!(f, "invalid socket address: {e}"),
            Self::Io(e)   => write!(f, "io: {e}"),
            Self::Json(e) => write!(f, "json: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Addr(e) => Some(e),
            Self::Io(e)   => Some(e),
            Self::Json(e) => Some(e),
        }
    }
}

impl From<AddrParseError> for Error {
    fn from(e: AddrParseError) -> Self {
        Self::Addr(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}
