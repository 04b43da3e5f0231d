//! Error types shared across the routing core.
//!
//! Handlers return `anyhow::Result<()>`; an `Err` short-circuits the rest of
//! the pipeline. When the error is (or wraps) an [`HttpError`], the router's
//! translator writes its status code and message. Any other error is reported
//! as a plain 500 with the error's display text as the body.

use std::fmt;

use http::StatusCode;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// An error carrying an HTTP status code and a response message.
///
/// The display form is the bare message. The serialized form is
/// `{"status": <u16>, "message": <string>}`, which is what the JSON data
/// writer and error-reporting handlers emit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: StatusCode,
    message: String,
}

impl HttpError {
    /// Create an error for `status` with the canonical reason phrase as the
    /// message (e.g. `404` becomes `"Not Found"`).
    pub fn new(status: StatusCode) -> Self {
        let message = status.canonical_reason().unwrap_or("").to_string();
        Self { status, message }
    }

    /// Create an error for `status` with an explicit message.
    pub fn with_message(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Shortcut for the 404 error produced by the default fallback chain.
    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND)
    }

    /// Shortcut for a 405 error.
    pub fn method_not_allowed() -> Self {
        Self::new(StatusCode::METHOD_NOT_ALLOWED)
    }

    /// Shortcut for a 500 error wrapping `message`.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_message(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

impl Serialize for HttpError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("HttpError", 2)?;
        s.serialize_field("status", &self.status.as_u16())?;
        s.serialize_field("message", &self.message)?;
        s.end()
    }
}
