//! # Content Module
//!
//! Reading request bodies and writing response data.
//!
//! Reading dispatches on the `Content-Type` header (JSON, XML, URL-encoded
//! form, multipart form) and deserializes into any `DeserializeOwned` target;
//! GET requests read from the query string. Writing goes through the
//! context's installed [`DataWriter`] variant, which decides serialization
//! and the `Content-Type` response header.

mod reader;
mod writer;

pub(crate) use reader::read;
pub use writer::{DataWriter, Payload};
