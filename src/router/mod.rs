//! # Router Module
//!
//! Request dispatch over per-method pattern tries.
//!
//! The router owns one [`Store`](crate::store::Store) per HTTP method,
//! built up front during registration. Once serving starts the tries are
//! read-only; [`Router::handle`] takes `&self` and routes must not be added
//! concurrently with dispatch.
//!
//! Dispatch acquires a pooled context, resolves the request path (percent
//! decoding and trailing-slash normalization are router flags), looks up
//! the matched handler chain, and drives it with the context's cooperative
//! pipeline. A miss installs the not-found chain instead: the `use`
//! handlers, then the method-not-allowed prober, then the 404 handler.
//! Errors returned by any handler are translated into HTTP responses here.

#[allow(clippy::module_inception)]
mod router;

pub(crate) use router::METHODS_CSV;
pub use router::{method_not_allowed_handler, not_found_handler, Router};
