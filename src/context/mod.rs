//! # Context Module
//!
//! Per-request state and the cooperative handler pipeline.
//!
//! A [`Context`] is handed to every handler on the matched route. Handlers
//! run in registration order; a handler that wants the rest of the chain to
//! run before its own post-processing calls [`Context::next`], and a handler
//! that has fully produced the response calls [`Context::abort`] to stop the
//! chain without an error. Returning an `Err` short-circuits instead and is
//! translated into an HTTP response by the router.
//!
//! Contexts are pooled. The pooled portion keeps its parameter buffers
//! between requests (the router pre-sizes them to the largest parameter
//! count any route needs), so steady-state dispatch does not allocate for
//! captures. Handlers must not hold on to any part of a context after the
//! pipeline completes.

#[allow(clippy::module_inception)]
mod context;
pub(crate) mod pool;

pub use context::{handler, Context, Handler};
pub(crate) use context::ContextState;
