//! # Fault Module
//!
//! Panic containment for handler pipelines.
//!
//! Handlers signal failure by returning errors; panicking is reserved for
//! genuine bugs. The [`recovery`] handler keeps one broken handler from
//! taking the whole server task down: installed early in a chain (usually
//! via the router's `use` handlers), it catches panics from everything it
//! wraps and converts them into pipeline errors the router can translate.

mod recovery;

pub use recovery::recovery;
