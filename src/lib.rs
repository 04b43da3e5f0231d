//! Trie-based HTTP router with a cooperative handler pipeline.
//!
//! `switchback` compiles parameterized URL patterns into one compressed
//! radix trie per HTTP method and matches incoming paths in time
//! proportional to the path length, capturing parameter values into pooled,
//! pre-sized buffers. Matched routes run an ordered handler chain with
//! explicit `next()`/`abort()` flow control; returned errors (and, with the
//! recovery handler installed, panics) are translated into HTTP responses.
//!
//! # Pattern syntax
//!
//! - literal characters match byte-for-byte;
//! - `<name>` captures a non-empty run of non-`/` characters;
//! - `<name:regex>` captures an anchored regex match (e.g. `<id:\d+>`);
//! - `<:regex>` is an unnamed capture occupying a positional slot;
//! - a trailing `*` captures the rest of the path, empty included.
//!
//! Among all matching routes the earliest-registered one wins,
//! deterministically.
//!
//! # Example
//!
//! ```rust,ignore
//! use switchback::{handler, HttpServer, Router};
//!
//! let mut router = Router::new();
//! router.use_handlers(vec![switchback::fault::recovery()]);
//! router.get(
//!     "/users/<id:\\d+>",
//!     vec![handler(|c| {
//!         let id = c.param("id").to_string();
//!         c.write(id)?;
//!         Ok(())
//!     })],
//! );
//! HttpServer::new(router).start("127.0.0.1:8080")?.join().unwrap();
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! Route registration happens before serving; once `handle` is being
//! called, the route tables are read-only.

pub mod content;
pub mod context;
pub mod error;
pub mod fault;
pub mod response;
pub mod route;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod store;

pub use content::{DataWriter, Payload};
pub use context::{handler, Context, Handler};
pub use error::HttpError;
pub use response::{BufferedResponse, ResponseWriter};
pub use route::{Route, RouteGroup, RouteInfo};
pub use router::{method_not_allowed_handler, not_found_handler, Router};
pub use runtime_config::RuntimeConfig;
pub use server::{HttpServer, RouterService, ServerHandle};
pub use store::Store;
