//! # Store Module
//!
//! Pattern-compiled radix trie holding the routes of a single HTTP method.
//!
//! Patterns are strings of literal text interleaved with parameter markers:
//!
//! - `<name>` captures the maximal non-empty run of non-`/` characters;
//! - `<name:regex>` captures the leftmost anchored match of `regex`;
//! - `<:regex>` is an unnamed capture that still occupies a positional slot;
//! - a `.*` constraint (what a trailing `*` compiles to) becomes a wildcard
//!   tail that swallows the rest of the path, empty included.
//!
//! Insertion splits literal edges on shared prefixes, so lookup walks the
//! tree in time proportional to the path length. Each node keeps at most one
//! parameter child and one wildcard child; literal children are tried first,
//! then the parameter child, then the wildcard. Among every data-bearing node
//! that matches, the one registered first wins, and subtree insertion-order
//! lower bounds (`min_order`) let the search skip branches that cannot beat
//! the candidate already in hand.
//!
//! Parameter values are written into a caller-supplied `&mut [String]` buffer
//! by position, reusing each slot's capacity, so a warm lookup does not
//! allocate unless it has to race a literal candidate against a parameter
//! branch.

mod node;
#[allow(clippy::module_inception)]
mod store;

pub use store::Store;
