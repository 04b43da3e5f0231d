//! # Route Module
//!
//! The builder surface for registering routes.
//!
//! A [`RouteGroup`] carries a URL prefix and an ordered handler list that is
//! prepended to every route registered through it. Groups nest; a child
//! group concatenates prefixes and copies (optionally extends) the parent's
//! handler list. [`Route`] is the chainable result of a registration and
//! fans `name`/`tag` calls out to every method the route was bound to.
//! Named routes are kept on the router and can render concrete URLs from
//! their pattern with [`RouteInfo::url`].

mod group;
#[allow(clippy::module_inception)]
mod route;
#[cfg(test)]
mod tests;

pub use group::RouteGroup;
pub use route::{Route, RouteInfo};
pub(crate) use route::build_url_template;
