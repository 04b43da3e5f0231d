use http::Method;

use crate::router::Router;

/// The registered record of one (method, path) binding.
///
/// Kept by the router for enumeration and named-route lookup. The handler
/// list itself lives in the per-method store.
#[derive(Debug, Clone)]
pub struct RouteInfo {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) name: Option<String>,
    pub(crate) tags: Vec<String>,
    pub(crate) template: String,
}

impl RouteInfo {
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The full registered pattern, group prefix included.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Render a URL from this route's template and `(token, value)` pairs.
    ///
    /// Each `<token>` occurrence is replaced with the query-escaped value.
    /// Pairs without a matching token are ignored; tokens without a pair
    /// stay in place.
    pub fn url(&self, pairs: &[(&str, &str)]) -> String {
        let mut url = self.template.clone();
        for (name, value) in pairs {
            let token = format!("<{name}>");
            if url.contains(&token) {
                let encoded: String =
                    url::form_urlencoded::byte_serialize(value.as_bytes()).collect();
                url = url.replace(&token, &encoded);
            }
        }
        url
    }
}

/// Reduce a pattern to its URL template by dropping the constraint part of
/// every parameter marker: `/users/<id:\d+>` becomes `/users/<id>`. A
/// trailing `*` (the bare wildcard shorthand, kept verbatim in the stored
/// path) carries no name and is dropped.
pub(crate) fn build_url_template(path: &str) -> String {
    let path = path.trim_end_matches('*');
    let mut template = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(start) = rest.find('<') {
        let Some(close) = rest[start..].find('>').map(|i| start + i) else {
            break;
        };
        template.push_str(&rest[..start]);
        let inner = &rest[start + 1..close];
        let name = inner.split(':').next().unwrap_or_default();
        template.push('<');
        template.push_str(name);
        template.push('>');
        rest = &rest[close + 1..];
    }
    template.push_str(rest);
    template
}

/// Chainable handle returned by a route registration.
///
/// When a registration listed several methods, the handle refers to all of
/// the per-method sub-routes and `name`/`tag` apply to each.
pub struct Route<'r> {
    router: &'r mut Router,
    indices: Vec<usize>,
}

impl<'r> Route<'r> {
    pub(crate) fn new(router: &'r mut Router, indices: Vec<usize>) -> Self {
        Self { router, indices }
    }

    /// Register this route under `name` for reverse lookup. A later
    /// registration under the same name replaces the earlier one.
    pub fn name(self, name: &str) -> Self {
        self.router.name_routes(&self.indices, name);
        self
    }

    /// Attach an arbitrary tag to this route (and all its sub-routes).
    pub fn tag(self, tag: &str) -> Self {
        self.router.tag_routes(&self.indices, tag);
        self
    }
}
