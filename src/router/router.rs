use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Method, Request, StatusCode};
use percent_encoding::percent_decode_str;
use tracing::{debug, error, warn};

use crate::context::pool::ContextPool;
use crate::context::{Context, Handler};
use crate::error::HttpError;
use crate::response::ResponseWriter;
use crate::route::{build_url_template, Route, RouteGroup, RouteInfo};
use crate::runtime_config::RuntimeConfig;
use crate::store::Store;

/// Every method a catch-all registration binds to.
pub(crate) const METHODS_CSV: &str = "CONNECT,DELETE,GET,HEAD,OPTIONS,PATCH,POST,PUT,TRACE";

/// The handler list attached to a trie node.
pub(crate) struct RouteData {
    pub(crate) handlers: Arc<[Handler]>,
}

impl fmt::Debug for RouteData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} handler(s)>", self.handlers.len())
    }
}

/// Dispatches requests to the handlers of the best-matching route.
///
/// Routes are registered through [`Router::group`], [`Router::to`] and the
/// method shortcuts, all of which require `&mut self`: registration is a
/// startup-phase activity and must finish before the router starts serving.
/// Dispatch itself ([`Router::handle`]) is `&self` and safe to call from
/// any number of concurrent request tasks; the context pool is the only
/// shared mutable state on that path.
pub struct Router {
    /// Trim trailing slashes from request paths before matching
    /// (`/x`, `/x/` and `/x//` all resolve alike; `/` stays `/`).
    pub ignore_trailing_slash: bool,
    /// Match against the percent-encoded path and decode captured values
    /// afterwards, instead of matching the decoded path.
    pub use_escaped_path: bool,
    stores: HashMap<Method, Store<RouteData>>,
    routes: Vec<RouteInfo>,
    named: HashMap<String, usize>,
    max_params: usize,
    handlers: Vec<Handler>,
    not_found: Vec<Handler>,
    not_found_handlers: Arc<[Handler]>,
    pool: ContextPool,
}

impl Router {
    pub fn new() -> Self {
        let config = RuntimeConfig::from_env();
        let mut router = Self {
            ignore_trailing_slash: false,
            use_escaped_path: false,
            stores: HashMap::new(),
            routes: Vec::new(),
            named: HashMap::new(),
            max_params: 0,
            handlers: Vec::new(),
            not_found: Vec::new(),
            not_found_handlers: Vec::new().into(),
            pool: ContextPool::new(config.pool_limit),
        };
        let method_not_allowed: Handler = Arc::new(method_not_allowed_handler);
        let not_found: Handler = Arc::new(not_found_handler);
        router.not_found(vec![method_not_allowed, not_found]);
        router
    }

    /// Handle one request, writing the response through `response`.
    ///
    /// This is the transport entry point: the adapter parses the wire
    /// request, calls this, and flushes whatever the pipeline wrote.
    pub fn handle(&self, request: Request<Vec<u8>>, response: &mut dyn ResponseWriter) {
        let mut state = self.pool.acquire(self.max_params);
        let method = request.method().clone();
        let path = self.resolve_path(&request);

        let (handlers, pnames) = self.find(&method, &path, &mut state.pvalues);
        debug!(
            method = %method,
            path = %path,
            handlers = handlers.len(),
            matched = !pnames.is_empty() || !Arc::ptr_eq(&handlers, &self.not_found_handlers),
            "dispatch"
        );
        let nparams = pnames.len();
        state.set_pnames(pnames);
        state.handlers = handlers;
        if self.use_escaped_path {
            for value in state.pvalues.iter_mut().take(nparams) {
                if value.contains('%') {
                    let decoded = percent_decode_str(value).decode_utf8_lossy().into_owned();
                    *value = decoded;
                }
            }
        }

        let mut ctx = Context::new(request, response, self, state);
        if let Err(err) = ctx.next() {
            self.handle_error(&mut ctx, err);
        }
        self.pool.release(ctx.into_state());
    }

    /// The named route registered as `name`.
    pub fn route(&self, name: &str) -> Option<&RouteInfo> {
        self.named.get(name).map(|&idx| &self.routes[idx])
    }

    /// All registered routes, in registration order (one entry per method).
    pub fn routes(&self) -> &[RouteInfo] {
        &self.routes
    }

    /// Render the URL of the named route; see [`RouteInfo::url`].
    pub fn url(&self, name: &str, pairs: &[(&str, &str)]) -> Option<String> {
        self.route(name).map(|route| route.url(pairs))
    }

    /// The largest parameter count any registered route captures.
    pub fn max_params(&self) -> usize {
        self.max_params
    }

    /// Append handlers that run first on every request, matched or not.
    pub fn use_handlers(&mut self, handlers: Vec<Handler>) {
        self.handlers.extend(handlers);
        self.rebuild_not_found_chain();
    }

    /// Replace the handlers invoked when no route matches. The `use`
    /// handlers still run first. The default chain probes the other
    /// method stores (405 with an `Allow` header) and then returns 404.
    pub fn not_found(&mut self, handlers: Vec<Handler>) {
        self.not_found = handlers;
        self.rebuild_not_found_chain();
    }

    /// A registration scope rooted at `prefix`, inheriting the router's
    /// `use` handlers.
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        let handlers = self.handlers.clone();
        RouteGroup::new(self, prefix.to_string(), handlers)
    }

    /// Like [`group`](Router::group) with extra handlers appended to the
    /// inherited list.
    pub fn group_with(&mut self, prefix: &str, extra: Vec<Handler>) -> RouteGroup<'_> {
        let mut handlers = self.handlers.clone();
        handlers.extend(extra);
        RouteGroup::new(self, prefix.to_string(), handlers)
    }

    /// Register `path` for the comma-separated `methods` list at the root.
    pub fn to(&mut self, methods: &str, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        let mut composed = self.handlers.clone();
        composed.extend(handlers);
        let indices = self.register(methods, path, composed);
        Route::new(self, indices)
    }

    pub fn get(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to("GET", path, handlers)
    }

    pub fn post(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to("POST", path, handlers)
    }

    pub fn put(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to("PUT", path, handlers)
    }

    pub fn patch(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to("PATCH", path, handlers)
    }

    pub fn delete(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to("DELETE", path, handlers)
    }

    pub fn head(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to("HEAD", path, handlers)
    }

    pub fn options(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to("OPTIONS", path, handlers)
    }

    /// Register `path` under every supported HTTP method at the root.
    pub fn any(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to(METHODS_CSV, path, handlers)
    }

    /// Compile `path` into the store of each listed method with the fully
    /// composed handler list, and record the route entries.
    pub(crate) fn register(
        &mut self,
        methods: &str,
        path: &str,
        handlers: Vec<Handler>,
    ) -> Vec<usize> {
        let shared: Arc<[Handler]> = handlers.into();
        let mut pattern = path.to_string();
        // An asterisk at the end matches any number of characters.
        if pattern.ends_with('*') {
            pattern.truncate(pattern.len() - 1);
            pattern.push_str("<:.*>");
        }

        let mut indices = Vec::new();
        for method in methods.split(',') {
            let method = method.trim();
            if method.is_empty() {
                continue;
            }
            let method: Method = method
                .parse()
                .unwrap_or_else(|_| panic!("invalid HTTP method {method:?}"));
            let store = self.stores.entry(method.clone()).or_default();
            let params = store.add(
                &pattern,
                RouteData {
                    handlers: shared.clone(),
                },
            );
            self.max_params = self.max_params.max(params);
            debug!(method = %method, path = %pattern, params, "route registered");
            indices.push(self.routes.len());
            self.routes.push(RouteInfo {
                method,
                path: path.to_string(),
                name: None,
                tags: Vec::new(),
                template: build_url_template(path),
            });
        }
        indices
    }

    pub(crate) fn name_routes(&mut self, indices: &[usize], name: &str) {
        for &idx in indices {
            self.routes[idx].name = Some(name.to_string());
        }
        if let Some(&first) = indices.first() {
            if let Some(prev) = self.named.insert(name.to_string(), first) {
                if !indices.contains(&prev) {
                    warn!(route = name, "named route replaced");
                }
            }
        }
    }

    pub(crate) fn tag_routes(&mut self, indices: &[usize], tag: &str) {
        for &idx in indices {
            self.routes[idx].tags.push(tag.to_string());
        }
    }

    /// The request path the matcher sees: percent handling per
    /// `use_escaped_path`, then trailing-slash normalization.
    pub(crate) fn resolve_path(&self, request: &Request<Vec<u8>>) -> String {
        let raw = request.uri().path();
        let path: Cow<'_, str> = if self.use_escaped_path {
            Cow::Borrowed(raw)
        } else {
            percent_decode_str(raw).decode_utf8_lossy()
        };
        self.normalize_path(&path).to_string()
    }

    fn normalize_path<'p>(&self, path: &'p str) -> &'p str {
        if self.ignore_trailing_slash && path.len() > 1 && path.ends_with('/') {
            let trimmed = path.trim_end_matches('/');
            if trimmed.is_empty() {
                "/"
            } else {
                trimmed
            }
        } else {
            path
        }
    }

    fn find<'r>(
        &'r self,
        method: &Method,
        path: &str,
        pvalues: &mut [String],
    ) -> (Arc<[Handler]>, &'r [String]) {
        if let Some(store) = self.stores.get(method) {
            let (data, pnames) = store.get(path, pvalues);
            if let Some(data) = data {
                return (data.handlers.clone(), pnames);
            }
        }
        (self.not_found_handlers.clone(), &[])
    }

    /// Which methods have a route matching `path`, as header-ready names.
    pub(crate) fn allowed_methods(&self, path: &str) -> Vec<String> {
        let mut pvalues = vec![String::new(); self.max_params];
        let mut methods = Vec::new();
        for (method, store) in &self.stores {
            if store.get(path, &mut pvalues).0.is_some() {
                methods.push(method.as_str().to_string());
            }
        }
        methods
    }

    fn rebuild_not_found_chain(&mut self) {
        self.not_found_handlers = self
            .handlers
            .iter()
            .chain(self.not_found.iter())
            .cloned()
            .collect::<Vec<_>>()
            .into();
    }

    /// Translate a pipeline error into a response: an [`HttpError`] keeps
    /// its status and message, anything else becomes a plain 500.
    fn handle_error(&self, ctx: &mut Context<'_>, err: anyhow::Error) {
        let (status, message) = match err.downcast_ref::<HttpError>() {
            Some(http_err) => (http_err.status(), http_err.message().to_string()),
            None => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
        };
        if status.is_server_error() {
            error!(status = status.as_u16(), %message, "request failed");
        } else {
            debug!(status = status.as_u16(), %message, "request rejected");
        }
        ctx.response.headers_mut().insert(
            CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        ctx.response.write_status(status);
        let _ = ctx.response.write(message.as_bytes());
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Terminal handler of the default not-found chain.
pub fn not_found_handler(_ctx: &mut Context<'_>) -> Result<()> {
    Err(HttpError::not_found().into())
}

/// Probes the other per-method stores for the request path. When any other
/// method matches, writes a sorted `Allow` header (plus `OPTIONS`) and
/// answers 405 — except for an OPTIONS request, which keeps its 200 — then
/// aborts the chain. When nothing matches it is a pass-through and the 404
/// handler runs.
pub fn method_not_allowed_handler(ctx: &mut Context<'_>) -> Result<()> {
    let router = ctx.router();
    let path = router.resolve_path(&ctx.request);
    let mut methods = router.allowed_methods(&path);
    if methods.is_empty() {
        return Ok(());
    }
    methods.push("OPTIONS".to_string());
    methods.sort();
    methods.dedup();
    let allow = methods.join(", ");
    ctx.response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_str(&allow)?);
    if ctx.request.method() != Method::OPTIONS {
        ctx.response.write_status(StatusCode::METHOD_NOT_ALLOWED);
    }
    ctx.abort();
    Ok(())
}
