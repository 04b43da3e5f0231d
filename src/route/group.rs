use crate::context::Handler;
use crate::router::Router;

use super::Route;

/// A registration scope: a URL prefix plus the handler list every route
/// registered through it starts with.
///
/// Obtained from [`Router::group`] (or another group); holds the router
/// mutably, so registration is a strictly startup-phase, sequential
/// activity.
pub struct RouteGroup<'r> {
    router: &'r mut Router,
    prefix: String,
    handlers: Vec<Handler>,
}

impl<'r> RouteGroup<'r> {
    pub(crate) fn new(router: &'r mut Router, prefix: String, handlers: Vec<Handler>) -> Self {
        Self {
            router,
            prefix,
            handlers,
        }
    }

    /// The accumulated URL prefix of this group.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// A child group at `prefix` (appended to this group's prefix) that
    /// inherits this group's handler list.
    pub fn group(&mut self, prefix: &str) -> RouteGroup<'_> {
        self.group_with(prefix, Vec::new())
    }

    /// A child group whose handler list is this group's list plus `extra`.
    pub fn group_with(&mut self, prefix: &str, extra: Vec<Handler>) -> RouteGroup<'_> {
        let mut handlers = self.handlers.clone();
        handlers.extend(extra);
        RouteGroup {
            router: &mut *self.router,
            prefix: format!("{}{}", self.prefix, prefix),
            handlers,
        }
    }

    /// Append handlers that every route registered through this group from
    /// now on will run first.
    pub fn use_handlers(&mut self, handlers: Vec<Handler>) {
        self.handlers.extend(handlers);
    }

    /// Register `path` under every method in the comma-separated `methods`
    /// list (e.g. `"GET,POST"`). The effective handler list is this group's
    /// handlers followed by `handlers`.
    pub fn to(&mut self, methods: &str, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        let full = format!("{}{}", self.prefix, path);
        let mut composed = self.handlers.clone();
        composed.extend(handlers);
        let indices = self.router.register(methods, &full, composed);
        Route::new(&mut *self.router, indices)
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

    /// Register `path` under every HTTP method the router supports.
    pub fn any(&mut self, path: &str, handlers: Vec<Handler>) -> Route<'_> {
        self.to(crate::router::METHODS_CSV, path, handlers)
    }
}
