use std::io;
use std::sync::Arc;

use http::StatusCode;
use may_minihttp::{HttpService, Request, Response};
use tracing::warn;

use crate::response::BufferedResponse;
use crate::router::Router;

use super::request::build_request;
use super::response::{flush, flush_error};

/// The `HttpService` implementation that runs one router.
///
/// Cloned per connection by the server runtime; all clones share the same
/// router, whose route tables are immutable once serving begins.
#[derive(Clone)]
pub struct RouterService {
    router: Arc<Router>,
}

impl RouterService {
    pub fn new(router: Router) -> Self {
        Self {
            router: Arc::new(router),
        }
    }

    /// The shared router. Useful for probing state from tests.
    pub fn router(&self) -> &Router {
        &self.router
    }
}

impl HttpService for RouterService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = match build_request(req) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "unparsable request");
                flush_error(res, StatusCode::BAD_REQUEST, "Bad Request");
                return Ok(());
            }
        };
        let mut buffered = BufferedResponse::new();
        self.router.handle(request, &mut buffered);
        flush(buffered, res);
        Ok(())
    }
}
