use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use http::Request;
use serde::de::DeserializeOwned;

use crate::content::{self, DataWriter, Payload};
use crate::response::ResponseWriter;
use crate::router::Router;

/// A request handler bound to a route (or to the router itself).
///
/// Returning `Ok(())` passes control back to the pipeline; returning an
/// error aborts the remaining handlers and hands the error to the router's
/// translator. Handlers that wrap the rest of the chain call
/// [`Context::next`] and regain control afterwards.
pub type Handler = Arc<dyn Fn(&mut Context<'_>) -> Result<()> + Send + Sync>;

/// Wrap a closure into a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Context<'_>) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// The per-request environment passed to each handler.
///
/// Exposes the parsed request, the response writer, the captured path
/// parameters of the matched route, and a name-keyed map for sharing data
/// between handlers of one request. One context is owned by exactly one
/// request at a time; nothing on it is thread-safe.
pub struct Context<'a> {
    /// The incoming request.
    pub request: Request<Vec<u8>>,
    /// The response writer for this request.
    pub response: &'a mut dyn ResponseWriter,
    router: &'a Router,
    state: Box<ContextState>,
}

/// The pooled portion of a context: everything that survives between
/// requests with its allocations intact.
pub(crate) struct ContextState {
    pub(crate) handlers: Arc<[Handler]>,
    pub(crate) index: usize,
    pub(crate) pnames: Vec<String>,
    pub(crate) pvalues: Vec<String>,
    pub(crate) data: HashMap<String, Box<dyn Any + Send + Sync>>,
    pub(crate) writer: DataWriter,
}

impl ContextState {
    pub(crate) fn new() -> Self {
        Self {
            handlers: Vec::new().into(),
            index: 0,
            pnames: Vec::new(),
            pvalues: Vec::new(),
            data: HashMap::new(),
            writer: DataWriter::Default,
        }
    }

    /// Prepare for the next request, preserving buffer capacity.
    pub(crate) fn reset(&mut self, max_params: usize) {
        self.handlers = Vec::new().into();
        self.index = 0;
        self.pnames.clear();
        self.data.clear();
        self.writer = DataWriter::Default;
        if self.pvalues.len() != max_params {
            self.pvalues.resize_with(max_params, String::new);
        }
    }

    /// Copy the matched route's parameter names in, reusing string slots.
    pub(crate) fn set_pnames(&mut self, names: &[String]) {
        self.pnames.truncate(names.len());
        for (dst, src) in self.pnames.iter_mut().zip(names) {
            dst.clear();
            dst.push_str(src);
        }
        let have = self.pnames.len();
        for src in &names[have..] {
            self.pnames.push(src.clone());
        }
    }
}

impl<'a> Context<'a> {
    pub(crate) fn new(
        request: Request<Vec<u8>>,
        response: &'a mut dyn ResponseWriter,
        router: &'a Router,
        state: Box<ContextState>,
    ) -> Self {
        Self {
            request,
            response,
            router,
            state,
        }
    }

    pub(crate) fn into_state(self) -> Box<ContextState> {
        self.state
    }

    /// The router dispatching this request.
    pub fn router(&self) -> &'a Router {
        self.router
    }

    /// Run the remaining handlers of the pipeline in order.
    ///
    /// Stops early when a handler returns an error (propagating it) or
    /// calls [`abort`](Context::abort).
    pub fn next(&mut self) -> Result<()> {
        while self.state.index < self.state.handlers.len() {
            let handler = self.state.handlers[self.state.index].clone();
            self.state.index += 1;
            handler(self)?;
        }
        Ok(())
    }

    /// Skip the rest of the pipeline without raising an error.
    pub fn abort(&mut self) {
        self.state.index = self.state.handlers.len();
    }

    /// The value captured for the first parameter named `name`, or `""`.
    ///
    /// Names are searched in pattern order, so when a pattern uses the same
    /// name twice the first capture wins.
    pub fn param(&self, name: &str) -> &str {
        for (n, v) in self.state.pnames.iter().zip(self.state.pvalues.iter()) {
            if n == name {
                return v;
            }
        }
        ""
    }

    /// All captured parameters of the matched route, in pattern order.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.state
            .pnames
            .iter()
            .zip(self.state.pvalues.iter())
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Share a value with later handlers of this request under `name`.
    pub fn set<V: Any + Send + Sync>(&mut self, name: impl Into<String>, value: V) {
        self.state.data.insert(name.into(), Box::new(value));
    }

    /// A value stored by an earlier handler, if its type matches.
    pub fn get<V: Any + Send + Sync>(&self, name: &str) -> Option<&V> {
        self.state.data.get(name).and_then(|v| v.downcast_ref())
    }

    /// Deserialize the request body into `T`, choosing the reader from the
    /// `Content-Type` header (JSON, XML, form, multipart form). GET requests
    /// read from the query string instead.
    pub fn read<T: DeserializeOwned>(&self) -> Result<T> {
        content::read(self)
    }

    /// Write `data` to the response through the installed data writer.
    pub fn write(&mut self, data: impl Into<Payload>) -> Result<()> {
        let writer = self.state.writer;
        writer.write(self.response, data.into())
    }

    /// Install a data writer for the rest of this request. Its content-type
    /// header is applied immediately.
    pub fn set_data_writer(&mut self, writer: DataWriter) {
        writer.set_header(self.response);
        self.state.writer = writer;
    }

    /// The currently installed data writer.
    pub fn data_writer(&self) -> DataWriter {
        self.state.writer
    }
}
