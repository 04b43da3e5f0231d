//! Response-writer abstraction at the transport boundary.
//!
//! The routing core never talks to a socket. It writes through
//! [`ResponseWriter`]: header access, a one-shot status line, and repeatable
//! body writes. The byte count and final status stay observable so wrapping
//! writers (timing, logging) can report on the completed response.
//!
//! [`BufferedResponse`] is the concrete implementation used by the server
//! adapter and by tests; it stages everything in memory until the transport
//! flushes it.

use std::io;

use http::{HeaderMap, StatusCode};
use tracing::warn;

/// Minimal capability set the pipeline needs from a response.
///
/// The status line is written at most once; later calls are ignored with a
/// warning. Body writes may happen any number of times and are counted.
pub trait ResponseWriter {
    /// Mutable access to the response headers.
    fn headers_mut(&mut self) -> &mut HeaderMap;

    /// Write the status line. The first call wins.
    fn write_status(&mut self, status: StatusCode);

    /// Append body bytes, returning how many were accepted.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// The status that has been (or will be) sent. Defaults to 200.
    fn status(&self) -> StatusCode;

    /// Total body bytes written so far.
    fn bytes_written(&self) -> u64;
}

/// In-memory [`ResponseWriter`] staged for a single transport flush.
#[derive(Debug)]
pub struct BufferedResponse {
    status: StatusCode,
    status_written: bool,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            status_written: false,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// The staged body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The staged headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Consume the response into `(status, headers, body)` for the transport.
    pub fn into_parts(self) -> (StatusCode, HeaderMap, Vec<u8>) {
        (self.status, self.headers, self.body)
    }
}

impl Default for BufferedResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter for BufferedResponse {
    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn write_status(&mut self, status: StatusCode) {
        if self.status_written {
            warn!(
                current = self.status.as_u16(),
                ignored = status.as_u16(),
                "status line already written"
            );
            return;
        }
        self.status = status;
        self.status_written = true;
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(data);
        Ok(data.len())
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn bytes_written(&self) -> u64 {
        self.body.len() as u64
    }
}
