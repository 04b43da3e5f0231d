//! # Server Module
//!
//! Coroutine HTTP transport adapter.
//!
//! The routing core is transport-free; this module connects it to
//! `may_minihttp`. Each inbound request runs on its own `may` coroutine:
//! the wire request is converted to an `http::Request`, the router writes
//! into a [`BufferedResponse`](crate::response::BufferedResponse), and the
//! buffered result is flushed back out. No other part of the crate touches
//! a socket.

mod request;
mod response;
mod service;

use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use may::coroutine::JoinHandle;
use may_minihttp::HttpServer as MiniHttpServer;
use tracing::info;

use crate::router::Router;
use crate::runtime_config::RuntimeConfig;

pub use service::RouterService;

/// A router bound to the coroutine HTTP server.
pub struct HttpServer(pub RouterService);

impl HttpServer {
    pub fn new(router: Router) -> Self {
        HttpServer(RouterService::new(router))
    }

    /// Bind `addr` and start serving on the `may` runtime.
    ///
    /// Reads [`RuntimeConfig`] from the environment for the coroutine
    /// stack size before spawning.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let config = RuntimeConfig::from_env();
        may::config().set_stack_size(config.stack_size);
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = MiniHttpServer(self.0).start(addr)?;
        info!(%addr, stack_size = config.stack_size, "server started");
        Ok(ServerHandle { addr, handle })
    }
}

/// Handle to a running server.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Block until the listener accepts connections (bounded wait).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// The address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Cancel the accept loop and wait for it to exit.
    pub fn stop(self) {
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Wait for the server to exit on its own.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}
