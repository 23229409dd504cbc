//! Socket binding and lifecycle for the `may_minihttp` server.
//!
//! [`HttpServer`] wraps any [`HttpService`] (in practice
//! [`AppService`](super::AppService)) and starts the accept loop on a `may`
//! coroutine. The returned [`ServerHandle`] is used to wait until the port
//! accepts connections, to block on the server, or to stop it.
//!
//! ```rust,ignore
//! let handle = HttpServer(service).start(("0.0.0.0", 4000))?;
//! handle.wait_ready()?;
//! handle.join()?;
//! ```

use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

/// Wrapper around `may_minihttp`'s server accepting up to 32 request headers.
///
/// Requests with more headers than that are rejected by the parser before
/// they reach the service.
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server
///
/// Dropping the handle leaves the server running; call [`ServerHandle::stop`]
/// to shut it down.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Poll the listening address until a TCP connect succeeds.
    ///
    /// Tries 100 times, 5ms apart.
    ///
    /// # Returns
    ///
    /// `Ok(())` once a connection to [`ServerHandle::addr`] succeeds.
    ///
    /// # Errors
    ///
    /// `TimedOut` if the server is not accepting after ~500ms.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..100 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Cancel the accept coroutine and wait for it to finish.
    ///
    /// Consumes the handle. Connections already being served finish on their
    /// own coroutines.
    pub fn stop(self) {
        // SAFETY: cancel() is unsafe per the may runtime; the handle is owned
        // here and the coroutine is not touched again after join.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the server coroutine exits.
    ///
    /// Used by `shiftdesk serve` to keep the process alive.
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind `addr` and start serving.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address to bind to (e.g., `("0.0.0.0", 4000)` or `"127.0.0.1:0"`).
    ///   Only the first resolved address is used.
    ///
    /// # Returns
    ///
    /// A `ServerHandle` for managing the running server
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = HttpServerWithHeaders::<_, 32>(self.0).start(addr)?;
        Ok(ServerHandle { addr, handle })
    }
}
