//! HTTP server.
//!
//! Accepts TCP connections, serves HTTP/1.1 through hyper, buffers each
//! request body up to a size limit and hands the request to
//! [`App::dispatch`] under a request timeout.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use waypoint_server::{App, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let app = Arc::new(App::builder().build()?);
//!     Server::new("0.0.0.0:3000".parse()?, app).run().await?;
//!     Ok(())
//! }
//! ```

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use waypoint_core::{response, DispatchError, Request, Response};

use crate::app::App;
use crate::shutdown::{ConnectionTracker, ShutdownSignal};

/// Default request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time to wait for in-flight connections on shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Errors that stop the server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The requested address.
        addr: SocketAddr,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error on the listener.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serves an [`App`] over HTTP/1.1.
#[derive(Debug)]
pub struct Server {
    addr: SocketAddr,
    app: Arc<App>,
    request_timeout: Duration,
    shutdown_timeout: Duration,
    max_body_size: usize,
}

impl Server {
    /// Creates a server for `app` on `addr`.
    #[must_use]
    pub fn new(addr: SocketAddr, app: Arc<App>) -> Self {
        Self {
            addr,
            app,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Sets the per-request timeout, covering body collection and dispatch.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets how long shutdown waits for in-flight connections.
    #[must_use]
    pub fn shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Sets the largest request body accepted, in bytes. Larger bodies get a
    /// 413 response without reaching the app.
    #[must_use]
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// The configured listen address.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Runs until SIGTERM or SIGINT.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(ShutdownSignal::with_os_signals()).await
    }

    /// Binds the configured address and runs until `shutdown` fires.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Bind`] if the address cannot be bound.
    pub async fn run_with_shutdown(self, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let listener = TcpListener::bind(self.addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: self.addr,
                source,
            })?;
        self.serve(listener, shutdown).await
    }

    /// Serves connections from an already bound listener until `shutdown`
    /// fires, then drains in-flight connections.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Io`] if the listener address cannot be read.
    pub async fn serve(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), ServerError> {
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "server listening");

        let server = Arc::new(self);
        let tracker = ConnectionTracker::new();

        loop {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, remote_addr)) => {
                        let server = Arc::clone(&server);
                        let token = tracker.acquire();
                        let shutdown = shutdown.clone();

                        tokio::spawn(async move {
                            if let Err(e) = server.handle_connection(stream, remote_addr, shutdown).await {
                                tracing::debug!(remote = %remote_addr, error = %e, "connection error");
                            }
                            drop(token);
                        });
                    }
                    Err(e) => tracing::error!(error = %e, "failed to accept connection"),
                },
                () = shutdown.recv() => {
                    tracing::info!("shutdown signal received, no longer accepting connections");
                    break;
                }
            }
        }

        tracing::info!(
            active = tracker.active_connections(),
            timeout_ms = u64::try_from(server.shutdown_timeout.as_millis()).unwrap_or(u64::MAX),
            "draining connections"
        );
        tokio::select! {
            () = tracker.wait_for_drain() => tracing::info!("all connections closed"),
            () = tokio::time::sleep(server.shutdown_timeout) => tracing::warn!(
                active = tracker.active_connections(),
                "shutdown timeout reached with connections still open"
            ),
        }

        tracing::info!("server stopped");
        Ok(())
    }

    async fn handle_connection(
        self: &Arc<Self>,
        stream: TcpStream,
        remote_addr: SocketAddr,
        shutdown: ShutdownSignal,
    ) -> Result<(), hyper::Error> {
        let io = TokioIo::new(stream);
        let server = Arc::clone(self);

        let service = service_fn(move |req: http::Request<Incoming>| {
            let server = Arc::clone(&server);
            async move { Ok::<_, Infallible>(server.handle_request(req).await) }
        });

        let conn = http1::Builder::new().serve_connection(io, service);
        tokio::pin!(conn);

        tokio::select! {
            result = conn.as_mut() => result,
            () = shutdown.recv() => {
                conn.as_mut().graceful_shutdown();
                tracing::debug!(remote = %remote_addr, "closing connection for shutdown");
                conn.await
            }
        }
    }

    async fn handle_request(&self, req: http::Request<Incoming>) -> Response {
        let timeout_ms = u64::try_from(self.request_timeout.as_millis()).unwrap_or(u64::MAX);
        let outcome = tokio::time::timeout(self.request_timeout, async {
            let request = match buffer(req, self.max_body_size).await {
                Ok(request) => request,
                Err(e) => {
                    tracing::warn!(error = %e, "failed to read request body");
                    return response::error(&e);
                }
            };
            self.app.dispatch(request).await
        })
        .await;

        outcome.unwrap_or_else(|_| {
            tracing::warn!(timeout_ms, "request timed out");
            response::error(&DispatchError::Timeout { timeout_ms })
        })
    }
}

async fn buffer(req: http::Request<Incoming>, limit: usize) -> Result<Request, DispatchError> {
    let (parts, body) = req.into_parts();
    let bytes: Bytes = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<LengthLimitError>() {
                DispatchError::PayloadTooLarge { limit }
            } else {
                DispatchError::BodyRead {
                    reason: e.to_string(),
                }
            }
        })?
        .to_bytes();
    Ok(http::Request::from_parts(parts, bytes))
}
