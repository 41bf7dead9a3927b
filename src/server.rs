//! HTTP server for a single controller, with graceful shutdown.
//!
//! perch does not route. [`Server`] mounts exactly one [`Controller`] and
//! hands it every request that arrives, with empty [`Args`]. Put a router in
//! front of it, or mount a controller that dispatches further on its own.
//!
//! perch does not decode bodies either. By default a request reaches the
//! controller with empty form and file bags; plug a decoder in with
//! [`Server::decode_with`] to fill them:
//!
//! ```rust
//! use perch::{Request, Server};
//!
//! let server = Server::bind("127.0.0.1:3000").unwrap().decode_with(|parts, body| {
//!     let mut req = Request::from_parts(parts, body.clone()).into_builder();
//!     for pair in std::str::from_utf8(&body).unwrap_or("").split('&') {
//!         if let Some((k, v)) = pair.split_once('=') {
//!             req = req.form_field(k, v);
//!         }
//!     }
//!     req.build()
//! });
//! ```
//!
//! # Graceful shutdown and Kubernetes
//!
//! When Kubernetes terminates a pod it sends **SIGTERM** and waits
//! `terminationGracePeriodSeconds` (default 30 s) before sending SIGKILL.
//!
//! The server reacts by:
//! 1. Immediately stopping `listener.accept()`, so no new connections are made.
//! 2. Letting every in-flight connection task run to completion.
//! 3. Returning from [`Server::serve`], which lets `main` exit cleanly.

use std::convert::Infallible;
use std::fmt::Display;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http::request::Parts;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::service::service_fn;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::controller::{Args, Controller};
use crate::error::Error;
use crate::request::Request;
use crate::response::Response;

/// Builds the [`Request`] a controller sees from what hyper received.
type Decoder = Arc<dyn Fn(Parts, Bytes) -> Request + Send + Sync>;

enum Bind {
    Addr(SocketAddr),
    Listener(TcpListener),
}

/// The HTTP server.
pub struct Server {
    bind: Bind,
    decode: Decoder,
}

impl Server {
    /// Configures the server to bind to `addr` when it starts serving.
    ///
    /// ```rust
    /// use perch::Server;
    /// let server = Server::bind("0.0.0.0:3000").unwrap();
    /// assert!(Server::bind("not an address").is_err());
    /// ```
    pub fn bind(addr: &str) -> Result<Self, Error> {
        Ok(Self::new(Bind::Addr(addr.parse()?)))
    }

    /// Serves on a listener that is already bound, e.g. to port `0`.
    pub fn from_listener(listener: TcpListener) -> Self {
        Self::new(Bind::Listener(listener))
    }

    fn new(bind: Bind) -> Self {
        Self { bind, decode: Arc::new(Request::from_parts) }
    }

    /// Replaces the default decoder ([`Request::from_parts`]) with `decode`,
    /// which runs once per request after the body has been read in full.
    /// This is where form fields and uploaded files get attached.
    pub fn decode_with<D>(mut self, decode: D) -> Self
    where
        D: Fn(Parts, Bytes) -> Request + Send + Sync + 'static,
    {
        self.decode = Arc::new(decode);
        self
    }

    /// Starts accepting connections and dispatching them to `controller`.
    ///
    /// Returns only after a full graceful shutdown (SIGTERM or Ctrl-C,
    /// followed by all in-flight requests completing).
    pub async fn serve<C>(self, controller: C) -> Result<(), Error>
    where
        C: Controller + Send + Sync + 'static,
        C::Error: Display,
    {
        self.serve_with_shutdown(controller, shutdown_signal()).await
    }

    /// Like [`serve`](Server::serve), but stops when `signal` resolves.
    pub async fn serve_with_shutdown<C, S>(self, controller: C, signal: S) -> Result<(), Error>
    where
        C: Controller + Send + Sync + 'static,
        C::Error: Display,
        S: Future<Output = ()>,
    {
        let listener = match self.bind {
            Bind::Addr(addr) => TcpListener::bind(addr).await?,
            Bind::Listener(listener) => listener,
        };
        let addr = listener.local_addr()?;

        // One controller for every connection; dispatch only needs `&C`.
        let controller = Arc::new(controller);
        let decode = self.decode;

        info!(addr = %addr, "perch listening");

        // JoinSet tracks every spawned connection task so we can wait for
        // them all to finish during graceful shutdown.
        let mut tasks = tokio::task::JoinSet::new();

        tokio::pin!(signal);

        loop {
            tokio::select! {
                // Check shutdown first so a SIGTERM immediately stops
                // accepting new connections, even if more are queued.
                biased;

                () = &mut signal => {
                    info!(in_flight = tasks.len(), "shutdown signal received, draining connections");
                    break;
                }

                res = listener.accept() => {
                    let (stream, peer) = match res {
                        Ok(v) => v,
                        Err(e) => {
                            error!("accept error: {e}");
                            continue;
                        }
                    };

                    let controller = Arc::clone(&controller);
                    let decode = Arc::clone(&decode);
                    let io = TokioIo::new(stream);

                    tasks.spawn(async move {
                        // Called once per request on the connection.
                        let svc = service_fn(move |req| {
                            let controller = Arc::clone(&controller);
                            let decode = Arc::clone(&decode);
                            async move { handle(controller, decode, req, peer).await }
                        });

                        // HTTP/1.1 or HTTP/2, whatever the client negotiates.
                        if let Err(e) = ConnBuilder::new(TokioExecutor::new())
                            .serve_connection(io, svc)
                            .await
                        {
                            error!(peer = %peer, "connection error: {e}");
                        }
                    });
                }

                // Reap finished connection tasks so the JoinSet does not grow
                // without bound on long-running servers.
                Some(_) = tasks.join_next(), if !tasks.is_empty() => {}
            }
        }

        while tasks.join_next().await.is_some() {}

        info!("perch stopped");
        Ok(())
    }
}

// ── Request dispatch ──────────────────────────────────────────────────────────

/// Produces one response for one request. Every failure becomes a status
/// code here, so hyper never sees an error.
async fn handle<C>(
    controller: Arc<C>,
    decode: Decoder,
    req: hyper::Request<Incoming>,
    peer: SocketAddr,
) -> Result<http::Response<Full<Bytes>>, Infallible>
where
    C: Controller,
    C::Error: Display,
{
    let (parts, body) = req.into_parts();
    let body = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) => {
            warn!(peer = %peer, "failed to read request body: {e}");
            return Ok(Response::with_status(400u16).into_http());
        }
    };

    let request = decode(parts, body);
    let response = match controller.dispatch(&request, Response::new(), &Args::default()) {
        Ok(response) => response,
        Err(e) => {
            error!(peer = %peer, method = %request.method(), path = request.path(), "controller failed: {e}");
            Response::with_status(500u16)
        }
    };

    debug!(method = %request.method(), path = request.path(), status = response.status(), "handled");
    Ok(response.into_http())
}

// ── Shutdown signal ───────────────────────────────────────────────────────────

/// Resolves on the first shutdown signal the process receives.
///
/// On Unix this listens for both **SIGTERM** and **SIGINT** (Ctrl-C).
/// On Windows only Ctrl-C is available. If a handler cannot be installed
/// that arm never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to install Ctrl-C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let sigterm = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let sigterm = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c   => {}
        () = sigterm  => {}
    }
}
