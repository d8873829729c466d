//! Streamable-HTTP transport: an axum listener serving POSTed JSON bodies
//! on a configurable host/port/path.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Transport, TransportKind, TransportStatus};
use crate::config::HttpConfig;
use crate::dispatch::RequestHandler;
use crate::error::{Error, Result};

#[derive(Clone)]
struct HttpState {
    handler: RequestHandler,
    /// Flipped off before the listener shuts down, so no new request begins
    /// handling once closing starts.
    accepting: Arc<AtomicBool>,
}

/// HTTP transport. Accepts concurrent connections; each POST to the
/// configured path is dispatched independently with no cross-request
/// ordering guarantee. In-flight requests at stop time are not awaited.
pub struct HttpTransport {
    config: HttpConfig,
    running: Arc<AtomicBool>,
    accepting: Arc<AtomicBool>,
    shutdown: Option<oneshot::Sender<()>>,
    serve_task: Option<JoinHandle<()>>,
    local_addr: Option<SocketAddr>,
}

impl HttpTransport {
    pub fn new(config: HttpConfig) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            accepting: Arc::new(AtomicBool::new(false)),
            shutdown: None,
            serve_task: None,
            local_addr: None,
        }
    }

    /// The address actually bound, available once started. With port 0 in
    /// the config this is where the OS-assigned port shows up.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::StreamableHttp
    }

    async fn start(&mut self, handler: RequestHandler) -> Result<()> {
        if self.serve_task.is_some() {
            return Err(Error::Transport("HTTP transport already started".into()));
        }

        let addr = self.config.bind_addr();
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|error| Error::Transport(format!("failed to bind {addr}: {error}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|error| Error::Transport(format!("failed to read bound address: {error}")))?;

        let state = HttpState {
            handler,
            accepting: Arc::clone(&self.accepting),
        };
        let router = Router::new()
            .route(&self.config.path, any(handle))
            .fallback(not_found)
            .with_state(state);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);
        self.accepting.store(true, Ordering::SeqCst);

        debug!(addr = %local_addr, path = %self.config.path, "HTTP transport listening");
        self.local_addr = Some(local_addr);
        self.shutdown = Some(shutdown_tx);
        self.serve_task = Some(tokio::spawn(async move {
            let serve = axum::serve(listener, router).with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            });
            if let Err(error) = serve.await {
                warn!(error = %error, "HTTP transport terminated");
            }
            running.store(false, Ordering::SeqCst);
        }));

        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        // Close the channel before the listener.
        self.accepting.store(false, Ordering::SeqCst);
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(serve_task) = self.serve_task.take() {
            // In-flight requests are not awaited.
            serve_task.abort();
        }
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn status(&self) -> TransportStatus {
        TransportStatus {
            kind: self.kind(),
            running: self.running.load(Ordering::SeqCst),
            details: json!({
                "host": self.config.host,
                "port": self.local_addr.map_or(self.config.port, |addr| addr.port()),
                "path": self.config.path,
            }),
        }
    }
}

async fn handle(State(state): State<HttpState>, method: Method, body: String) -> Response {
    if method != Method::POST {
        return not_found().await.into_response();
    }
    if !state.accepting.load(Ordering::SeqCst) {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "error": "Server is shutting down" })),
        )
            .into_response();
    }

    let parsed: Value = match serde_json::from_str(&body) {
        Ok(parsed) => parsed,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Invalid JSON" })),
            )
                .into_response()
        }
    };

    let handler = Arc::clone(&state.handler);
    // Run in a task of its own so a panicking handler surfaces as a JoinError
    // and maps to a 500 instead of tearing the connection down.
    match tokio::spawn(async move { handler(parsed).await }).await {
        Ok(Some(response)) => Json(response).into_response(),
        // Notification: nothing to send back.
        Ok(None) => StatusCode::ACCEPTED.into_response(),
        Err(error) => {
            warn!(error = %error, "request handler failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "Internal Server Error",
                    "message": error.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}
