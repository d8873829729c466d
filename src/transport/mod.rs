//! Transport layer: adapters bridging an external request source to the
//! dispatcher, plus a manager owning the current transport's lifecycle.

use async_trait::async_trait;
use serde_json::Value;
use strum::Display;

use crate::dispatch::RequestHandler;
use crate::error::Result;

pub mod http;
pub mod manager;
pub mod stdio;

pub use http::HttpTransport;
pub use manager::TransportManager;
pub use stdio::StdioTransport;

/// Which adapter a transport is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TransportKind {
    Stdio,
    StreamableHttp,
}

/// Point-in-time report of a transport's state.
#[derive(Debug, Clone)]
pub struct TransportStatus {
    pub kind: TransportKind,
    pub running: bool,
    pub details: Value,
}

/// Lifecycle contract shared by all transport adapters.
///
/// `start` wires the host's request handler to the adapter's channel and is
/// fatal on connect/listen failure. `stop` is idempotent: closing an already
/// closed transport is a no-op.
#[async_trait]
pub trait Transport: Send + Sync {
    fn kind(&self) -> TransportKind;

    async fn start(&mut self, handler: RequestHandler) -> Result<()>;

    async fn stop(&mut self) -> Result<()>;

    fn status(&self) -> TransportStatus;
}
