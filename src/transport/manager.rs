//! Ownership of the current transport.

use tracing::debug;

use super::{Transport, TransportStatus};
use crate::dispatch::RequestHandler;
use crate::error::{Error, Result};

/// Holds at most one active transport.
///
/// Replacement is an explicit ownership handoff: `set_current` refuses to
/// install a new transport while the previous one still reports running, so
/// a forgotten `stop` surfaces as an error instead of a leaked channel.
#[derive(Default)]
pub struct TransportManager {
    current: Option<Box<dyn Transport>>,
}

impl TransportManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a transport as current.
    pub fn set_current(&mut self, transport: Box<dyn Transport>) -> Result<()> {
        if let Some(current) = &self.current {
            let status = current.status();
            if status.running {
                return Err(Error::Transport(format!(
                    "cannot replace the running {} transport, stop it first",
                    status.kind
                )));
            }
        }
        debug!(kind = %transport.kind(), "installing current transport");
        self.current = Some(transport);
        Ok(())
    }

    /// Start the current transport with the host's request handler.
    pub async fn start(&mut self, handler: RequestHandler) -> Result<()> {
        match self.current.as_mut() {
            Some(transport) => transport.start(handler).await,
            None => Err(Error::Transport("no transport installed".into())),
        }
    }

    /// Stop the current transport. A no-op when none is installed.
    pub async fn stop(&mut self) -> Result<()> {
        match self.current.as_mut() {
            Some(transport) => transport.stop().await,
            None => Ok(()),
        }
    }

    /// Status of the current transport, or `None` when none is installed.
    pub fn status(&self) -> Option<TransportStatus> {
        self.current.as_ref().map(|transport| transport.status())
    }
}
