//! Standard-stream transport: one long-lived duplex channel over the
//! process's stdin/stdout, newline-delimited JSON framing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::{Transport, TransportKind, TransportStatus};
use crate::dispatch::{JsonRpcError, JsonRpcResponse, RequestHandler, RequestId};
use crate::error::{Error, Result};

type ChannelReader = Box<dyn AsyncRead + Send + Sync + Unpin>;
type ChannelWriter = Box<dyn AsyncWrite + Send + Sync + Unpin>;

/// Stdio transport. Requests are served one at a time in arrival order; the
/// pump ends at EOF on the input stream.
pub struct StdioTransport {
    channel: Option<(ChannelReader, ChannelWriter)>,
    running: Arc<AtomicBool>,
    pump: Option<JoinHandle<()>>,
}

impl StdioTransport {
    /// Transport over the process's real stdin/stdout.
    pub fn new() -> Self {
        Self::with_streams(tokio::io::stdin(), tokio::io::stdout())
    }

    /// Transport over arbitrary streams. Tests use in-memory duplex pipes
    /// here instead of touching the real standard streams.
    pub fn with_streams(
        reader: impl AsyncRead + Send + Sync + Unpin + 'static,
        writer: impl AsyncWrite + Send + Sync + Unpin + 'static,
    ) -> Self {
        Self {
            channel: Some((Box::new(reader), Box::new(writer))),
            running: Arc::new(AtomicBool::new(false)),
            pump: None,
        }
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for StdioTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Stdio
    }

    async fn start(&mut self, handler: RequestHandler) -> Result<()> {
        if self.pump.is_some() {
            return Err(Error::Transport("stdio transport already started".into()));
        }
        let (reader, writer) = self
            .channel
            .take()
            .ok_or_else(|| Error::Transport("stdio channel already consumed".into()))?;

        let running = Arc::clone(&self.running);
        running.store(true, Ordering::SeqCst);

        self.pump = Some(tokio::spawn(pump(reader, writer, handler, running)));
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn status(&self) -> TransportStatus {
        TransportStatus {
            kind: self.kind(),
            running: self.running.load(Ordering::SeqCst),
            details: json!({ "channel": "stdio" }),
        }
    }
}

/// Read lines, dispatch, write responses. Single channel, FIFO: a request
/// is fully handled before the next line is read.
async fn pump(
    reader: ChannelReader,
    mut writer: ChannelWriter,
    handler: RequestHandler,
    running: Arc<AtomicBool>,
) {
    let mut lines = BufReader::new(reader).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("stdio channel reached EOF");
                break;
            }
            Err(error) => {
                warn!(error = %error, "stdio read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            // Each call runs in its own task: a panicking handler gets an
            // internal-error response instead of killing the pump.
            Ok(body) => {
                let id = request_id(&body);
                let call = {
                    let handler = Arc::clone(&handler);
                    tokio::spawn(async move { handler(body).await })
                };
                match call.await {
                    Ok(response) => response,
                    Err(error) => {
                        warn!(error = %error, "stdio handler task failed");
                        Some(
                            JsonRpcResponse::failure(
                                id,
                                JsonRpcError::internal_error("Internal server error"),
                            )
                            .into_value(),
                        )
                    }
                }
            }
            Err(error) => Some(
                JsonRpcResponse::failure(
                    RequestId::Null,
                    JsonRpcError::parse_error(format!("invalid JSON: {error}")),
                )
                .into_value(),
            ),
        };

        if let Some(response) = response {
            if write_line(&mut writer, &response).await.is_err() {
                break;
            }
        }
    }

    running.store(false, Ordering::SeqCst);
}

fn request_id(body: &Value) -> RequestId {
    body.get("id")
        .cloned()
        .and_then(|id| serde_json::from_value(id).ok())
        .unwrap_or(RequestId::Null)
}

async fn write_line(writer: &mut ChannelWriter, response: &Value) -> std::io::Result<()> {
    let mut payload = response.to_string().into_bytes();
    payload.push(b'\n');
    let written = async {
        writer.write_all(&payload).await?;
        writer.flush().await
    }
    .await;
    if let Err(error) = &written {
        warn!(error = %error, "stdio write failed");
    }
    written
}
