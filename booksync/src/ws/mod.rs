use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::error::{Result, SyncError};
use crate::types::ConnectionState;

/// What the push channel reports to its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushEvent {
    /// The connection moved to a new state.
    Status(ConnectionState),
    /// A message arrived. Its content is not interpreted.
    Notified,
}

/// Why a single connection ended.
enum Ended {
    Closed,
    Failed(String),
    Shutdown,
}

/// Persistent push connection that reconnects forever after a fixed delay.
#[derive(Debug)]
pub struct PushChannel {
    url: String,
    reconnect_delay: Duration,
    events: mpsc::UnboundedSender<PushEvent>,
}

/// Handle to a running push channel. Dropping it does not stop the channel;
/// call [`close`](Self::close).
#[derive(Debug, Clone)]
pub struct PushHandle {
    cancel: CancellationToken,
}

impl PushHandle {
    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl PushChannel {
    /// Create a push channel (does not connect yet) and the receiver for
    /// its events.
    pub fn new(url: String, reconnect_delay: Duration) -> (Self, mpsc::UnboundedReceiver<PushEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        (
            Self {
                url,
                reconnect_delay,
                events,
            },
            rx,
        )
    }

    /// Validate the URL and start the reconnect loop in the background.
    ///
    /// # Errors
    ///
    /// If the URL cannot be turned into a websocket request, reports
    /// [`ConnectionState::FailedNoRetry`] and returns the error without
    /// scheduling any retry.
    pub fn connect(&self, cancel: CancellationToken) -> Result<PushHandle> {
        if let Err(e) = validate_url(&self.url) {
            error!("push channel init failed for {}: {e}", self.url);
            let _ = self
                .events
                .send(PushEvent::Status(ConnectionState::FailedNoRetry));
            return Err(e);
        }

        let cancel = cancel.child_token();
        let handle = PushHandle {
            cancel: cancel.clone(),
        };
        let events = self.events.clone();
        let delay = self.reconnect_delay;
        let url = self.url.clone();

        tokio::spawn(async move {
            let mut attempt: u64 = 0;
            loop {
                attempt += 1;
                emit(&events, ConnectionState::Connecting);
                match run_connection(&url, &events, &cancel).await {
                    Ended::Shutdown => break,
                    Ended::Closed => {
                        info!(attempt, "push channel closed");
                    }
                    Ended::Failed(reason) => {
                        warn!(attempt, "push channel error: {reason}");
                        emit(&events, ConnectionState::ErrorRetrying);
                    }
                }
                emit(&events, ConnectionState::DisconnectedRetrying);

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            debug!("push channel stopped");
        });

        Ok(handle)
    }
}

/// Check that `url` can be turned into a websocket handshake request.
fn validate_url(url: &str) -> Result<()> {
    let parsed = Url::parse(url)?;
    if !matches!(parsed.scheme(), "ws" | "wss") {
        return Err(SyncError::InvalidUrl(format!(
            "push channel needs ws:// or wss://, got {url}"
        )));
    }
    url.into_client_request()
        .map(|_| ())
        .map_err(|e| SyncError::WebSocket(format!("bad request for {url}: {e}")))
}

fn emit(events: &mpsc::UnboundedSender<PushEvent>, state: ConnectionState) {
    debug!(state = ?state, "push channel: {}", state.label());
    let _ = events.send(PushEvent::Status(state));
}

async fn run_connection(
    url: &str,
    events: &mpsc::UnboundedSender<PushEvent>,
    cancel: &CancellationToken,
) -> Ended {
    let connect = tokio_tungstenite::connect_async(url);
    let ws_stream = tokio::select! {
        _ = cancel.cancelled() => return Ended::Shutdown,
        res = connect => match res {
            Ok((ws_stream, _)) => ws_stream,
            Err(e) => return Ended::Failed(format!("connect failed: {e}")),
        },
    };

    info!("push channel connected to {url}");
    emit(events, ConnectionState::Connected);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("push channel shutdown requested");
                let _ = write.close().await;
                return Ended::Shutdown;
            }
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(_))) | Some(Ok(Message::Binary(_))) => {
                        let _ = events.send(PushEvent::Notified);
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = write.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        return Ended::Closed;
                    }
                    Some(Err(e)) => {
                        let _ = write.close().await;
                        return Ended::Failed(format!("read error: {e}"));
                    }
                    _ => {}
                }
            }
        }
    }
}
