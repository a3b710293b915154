//! Consumer-side telemetry client with automatic reconnection.
//!
//! [`TelemetryClient`] hides connection management behind a small observable
//! surface: connection state, an optional last-error string, and the latest
//! snapshot batch. While disconnected the consumer keeps seeing the
//! last-known batch rather than an empty state.

use crate::error::TelemetryError;
use crate::telemetry::{FeedMessage, SensorReading};
use futures_util::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

/// Configuration for the telemetry client, fixed at construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// WebSocket URL of the telemetry feed
    pub url: String,
    /// Fixed delay between reconnection attempts (no backoff escalation)
    pub reconnect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: format!("ws://127.0.0.1:{}/ws", crate::DEFAULT_WEB_PORT),
            reconnect_delay: Duration::from_millis(crate::DEFAULT_RECONNECT_DELAY_MS),
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Set the fixed reconnection delay.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// Connection state of the client's channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

#[derive(Debug)]
enum Command {
    Reconnect,
    Shutdown,
}

/// How a live connection ended.
enum Outcome {
    /// Channel lost; retry after the fixed delay
    Lost,
    /// Consumer asked for an immediate re-dial
    Reconnect,
    /// Consumer is shutting the client down
    Shutdown,
}

#[derive(Debug)]
struct ClientShared {
    state: RwLock<ConnectionState>,
    readings: RwLock<Vec<SensorReading>>,
    last_error: RwLock<Option<String>>,
}

/// A continuously updated view of the telemetry feed.
///
/// On construction the client immediately dials the feed and thereafter
/// reconnects on its own after every channel loss, waiting the configured
/// fixed delay between attempts. Dropping the client (or calling
/// [`TelemetryClient::shutdown`]) cancels any pending reconnection and
/// closes any open channel.
#[derive(Debug)]
pub struct TelemetryClient {
    shared: Arc<ClientShared>,
    commands: mpsc::UnboundedSender<Command>,
    task: Option<JoinHandle<()>>,
}

impl TelemetryClient {
    /// Start the client; it begins connecting immediately.
    pub fn connect(config: ClientConfig) -> Self {
        let shared = Arc::new(ClientShared {
            state: RwLock::new(ConnectionState::Disconnected),
            readings: RwLock::new(Vec::new()),
            last_error: RwLock::new(None),
        });

        let (commands, command_rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_loop(config, shared.clone(), command_rx));

        Self {
            shared,
            commands,
            task: Some(task),
        }
    }

    /// Current connection state.
    pub async fn state(&self) -> ConnectionState {
        *self.shared.state.read().await
    }

    pub async fn is_connected(&self) -> bool {
        self.state().await == ConnectionState::Connected
    }

    /// The latest snapshot batch, possibly stale while disconnected.
    /// Empty until the first message arrives.
    pub async fn latest(&self) -> Vec<SensorReading> {
        self.shared.readings.read().await.clone()
    }

    /// Human-readable description of the last transport failure, cleared on
    /// the next successful connect.
    pub async fn last_error(&self) -> Option<String> {
        self.shared.last_error.read().await.clone()
    }

    /// Force-close any open channel and immediately dial a new connection,
    /// bypassing the scheduled reconnection delay.
    pub fn reconnect(&self) {
        let _ = self.commands.send(Command::Reconnect);
    }

    /// Close the channel, cancel pending reconnection work and wait for the
    /// driver task to finish.
    pub async fn shutdown(mut self) {
        let _ = self.commands.send(Command::Shutdown);
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for TelemetryClient {
    fn drop(&mut self) {
        // Shutdown not awaited; make sure no timer or channel outlives us.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn set_state(shared: &ClientShared, state: ConnectionState) {
    *shared.state.write().await = state;
}

async fn record_error(shared: &ClientShared, error: TelemetryError) {
    *shared.last_error.write().await = Some(error.to_string());
}

/// Apply one inbound text frame to the shared view.
///
/// `initial` and `update` are treated identically: the latest batch is
/// replaced wholesale. Anything else is discarded without touching the
/// connection.
async fn apply_text(shared: &ClientShared, text: &str) {
    match FeedMessage::from_json(text) {
        Ok(message) => {
            *shared.readings.write().await = message.into_data();
        }
        Err(e) => {
            debug!(error = %e, "discarding malformed feed message");
        }
    }
}

async fn run_loop(
    config: ClientConfig,
    shared: Arc<ClientShared>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    loop {
        set_state(&shared, ConnectionState::Connecting).await;
        debug!(url = %config.url, "dialing telemetry feed");

        match connect_async(config.url.as_str()).await {
            Ok((stream, _)) => {
                set_state(&shared, ConnectionState::Connected).await;
                *shared.last_error.write().await = None;
                info!(url = %config.url, "telemetry feed connected");

                let outcome = drive_connection(stream, &shared, &mut commands).await;
                set_state(&shared, ConnectionState::Disconnected).await;

                match outcome {
                    Outcome::Shutdown => return,
                    Outcome::Reconnect => continue,
                    Outcome::Lost => {}
                }
            }
            Err(e) => {
                warn!(url = %config.url, error = %e, "failed to open telemetry channel");
                record_error(&shared, TelemetryError::transport_error(e.to_string())).await;
                set_state(&shared, ConnectionState::Disconnected).await;
            }
        }

        // Fixed-delay reconnection, cancellable by consumer commands.
        tokio::select! {
            _ = tokio::time::sleep(config.reconnect_delay) => {}
            cmd = commands.recv() => match cmd {
                Some(Command::Reconnect) => {}
                Some(Command::Shutdown) | None => return,
            },
        }
    }
}

async fn drive_connection(
    mut stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
    shared: &ClientShared,
    commands: &mut mpsc::UnboundedReceiver<Command>,
) -> Outcome {
    loop {
        tokio::select! {
            msg = stream.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    apply_text(shared, &text).await;
                }
                Some(Ok(Message::Close(_))) => {
                    record_error(
                        shared,
                        TelemetryError::transport_error("connection closed by server"),
                    )
                    .await;
                    return Outcome::Lost;
                }
                Some(Ok(other)) => {
                    debug!(?other, "ignoring non-text frame");
                }
                Some(Err(e)) => {
                    record_error(shared, TelemetryError::transport_error(e.to_string())).await;
                    return Outcome::Lost;
                }
                None => {
                    record_error(shared, TelemetryError::transport_error("stream ended")).await;
                    return Outcome::Lost;
                }
            },
            cmd = commands.recv() => match cmd {
                Some(Command::Reconnect) => {
                    let _ = stream.close(None).await;
                    return Outcome::Reconnect;
                }
                Some(Command::Shutdown) | None => {
                    let _ = stream.close(None).await;
                    return Outcome::Shutdown;
                }
            },
        }
    }
}
