/// WebSocket link to the out-of-process recognition engine
///
/// Commands go out as JSON frames and are correlated FIFO with
/// `command_ack` / `command_rejected` replies; push events are fanned out to
/// the channel listeners registered through [`RecognitionEngine::listen`].

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
    connect_async,
    tungstenite::{
        http::{Request, Uri},
        Message,
    },
    MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, error, info, warn};

use super::error::{EngineError, EngineResult};
use super::gateway::RecognitionEngine;
use super::messages::{
    ClientCommand, EngineMessage, PauseCommand, ResumeCommand, StartCommand, StopCommand,
};
use crate::events::{EngineEvent, EventChannel, ListenerId};
use crate::session::SessionConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Write half of the WebSocket stream
type WsWriter = futures_util::stream::SplitSink<WsStream, Message>;

/// Read half of the WebSocket stream
type WsReader = futures_util::stream::SplitStream<WsStream>;

/// Engine endpoint configuration
///
/// # Example
/// ```no_run
/// use liveflow::engine::EngineEndpoint;
///
/// let endpoint = EngineEndpoint::new("wss://engine.example.com/v1/session")
///     .with_api_key("secret")
///     .with_timeout(5000);
/// ```
#[derive(Debug, Clone)]
pub struct EngineEndpoint {
    /// WebSocket URL of the engine
    pub url: String,

    /// API key sent in the `x-api-key` header
    pub api_key: Option<String>,

    /// Connection timeout in milliseconds
    pub timeout_ms: u64,
}

impl EngineEndpoint {
    /// Create an endpoint with the default timeout
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            timeout_ms: 10000,
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the connection timeout in milliseconds
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Build the upgrade request for this endpoint
    pub fn build_request(&self) -> EngineResult<Request<()>> {
        let uri: Uri = self
            .url
            .parse()
            .map_err(|e| EngineError::InvalidEndpoint(format!("invalid URL: {e}")))?;

        let host = uri
            .host()
            .ok_or_else(|| EngineError::InvalidEndpoint("URL has no host".to_string()))?
            .to_string();

        let mut builder = Request::builder()
            .uri(uri)
            .header("Host", host)
            .header("Connection", "Upgrade")
            .header("Upgrade", "websocket")
            .header("Sec-WebSocket-Version", "13");

        if let Some(ref key) = self.api_key {
            builder = builder.header("x-api-key", key.as_str());
        }

        builder
            .body(())
            .map_err(|e| EngineError::InvalidEndpoint(e.to_string()))
    }
}

/// Shared state between the engine handle and its reader task
struct Shared {
    /// Acknowledgements outstanding, in send order
    pending: Mutex<VecDeque<oneshot::Sender<EngineResult<()>>>>,

    /// Registered channel listeners
    listeners: Mutex<HashMap<u64, (EventChannel, mpsc::Sender<EngineEvent>)>>,

    /// Listener id allocator
    next_listener_id: AtomicU64,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, VecDeque<oneshot::Sender<EngineResult<()>>>> {
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn listeners(
        &self,
    ) -> MutexGuard<'_, HashMap<u64, (EventChannel, mpsc::Sender<EngineEvent>)>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Fail every outstanding command; called when the connection dies
    fn drain_pending(&self) {
        let mut pending = self.pending();
        while let Some(tx) = pending.pop_front() {
            let _ = tx.send(Err(EngineError::ConnectionClosed));
        }
    }
}

/// WebSocket-backed recognition engine
///
/// # Example
/// ```no_run
/// use liveflow::engine::{EngineEndpoint, RemoteEngine};
///
/// #[tokio::main]
/// async fn main() {
///     let endpoint = EngineEndpoint::new("wss://engine.example.com/v1/session");
///     let engine = RemoteEngine::connect(&endpoint).await.unwrap();
///     // hand it to a SessionController...
/// }
/// ```
pub struct RemoteEngine {
    writer: tokio::sync::Mutex<WsWriter>,
    shared: Arc<Shared>,
    reader_handle: JoinHandle<()>,
}

impl RemoteEngine {
    /// Connect to the engine
    ///
    /// # Errors
    ///
    /// Returns `Timeout` if the connection does not establish within the
    /// endpoint's timeout, `AuthenticationFailed` on a 401 upgrade
    /// response, and `ConnectionFailed` for other handshake errors.
    pub async fn connect(endpoint: &EngineEndpoint) -> EngineResult<Self> {
        info!(url = %endpoint.url, "connecting to recognition engine");

        let request = endpoint.build_request()?;
        let timeout = tokio::time::Duration::from_millis(endpoint.timeout_ms);

        let (ws_stream, response) = tokio::time::timeout(timeout, connect_async(request))
            .await
            .map_err(|_| EngineError::Timeout(endpoint.timeout_ms))?
            .map_err(|e| {
                if let tokio_tungstenite::tungstenite::Error::Http(resp) = &e {
                    if resp.status() == 401 {
                        return EngineError::AuthenticationFailed;
                    }
                }
                EngineError::ConnectionFailed(e.to_string())
            })?;

        info!(status = %response.status(), "engine connection established");

        let (writer, reader) = ws_stream.split();

        let shared = Arc::new(Shared {
            pending: Mutex::new(VecDeque::new()),
            listeners: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(0),
        });

        let reader_handle = tokio::spawn(reader_task(reader, Arc::clone(&shared)));

        Ok(Self {
            writer: tokio::sync::Mutex::new(writer),
            shared,
            reader_handle,
        })
    }

    /// Close the link and stop the reader task
    pub async fn shutdown(self) {
        info!("closing engine connection");
        {
            let mut writer = self.writer.lock().await;
            if let Err(e) = writer.close().await {
                warn!(error = %e, "failed to close engine connection cleanly");
            }
        }
        self.reader_handle.abort();
        self.shared.drain_pending();
    }

    /// Send one command frame and await its acknowledgement
    ///
    /// The writer lock is held across enqueue-and-send so the pending queue
    /// order always matches the wire order, which is what makes FIFO ack
    /// correlation sound.
    async fn send_command(&self, command: ClientCommand) -> EngineResult<()> {
        let name = command.name();
        let json = serde_json::to_string(&command)?;
        let (ack_tx, ack_rx) = oneshot::channel();

        {
            let mut writer = self.writer.lock().await;
            self.shared.pending().push_back(ack_tx);

            debug!(command = name, "sending command frame");
            if let Err(e) = writer.send(Message::Text(json.into())).await {
                self.shared.pending().pop_back();
                return Err(EngineError::WebSocket(e));
            }
        }

        match ack_rx.await {
            Ok(outcome) => outcome,
            Err(_) => Err(EngineError::ConnectionClosed),
        }
    }
}

#[async_trait]
impl RecognitionEngine for RemoteEngine {
    async fn start(&self, config: &SessionConfig) -> EngineResult<()> {
        self.send_command(ClientCommand::Start(StartCommand::new(config)))
            .await
    }

    async fn pause(&self) -> EngineResult<()> {
        self.send_command(ClientCommand::Pause(PauseCommand::new()))
            .await
    }

    async fn resume(&self) -> EngineResult<()> {
        self.send_command(ClientCommand::Resume(ResumeCommand::new()))
            .await
    }

    async fn stop(&self) -> EngineResult<()> {
        self.send_command(ClientCommand::Stop(StopCommand::new()))
            .await
    }

    fn listen(
        &self,
        channel: EventChannel,
        sink: mpsc::Sender<EngineEvent>,
    ) -> EngineResult<ListenerId> {
        let id = self.shared.next_listener_id.fetch_add(1, Ordering::SeqCst);
        self.shared.listeners().insert(id, (channel, sink));
        debug!(channel = channel.name(), id, "channel listener registered");
        Ok(ListenerId(id))
    }

    fn unlisten(&self, id: ListenerId) {
        if self.shared.listeners().remove(&id.0).is_some() {
            debug!(id = id.0, "channel listener removed");
        }
    }
}

/// Reader task: parses engine frames, resolves acknowledgements FIFO, and
/// fans push events out to the registered channel listeners
async fn reader_task(mut reader: WsReader, shared: Arc<Shared>) {
    debug!("engine reader task started");

    while let Some(frame) = reader.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                let message: EngineMessage = match serde_json::from_str(&text) {
                    Ok(message) => message,
                    Err(e) => {
                        error!(error = %e, "failed to parse engine frame");
                        continue;
                    }
                };

                match message {
                    EngineMessage::CommandAck { command } => {
                        debug!(command = %command, "command acknowledged");
                        match shared.pending().pop_front() {
                            Some(tx) => {
                                let _ = tx.send(Ok(()));
                            }
                            None => warn!(command = %command, "unexpected acknowledgement"),
                        }
                    }
                    EngineMessage::CommandRejected { command, reason } => {
                        warn!(command = %command, reason = %reason, "command rejected");
                        match shared.pending().pop_front() {
                            Some(tx) => {
                                let _ = tx.send(Err(EngineError::Rejected { command, reason }));
                            }
                            None => warn!("unexpected rejection"),
                        }
                    }
                    message => {
                        if let Some(event) = message.into_event() {
                            dispatch_event(&shared, event);
                        }
                    }
                }
            }
            Ok(Message::Close(frame)) => {
                info!(?frame, "engine sent close frame");
                break;
            }
            Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {
                // Pong replies are handled by the underlying library
            }
            Ok(other) => {
                warn!(?other, "unexpected frame from engine");
            }
            Err(e) => {
                error!(error = %e, "engine connection error");
                break;
            }
        }
    }

    shared.drain_pending();
    debug!("engine reader task stopped");
}

/// Deliver one event to every listener registered for its channel
fn dispatch_event(shared: &Shared, event: EngineEvent) {
    let channel = event.channel();
    let listeners = shared.listeners();

    for (id, (registered, sink)) in listeners.iter() {
        if *registered != channel {
            continue;
        }
        if let Err(e) = sink.try_send(event.clone()) {
            warn!(id = *id, channel = channel.name(), error = %e, "dropping event for slow listener");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_defaults() {
        let endpoint = EngineEndpoint::new("wss://engine.example.com/v1/session");
        assert_eq!(endpoint.timeout_ms, 10000);
        assert!(endpoint.api_key.is_none());
    }

    #[test]
    fn test_endpoint_builder() {
        let endpoint = EngineEndpoint::new("wss://engine.example.com/v1/session")
            .with_api_key("key-123")
            .with_timeout(5000);

        assert_eq!(endpoint.api_key.as_deref(), Some("key-123"));
        assert_eq!(endpoint.timeout_ms, 5000);
    }

    #[test]
    fn test_endpoint_build_request() {
        let endpoint =
            EngineEndpoint::new("wss://engine.example.com/v1/session").with_api_key("key-123");

        let request = endpoint.build_request().unwrap();
        assert_eq!(request.uri().host(), Some("engine.example.com"));
        assert_eq!(
            request.headers().get("x-api-key").map(|v| v.to_str().unwrap()),
            Some("key-123")
        );
    }

    #[test]
    fn test_endpoint_rejects_invalid_url() {
        let endpoint = EngineEndpoint::new("not a url");
        assert!(matches!(
            endpoint.build_request(),
            Err(EngineError::InvalidEndpoint(_))
        ));
    }
}
