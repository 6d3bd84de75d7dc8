/// Error types for the recognition engine boundary
///
/// Covers both the command path (rejections, transport failures) and the
/// event-subscription path.

use thiserror::Error;

/// Engine boundary errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Failed to reach the engine
    #[error("failed to connect to engine: {0}")]
    ConnectionFailed(String),

    /// Authentication failed (invalid API key)
    #[error("authentication failed: invalid API key")]
    AuthenticationFailed,

    /// Connection timeout
    #[error("connection timeout after {0}ms")]
    Timeout(u64),

    /// WebSocket transport error
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Failed to serialize or deserialize a wire message
    #[error("failed to serialize message: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The engine refused a command
    #[error("engine rejected `{command}`: {reason}")]
    Rejected { command: String, reason: String },

    /// Failed to open a push-event channel
    #[error("failed to subscribe to {channel}: {reason}")]
    SubscriptionFailed {
        channel: &'static str,
        reason: String,
    },

    /// Connection dropped while a command was outstanding
    #[error("engine connection closed unexpectedly")]
    ConnectionClosed,

    /// Invalid endpoint configuration
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
