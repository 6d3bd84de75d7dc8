/// Wire message types for the remote recognition engine
///
/// The engine speaks JSON frames over a WebSocket. Client-to-engine frames
/// are session commands; engine-to-client frames are either command
/// acknowledgements or push events on one of the named channels.

use serde::{Deserialize, Serialize};

use crate::events::EngineEvent;
use crate::session::{ProcessingMode, SessionConfig};
use crate::transcript::RecognitionResult;

// ============================================================================
// Client -> Engine Commands
// ============================================================================

/// Start a recognition session
///
/// Carries the full session configuration; the engine acknowledges with
/// `command_ack` or refuses with `command_rejected`.
///
/// # Example
/// ```
/// use liveflow::engine::messages::StartCommand;
/// use liveflow::session::SessionConfig;
///
/// let cmd = StartCommand::new(&SessionConfig::default());
/// let json = serde_json::to_string(&cmd).unwrap();
/// assert!(json.contains("\"message_type\":\"start_session\""));
/// ```
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StartCommand {
    /// Message type identifier (always "start_session")
    pub message_type: &'static str,

    /// Language code ("auto" or a fixed language)
    pub language: &'static str,

    /// Processing mode
    pub mode: ProcessingMode,

    /// Whether to label speakers
    pub speaker_diarization: bool,

    /// Whether to apply noise reduction
    pub noise_reduction: bool,

    /// Whether the engine persists the audio artifact periodically
    pub auto_save: bool,

    /// Auto-save interval in minutes
    pub save_interval_min: u32,
}

impl StartCommand {
    /// Build a start command from a session configuration
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            message_type: "start_session",
            language: config.language.code(),
            mode: config.mode,
            speaker_diarization: config.speaker_diarization,
            noise_reduction: config.noise_reduction,
            auto_save: config.auto_save,
            save_interval_min: config.save_interval_min,
        }
    }
}

/// Pause the live session
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PauseCommand {
    /// Message type identifier (always "pause_session")
    pub message_type: &'static str,
}

impl Default for PauseCommand {
    fn default() -> Self {
        Self {
            message_type: "pause_session",
        }
    }
}

impl PauseCommand {
    /// Create a new pause command
    pub fn new() -> Self {
        Self::default()
    }
}

/// Resume a paused session
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ResumeCommand {
    /// Message type identifier (always "resume_session")
    pub message_type: &'static str,
}

impl Default for ResumeCommand {
    fn default() -> Self {
        Self {
            message_type: "resume_session",
        }
    }
}

impl ResumeCommand {
    /// Create a new resume command
    pub fn new() -> Self {
        Self::default()
    }
}

/// Stop the session
///
/// Acknowledgement only confirms the engine accepted the stop; trailing
/// recognition events and the final `session_complete` arrive afterwards.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct StopCommand {
    /// Message type identifier (always "stop_session")
    pub message_type: &'static str,
}

impl Default for StopCommand {
    fn default() -> Self {
        Self {
            message_type: "stop_session",
        }
    }
}

impl StopCommand {
    /// Create a new stop command
    pub fn new() -> Self {
        Self::default()
    }
}

/// Union type for all client commands
#[derive(Serialize, Debug, Clone)]
#[serde(untagged)]
pub enum ClientCommand {
    /// Start a session
    Start(StartCommand),
    /// Pause the session
    Pause(PauseCommand),
    /// Resume the session
    Resume(ResumeCommand),
    /// Stop the session
    Stop(StopCommand),
}

impl ClientCommand {
    /// Command name used for ack correlation and logging
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start(_) => "start_session",
            Self::Pause(_) => "pause_session",
            Self::Resume(_) => "resume_session",
            Self::Stop(_) => "stop_session",
        }
    }
}

// ============================================================================
// Engine -> Client Messages
// ============================================================================

/// Messages received from the engine
///
/// Tagged by the `message_type` field. Command replies arrive on the same
/// logical queue as push events, in order.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "message_type")]
pub enum EngineMessage {
    /// A command was accepted
    #[serde(rename = "command_ack")]
    CommandAck {
        /// Name of the acknowledged command
        command: String,
    },

    /// A command was refused
    #[serde(rename = "command_rejected")]
    CommandRejected {
        /// Name of the refused command
        command: String,
        /// Engine-supplied reason
        reason: String,
    },

    /// Input audio level update
    #[serde(rename = "audio_level")]
    AudioLevel {
        /// Level in 0.0 - 1.0
        level: f32,
        /// Engine timestamp
        timestamp_ms: u64,
    },

    /// Provisional or finalized recognition result
    #[serde(rename = "recognition_result")]
    RecognitionResult(RecognitionResult),

    /// Periodic session statistics
    #[serde(rename = "periodic_stats")]
    PeriodicStats {
        /// Number of distinct speakers detected so far
        speaker_count: u32,
        /// Engine-side confidence average
        average_confidence: f32,
    },

    /// Graceful completion after a stop command
    #[serde(rename = "session_complete")]
    SessionComplete,

    /// Engine-side termination outside the normal stop flow
    #[serde(rename = "abnormal_stop")]
    AbnormalStop,

    /// The session's audio artifact was persisted
    #[serde(rename = "artifact_saved")]
    ArtifactSaved {
        /// Path of the saved artifact
        path: String,
    },

    /// Engine-side session error
    #[serde(rename = "session_error")]
    SessionError {
        /// Error description
        message: String,
    },
}

impl EngineMessage {
    /// Check if this is a command acknowledgement
    pub fn is_ack(&self) -> bool {
        matches!(self, Self::CommandAck { .. })
    }

    /// Check if this is a command rejection
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::CommandRejected { .. })
    }

    /// Check if this is a push event rather than a command reply
    pub fn is_event(&self) -> bool {
        !self.is_ack() && !self.is_rejection()
    }

    /// Convert a push-event message into its in-process event
    ///
    /// Returns `None` for command replies.
    pub fn into_event(self) -> Option<EngineEvent> {
        match self {
            Self::CommandAck { .. } | Self::CommandRejected { .. } => None,
            Self::AudioLevel {
                level,
                timestamp_ms,
            } => Some(EngineEvent::AudioLevel {
                level,
                timestamp_ms,
            }),
            Self::RecognitionResult(result) => Some(EngineEvent::Recognition(result)),
            Self::PeriodicStats {
                speaker_count,
                average_confidence,
            } => Some(EngineEvent::PeriodicStats {
                speaker_count,
                average_confidence,
            }),
            Self::SessionComplete => Some(EngineEvent::Completed),
            Self::AbnormalStop => Some(EngineEvent::AbnormalStop),
            Self::ArtifactSaved { path } => Some(EngineEvent::ArtifactSaved { path }),
            Self::SessionError { message } => Some(EngineEvent::Error { message }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use crate::session::Language;

    #[test]
    fn test_start_command_serialization() {
        let config = SessionConfig::default().with_language(Language::En);
        let cmd = StartCommand::new(&config);

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"message_type\":\"start_session\""));
        assert!(json.contains("\"language\":\"en\""));
        assert!(json.contains("\"mode\":\"streaming\""));
    }

    #[test]
    fn test_control_commands_serialization() {
        let json = serde_json::to_string(&PauseCommand::new()).unwrap();
        assert_eq!(json, "{\"message_type\":\"pause_session\"}");

        let json = serde_json::to_string(&ResumeCommand::new()).unwrap();
        assert_eq!(json, "{\"message_type\":\"resume_session\"}");

        let json = serde_json::to_string(&StopCommand::new()).unwrap();
        assert_eq!(json, "{\"message_type\":\"stop_session\"}");
    }

    #[test]
    fn test_client_command_names() {
        assert_eq!(
            ClientCommand::Start(StartCommand::new(&SessionConfig::default())).name(),
            "start_session"
        );
        assert_eq!(ClientCommand::Stop(StopCommand::new()).name(), "stop_session");
    }

    #[test]
    fn test_command_ack_deserialization() {
        let json = r#"{"message_type": "command_ack", "command": "start_session"}"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();

        assert!(msg.is_ack());
        assert!(!msg.is_event());
        assert!(msg.into_event().is_none());
    }

    #[test]
    fn test_command_rejected_deserialization() {
        let json = r#"{
            "message_type": "command_rejected",
            "command": "pause_session",
            "reason": "no live session"
        }"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();

        assert!(msg.is_rejection());
        match msg {
            EngineMessage::CommandRejected { command, reason } => {
                assert_eq!(command, "pause_session");
                assert_eq!(reason, "no live session");
            }
            _ => panic!("expected CommandRejected"),
        }
    }

    #[test]
    fn test_recognition_result_deserialization() {
        let json = r#"{
            "message_type": "recognition_result",
            "text": "hello world",
            "confidence": 0.93,
            "is_temporary": true,
            "timestamp_ms": 4100
        }"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();

        assert!(msg.is_event());
        let event = msg.into_event().unwrap();
        assert_eq!(event.channel(), EventChannel::RecognitionResult);

        match event {
            EngineEvent::Recognition(result) => {
                assert_eq!(result.text, "hello world");
                assert!(result.is_temporary);
                assert_eq!(result.speaker, None);
            }
            _ => panic!("expected Recognition"),
        }
    }

    #[test]
    fn test_audio_level_deserialization() {
        let json = r#"{"message_type": "audio_level", "level": 0.42, "timestamp_ms": 1000}"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();

        match msg.into_event().unwrap() {
            EngineEvent::AudioLevel {
                level,
                timestamp_ms,
            } => {
                assert_eq!(level, 0.42);
                assert_eq!(timestamp_ms, 1000);
            }
            _ => panic!("expected AudioLevel"),
        }
    }

    #[test]
    fn test_periodic_stats_deserialization() {
        let json = r#"{
            "message_type": "periodic_stats",
            "speaker_count": 3,
            "average_confidence": 0.88
        }"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();

        match msg.into_event().unwrap() {
            EngineEvent::PeriodicStats { speaker_count, .. } => {
                assert_eq!(speaker_count, 3);
            }
            _ => panic!("expected PeriodicStats"),
        }
    }

    #[test]
    fn test_lifecycle_events_deserialization() {
        let json = r#"{"message_type": "session_complete"}"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.into_event(), Some(EngineEvent::Completed));

        let json = r#"{"message_type": "abnormal_stop"}"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();
        assert_eq!(msg.into_event(), Some(EngineEvent::AbnormalStop));

        let json = r#"{"message_type": "artifact_saved", "path": "/tmp/session.wav"}"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();
        match msg.into_event().unwrap() {
            EngineEvent::ArtifactSaved { path } => assert_eq!(path, "/tmp/session.wav"),
            _ => panic!("expected ArtifactSaved"),
        }

        let json = r#"{"message_type": "session_error", "message": "decoder crashed"}"#;
        let msg: EngineMessage = serde_json::from_str(json).unwrap();
        match msg.into_event().unwrap() {
            EngineEvent::Error { message } => assert_eq!(message, "decoder crashed"),
            _ => panic!("expected Error"),
        }
    }
}
