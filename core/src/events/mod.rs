//! Engine push events and channel subscriptions
//!
//! The recognition engine pushes events over a fixed set of named channels.
//! This module defines the channel set, the event union delivered to the
//! controller, and the [`ChannelAdapter`] that guarantees the subscription
//! bundle is opened and torn down exactly once per session.

mod adapter;

pub use adapter::{ChannelAdapter, SubscriptionGuard};

use crate::transcript::RecognitionResult;

/// Named push-event channels exposed by the engine
///
/// A session subscribes to all of them at once; see [`ChannelAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventChannel {
    /// Input audio level updates
    AudioLevel,

    /// Provisional and finalized recognition results
    RecognitionResult,

    /// Periodic session statistics
    PeriodicStats,

    /// Graceful session completion
    Completion,

    /// Engine-side termination outside the normal stop flow
    AbnormalStop,

    /// The session's audio artifact was persisted
    ArtifactSaved,

    /// Engine-side session error
    Error,
}

impl EventChannel {
    /// The full channel bundle a session subscribes to
    pub const ALL: [EventChannel; 7] = [
        EventChannel::AudioLevel,
        EventChannel::RecognitionResult,
        EventChannel::PeriodicStats,
        EventChannel::Completion,
        EventChannel::AbnormalStop,
        EventChannel::ArtifactSaved,
        EventChannel::Error,
    ];

    /// Wire name of the channel
    pub fn name(&self) -> &'static str {
        match self {
            Self::AudioLevel => "audio_level",
            Self::RecognitionResult => "recognition_result",
            Self::PeriodicStats => "periodic_stats",
            Self::Completion => "session_complete",
            Self::AbnormalStop => "abnormal_stop",
            Self::ArtifactSaved => "artifact_saved",
            Self::Error => "session_error",
        }
    }
}

/// Handle for one open channel subscription
///
/// Returned by [`RecognitionEngine::listen`](crate::engine::RecognitionEngine::listen)
/// and passed back to `unlisten` on teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

/// Events pushed by the engine during a session
///
/// Delivery is at-least-once with strict ordering within each channel; the
/// controller tolerates the lack of ordering across distinct channels.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Input audio level (0.0 - 1.0)
    AudioLevel { level: f32, timestamp_ms: u64 },

    /// Provisional or finalized recognition result
    Recognition(RecognitionResult),

    /// Periodic session statistics
    PeriodicStats {
        speaker_count: u32,
        average_confidence: f32,
    },

    /// The engine finished processing after a stop
    Completed,

    /// The engine terminated the session outside the normal stop flow
    AbnormalStop,

    /// The session's audio artifact was written
    ArtifactSaved { path: String },

    /// Engine-side session error
    Error { message: String },
}

impl EngineEvent {
    /// The channel this event is delivered on
    pub fn channel(&self) -> EventChannel {
        match self {
            Self::AudioLevel { .. } => EventChannel::AudioLevel,
            Self::Recognition(_) => EventChannel::RecognitionResult,
            Self::PeriodicStats { .. } => EventChannel::PeriodicStats,
            Self::Completed => EventChannel::Completion,
            Self::AbnormalStop => EventChannel::AbnormalStop,
            Self::ArtifactSaved { .. } => EventChannel::ArtifactSaved,
            Self::Error { .. } => EventChannel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_bundle_is_complete() {
        assert_eq!(EventChannel::ALL.len(), 7);

        // No duplicates
        for (i, a) in EventChannel::ALL.iter().enumerate() {
            for b in &EventChannel::ALL[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_event_channel_mapping() {
        let event = EngineEvent::AudioLevel {
            level: 0.5,
            timestamp_ms: 10,
        };
        assert_eq!(event.channel(), EventChannel::AudioLevel);

        let event = EngineEvent::Recognition(RecognitionResult::temporary("hi", 0.5, 10));
        assert_eq!(event.channel(), EventChannel::RecognitionResult);

        assert_eq!(EngineEvent::Completed.channel(), EventChannel::Completion);
        assert_eq!(
            EngineEvent::AbnormalStop.channel(),
            EventChannel::AbnormalStop
        );
    }

    #[test]
    fn test_channel_names() {
        assert_eq!(EventChannel::AudioLevel.name(), "audio_level");
        assert_eq!(EventChannel::Completion.name(), "session_complete");
        assert_eq!(EventChannel::Error.name(), "session_error");
    }
}
