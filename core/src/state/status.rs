use serde::Serialize;

/// Session lifecycle status
///
/// The complete set of states a transcription session can be in. Making this
/// a closed enum keeps illegal combinations (recording and processing at the
/// same time) unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// No session is live; waiting for a start
    #[default]
    Idle,

    /// Audio is being captured and recognized
    Recording,

    /// Recording is suspended; duration frozen, session still live
    Paused,

    /// Stop was requested; waiting for the engine's completion event
    Processing,
}

impl SessionStatus {
    /// Check if no session is live
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Check if actively recording
    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording)
    }

    /// Check if paused
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Check if waiting for the engine to finish
    pub fn is_processing(&self) -> bool {
        matches!(self, Self::Processing)
    }

    /// Check if a session is live in any form
    pub fn is_active(&self) -> bool {
        !self.is_idle()
    }

    /// Status name for logs and errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Processing => "processing",
        }
    }

    /// Validate a status transition against the session state graph
    ///
    /// The graph is total order and unidirectional except for the
    /// recording/paused cycle:
    ///
    /// ```text
    /// idle --start--> recording
    /// recording <--> paused
    /// recording|paused --stop--> processing
    /// recording|paused --engine error--> idle
    /// processing --completion|error--> idle
    /// ```
    pub fn can_transition_to(&self, to: SessionStatus) -> bool {
        use SessionStatus::*;

        match (self, to) {
            (Idle, Recording) => true,

            (Recording, Paused) => true,
            (Recording, Processing) => true,
            (Recording, Idle) => true,

            (Paused, Recording) => true,
            (Paused, Processing) => true,
            (Paused, Idle) => true,

            (Processing, Idle) => true,

            _ => false,
        }
    }
}
