//! Transcript aggregation
//!
//! Merges the two competing classes of recognition output — provisional
//! ("temporary") text and finalized segments — into one ordered transcript
//! buffer plus a single provisional slot. The merge rule is a plain method
//! on [`TranscriptBuffer`], so it can be unit tested without standing up an
//! event channel.

use serde::{Deserialize, Serialize};

/// A single recognition result pushed by the engine
///
/// `is_temporary` distinguishes provisional text (replaced wholesale by the
/// next result) from a finalized segment (appended to the transcript).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionResult {
    /// Recognized text
    pub text: String,

    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,

    /// Whether this is a provisional result
    pub is_temporary: bool,

    /// Speaker label, when diarization is enabled
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,

    /// Engine-supplied timestamp, monotonic within a session
    pub timestamp_ms: u64,
}

impl RecognitionResult {
    /// Create a provisional result
    pub fn temporary(text: impl Into<String>, confidence: f32, timestamp_ms: u64) -> Self {
        Self {
            text: text.into(),
            confidence,
            is_temporary: true,
            speaker: None,
            timestamp_ms,
        }
    }

    /// Create a finalized result
    pub fn finalized(text: impl Into<String>, confidence: f32, timestamp_ms: u64) -> Self {
        Self {
            text: text.into(),
            confidence,
            is_temporary: false,
            speaker: None,
            timestamp_ms,
        }
    }

    /// Attach a speaker label
    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }
}

/// A finalized transcript segment
///
/// Never mutated after insertion. The id is allocated locally and increases
/// monotonically per session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSegment {
    /// Locally allocated segment id
    pub id: u64,

    /// Finalized text
    pub text: String,

    /// Speaker label, when diarization is enabled
    pub speaker: Option<String>,

    /// Engine-supplied timestamp
    pub timestamp_ms: u64,

    /// Recognition confidence (0.0 - 1.0)
    pub confidence: f32,
}

/// Ordered transcript buffer with one provisional slot
///
/// Segments are append-only within a session and kept in arrival order; the
/// buffer trusts engine-side ordering and performs no reordering or
/// deduplication. A final result atomically clears the provisional slot
/// while appending, so the two are never both stale.
#[derive(Debug, Clone, Default)]
pub struct TranscriptBuffer {
    segments: Vec<TranscriptSegment>,
    current_text: String,
    confidence: f32,
    next_id: u64,
}

impl TranscriptBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one recognition result
    ///
    /// Provisional results replace the provisional slot and set the
    /// display confidence; finalized results append a segment, clear the
    /// provisional slot, and recompute the confidence as the arithmetic
    /// mean over all finalized segments. A final result with no preceding
    /// provisional text is handled identically (there is nothing to clear).
    pub fn apply(&mut self, result: &RecognitionResult) {
        if result.is_temporary {
            self.current_text = result.text.clone();
            self.confidence = result.confidence;
            return;
        }

        let segment = TranscriptSegment {
            id: self.next_id,
            text: result.text.clone(),
            speaker: result.speaker.clone(),
            timestamp_ms: result.timestamp_ms,
            confidence: result.confidence,
        };
        self.next_id += 1;

        self.segments.push(segment);
        self.current_text.clear();
        self.confidence = self.mean_confidence();
    }

    /// Discard segments and provisional text without ending the session
    ///
    /// Segment ids keep increasing afterwards; only a new session resets
    /// the allocator.
    pub fn clear(&mut self) {
        self.segments.clear();
        self.current_text.clear();
        self.confidence = 0.0;
    }

    /// Drop the pending provisional text, keeping finalized segments
    pub fn clear_current(&mut self) {
        self.current_text.clear();
    }

    /// Reset everything for a new session, including the id allocator
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Finalized segments in arrival order
    pub fn segments(&self) -> &[TranscriptSegment] {
        &self.segments
    }

    /// Pending provisional text, empty if none
    pub fn current_text(&self) -> &str {
        &self.current_text
    }

    /// Current confidence value
    ///
    /// Mean over finalized segments after any final result; the raw event
    /// confidence while a provisional result is the latest arrival.
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Concatenate finalized segments into one transcript string
    pub fn concatenated(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn mean_confidence(&self) -> f32 {
        if self.segments.is_empty() {
            return 0.0;
        }
        let sum: f32 = self.segments.iter().map(|s| s.confidence).sum();
        sum / self.segments.len() as f32
    }
}

/// Finalized session summary handed to the persistence collaborator
///
/// Built by the caller once the session is back to idle with a non-empty
/// transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Concatenated transcript text
    pub text: String,

    /// Total recorded duration in seconds
    pub duration_secs: u64,

    /// Mean confidence over finalized segments
    pub confidence: f32,

    /// Number of finalized segments
    pub segment_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temporary_replaces_provisional_slot() {
        let mut buffer = TranscriptBuffer::new();

        buffer.apply(&RecognitionResult::temporary("hel", 0.4, 100));
        assert_eq!(buffer.current_text(), "hel");
        assert_eq!(buffer.confidence(), 0.4);
        assert!(buffer.segments().is_empty());

        buffer.apply(&RecognitionResult::temporary("hello", 0.6, 200));
        assert_eq!(buffer.current_text(), "hello");
        assert_eq!(buffer.confidence(), 0.6);
        assert!(buffer.segments().is_empty());
    }

    #[test]
    fn test_final_appends_and_clears_provisional() {
        let mut buffer = TranscriptBuffer::new();

        buffer.apply(&RecognitionResult::temporary("hello", 0.5, 100));
        buffer.apply(&RecognitionResult::finalized("hello", 0.9, 150));

        assert_eq!(buffer.current_text(), "");
        assert_eq!(buffer.segments().len(), 1);
        assert_eq!(buffer.segments()[0].id, 0);
        assert_eq!(buffer.segments()[0].text, "hello");
        assert_eq!(buffer.segments()[0].confidence, 0.9);
        assert_eq!(buffer.confidence(), 0.9);
    }

    #[test]
    fn test_final_without_preceding_provisional() {
        let mut buffer = TranscriptBuffer::new();

        buffer.apply(&RecognitionResult::finalized("hello", 0.9, 100));

        assert_eq!(buffer.current_text(), "");
        assert_eq!(buffer.segments().len(), 1);
    }

    #[test]
    fn test_confidence_is_mean_over_finals_only() {
        let mut buffer = TranscriptBuffer::new();

        buffer.apply(&RecognitionResult::temporary("x", 0.1, 50));
        buffer.apply(&RecognitionResult::finalized("hello", 0.9, 100));
        buffer.apply(&RecognitionResult::temporary("y", 0.2, 150));
        buffer.apply(&RecognitionResult::finalized("world", 0.8, 200));

        assert!((buffer.confidence() - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let mut buffer = TranscriptBuffer::new();

        for i in 0..5 {
            buffer.apply(&RecognitionResult::finalized(format!("s{i}"), 0.5, i * 100));
        }

        let ids: Vec<u64> = buffer.segments().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_clear_keeps_id_allocator() {
        let mut buffer = TranscriptBuffer::new();

        buffer.apply(&RecognitionResult::finalized("one", 0.5, 100));
        buffer.apply(&RecognitionResult::temporary("two", 0.5, 200));
        buffer.clear();

        assert!(buffer.segments().is_empty());
        assert_eq!(buffer.current_text(), "");
        assert_eq!(buffer.confidence(), 0.0);

        // Ids continue where they left off
        buffer.apply(&RecognitionResult::finalized("three", 0.5, 300));
        assert_eq!(buffer.segments()[0].id, 1);
    }

    #[test]
    fn test_reset_restarts_id_allocator() {
        let mut buffer = TranscriptBuffer::new();

        buffer.apply(&RecognitionResult::finalized("one", 0.5, 100));
        buffer.reset();

        buffer.apply(&RecognitionResult::finalized("two", 0.5, 200));
        assert_eq!(buffer.segments()[0].id, 0);
    }

    #[test]
    fn test_speaker_label_carried_through() {
        let mut buffer = TranscriptBuffer::new();

        buffer.apply(&RecognitionResult::finalized("hi", 0.9, 100).with_speaker("speaker_1"));

        assert_eq!(buffer.segments()[0].speaker.as_deref(), Some("speaker_1"));
    }

    #[test]
    fn test_concatenated() {
        let mut buffer = TranscriptBuffer::new();

        buffer.apply(&RecognitionResult::finalized("hello", 0.9, 100));
        buffer.apply(&RecognitionResult::finalized("world", 0.8, 200));

        assert_eq!(buffer.concatenated(), "hello world");
    }

    #[test]
    fn test_recognition_result_deserialization() {
        let json = r#"{
            "text": "hello",
            "confidence": 0.92,
            "is_temporary": false,
            "speaker": "speaker_0",
            "timestamp_ms": 1520
        }"#;

        let result: RecognitionResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.text, "hello");
        assert!(!result.is_temporary);
        assert_eq!(result.speaker.as_deref(), Some("speaker_0"));
        assert_eq!(result.timestamp_ms, 1520);
    }
}
