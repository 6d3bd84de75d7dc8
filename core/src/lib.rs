//! LiveFlow - live transcription session engine
//!
//! Drives a recording session against an out-of-process speech recognition
//! engine: a strict session lifecycle (idle -> recording -> paused ->
//! processing -> idle), reconciliation of provisional and finalized
//! recognition results into one ordered transcript, and a force-stop escape
//! hatch so the embedding UI never gets stuck on an unresponsive backend.

/// Recognition engine boundary: commands, wire protocol, remote link
pub mod engine;

/// Engine push events and channel subscriptions
pub mod events;

/// Session controller, configuration and clock
pub mod session;

/// Session status machine
pub mod state;

/// Transcript aggregation
pub mod transcript;

/// Utility modules
pub mod utils;

pub use session::{SessionConfig, SessionController, SessionError, SessionSnapshot};
pub use state::SessionStatus;
