//! Live transcription session management
//!
//! The [`SessionController`] drives a recording session end-to-end: it owns
//! the status machine, merges provisional and finalized recognition results
//! into the transcript, keeps the session clock, and guarantees the event
//! channel bundle is opened and torn down exactly once per session, under
//! error and forced-abort paths included.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use liveflow::engine::{EngineEndpoint, RemoteEngine};
//! use liveflow::session::{SessionConfig, SessionController};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = RemoteEngine::connect(&EngineEndpoint::new("wss://engine.local/v1")).await?;
//! let controller = SessionController::new(Arc::new(engine), SessionConfig::default());
//!
//! controller.start_recording().await?;
//! // ... engine events flow into the snapshot ...
//! controller.stop_recording().await?;
//! # Ok(())
//! # }
//! ```

mod clock;
mod config;
mod controller;

pub use clock::SessionClock;
pub use config::{ConfigUpdate, Language, ProcessingMode, SessionConfig};
pub use controller::{SessionController, SessionError, SessionResult, SessionSnapshot};
