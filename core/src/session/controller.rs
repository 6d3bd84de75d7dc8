use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::clock::SessionClock;
use super::config::{ConfigUpdate, SessionConfig};
use crate::engine::{CommandGateway, EngineError, RecognitionEngine};
use crate::events::{ChannelAdapter, EngineEvent};
use crate::state::{SessionStatus, StateError, StateResult};
use crate::transcript::{SessionSummary, TranscriptBuffer, TranscriptSegment};

/// Capacity of the engine event queue
const EVENT_QUEUE_CAPACITY: usize = 256;

/// Immutable view of the session state
///
/// Published after every committed change; readers never observe partial
/// updates. Serializable so the embedding UI can forward it as an event
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    /// Lifecycle status
    pub status: SessionStatus,

    /// Recorded duration in seconds; frozen while paused or processing
    pub duration_secs: u64,

    /// Finalized transcript segments in arrival order
    pub segments: Vec<TranscriptSegment>,

    /// Pending provisional text, empty if none
    pub current_text: String,

    /// Mean confidence over finalized segments
    pub confidence: f32,

    /// Last speaker count reported by the engine
    pub speaker_count: u32,

    /// Last input audio level (0.0 - 1.0)
    pub audio_level: f32,

    /// Path of the persisted audio artifact, once reported
    pub audio_file_path: Option<String>,

    /// Most recent mid-session engine error, if any
    pub last_error: Option<String>,
}

/// Session operation errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// The operation does not match the current status
    #[error("`{operation}` is not valid while {current}")]
    WrongState {
        operation: &'static str,
        current: &'static str,
    },

    /// Another command is still awaiting its acknowledgement
    #[error("`{operation}` is still in flight")]
    Busy { operation: &'static str },

    /// A session reset (force stop or engine error) landed while the
    /// command was in flight
    #[error("`{operation}` was interrupted by a session reset")]
    Interrupted { operation: &'static str },

    /// The engine refused the command
    #[error("engine rejected command: {0}")]
    Command(#[source] EngineError),

    /// The event channel bundle could not be opened
    #[error("failed to open event channels: {0}")]
    Subscription(#[source] EngineError),

    /// A status transition fell outside the state graph
    #[error(transparent)]
    State(#[from] StateError),
}

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Mutable session state, guarded by the controller's mutex
struct Inner {
    config: SessionConfig,
    status: SessionStatus,
    clock: SessionClock,
    transcript: TranscriptBuffer,
    channels: ChannelAdapter,
    speaker_count: u32,
    audio_level: f32,
    audio_file_path: Option<String>,
    last_error: Option<String>,

    /// Name of the command currently awaiting acknowledgement
    pending_command: Option<&'static str>,

    /// Session generation; bumped by every reset so acknowledgements that
    /// land afterwards abort instead of committing a stale transition
    epoch: u64,
}

impl Inner {
    fn new(config: SessionConfig) -> Self {
        Self {
            config,
            status: SessionStatus::Idle,
            clock: SessionClock::new(),
            transcript: TranscriptBuffer::new(),
            channels: ChannelAdapter::new(),
            speaker_count: 0,
            audio_level: 0.0,
            audio_file_path: None,
            last_error: None,
            pending_command: None,
            epoch: 0,
        }
    }

    fn ensure_not_busy(&self) -> SessionResult<()> {
        match self.pending_command {
            Some(operation) => Err(SessionError::Busy { operation }),
            None => Ok(()),
        }
    }

    fn transition(&mut self, to: SessionStatus) -> StateResult<()> {
        if !self.status.can_transition_to(to) {
            return Err(StateError::InvalidTransition {
                from: self.status,
                to,
            });
        }
        debug!(from = self.status.name(), to = to.name(), "status transition");
        self.status = to;
        Ok(())
    }

    fn to_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            duration_secs: self.clock.elapsed_secs(),
            segments: self.transcript.segments().to_vec(),
            current_text: self.transcript.current_text().to_string(),
            confidence: self.transcript.confidence(),
            speaker_count: self.speaker_count,
            audio_level: self.audio_level,
            audio_file_path: self.audio_file_path.clone(),
            last_error: self.last_error.clone(),
        }
    }
}

/// Drives a live transcription session end-to-end
///
/// Owns the session status machine, the transcript buffer, the event
/// channel subscriptions, and the session clock; it is the only type the
/// embedding application talks to. One session is live at a time: starting
/// while a session is active is rejected with a typed error.
///
/// State is read through [`snapshot`](Self::snapshot) (lock-free) or pushed
/// to [`subscribe`](Self::subscribe) listeners after every committed change.
///
/// # Workflow
///
/// ```text
/// 1. start_recording(config)
///    └── reset state, open event channels, dispatch start
///    └── status: idle -> recording (committed only on acknowledgement)
///
/// 2. engine pushes events
///    └── audio levels, provisional/final recognition results, stats
///
/// 3. pause_recording() / resume_recording()
///    └── status: recording <-> paused, duration frozen while paused
///
/// 4. stop_recording()
///    └── status: recording|paused -> processing, stop dispatched
///    └── trailing final segments may still arrive
///
/// 5. engine completion event
///    └── status: processing -> idle, channel bundle closed
/// ```
///
/// If the engine stops responding, [`force_stop`](Self::force_stop) resets
/// local state immediately without waiting for it.
pub struct SessionController {
    engine: Arc<dyn RecognitionEngine>,
    gateway: CommandGateway,
    event_tx: mpsc::Sender<EngineEvent>,
    inner: Mutex<Inner>,
    snapshot: ArcSwap<SessionSnapshot>,
    listeners: std::sync::Mutex<Vec<mpsc::Sender<Arc<SessionSnapshot>>>>,
}

impl SessionController {
    /// Create a controller for the given engine
    ///
    /// Spawns the event loop that applies engine events in arrival order
    /// and republishes the duration once per second while recording. The
    /// loop stops when the controller is dropped.
    pub fn new(engine: Arc<dyn RecognitionEngine>, config: SessionConfig) -> Arc<Self> {
        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let gateway = CommandGateway::new(Arc::clone(&engine));
        let inner = Inner::new(config);
        let snapshot = ArcSwap::from_pointee(inner.to_snapshot());

        let controller = Arc::new(Self {
            engine,
            gateway,
            event_tx,
            inner: Mutex::new(inner),
            snapshot,
            listeners: std::sync::Mutex::new(Vec::new()),
        });

        Self::spawn_event_loop(&controller, event_rx);
        controller
    }

    /// Current session state, lock-free
    pub fn snapshot(&self) -> Arc<SessionSnapshot> {
        self.snapshot.load_full()
    }

    /// Receive a snapshot after every committed state change
    pub fn subscribe(&self) -> mpsc::Receiver<Arc<SessionSnapshot>> {
        let (tx, rx) = mpsc::channel(32);
        self.lock_listeners().push(tx);
        rx
    }

    /// Start a new recording session
    ///
    /// Valid only while idle. Resets duration, transcript, confidence and
    /// speaker count, opens the event channel bundle, then dispatches the
    /// start command. The recording status is committed only on
    /// acknowledgement; on failure the session reverts to idle with the
    /// channel bundle closed.
    ///
    /// # Errors
    ///
    /// - [`SessionError::WrongState`] if a session is already live
    /// - [`SessionError::Subscription`] if the channel bundle fails to open
    /// - [`SessionError::Command`] if the engine refuses the start
    pub async fn start_recording(&self) -> SessionResult<()> {
        let (epoch, config) = {
            let mut inner = self.inner.lock().await;
            inner.ensure_not_busy()?;
            if !inner.status.is_idle() {
                return Err(SessionError::WrongState {
                    operation: "start",
                    current: inner.status.name(),
                });
            }

            info!("starting recording session");
            inner.transcript.reset();
            inner.clock.reset();
            inner.speaker_count = 0;
            inner.audio_level = 0.0;
            inner.audio_file_path = None;
            inner.last_error = None;

            if let Err(e) = inner.channels.open(&self.engine, self.event_tx.clone()) {
                self.publish(&inner);
                return Err(SessionError::Subscription(e));
            }

            inner.pending_command = Some("start");
            (inner.epoch, inner.config.clone())
        };

        let outcome = self.gateway.start(&config).await;

        let mut inner = self.inner.lock().await;
        inner.pending_command = None;

        if inner.epoch != epoch {
            return Err(SessionError::Interrupted { operation: "start" });
        }

        match outcome {
            Ok(()) => {
                inner.transition(SessionStatus::Recording)?;
                inner.clock.run();
                self.publish(&inner);
                info!("recording session started");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "start command failed, reverting to idle");
                inner.channels.close();
                self.publish(&inner);
                Err(SessionError::Command(e))
            }
        }
    }

    /// Pause the live session
    ///
    /// Valid only while recording. The duration is frozen, not reset. On
    /// command failure the state is left unchanged and the caller may
    /// retry.
    pub async fn pause_recording(&self) -> SessionResult<()> {
        let epoch = {
            let mut inner = self.inner.lock().await;
            inner.ensure_not_busy()?;
            if !inner.status.is_recording() {
                return Err(SessionError::WrongState {
                    operation: "pause",
                    current: inner.status.name(),
                });
            }
            inner.pending_command = Some("pause");
            inner.epoch
        };

        let outcome = self.gateway.pause().await;

        let mut inner = self.inner.lock().await;
        inner.pending_command = None;

        match outcome {
            Ok(()) => {
                if inner.epoch != epoch {
                    return Err(SessionError::Interrupted { operation: "pause" });
                }
                inner.transition(SessionStatus::Paused)?;
                inner.clock.pause();
                self.publish(&inner);
                info!(duration_secs = inner.clock.elapsed_secs(), "recording paused");
                Ok(())
            }
            Err(e) => Err(SessionError::Command(e)),
        }
    }

    /// Resume a paused session
    ///
    /// Valid only while paused; the clock restarts from the frozen
    /// duration.
    pub async fn resume_recording(&self) -> SessionResult<()> {
        let epoch = {
            let mut inner = self.inner.lock().await;
            inner.ensure_not_busy()?;
            if !inner.status.is_paused() {
                return Err(SessionError::WrongState {
                    operation: "resume",
                    current: inner.status.name(),
                });
            }
            inner.pending_command = Some("resume");
            inner.epoch
        };

        let outcome = self.gateway.resume().await;

        let mut inner = self.inner.lock().await;
        inner.pending_command = None;

        match outcome {
            Ok(()) => {
                if inner.epoch != epoch {
                    return Err(SessionError::Interrupted {
                        operation: "resume",
                    });
                }
                inner.transition(SessionStatus::Recording)?;
                inner.clock.run();
                self.publish(&inner);
                info!("recording resumed");
                Ok(())
            }
            Err(e) => Err(SessionError::Command(e)),
        }
    }

    /// Stop the session gracefully
    ///
    /// Valid while recording or paused. The status moves to processing
    /// immediately so the UI can disable further input; the reset to idle
    /// and the channel teardown happen only when the engine's completion
    /// event arrives, because trailing final segments may still follow the
    /// acknowledgement.
    pub async fn stop_recording(&self) -> SessionResult<()> {
        {
            let mut inner = self.inner.lock().await;
            inner.ensure_not_busy()?;
            if !inner.status.is_recording() && !inner.status.is_paused() {
                return Err(SessionError::WrongState {
                    operation: "stop",
                    current: inner.status.name(),
                });
            }

            inner.transition(SessionStatus::Processing)?;
            inner.clock.pause();
            inner.pending_command = Some("stop");
            self.publish(&inner);
            info!(duration_secs = inner.clock.elapsed_secs(), "stop requested, processing");
        }

        let outcome = self.gateway.stop().await;

        let mut inner = self.inner.lock().await;
        inner.pending_command = None;

        match outcome {
            Ok(()) => Ok(()),
            Err(e) => {
                // The session stays in processing: the engine may still
                // complete, and force_stop remains the escape hatch.
                warn!(error = %e, "stop command failed");
                Err(SessionError::Command(e))
            }
        }
    }

    /// Unconditionally reset local state without waiting for the engine
    ///
    /// The escape hatch for an unresponsive engine: status goes to idle,
    /// the duration and audio level are zeroed, provisional text is
    /// cleared and the channel bundle is closed before this call returns.
    /// The stop command is still dispatched in the background; its failure
    /// is logged, never surfaced. Finalized segments are kept so the
    /// caller can still salvage the transcript.
    pub async fn force_stop(&self) {
        {
            let mut inner = self.inner.lock().await;
            if inner.status.is_idle() && inner.pending_command.is_none() {
                return;
            }

            info!(status = inner.status.name(), "force stop, resetting local state");
            inner.epoch += 1;
            inner.pending_command = None;
            inner.channels.close();
            // Local state is the source of truth here; this bypasses the
            // status graph on purpose.
            inner.status = SessionStatus::Idle;
            inner.clock.reset();
            inner.transcript.clear_current();
            inner.audio_level = 0.0;
            self.publish(&inner);
        }

        let engine = Arc::clone(&self.engine);
        tokio::spawn(async move {
            if let Err(e) = engine.stop().await {
                warn!(error = %e, "background stop after force stop failed");
            }
        });
    }

    /// Discard the transcript without ending the session
    ///
    /// Always valid; status and duration are untouched.
    pub async fn clear_transcript(&self) {
        let mut inner = self.inner.lock().await;
        inner.transcript.clear();
        self.publish(&inner);
        debug!("transcript cleared");
    }

    /// Merge a partial update into the stored configuration
    ///
    /// Valid in any status, but does not retroactively affect an already
    /// started engine session.
    pub async fn update_config(&self, update: ConfigUpdate) {
        let mut inner = self.inner.lock().await;
        inner.config.apply(&update);
        debug!(config = ?inner.config, "session config updated");
    }

    /// Current session configuration
    pub async fn config(&self) -> SessionConfig {
        self.inner.lock().await.config.clone()
    }

    /// Finalized summary for the persistence collaborator
    ///
    /// Available once the session is idle with a non-empty transcript.
    pub async fn summary(&self) -> Option<SessionSummary> {
        let inner = self.inner.lock().await;
        if !inner.status.is_idle() || inner.transcript.segments().is_empty() {
            return None;
        }
        Some(SessionSummary {
            text: inner.transcript.concatenated(),
            duration_secs: inner.clock.elapsed_secs(),
            confidence: inner.transcript.confidence(),
            segment_count: inner.transcript.segments().len(),
        })
    }

    /// Spawn the loop that applies engine events and refreshes the
    /// published duration while recording
    fn spawn_event_loop(controller: &Arc<Self>, mut event_rx: mpsc::Receiver<EngineEvent>) {
        let weak = Arc::downgrade(controller);

        tokio::spawn(async move {
            let mut ticker = interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    event = event_rx.recv() => {
                        let Some(event) = event else { break };
                        let Some(controller) = weak.upgrade() else { break };
                        controller.apply_event(event).await;
                    }
                    _ = ticker.tick() => {
                        let Some(controller) = weak.upgrade() else { break };
                        let inner = controller.inner.lock().await;
                        if inner.status.is_recording() {
                            controller.publish(&inner);
                        }
                    }
                }
            }

            debug!("session event loop stopped");
        });
    }

    /// Apply one engine event to the session state
    ///
    /// Events for a session that was already reset to idle (a late
    /// completion after a force stop, for example) are dropped here.
    async fn apply_event(&self, event: EngineEvent) {
        let mut inner = self.inner.lock().await;

        if inner.status.is_idle() {
            debug!(channel = event.channel().name(), "dropping event, no live session");
            return;
        }

        match event {
            EngineEvent::AudioLevel { level, .. } => {
                inner.audio_level = level;
                self.publish(&inner);
            }
            EngineEvent::Recognition(result) => {
                inner.transcript.apply(&result);
                self.publish(&inner);
            }
            EngineEvent::PeriodicStats { speaker_count, .. } => {
                inner.speaker_count = speaker_count;
                self.publish(&inner);
            }
            EngineEvent::ArtifactSaved { path } => {
                debug!(path = %path, "audio artifact saved");
                inner.audio_file_path = Some(path);
                self.publish(&inner);
            }
            EngineEvent::Completed => {
                if inner.status.is_processing() {
                    info!("session completed");
                    self.finish(&mut inner, None);
                } else {
                    warn!(
                        status = inner.status.name(),
                        "ignoring completion outside processing"
                    );
                }
            }
            EngineEvent::AbnormalStop => {
                warn!("engine stopped the session abnormally");
                self.finish(&mut inner, None);
            }
            EngineEvent::Error { message } => {
                error!(error = %message, "engine session error");
                self.finish(&mut inner, Some(message));
            }
        }
    }

    /// Common teardown for every path that returns to idle through events
    fn finish(&self, inner: &mut Inner, session_error: Option<String>) {
        inner.epoch += 1;
        inner.pending_command = None;
        inner.channels.close();
        if let Err(e) = inner.transition(SessionStatus::Idle) {
            warn!(error = %e, "finishing outside the state graph");
            inner.status = SessionStatus::Idle;
        }
        inner.clock.pause();
        inner.transcript.clear_current();
        inner.audio_level = 0.0;
        inner.last_error = session_error;
        self.publish(inner);
    }

    /// Publish a snapshot and notify subscribers
    fn publish(&self, inner: &Inner) {
        let snapshot = Arc::new(inner.to_snapshot());
        self.snapshot.store(Arc::clone(&snapshot));

        let mut listeners = self.lock_listeners();
        listeners.retain(|tx| match tx.try_send(Arc::clone(&snapshot)) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        });
    }

    fn lock_listeners(
        &self,
    ) -> std::sync::MutexGuard<'_, Vec<mpsc::Sender<Arc<SessionSnapshot>>>> {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }
}
