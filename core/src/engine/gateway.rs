use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use super::error::EngineResult;
use crate::events::{EngineEvent, EventChannel, ListenerId};
use crate::session::SessionConfig;

/// The recognition engine boundary
///
/// The engine runs out-of-process and is reached only through asynchronous
/// commands and named push-event channels. Commands resolve to an
/// acknowledgement (`Ok`) or a typed failure; they may also never resolve at
/// all, which is why the controller offers a force-stop path that does not
/// wait on this trait.
///
/// `listen` registers a sink for one channel and returns a handle;
/// `unlisten` releases it. Implementations deliver events in arrival order
/// per channel.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    /// Start a recognition session with the given configuration
    async fn start(&self, config: &SessionConfig) -> EngineResult<()>;

    /// Pause the live session
    async fn pause(&self) -> EngineResult<()>;

    /// Resume a paused session
    async fn resume(&self) -> EngineResult<()>;

    /// Stop the session
    ///
    /// Acknowledgement does not mean the session is over: trailing
    /// recognition events and a completion event follow.
    async fn stop(&self) -> EngineResult<()>;

    /// Subscribe a sink to one push-event channel
    fn listen(
        &self,
        channel: EventChannel,
        sink: mpsc::Sender<EngineEvent>,
    ) -> EngineResult<ListenerId>;

    /// Release a channel subscription
    fn unlisten(&self, id: ListenerId);
}

/// Issues session commands to the engine
///
/// A thin dispatch layer over [`RecognitionEngine`]: every command is logged
/// on the way out and its outcome propagated unchanged to the caller. No
/// retry happens here; retry is a caller decision.
pub struct CommandGateway {
    engine: Arc<dyn RecognitionEngine>,
}

impl CommandGateway {
    /// Create a gateway for the given engine
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self { engine }
    }

    /// Dispatch a start command and await acknowledgement
    pub async fn start(&self, config: &SessionConfig) -> EngineResult<()> {
        debug!(language = config.language.code(), mode = ?config.mode, "dispatching start command");
        self.engine.start(config).await
    }

    /// Dispatch a pause command and await acknowledgement
    pub async fn pause(&self) -> EngineResult<()> {
        debug!("dispatching pause command");
        self.engine.pause().await
    }

    /// Dispatch a resume command and await acknowledgement
    pub async fn resume(&self) -> EngineResult<()> {
        debug!("dispatching resume command");
        self.engine.resume().await
    }

    /// Dispatch a stop command and await acknowledgement
    pub async fn stop(&self) -> EngineResult<()> {
        debug!("dispatching stop command");
        self.engine.stop().await
    }
}
