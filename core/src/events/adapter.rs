use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{EngineEvent, EventChannel, ListenerId};
use crate::engine::{EngineResult, RecognitionEngine};

/// An open subscription bundle, released on drop
///
/// Holding the full bundle in one guard makes partial teardown
/// unrepresentable: all channels close together, on every path that
/// reaches idle.
pub struct SubscriptionGuard {
    engine: Arc<dyn RecognitionEngine>,
    ids: Vec<ListenerId>,
}

impl Drop for SubscriptionGuard {
    fn drop(&mut self) {
        for id in self.ids.drain(..) {
            self.engine.unlisten(id);
        }
        debug!("event channel bundle closed");
    }
}

/// Opens and tears down the fixed event channel bundle
///
/// At most one subscription set is active per adapter. Re-entrant `open`
/// calls close the previous set first, so rapid start/stop cycles can never
/// accumulate duplicate handlers.
#[derive(Default)]
pub struct ChannelAdapter {
    active: Option<SubscriptionGuard>,
}

impl ChannelAdapter {
    /// Create an adapter with no open subscriptions
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to the full channel bundle
    ///
    /// All-or-nothing: if any channel fails to open, every channel opened
    /// so far is closed again and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns the engine's error if a subscription cannot be established.
    pub fn open(
        &mut self,
        engine: &Arc<dyn RecognitionEngine>,
        sink: mpsc::Sender<EngineEvent>,
    ) -> EngineResult<()> {
        self.close();

        let mut ids = Vec::with_capacity(EventChannel::ALL.len());
        for channel in EventChannel::ALL {
            match engine.listen(channel, sink.clone()) {
                Ok(id) => ids.push(id),
                Err(e) => {
                    warn!(channel = channel.name(), error = %e, "failed to open event channel");
                    for id in ids {
                        engine.unlisten(id);
                    }
                    return Err(e);
                }
            }
        }

        debug!(channels = ids.len(), "event channel bundle opened");
        self.active = Some(SubscriptionGuard {
            engine: Arc::clone(engine),
            ids,
        });
        Ok(())
    }

    /// Close the active subscription set, if any
    pub fn close(&mut self) {
        self.active.take();
    }

    /// Check whether a subscription set is active
    pub fn is_open(&self) -> bool {
        self.active.is_some()
    }
}
