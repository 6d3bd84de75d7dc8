//! Live session walkthrough
//!
//! Drives a full session lifecycle against a scripted in-process engine:
//! start, provisional/final recognition results, pause/resume, stop,
//! completion, and a force stop against a hanging engine.
//!
//! Run: cargo run --example live_session

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use liveflow::engine::{EngineResult, RecognitionEngine};
use liveflow::events::{EngineEvent, EventChannel, ListenerId};
use liveflow::session::{SessionConfig, SessionController};
use liveflow::transcript::RecognitionResult;
use liveflow::utils::logging::init_logging;

/// In-process engine scripted from main
#[derive(Default)]
struct ScriptedEngine {
    listeners: Mutex<HashMap<u64, (EventChannel, mpsc::Sender<EngineEvent>)>>,
    next_listener: AtomicU64,
    hang_stop: AtomicBool,
}

impl ScriptedEngine {
    fn emit(&self, event: EngineEvent) {
        let channel = event.channel();
        let listeners = self.listeners.lock().unwrap();
        for (registered, sink) in listeners.values() {
            if *registered == channel {
                let _ = sink.try_send(event.clone());
            }
        }
    }
}

#[async_trait]
impl RecognitionEngine for ScriptedEngine {
    async fn start(&self, _config: &SessionConfig) -> EngineResult<()> {
        Ok(())
    }

    async fn pause(&self) -> EngineResult<()> {
        Ok(())
    }

    async fn resume(&self) -> EngineResult<()> {
        Ok(())
    }

    async fn stop(&self) -> EngineResult<()> {
        if self.hang_stop.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
        Ok(())
    }

    fn listen(
        &self,
        channel: EventChannel,
        sink: mpsc::Sender<EngineEvent>,
    ) -> EngineResult<ListenerId> {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        self.listeners.lock().unwrap().insert(id, (channel, sink));
        Ok(ListenerId(id))
    }

    fn unlisten(&self, id: ListenerId) {
        self.listeners.lock().unwrap().remove(&id.0);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let engine = Arc::new(ScriptedEngine::default());
    let controller = SessionController::new(engine.clone(), SessionConfig::default());

    println!("=== Live session walkthrough ===\n");

    // 1. Start recording
    println!("1. Start recording");
    println!("{}", "-".repeat(40));
    controller.start_recording().await?;
    println!("  status: {}\n", controller.snapshot().status.name());

    // 2. Recognition results flow in
    println!("2. Recognition results");
    println!("{}", "-".repeat(40));
    engine.emit(EngineEvent::Recognition(RecognitionResult::temporary(
        "good mor", 0.41, 820,
    )));
    engine.emit(EngineEvent::Recognition(RecognitionResult::temporary(
        "good morning", 0.63, 1470,
    )));
    engine.emit(EngineEvent::Recognition(RecognitionResult::finalized(
        "good morning everyone",
        0.94,
        2210,
    )));
    engine.emit(EngineEvent::Recognition(RecognitionResult::finalized(
        "let's get started",
        0.88,
        4030,
    )));
    sleep(Duration::from_millis(50)).await;

    let snapshot = controller.snapshot();
    for segment in &snapshot.segments {
        println!("  [{}] {} (conf {:.2})", segment.id, segment.text, segment.confidence);
    }
    println!("  mean confidence: {:.2}\n", snapshot.confidence);

    // 3. Pause and resume
    println!("3. Pause / resume");
    println!("{}", "-".repeat(40));
    controller.pause_recording().await?;
    println!("  status: {}", controller.snapshot().status.name());
    controller.resume_recording().await?;
    println!("  status: {}\n", controller.snapshot().status.name());

    // 4. Graceful stop
    println!("4. Graceful stop");
    println!("{}", "-".repeat(40));
    controller.stop_recording().await?;
    println!("  status: {}", controller.snapshot().status.name());

    engine.emit(EngineEvent::Recognition(RecognitionResult::finalized(
        "see you tomorrow",
        0.91,
        6550,
    )));
    engine.emit(EngineEvent::ArtifactSaved {
        path: "/tmp/session.wav".to_string(),
    });
    engine.emit(EngineEvent::Completed);
    sleep(Duration::from_millis(50)).await;

    let snapshot = controller.snapshot();
    println!("  status: {}", snapshot.status.name());
    println!("  artifact: {:?}", snapshot.audio_file_path);

    if let Some(summary) = controller.summary().await {
        println!(
            "  summary: \"{}\" ({} segments, conf {:.2})\n",
            summary.text, summary.segment_count, summary.confidence
        );
    }

    // 5. Force stop against a hanging engine
    println!("5. Force stop");
    println!("{}", "-".repeat(40));
    engine.hang_stop.store(true, Ordering::SeqCst);
    controller.start_recording().await?;
    engine.emit(EngineEvent::Recognition(RecognitionResult::temporary(
        "never finali", 0.3, 500,
    )));
    sleep(Duration::from_millis(50)).await;

    controller.force_stop().await;
    let snapshot = controller.snapshot();
    println!("  status: {}", snapshot.status.name());
    println!("  duration: {}s", snapshot.duration_secs);
    println!("  provisional text: {:?}", snapshot.current_text);

    Ok(())
}
