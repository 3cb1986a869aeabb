//! `AuraEngine`: top-level lifecycle controller.
//!
//! ## Lifecycle
//!
//! ```text
//! AuraEngine::new()
//!     └─► start()   → pipeline spawned, status = Running
//!         └─► stop() → running=false, timers cancelled, status = Stopped
//! ```
//!
//! `start()`/`stop()` in the wrong state return an error rather than
//! panicking. Interaction state (objects, clicks, ambient colour) survives a
//! stop/start cycle; timers and per-frame history do not.
//!
//! ## Threading
//!
//! External services push into a bounded `crossbeam-channel` through cloned
//! [`InputSink`]s and never block. One `spawn_blocking` pipeline drains the
//! queue and is the only writer of the [`InteractionSession`]. Readers get a
//! versioned [`SceneSnapshot`] copy out of a `RwLock`.
//!
//! Every `start()` opens a fresh input queue, so a pipeline left over from
//! the previous run can never receive inputs meant for the new one. Inputs
//! still queued at `stop()` are discarded by the next `start()`.

pub mod pipeline;
pub mod session;

pub use session::{InteractionSession, LogBoard, SessionEvent, SessionStats};

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    click::ClickConfig,
    commands::VoiceConfig,
    error::{AuraError, Result},
    face::{BlinkConfig, BlinkDetector},
    hand::HandThresholds,
    ipc::events::{
        AmbientEvent, Capability, ClickEvent, EngineStatus, EngineStatusEvent,
        GestureChangedEvent, LogEvent, SceneSnapshot,
    },
    landmarks::{FaceFrame, HandFrame},
    objects::{ObjectConfig, Viewport},
};

/// Broadcast channel capacity per event kind.
const BROADCAST_CAP: usize = 256;

/// Configuration for `AuraEngine`.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub hand: HandThresholds,
    pub blink: BlinkConfig,
    pub objects: ObjectConfig,
    pub click: ClickConfig,
    pub voice: VoiceConfig,
    pub viewport: Viewport,
    /// How long a HUD log line stays up. Default: 2000 ms.
    pub log_display_ms: u64,
    /// Bounded input queue length; a full queue drops new inputs.
    pub input_queue_capacity: usize,
    /// Longest the pipeline waits for input before polling timers.
    pub tick_interval_ms: u64,
    /// Seed for object placement. `None` seeds from the OS.
    pub spawn_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hand: HandThresholds::default(),
            blink: BlinkConfig::default(),
            objects: ObjectConfig::default(),
            click: ClickConfig::default(),
            voice: VoiceConfig::default(),
            viewport: Viewport::default(),
            log_display_ms: 2_000,
            input_queue_capacity: 256,
            tick_interval_ms: 16,
            spawn_seed: None,
        }
    }
}

/// Milliseconds since engine creation. Shared by producers and the pipeline
/// so frame timestamps and timer polls use one time base.
#[derive(Debug, Clone, Copy)]
pub struct EngineClock {
    epoch: Instant,
}

impl EngineClock {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

impl Default for EngineClock {
    fn default() -> Self {
        Self::new()
    }
}

/// One input from an external service.
#[derive(Debug, Clone)]
pub enum EngineInput {
    Hand(HandFrame),
    Face(FaceFrame),
    Transcript(String),
    Unavailable {
        capability: Capability,
        detail: Option<String>,
    },
}

/// Cloneable, non-blocking producer handle for external services.
///
/// Sinks stay valid across stop/start; they always feed the current run.
#[derive(Clone)]
pub struct InputSink {
    tx: Arc<RwLock<Sender<EngineInput>>>,
    running: Arc<AtomicBool>,
    clock: EngineClock,
    diagnostics: Arc<pipeline::PipelineDiagnostics>,
}

impl InputSink {
    /// Engine time for stamping frames.
    pub fn now_ms(&self) -> u64 {
        self.clock.now_ms()
    }

    pub fn push_hand_frame(&self, frame: HandFrame) -> Result<bool> {
        self.push(EngineInput::Hand(frame))
    }

    pub fn push_face_frame(&self, frame: FaceFrame) -> Result<bool> {
        self.push(EngineInput::Face(frame))
    }

    pub fn push_transcript(&self, transcript: impl Into<String>) -> Result<bool> {
        self.push(EngineInput::Transcript(transcript.into()))
    }

    /// Report that an external service failed for good.
    pub fn report_unavailable(&self, capability: Capability, detail: Option<String>) -> Result<bool> {
        self.push(EngineInput::Unavailable { capability, detail })
    }

    /// Queue one input. `Ok(false)` when the queue was full and the input
    /// was dropped.
    ///
    /// # Errors
    /// - `AuraError::NotRunning` if the engine is stopped.
    /// - `AuraError::InputClosed` if the engine has been dropped.
    pub fn push(&self, input: EngineInput) -> Result<bool> {
        if !self.running.load(Ordering::Relaxed) {
            return Err(AuraError::NotRunning);
        }
        match self.tx.read().try_send(input) {
            Ok(()) => Ok(true),
            Err(TrySendError::Full(_)) => {
                self.diagnostics
                    .dropped_inputs
                    .fetch_add(1, Ordering::Relaxed);
                debug!("input queue full: dropping input");
                Ok(false)
            }
            Err(TrySendError::Disconnected(_)) => Err(AuraError::InputClosed),
        }
    }
}

/// The top-level engine handle.
///
/// `AuraEngine` is `Send + Sync`; all fields use interior mutability.
pub struct AuraEngine {
    config: EngineConfig,
    running: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
    status: Arc<Mutex<EngineStatus>>,
    session: Arc<Mutex<InteractionSession>>,
    snapshot: Arc<RwLock<SceneSnapshot>>,
    input_tx: Arc<RwLock<Sender<EngineInput>>>,
    /// Receiving end of the current run's queue.
    input_rx: Mutex<Receiver<EngineInput>>,
    clock: EngineClock,
    channels: pipeline::EventChannels,
    diagnostics: Arc<pipeline::PipelineDiagnostics>,
}

impl AuraEngine {
    /// Create a new engine. Does not consume input until `start()`.
    pub fn new(config: EngineConfig) -> Self {
        let session = InteractionSession::new(&config);
        Self::with_session(config, session)
    }

    /// Create an engine around a custom blink detector.
    pub fn with_blink_detector(config: EngineConfig, blink: Box<dyn BlinkDetector>) -> Self {
        let session = InteractionSession::with_blink_detector(&config, blink);
        Self::with_session(config, session)
    }

    fn with_session(config: EngineConfig, session: InteractionSession) -> Self {
        let (input_tx, input_rx) = input_queue(&config);
        let snapshot = session.snapshot();
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
            status: Arc::new(Mutex::new(EngineStatus::Idle)),
            session: Arc::new(Mutex::new(session)),
            snapshot: Arc::new(RwLock::new(snapshot)),
            input_tx: Arc::new(RwLock::new(input_tx)),
            input_rx: Mutex::new(input_rx),
            clock: EngineClock::new(),
            channels: pipeline::EventChannels::new(BROADCAST_CAP),
            diagnostics: Arc::new(pipeline::PipelineDiagnostics::default()),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start consuming inputs on a blocking pipeline task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// - `AuraError::AlreadyRunning` if already started.
    pub fn start(&self) -> Result<()> {
        if self.running.load(Ordering::SeqCst) {
            return Err(AuraError::AlreadyRunning);
        }

        self.diagnostics.reset();

        // Swap in a fresh queue before accepting input. Whatever the previous
        // run left behind is counted and dropped with the old queue.
        let (tx, rx) = input_queue(&self.config);
        let stale = {
            let mut current_rx = self.input_rx.lock();
            let stale = current_rx.try_iter().count();
            *self.input_tx.write() = tx;
            *current_rx = rx.clone();
            stale
        };
        if stale > 0 {
            debug!(stale, "discarded inputs left over from the previous run");
            self.diagnostics
                .dropped_inputs
                .fetch_add(stale, Ordering::Relaxed);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.running.store(true, Ordering::SeqCst);

        let degraded = self.session.lock().has_unavailable();
        self.set_status(
            if degraded {
                EngineStatus::Degraded
            } else {
                EngineStatus::Running
            },
            None,
        );

        let ctx = pipeline::PipelineContext {
            session: Arc::clone(&self.session),
            inputs: rx,
            running: Arc::clone(&self.running),
            generation,
            current_generation: Arc::clone(&self.generation),
            clock: self.clock,
            tick: Duration::from_millis(self.config.tick_interval_ms.max(1)),
            channels: self.channels.clone(),
            status: Arc::clone(&self.status),
            snapshot: Arc::clone(&self.snapshot),
            diagnostics: Arc::clone(&self.diagnostics),
        };

        tokio::task::spawn_blocking(move || pipeline::run(ctx));
        info!(generation, "engine started");
        Ok(())
    }

    /// Stop consuming inputs and cancel pending timers.
    ///
    /// Takes the session lock, so any iteration in flight finishes first and
    /// the pipeline observes the cleared flag before touching state again.
    ///
    /// # Errors
    /// - `AuraError::NotRunning` if not currently running.
    pub fn stop(&self) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(AuraError::NotRunning);
        }
        self.running.store(false, Ordering::SeqCst);
        self.session.lock().shutdown();
        self.set_status(EngineStatus::Stopped, None);
        info!("engine stop requested");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Current engine status (snapshot).
    pub fn status(&self) -> EngineStatus {
        *self.status.lock()
    }

    /// Producer handle for external services.
    pub fn input_sink(&self) -> InputSink {
        InputSink {
            tx: Arc::clone(&self.input_tx),
            running: Arc::clone(&self.running),
            clock: self.clock,
            diagnostics: Arc::clone(&self.diagnostics),
        }
    }

    /// Latest published scene.
    pub fn snapshot(&self) -> SceneSnapshot {
        self.snapshot.read().clone()
    }

    pub fn subscribe_gestures(&self) -> broadcast::Receiver<GestureChangedEvent> {
        self.channels.gesture_tx.subscribe()
    }

    pub fn subscribe_logs(&self) -> broadcast::Receiver<LogEvent> {
        self.channels.log_tx.subscribe()
    }

    pub fn subscribe_clicks(&self) -> broadcast::Receiver<ClickEvent> {
        self.channels.click_tx.subscribe()
    }

    pub fn subscribe_ambient(&self) -> broadcast::Receiver<AmbientEvent> {
        self.channels.ambient_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> broadcast::Receiver<EngineStatusEvent> {
        self.channels.status_tx.subscribe()
    }

    /// Snapshot of pipeline counters for observability.
    pub fn pipeline_diagnostics_snapshot(&self) -> pipeline::DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn set_status(&self, new_status: EngineStatus, detail: Option<String>) {
        *self.status.lock() = new_status;
        let _ = self.channels.status_tx.send(EngineStatusEvent {
            status: new_status,
            detail,
        });
    }
}

fn input_queue(config: &EngineConfig) -> (Sender<EngineInput>, Receiver<EngineInput>) {
    crossbeam_channel::bounded(config.input_queue_capacity.max(1))
}

impl Drop for AuraEngine {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_stop_state_errors() {
        let engine = AuraEngine::new(EngineConfig::default());
        assert_eq!(engine.status(), EngineStatus::Idle);
        assert!(matches!(engine.stop(), Err(AuraError::NotRunning)));

        engine.start().unwrap();
        assert_eq!(engine.status(), EngineStatus::Running);
        assert!(matches!(engine.start(), Err(AuraError::AlreadyRunning)));

        engine.stop().unwrap();
        assert_eq!(engine.status(), EngineStatus::Stopped);
    }

    #[test]
    fn sink_rejects_input_while_stopped() {
        let engine = AuraEngine::new(EngineConfig::default());
        let sink = engine.input_sink();
        assert!(matches!(
            sink.push_transcript("add object"),
            Err(AuraError::NotRunning)
        ));
    }

    #[test]
    fn full_queue_drops_and_counts() {
        let engine = AuraEngine::new(EngineConfig {
            input_queue_capacity: 1,
            ..EngineConfig::default()
        });
        // Mark running without spawning a pipeline so nothing drains.
        engine.running.store(true, Ordering::SeqCst);
        let sink = engine.input_sink();
        assert!(sink.push_transcript("one").unwrap());
        assert!(!sink.push_transcript("two").unwrap());
        assert_eq!(engine.pipeline_diagnostics_snapshot().dropped_inputs, 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn inputs_left_in_the_queue_are_dropped_on_start() {
        let engine = AuraEngine::new(EngineConfig {
            spawn_seed: Some(3),
            ..EngineConfig::default()
        });
        // Queue two inputs with no pipeline consuming them, then "stop".
        engine.running.store(true, Ordering::SeqCst);
        let sink = engine.input_sink();
        assert!(sink.push_transcript("add object").unwrap());
        assert!(sink.push_transcript("add object").unwrap());
        engine.running.store(false, Ordering::SeqCst);

        engine.start().unwrap();
        assert_eq!(engine.pipeline_diagnostics_snapshot().dropped_inputs, 2);

        // The same sink feeds the new run.
        assert!(sink.push_transcript("create three objects").unwrap());
        let deadline = Instant::now() + Duration::from_secs(2);
        while engine.snapshot().objects.len() != 3 {
            assert!(Instant::now() < deadline, "new input never applied");
            std::thread::sleep(Duration::from_millis(5));
        }
        engine.stop().unwrap();
    }

    #[test]
    fn initial_snapshot_is_idle_with_default_ambient() {
        let engine = AuraEngine::new(EngineConfig::default());
        let snap = engine.snapshot();
        assert_eq!(snap.active_gesture, crate::priority::GestureType::Idle);
        assert_eq!(snap.ambient_color, crate::commands::DEFAULT_AMBIENT_COLOR);
        assert!(snap.objects.is_empty());
    }
}
