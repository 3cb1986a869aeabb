//! Blocking input loop.
//!
//! ## Per iteration
//!
//! ```text
//! 1. Wait up to one tick for an EngineInput on the bounded queue
//! 2. Hand / face / transcript / capability input ─► InteractionSession
//! 3. Poll session timers against the engine clock
//! 4. Broadcast produced events; publish a new SceneSnapshot if state changed
//! ```
//!
//! The loop runs in `spawn_blocking` and exits when the running flag drops
//! or a newer pipeline generation has started. Each run owns its own input
//! queue. Cancelling timers on stop is the engine's job, done under the
//! session lock, so a late-exiting loop never touches a newer run's state.

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError};
use parking_lot::{Mutex, RwLock};
use tokio::sync::broadcast;
use tracing::{info, warn};

use super::{
    session::{InteractionSession, SessionEvent},
    EngineClock, EngineInput,
};
use crate::ipc::events::{
    AmbientEvent, ClickEvent, EngineStatus, EngineStatusEvent, GestureChangedEvent, LogEvent,
    SceneSnapshot,
};

pub struct PipelineDiagnostics {
    pub hand_frames: AtomicUsize,
    pub face_frames: AtomicUsize,
    pub transcripts: AtomicUsize,
    pub capability_reports: AtomicUsize,
    pub dropped_inputs: AtomicUsize,
    pub gesture_changes: AtomicUsize,
    pub clicks: AtomicUsize,
    pub log_lines: AtomicUsize,
    pub blinks: AtomicUsize,
    pub rejected_commands: AtomicUsize,
    pub snapshots_published: AtomicUsize,
}

impl Default for PipelineDiagnostics {
    fn default() -> Self {
        Self {
            hand_frames: AtomicUsize::new(0),
            face_frames: AtomicUsize::new(0),
            transcripts: AtomicUsize::new(0),
            capability_reports: AtomicUsize::new(0),
            dropped_inputs: AtomicUsize::new(0),
            gesture_changes: AtomicUsize::new(0),
            clicks: AtomicUsize::new(0),
            log_lines: AtomicUsize::new(0),
            blinks: AtomicUsize::new(0),
            rejected_commands: AtomicUsize::new(0),
            snapshots_published: AtomicUsize::new(0),
        }
    }
}

impl PipelineDiagnostics {
    pub fn reset(&self) {
        self.hand_frames.store(0, Ordering::Relaxed);
        self.face_frames.store(0, Ordering::Relaxed);
        self.transcripts.store(0, Ordering::Relaxed);
        self.capability_reports.store(0, Ordering::Relaxed);
        self.dropped_inputs.store(0, Ordering::Relaxed);
        self.gesture_changes.store(0, Ordering::Relaxed);
        self.clicks.store(0, Ordering::Relaxed);
        self.log_lines.store(0, Ordering::Relaxed);
        self.blinks.store(0, Ordering::Relaxed);
        self.rejected_commands.store(0, Ordering::Relaxed);
        self.snapshots_published.store(0, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            hand_frames: self.hand_frames.load(Ordering::Relaxed),
            face_frames: self.face_frames.load(Ordering::Relaxed),
            transcripts: self.transcripts.load(Ordering::Relaxed),
            capability_reports: self.capability_reports.load(Ordering::Relaxed),
            dropped_inputs: self.dropped_inputs.load(Ordering::Relaxed),
            gesture_changes: self.gesture_changes.load(Ordering::Relaxed),
            clicks: self.clicks.load(Ordering::Relaxed),
            log_lines: self.log_lines.load(Ordering::Relaxed),
            blinks: self.blinks.load(Ordering::Relaxed),
            rejected_commands: self.rejected_commands.load(Ordering::Relaxed),
            snapshots_published: self.snapshots_published.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    pub hand_frames: usize,
    pub face_frames: usize,
    pub transcripts: usize,
    pub capability_reports: usize,
    pub dropped_inputs: usize,
    pub gesture_changes: usize,
    pub clicks: usize,
    pub log_lines: usize,
    pub blinks: usize,
    pub rejected_commands: usize,
    pub snapshots_published: usize,
}

/// Broadcast senders for every outbound event kind.
#[derive(Clone)]
pub struct EventChannels {
    pub gesture_tx: broadcast::Sender<GestureChangedEvent>,
    pub log_tx: broadcast::Sender<LogEvent>,
    pub click_tx: broadcast::Sender<ClickEvent>,
    pub ambient_tx: broadcast::Sender<AmbientEvent>,
    pub status_tx: broadcast::Sender<EngineStatusEvent>,
}

impl EventChannels {
    pub fn new(capacity: usize) -> Self {
        let (gesture_tx, _) = broadcast::channel(capacity);
        let (log_tx, _) = broadcast::channel(capacity);
        let (click_tx, _) = broadcast::channel(capacity);
        let (ambient_tx, _) = broadcast::channel(capacity);
        let (status_tx, _) = broadcast::channel(capacity);
        Self {
            gesture_tx,
            log_tx,
            click_tx,
            ambient_tx,
            status_tx,
        }
    }
}

/// All context the pipeline needs, passed as one struct so the closure stays tidy.
pub struct PipelineContext {
    pub session: Arc<Mutex<InteractionSession>>,
    pub inputs: Receiver<EngineInput>,
    pub running: Arc<AtomicBool>,
    /// Generation this pipeline was started for.
    pub generation: u64,
    pub current_generation: Arc<AtomicU64>,
    pub clock: EngineClock,
    pub tick: Duration,
    pub channels: EventChannels,
    pub status: Arc<Mutex<EngineStatus>>,
    pub snapshot: Arc<RwLock<SceneSnapshot>>,
    pub diagnostics: Arc<PipelineDiagnostics>,
}

impl PipelineContext {
    fn should_run(&self) -> bool {
        self.running.load(Ordering::Relaxed)
            && self.current_generation.load(Ordering::Relaxed) == self.generation
    }
}

/// Run the blocking pipeline until `ctx.running` becomes false.
pub fn run(ctx: PipelineContext) {
    info!(generation = ctx.generation, "pipeline started");

    {
        let session = ctx.session.lock();
        if ctx.should_run() {
            publish_snapshot(&ctx, &session);
        }
    }

    loop {
        // ── 0. Check running flag ─────────────────────────────────────────
        if !ctx.should_run() {
            break;
        }

        // ── 1. Wait for input (or one tick) ───────────────────────────────
        let received = match ctx.inputs.recv_timeout(ctx.tick) {
            Ok(input) => Some(input),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => {
                warn!("input queue disconnected: stopping pipeline");
                break;
            }
        };

        let mut session = ctx.session.lock();
        // Input that raced with stop() is ignored; stop() may also have shut
        // the session down while we waited for the lock.
        if !ctx.should_run() {
            if received.is_some() {
                ctx.diagnostics.dropped_inputs.fetch_add(1, Ordering::Relaxed);
            }
            break;
        }
        let version_before = session.version();
        let mut events = Vec::new();

        // ── 2. Feed the session ───────────────────────────────────────────
        if let Some(input) = received {
            events.extend(apply_input(&ctx, &mut session, input));
        }

        // ── 3. Timers ─────────────────────────────────────────────────────
        events.extend(session.poll_timers(ctx.clock.now_ms()));

        // ── 4. Publish ────────────────────────────────────────────────────
        for event in events {
            broadcast_event(&ctx, event);
        }
        let stats = session.stats();
        ctx.diagnostics
            .blinks
            .store(stats.blinks as usize, Ordering::Relaxed);
        ctx.diagnostics
            .rejected_commands
            .store(stats.rejected_commands as usize, Ordering::Relaxed);

        if session.version() != version_before {
            publish_snapshot(&ctx, &session);
        }
    }

    info!(generation = ctx.generation, "pipeline stopped");
}

fn apply_input(
    ctx: &PipelineContext,
    session: &mut InteractionSession,
    input: EngineInput,
) -> Vec<SessionEvent> {
    match input {
        EngineInput::Hand(frame) => {
            ctx.diagnostics.hand_frames.fetch_add(1, Ordering::Relaxed);
            session.on_hand_frame(&frame)
        }
        EngineInput::Face(frame) => {
            ctx.diagnostics.face_frames.fetch_add(1, Ordering::Relaxed);
            session.on_face_frame(&frame)
        }
        EngineInput::Transcript(text) => {
            ctx.diagnostics.transcripts.fetch_add(1, Ordering::Relaxed);
            session.on_transcript(&text, ctx.clock.now_ms())
        }
        EngineInput::Unavailable { capability, detail } => {
            ctx.diagnostics
                .capability_reports
                .fetch_add(1, Ordering::Relaxed);
            session.on_capability_lost(capability, detail, ctx.clock.now_ms())
        }
    }
}

fn broadcast_event(ctx: &PipelineContext, event: SessionEvent) {
    // Send errors only mean nobody is subscribed.
    match event {
        SessionEvent::Gesture(e) => {
            ctx.diagnostics.gesture_changes.fetch_add(1, Ordering::Relaxed);
            let _ = ctx.channels.gesture_tx.send(e);
        }
        SessionEvent::Log(e) => {
            ctx.diagnostics.log_lines.fetch_add(1, Ordering::Relaxed);
            let _ = ctx.channels.log_tx.send(e);
        }
        SessionEvent::Click(e) => {
            ctx.diagnostics.clicks.fetch_add(1, Ordering::Relaxed);
            let _ = ctx.channels.click_tx.send(e);
        }
        SessionEvent::Ambient(e) => {
            let _ = ctx.channels.ambient_tx.send(e);
        }
        SessionEvent::Status(e) => {
            *ctx.status.lock() = e.status;
            let _ = ctx.channels.status_tx.send(e);
        }
    }
}

fn publish_snapshot(ctx: &PipelineContext, session: &InteractionSession) {
    let snapshot = session.snapshot();
    *ctx.snapshot.write() = snapshot;
    ctx.diagnostics
        .snapshots_published
        .fetch_add(1, Ordering::Relaxed);
}
