//! `InteractionSession`: the single writer of all interaction state.
//!
//! Every mutation happens inside one of the `on_*` / `poll_timers` calls and
//! each call returns the events it produced. The session never blocks and
//! never reads a clock; time comes in with the inputs.
//!
//! ## Hand frame order
//!
//! ```text
//! HandInterpreter::process ─► edge log lines
//!   ─► resolve (pre-interaction) ─► InteractionController (hover / follow / grab / release)
//!   ─► GesturePriorityResolver::update (event only on change)
//!   ─► tap rising edge ─► ClickArbiter
//! ```

use tracing::{debug, info, warn};

use super::EngineConfig;
use crate::{
    click::{ClickArbiter, ClickSource},
    commands::{
        dispatch::{rejection_message, LISTEN_TIMEOUT_MESSAGE},
        CommandContext, CommandDispatcher, DispatchOutcome,
    },
    face::{BlinkDetector, BlinkReading, EarBlinkDetector},
    hand::HandInterpreter,
    ipc::events::{
        AmbientEvent, Capability, ClickEvent, EngineStatus, EngineStatusEvent,
        GestureChangedEvent, LogEvent, SceneSnapshot,
    },
    landmarks::{FaceFrame, HandFrame},
    objects::{InteractionController, InteractionEvent, ObjectRegistry},
    priority::{self, GesturePriorityResolver},
    timer::OneShotTimer,
};

/// Outbound event produced by a session call.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Gesture(GestureChangedEvent),
    Log(LogEvent),
    Click(ClickEvent),
    Ambient(AmbientEvent),
    Status(EngineStatusEvent),
}

/// The HUD's current log line with its single-shot expiry.
#[derive(Debug, Clone)]
pub struct LogBoard {
    display_ms: u64,
    message: Option<String>,
    expiry: OneShotTimer,
}

impl LogBoard {
    pub fn new(display_ms: u64) -> Self {
        Self {
            display_ms,
            message: None,
            expiry: OneShotTimer::new(),
        }
    }

    /// Show `message`, replacing the current line and restarting the expiry.
    pub fn post(&mut self, message: impl Into<String>, now_ms: u64) {
        self.message = Some(message.into());
        self.expiry.arm(now_ms, self.display_ms);
    }

    /// Clear the line once its display time is over. `true` on expiry.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        if self.expiry.fire(now_ms) {
            self.message = None;
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn display_ms(&self) -> u64 {
        self.display_ms
    }

    pub fn cancel(&mut self) {
        self.expiry.cancel();
        self.message = None;
    }
}

/// Counters the pipeline folds into its diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub blinks: u64,
    pub rejected_commands: u64,
    /// Commands that hit a fault rather than a user-facing rejection.
    pub failed_commands: u64,
    pub ignored_transcripts: u64,
}

pub struct InteractionSession {
    hands: HandInterpreter,
    blink: Box<dyn BlinkDetector>,
    registry: ObjectRegistry,
    interaction: InteractionController,
    resolver: GesturePriorityResolver,
    dispatcher: CommandDispatcher,
    clicks: ClickArbiter,
    log: LogBoard,
    last_blink: BlinkReading,
    was_tapping: bool,
    unavailable: Vec<Capability>,
    stats: SessionStats,
    seq: u64,
    version: u64,
    last_input_ms: u64,
}

impl InteractionSession {
    pub fn new(config: &EngineConfig) -> Self {
        Self::with_blink_detector(config, Box::new(EarBlinkDetector::new(config.blink.clone())))
    }

    /// Build a session around a custom blink detector.
    pub fn with_blink_detector(config: &EngineConfig, blink: Box<dyn BlinkDetector>) -> Self {
        let registry = match config.spawn_seed {
            Some(seed) => ObjectRegistry::with_seed(config.objects.clone(), seed),
            None => ObjectRegistry::new(config.objects.clone()),
        };
        Self {
            hands: HandInterpreter::new(config.hand.clone()),
            blink,
            registry,
            interaction: InteractionController::new(config.viewport),
            resolver: GesturePriorityResolver::new(),
            dispatcher: CommandDispatcher::new(config.voice.clone()),
            clicks: ClickArbiter::new(config.click),
            log: LogBoard::new(config.log_display_ms),
            last_blink: BlinkReading::default(),
            was_tapping: false,
            unavailable: Vec::new(),
            stats: SessionStats::default(),
            seq: 0,
            version: 0,
            last_input_ms: 0,
        }
    }

    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    pub fn resolver(&self) -> &GesturePriorityResolver {
        &self.resolver
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    pub fn log_board(&self) -> &LogBoard {
        &self.log
    }

    /// Process one hand-tracker frame.
    pub fn on_hand_frame(&mut self, frame: &HandFrame) -> Vec<SessionEvent> {
        let now = frame.timestamp_ms;
        self.touch(now);
        let mut events = Vec::new();

        let update = self.hands.process(frame);
        let hand = update.state;
        for edge in &update.edges {
            debug!(edge = ?edge, "gesture edge");
            events.push(self.post_log(edge.log_message(), now));
        }

        let pre = priority::resolve(&hand, self.registry.grabbed().is_some());
        for event in self.interaction.update(&hand, pre, &mut self.registry) {
            match event {
                InteractionEvent::Grabbed(id) => debug!(id = %id, "grab started"),
                InteractionEvent::Released(id) => debug!(id = %id, "grab ended"),
                InteractionEvent::ReleaseSuppressed(id) => debug!(id = %id, "grab held"),
            }
        }

        events.extend(self.resolve_gesture(now));

        if hand.is_tapping && !self.was_tapping {
            events.extend(self.click(ClickSource::Tap, now));
        }
        self.was_tapping = hand.is_tapping;

        events
    }

    /// Process one face-tracker frame.
    pub fn on_face_frame(&mut self, frame: &FaceFrame) -> Vec<SessionEvent> {
        let now = frame.timestamp_ms;
        self.touch(now);
        match self.blink.observe(frame) {
            Ok(reading) => {
                self.last_blink = reading;
                if reading.blink {
                    self.stats.blinks += 1;
                    return self.click(ClickSource::Blink, now);
                }
            }
            Err(e) => {
                warn!("face frame ignored: {e}");
                self.last_blink.blink = false;
                self.last_blink.eyes_closed = false;
            }
        }
        Vec::new()
    }

    /// Apply one finalized transcript against the current registry and
    /// priority state.
    pub fn on_transcript(&mut self, transcript: &str, now_ms: u64) -> Vec<SessionEvent> {
        self.touch(now_ms);
        let ctx = CommandContext::new(self.resolver.active(), self.registry.grabbed_id());
        let mut events = Vec::new();

        match self
            .dispatcher
            .dispatch(transcript, ctx, &mut self.registry, now_ms)
        {
            Ok(DispatchOutcome::Ignored) => self.stats.ignored_transcripts += 1,
            Ok(outcome) => {
                info!(transcript, ?outcome, "voice command");
                if let Some(message) = outcome.log_message() {
                    events.push(self.post_log(message, now_ms));
                }
                if outcome.raises_pulse() {
                    events.push(self.ambient_event());
                }
            }
            Err(e) if e.is_rejection() => {
                self.stats.rejected_commands += 1;
                info!(transcript, "voice command rejected: {e}");
                if let Some(message) = rejection_message(&e) {
                    events.push(self.post_log(message, now_ms));
                }
            }
            Err(e) => {
                self.stats.failed_commands += 1;
                warn!(transcript, "voice command failed: {e}");
            }
        }
        // Removing or clearing a grabbed object ends the grab right away.
        events.extend(self.resolve_gesture(now_ms));
        events
    }

    /// Mark an external capability as unavailable. The remaining inputs keep
    /// working. Repeated reports are ignored.
    pub fn on_capability_lost(
        &mut self,
        capability: Capability,
        detail: Option<String>,
        now_ms: u64,
    ) -> Vec<SessionEvent> {
        if self.unavailable.contains(&capability) {
            return Vec::new();
        }
        self.touch(now_ms);
        warn!(
            capability = capability.as_str(),
            detail = detail.as_deref().unwrap_or(""),
            "capability unavailable"
        );
        self.unavailable.push(capability);
        let log = self.post_log(capability.failure_message(), now_ms);
        let status = SessionEvent::Status(EngineStatusEvent {
            status: EngineStatus::Degraded,
            detail: Some(match detail {
                Some(d) => format!("{}: {d}", capability.as_str()),
                None => capability.as_str().to_string(),
            }),
        });
        vec![log, status]
    }

    /// Fire expired timers (log expiry, listening window).
    pub fn poll_timers(&mut self, now_ms: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.dispatcher.poll(now_ms) {
            self.touch(now_ms);
            events.push(self.post_log(LISTEN_TIMEOUT_MESSAGE, now_ms));
        }
        if self.log.poll(now_ms) {
            self.touch(now_ms);
            events.push(SessionEvent::Log(LogEvent {
                seq: self.next_seq(),
                message: None,
                display_ms: 0,
                timestamp_ms: now_ms,
            }));
        }
        events
    }

    pub fn has_unavailable(&self) -> bool {
        !self.unavailable.is_empty()
    }

    /// Snapshot version; bumped by every state-changing call.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        let active = self.resolver.active();
        SceneSnapshot {
            version: self.version,
            timestamp_ms: self.last_input_ms,
            active_gesture: active,
            priority: active.priority(),
            hand: self.hands.state().clone(),
            objects: self.registry.objects().to_vec(),
            click: self.clicks.state(),
            blink: self.last_blink,
            ambient_color: self.dispatcher.ambient_color().to_string(),
            pulse_count: self.dispatcher.pulse_count(),
            listening: self.dispatcher.is_listening(self.last_input_ms),
            log_message: self.log.current().map(str::to_string),
            unavailable: self.unavailable.clone(),
        }
    }

    /// Cancel every pending timer and drop per-frame history.
    pub fn shutdown(&mut self) {
        self.log.cancel();
        self.dispatcher.shutdown();
        self.hands.reset();
        self.interaction.reset();
        self.was_tapping = false;
        info!("interaction session shut down");
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    fn resolve_gesture(&mut self, now_ms: u64) -> Option<SessionEvent> {
        let grabbed = self.registry.grabbed().is_some();
        let t = self.resolver.update(self.hands.state(), grabbed)?;
        Some(SessionEvent::Gesture(GestureChangedEvent {
            seq: self.next_seq(),
            gesture: t.current,
            previous: t.previous,
            priority: t.current.priority(),
            display_name: t.current.display_name().to_string(),
            timestamp_ms: now_ms,
        }))
    }

    fn click(&mut self, source: ClickSource, now_ms: u64) -> Vec<SessionEvent> {
        if !self.clicks.trigger(source, now_ms) {
            return Vec::new();
        }
        let state = self.clicks.state();
        let click = SessionEvent::Click(ClickEvent {
            seq: self.next_seq(),
            source,
            count: state.count,
            timestamp_ms: now_ms,
        });
        vec![click, self.post_log(source.log_message(), now_ms)]
    }

    fn post_log(&mut self, message: impl Into<String>, now_ms: u64) -> SessionEvent {
        let message = message.into();
        self.log.post(message.clone(), now_ms);
        SessionEvent::Log(LogEvent {
            seq: self.next_seq(),
            message: Some(message),
            display_ms: self.log.display_ms(),
            timestamp_ms: now_ms,
        })
    }

    fn ambient_event(&mut self) -> SessionEvent {
        SessionEvent::Ambient(AmbientEvent {
            seq: self.next_seq(),
            color: self.dispatcher.ambient_color().to_string(),
            pulse: self.dispatcher.pulse_count(),
        })
    }

    fn touch(&mut self, now_ms: u64) {
        self.version += 1;
        self.last_input_ms = self.last_input_ms.max(now_ms);
    }

    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}
