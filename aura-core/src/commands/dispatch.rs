//! `CommandDispatcher`: applies parsed voice commands against a consistent
//! snapshot of registry and priority state.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{color::NamedColor, strip_wake_word, VoiceCommand, DEFAULT_AMBIENT_COLOR};
use crate::error::{AuraError, Result};
use crate::objects::{ObjectId, ObjectRegistry};
use crate::priority::GestureType;
use crate::timer::OneShotTimer;

pub const WAKE_WORD_MESSAGE: &str = "AURA WAKE WORD DETECTED";
pub const LISTEN_TIMEOUT_MESSAGE: &str = "TIMEOUT: NO COMMAND";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct VoiceConfig {
    pub wake_word: String,
    /// How long the dispatcher listens after the wake word.
    pub listening_window_ms: u64,
    /// Ignore commands outside the listening window.
    pub require_wake_word: bool,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            wake_word: "aura".into(),
            listening_window_ms: 5_000,
            require_wake_word: false,
        }
    }
}

/// Registry / priority context read at dispatch time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContext {
    pub active: GestureType,
    pub grabbed: Option<ObjectId>,
}

impl CommandContext {
    pub fn new(active: GestureType, grabbed: Option<ObjectId>) -> Self {
        Self { active, grabbed }
    }

    /// The object commands apply to, if the user is holding one.
    pub fn focused_object(&self) -> Option<ObjectId> {
        if self.active.priority() >= GestureType::Grab.priority() {
            self.grabbed
        } else {
            None
        }
    }
}

/// What a transcript did.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// No rule matched, or a command arrived outside the required window.
    Ignored,
    WakeWord,
    Cleared { removed: usize },
    Removed(ObjectId),
    Spawned(Vec<ObjectId>),
    ObjectColored {
        id: ObjectId,
        color: &'static NamedColor,
    },
    AmbientColored(&'static NamedColor),
}

impl DispatchOutcome {
    /// HUD line for this outcome.
    pub fn log_message(&self) -> Option<String> {
        match self {
            Self::Ignored => None,
            Self::WakeWord => Some(WAKE_WORD_MESSAGE.to_string()),
            Self::Cleared { .. } => Some("ALL OBJECTS CLEARED".to_string()),
            Self::Removed(_) => Some("OBJECT REMOVED".to_string()),
            Self::Spawned(ids) if ids.len() == 1 => Some("OBJECT CREATED".to_string()),
            Self::Spawned(ids) => Some(format!("OBJECTS CREATED x{}", ids.len())),
            Self::ObjectColored { color, .. } => Some(format!("COLOR >> {} (OBJECT)", color.label())),
            Self::AmbientColored(color) => Some(format!("COLOR >> {}", color.label())),
        }
    }

    /// Whether the ambient renderer should flash.
    pub fn raises_pulse(&self) -> bool {
        matches!(self, Self::WakeWord | Self::AmbientColored(_))
    }
}

/// HUD line for a rejected command.
pub fn rejection_message(err: &AuraError) -> Option<String> {
    match err {
        AuraError::CapacityExceeded { max, .. } => Some(format!("MAX OBJECTS REACHED ({max})")),
        AuraError::NoTarget | AuraError::UnknownObject(_) => Some("NO OBJECT SELECTED".to_string()),
        _ => None,
    }
}

pub struct CommandDispatcher {
    config: VoiceConfig,
    ambient_color: String,
    pulse_count: u64,
    listening: OneShotTimer,
}

impl CommandDispatcher {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            ambient_color: DEFAULT_AMBIENT_COLOR.to_string(),
            pulse_count: 0,
            listening: OneShotTimer::new(),
        }
    }

    pub fn ambient_color(&self) -> &str {
        &self.ambient_color
    }

    /// Number of ambient pulses raised so far.
    pub fn pulse_count(&self) -> u64 {
        self.pulse_count
    }

    pub fn is_listening(&self, now_ms: u64) -> bool {
        self.listening.is_running(now_ms)
    }

    /// Apply one finalized transcript.
    ///
    /// # Errors
    /// - `AuraError::NoTarget` for a single remove with no grabbed object.
    /// - `AuraError::CapacityExceeded` when a spawn would overflow the registry.
    pub fn dispatch(
        &mut self,
        transcript: &str,
        ctx: CommandContext,
        registry: &mut ObjectRegistry,
        now_ms: u64,
    ) -> Result<DispatchOutcome> {
        let (addressed, text) = match strip_wake_word(transcript, &self.config.wake_word) {
            Some(rest) => (true, rest),
            None => (false, transcript),
        };

        if addressed && text.is_empty() {
            self.pulse_count += 1;
            self.listening.arm(now_ms, self.config.listening_window_ms);
            info!(window_ms = self.config.listening_window_ms, "wake word detected");
            return Ok(DispatchOutcome::WakeWord);
        }

        let Some(command) = VoiceCommand::parse(text) else {
            debug!(transcript, "transcript ignored: no command matched");
            return Ok(DispatchOutcome::Ignored);
        };

        if self.config.require_wake_word && !addressed && !self.is_listening(now_ms) {
            debug!(?command, "command ignored: wake word required");
            return Ok(DispatchOutcome::Ignored);
        }

        let outcome = self.execute(command, ctx, registry)?;
        self.listening.cancel();
        if outcome.raises_pulse() {
            self.pulse_count += 1;
        }
        Ok(outcome)
    }

    fn execute(
        &mut self,
        command: VoiceCommand,
        ctx: CommandContext,
        registry: &mut ObjectRegistry,
    ) -> Result<DispatchOutcome> {
        match command {
            VoiceCommand::ClearAll => Ok(DispatchOutcome::Cleared {
                removed: registry.clear(),
            }),
            VoiceCommand::RemoveFocused => {
                let id = ctx.focused_object().ok_or(AuraError::NoTarget)?;
                if registry.remove(id) {
                    Ok(DispatchOutcome::Removed(id))
                } else {
                    Err(AuraError::UnknownObject(id))
                }
            }
            VoiceCommand::Spawn { quantity } => {
                registry.spawn_many(quantity).map(DispatchOutcome::Spawned)
            }
            VoiceCommand::SetColor(color) => match ctx.focused_object() {
                Some(id) => {
                    registry.set_color(id, color.hex)?;
                    Ok(DispatchOutcome::ObjectColored { id, color })
                }
                None => {
                    self.ambient_color = color.hex.to_string();
                    info!(color = color.name, "ambient colour updated");
                    Ok(DispatchOutcome::AmbientColored(color))
                }
            },
        }
    }

    /// Expire the listening window. Returns `true` exactly once per expiry.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let expired = self.listening.fire(now_ms);
        if expired {
            info!("listening window expired");
        }
        expired
    }

    pub fn shutdown(&mut self) {
        self.listening.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectConfig;

    fn setup(objects: usize) -> (CommandDispatcher, ObjectRegistry) {
        let mut reg = ObjectRegistry::with_seed(ObjectConfig::default(), 3);
        reg.spawn_many(objects).unwrap();
        (CommandDispatcher::new(VoiceConfig::default()), reg)
    }

    fn idle() -> CommandContext {
        CommandContext::new(GestureType::Idle, None)
    }

    #[test]
    fn create_two_with_two_present_is_rejected() {
        let (mut d, mut reg) = setup(2);
        let err = d
            .dispatch("create two objects", idle(), &mut reg, 0)
            .unwrap_err();
        assert!(matches!(err, AuraError::CapacityExceeded { .. }));
        assert_eq!(rejection_message(&err).as_deref(), Some("MAX OBJECTS REACHED (3)"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn create_logs_plural_count() {
        let (mut d, mut reg) = setup(0);
        let outcome = d.dispatch("spawn three objects", idle(), &mut reg, 0).unwrap();
        assert_eq!(outcome.log_message().as_deref(), Some("OBJECTS CREATED x3"));
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn remove_object_while_grabbed_removes_it() {
        let (mut d, mut reg) = setup(2);
        let target = reg.objects()[1].id;
        let ctx = CommandContext::new(GestureType::Grab, Some(target));
        let outcome = d.dispatch("remove object", ctx, &mut reg, 0).unwrap();
        assert_eq!(outcome, DispatchOutcome::Removed(target));
        assert_eq!(reg.len(), 1);
        assert!(reg.get(target).is_none());
    }

    #[test]
    fn remove_without_focus_is_no_target() {
        let (mut d, mut reg) = setup(2);
        let err = d.dispatch("delete it", idle(), &mut reg, 0).unwrap_err();
        assert!(matches!(err, AuraError::NoTarget));
        assert_eq!(rejection_message(&err).as_deref(), Some("NO OBJECT SELECTED"));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn clear_all_empties_registry() {
        let (mut d, mut reg) = setup(3);
        let outcome = d.dispatch("clear all", idle(), &mut reg, 0).unwrap();
        assert_eq!(outcome, DispatchOutcome::Cleared { removed: 3 });
        assert!(reg.is_empty());
    }

    #[test]
    fn colour_goes_to_focused_object_or_ambient() {
        let (mut d, mut reg) = setup(1);
        let id = reg.objects()[0].id;

        let outcome = d
            .dispatch("red", CommandContext::new(GestureType::Grab, Some(id)), &mut reg, 0)
            .unwrap();
        assert_eq!(outcome.log_message().as_deref(), Some("COLOR >> RED (OBJECT)"));
        assert_eq!(reg.get(id).unwrap().color, "#ff2a2a");
        assert_eq!(d.ambient_color(), DEFAULT_AMBIENT_COLOR);
        assert_eq!(d.pulse_count(), 0);

        let outcome = d.dispatch("purple", idle(), &mut reg, 0).unwrap();
        assert_eq!(outcome.log_message().as_deref(), Some("COLOR >> PURPLE"));
        assert_eq!(d.ambient_color(), "#bd00ff");
        assert_eq!(d.pulse_count(), 1);
    }

    #[test]
    fn grabbed_id_without_grab_priority_is_not_focus() {
        let ctx = CommandContext::new(GestureType::DualHand, Some(ObjectId(0)));
        assert_eq!(ctx.focused_object(), None);
    }

    #[test]
    fn unmatched_transcript_changes_nothing() {
        let (mut d, mut reg) = setup(1);
        let before = reg.objects().to_vec();
        let outcome = d.dispatch("what time is it", idle(), &mut reg, 0).unwrap();
        assert_eq!(outcome, DispatchOutcome::Ignored);
        assert_eq!(reg.objects(), before.as_slice());
    }

    #[test]
    fn wake_word_opens_window_that_times_out() {
        let (mut d, mut reg) = setup(0);
        let outcome = d.dispatch("Aura", idle(), &mut reg, 1_000).unwrap();
        assert_eq!(outcome, DispatchOutcome::WakeWord);
        assert_eq!(d.pulse_count(), 1);
        assert!(d.is_listening(3_000));
        assert!(!d.poll(5_999));
        assert!(d.poll(6_000));
        assert!(!d.poll(7_000));
    }

    #[test]
    fn executed_command_closes_window() {
        let (mut d, mut reg) = setup(0);
        d.dispatch("aura", idle(), &mut reg, 0).unwrap();
        d.dispatch("add object", idle(), &mut reg, 100).unwrap();
        assert!(!d.is_listening(200));
        assert!(!d.poll(10_000));
    }

    #[test]
    fn required_wake_word_gates_commands() {
        let mut reg = ObjectRegistry::with_seed(ObjectConfig::default(), 3);
        let mut d = CommandDispatcher::new(VoiceConfig {
            require_wake_word: true,
            ..VoiceConfig::default()
        });
        let ignored = d.dispatch("add object", idle(), &mut reg, 0).unwrap();
        assert_eq!(ignored, DispatchOutcome::Ignored);
        assert!(reg.is_empty());

        d.dispatch("aura", idle(), &mut reg, 10).unwrap();
        assert!(matches!(
            d.dispatch("add object", idle(), &mut reg, 20).unwrap(),
            DispatchOutcome::Spawned(_)
        ));

        // Addressed in one breath.
        assert!(matches!(
            d.dispatch("aura add object", idle(), &mut reg, 30).unwrap(),
            DispatchOutcome::Spawned(_)
        ));
        assert_eq!(reg.len(), 2);
    }
}
