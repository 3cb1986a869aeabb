//! Events broadcast by the engine, plus the per-tick scene snapshot.
//!
//! | Event | Subscription |
//! |-------|--------------|
//! | `GestureChangedEvent` | `AuraEngine::subscribe_gestures` |
//! | `LogEvent` | `AuraEngine::subscribe_logs` |
//! | `ClickEvent` | `AuraEngine::subscribe_clicks` |
//! | `AmbientEvent` | `AuraEngine::subscribe_ambient` |
//! | `EngineStatusEvent` | `AuraEngine::subscribe_status` |
//!
//! Every event except status carries `seq`, drawn from one engine-wide
//! monotonically increasing counter.

use serde::{Deserialize, Serialize};

use crate::click::{ClickSource, ClickState};
use crate::face::BlinkReading;
use crate::hand::HandState;
use crate::objects::InteractiveObject;
use crate::priority::GestureType;

// ---------------------------------------------------------------------------
// Gesture events
// ---------------------------------------------------------------------------

/// Emitted only when the resolved gesture differs from the previous frame's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GestureChangedEvent {
    pub seq: u64,
    pub gesture: GestureType,
    pub previous: GestureType,
    pub priority: u8,
    /// HUD label, e.g. `"GRAVITY WELL"`.
    pub display_name: String,
    pub timestamp_ms: u64,
}

// ---------------------------------------------------------------------------
// HUD log
// ---------------------------------------------------------------------------

/// A HUD log line. `message: None` means the previous line expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub seq: u64,
    pub message: Option<String>,
    /// How long the line stays visible.
    pub display_ms: u64,
    pub timestamp_ms: u64,
}

// ---------------------------------------------------------------------------
// Clicks and ambient
// ---------------------------------------------------------------------------

/// Emitted for every accepted click.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub seq: u64,
    pub source: ClickSource,
    pub count: u64,
    pub timestamp_ms: u64,
}

/// Ambient colour change and/or flash request for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmbientEvent {
    pub seq: u64,
    pub color: String,
    /// Total pulses raised; a renderer flashes whenever it increases.
    pub pulse: u64,
}

// ---------------------------------------------------------------------------
// Engine status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatusEvent {
    pub status: EngineStatus,
    /// Optional human-readable detail (e.g. which capability failed).
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineStatus {
    /// Created, `start()` not yet called.
    Idle,
    /// Consuming inputs.
    Running,
    /// Running, but at least one external capability is unavailable.
    Degraded,
    /// Stopped; may be restarted.
    Stopped,
}

/// External services feeding the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    HandTracking,
    FaceTracking,
    SpeechRecognition,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HandTracking => "hand_tracking",
            Self::FaceTracking => "face_tracking",
            Self::SpeechRecognition => "speech_recognition",
        }
    }

    /// HUD line raised when the capability is lost.
    pub fn failure_message(&self) -> &'static str {
        match self {
            Self::HandTracking => "ERROR: HAND_TRACKING_FAIL",
            Self::FaceTracking => "ERROR: FACE_TRACKING_FAIL",
            Self::SpeechRecognition => "ERROR: SPEECH_FAIL",
        }
    }
}

// ---------------------------------------------------------------------------
// Scene snapshot
// ---------------------------------------------------------------------------

/// Immutable view of the interaction state after one processed input.
///
/// `version` strictly increases between published snapshots, so readers can
/// skip redundant work. One processed input may advance it by more than one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub version: u64,
    pub timestamp_ms: u64,
    pub active_gesture: GestureType,
    pub priority: u8,
    pub hand: HandState,
    pub objects: Vec<InteractiveObject>,
    pub click: ClickState,
    pub blink: BlinkReading,
    pub ambient_color: String,
    pub pulse_count: u64,
    /// Wake-word listening window is open.
    pub listening: bool,
    /// Current HUD line, if one is showing.
    pub log_message: Option<String>,
    pub unavailable: Vec<Capability>,
}
