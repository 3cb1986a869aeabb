//! Landmark interpretation: raw hand landmark sets → semantic `HandState`.
//!
//! ## Per-frame flow
//!
//! ```text
//! HandFrame ─► primary hand ─► pinch / tap / fist (fixed geometric thresholds)
//!          └─► second hand ─► two-handed distance + centre (suppresses swipe)
//!                         └─► wrist-x window ─► SwipeDetector (one-frame pulse)
//! ```
//!
//! `HandState` is overwritten wholesale on every processed frame; the only
//! history kept is the swipe window and the previous-frame flags used to
//! derive gesture-start edges.

pub mod interpreter;
pub mod swipe;

pub use interpreter::{HandInterpreter, HandUpdate};
pub use swipe::SwipeDetector;

use serde::{Deserialize, Serialize};

use crate::landmarks::Landmark;

/// Fixed geometric and temporal thresholds for hand gestures.
///
/// Distances are in normalized image units, times in milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct HandThresholds {
    /// Index-tip to thumb-tip distance below which the hand is pinching.
    pub pinch_distance: f32,
    /// Thumb-tip to nearest index joint distance below which the hand is
    /// tapping (only when not pinching).
    pub tap_distance: f32,
    /// Index-tip to wrist distance below which the hand is a fist.
    pub fist_distance: f32,
    /// Minimum absolute wrist-x travel across the window for a swipe.
    pub swipe_distance: f32,
    /// The window must span strictly less than this for a swipe.
    pub swipe_window_ms: u64,
    /// Samples in the wrist-x window.
    pub swipe_samples: usize,
    /// Suppression period after a swipe fires.
    pub swipe_cooldown_ms: u64,
}

impl Default for HandThresholds {
    fn default() -> Self {
        Self {
            pinch_distance: 0.05,
            tap_distance: 0.06,
            fist_distance: 0.15,
            swipe_distance: 0.08,
            swipe_window_ms: 300,
            swipe_samples: 5,
            swipe_cooldown_ms: 500,
        }
    }
}

/// Direction of a detected swipe.
///
/// The camera image is mirrored on screen, so increasing wrist x is reported
/// as `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
    #[default]
    None,
}

impl SwipeDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
        }
    }

    pub fn is_some(&self) -> bool {
        *self != SwipeDirection::None
    }
}

/// Derived snapshot of the tracked hands for one frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandState {
    pub index_tip: Option<Landmark>,
    pub thumb_tip: Option<Landmark>,
    pub wrist: Option<Landmark>,
    pub is_present: bool,
    pub is_pinching: bool,
    /// Never true while `is_pinching` is true.
    pub is_tapping: bool,
    pub is_fist: bool,
    pub is_two_handed: bool,
    /// Wrist-to-wrist distance; 0 unless two-handed.
    pub hand_distance: f32,
    /// Wrist midpoint; only set when two-handed.
    pub center_point: Option<Landmark>,
    /// One-frame pulse; `None` on every frame a swipe did not fire.
    pub swipe_direction: SwipeDirection,
}

impl HandState {
    /// The "no hand this frame" state.
    pub fn absent() -> Self {
        Self::default()
    }
}

/// Gesture-start notifications derived by comparing a flag with its value
/// on the previous processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandEdge {
    PinchStarted,
    FistStarted,
    TwoHandStarted,
    Swipe(SwipeDirection),
}

impl HandEdge {
    /// HUD log line for this edge.
    pub fn log_message(&self) -> &'static str {
        match self {
            Self::PinchStarted => "PINCH SELECT",
            Self::FistStarted => "GRAVITY WELL",
            Self::TwoHandStarted => "DUAL HAND SYNC",
            Self::Swipe(SwipeDirection::Left) => "FLICK LEFT <<",
            Self::Swipe(_) => ">> FLICK RIGHT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_state_serializes_camel_case_with_lowercase_swipe() {
        let state = HandState {
            is_present: true,
            swipe_direction: SwipeDirection::Left,
            ..HandState::default()
        };
        let json = serde_json::to_value(&state).expect("serialize hand state");
        assert_eq!(json["isPresent"], true);
        assert_eq!(json["swipeDirection"], "left");
        assert!(json["indexTip"].is_null());
    }

    #[test]
    fn swipe_edges_log_with_mirrored_arrows() {
        assert_eq!(
            HandEdge::Swipe(SwipeDirection::Left).log_message(),
            "FLICK LEFT <<"
        );
        assert_eq!(
            HandEdge::Swipe(SwipeDirection::Right).log_message(),
            ">> FLICK RIGHT"
        );
    }
}
