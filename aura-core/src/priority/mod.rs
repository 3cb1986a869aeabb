//! Gesture Priority Resolver.
//!
//! One pure function, [`resolve`], decides the active gesture from the
//! current `HandState` and the registry's grab flag. Every consumer goes
//! through it; nothing re-derives priority on its own.
//!
//! | Gesture     | Priority | Condition                        |
//! |-------------|----------|----------------------------------|
//! | `grab`      | 100      | an object is grabbed             |
//! | `dual_hand` | 50       | two hands detected               |
//! | `fist`      | 30       | hand present and closed          |
//! | `swipe`     | 20       | swipe pulse this frame           |
//! | `move`      | 10       | hand present                     |
//! | `idle`      | 0        | otherwise                        |

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::hand::HandState;

/// The six arbitrated gesture modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GestureType {
    Grab,
    DualHand,
    Fist,
    Swipe,
    Move,
    #[default]
    Idle,
}

impl GestureType {
    /// All variants in descending priority.
    pub const ALL: [GestureType; 6] = [
        Self::Grab,
        Self::DualHand,
        Self::Fist,
        Self::Swipe,
        Self::Move,
        Self::Idle,
    ];

    pub const fn priority(self) -> u8 {
        match self {
            Self::Grab => 100,
            Self::DualHand => 50,
            Self::Fist => 30,
            Self::Swipe => 20,
            Self::Move => 10,
            Self::Idle => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grab => "grab",
            Self::DualHand => "dual_hand",
            Self::Fist => "fist",
            Self::Swipe => "swipe",
            Self::Move => "move",
            Self::Idle => "idle",
        }
    }

    /// HUD label.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Grab => "OBJECT GRABBED",
            Self::DualHand => "DUAL HAND SYNC",
            Self::Fist => "GRAVITY WELL",
            Self::Swipe => "PARTICLE WIND",
            Self::Move => "CURSOR TRACKING",
            Self::Idle => "NONE",
        }
    }
}

/// Decide the active gesture for one frame. First match wins, in
/// descending priority.
pub fn resolve(hand: &HandState, object_grabbed: bool) -> GestureType {
    if object_grabbed {
        GestureType::Grab
    } else if hand.is_two_handed {
        GestureType::DualHand
    } else if hand.is_fist && hand.is_present {
        GestureType::Fist
    } else if hand.swipe_direction.is_some() {
        GestureType::Swipe
    } else if hand.is_present {
        GestureType::Move
    } else {
        GestureType::Idle
    }
}

/// Emitted when the resolved gesture differs from the previous frame's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureTransition {
    pub previous: GestureType,
    pub current: GestureType,
}

/// Holds the last resolved gesture so changes can be detected. The decision
/// itself never depends on it.
#[derive(Debug, Clone, Default)]
pub struct GesturePriorityResolver {
    active: GestureType,
}

impl GesturePriorityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve this frame and report a transition if the gesture changed.
    pub fn update(&mut self, hand: &HandState, object_grabbed: bool) -> Option<GestureTransition> {
        let current = resolve(hand, object_grabbed);
        if current == self.active {
            return None;
        }
        let previous = std::mem::replace(&mut self.active, current);
        debug!(
            from = previous.as_str(),
            to = current.as_str(),
            priority = current.priority(),
            "active gesture changed"
        );
        Some(GestureTransition { previous, current })
    }

    pub fn active(&self) -> GestureType {
        self.active
    }

    pub fn priority(&self) -> u8 {
        self.active.priority()
    }

    /// `true` iff `candidate` ranks at least as high as the active gesture.
    pub fn should_allow(&self, candidate: GestureType) -> bool {
        candidate.priority() >= self.active.priority()
    }

    pub fn reset(&mut self) {
        self.active = GestureType::Idle;
    }
}
