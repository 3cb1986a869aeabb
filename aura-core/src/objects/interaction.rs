//! `InteractionController`: per-frame hover / grab / release protocol.
//!
//! ```text
//! index tip ─► Viewport::to_world ─► update_hover            (every frame)
//!                                 └► update_grabbed_position (while pinching)
//! pinch ↑  ─► grab first hovered object
//! pinch ↓  ─► release, unless two hands are up while grabbing
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{ObjectId, ObjectRegistry};
use crate::geometry::Vec3;
use crate::hand::HandState;
use crate::landmarks::Landmark;
use crate::priority::GestureType;

/// World-space size of the visible plane at the hand's depth.
///
/// Defaults match a 75° vertical field of view at distance 5 with a 16:9
/// image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 13.64,
            height: 7.67,
        }
    }
}

impl Viewport {
    /// Map a normalized (mirrored) image landmark onto the world plane z = 0.
    pub fn to_world(&self, landmark: &Landmark) -> Vec3 {
        Vec3::new(
            (0.5 - landmark.x) * self.width,
            (0.5 - landmark.y) * self.height,
            0.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEvent {
    Grabbed(ObjectId),
    Released(ObjectId),
    /// Pinch dropped while two hands were up; the grab was kept.
    ReleaseSuppressed(ObjectId),
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    viewport: Viewport,
    prev_pinch: bool,
}

impl InteractionController {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            prev_pinch: false,
        }
    }

    /// World-space pointer for the current frame, if a hand is present.
    pub fn pointer(&self, hand: &HandState) -> Option<Vec3> {
        if !hand.is_present {
            return None;
        }
        hand.index_tip.map(|tip| self.viewport.to_world(&tip))
    }

    /// Run one frame of the protocol.
    ///
    /// `active` is the gesture resolved from this frame's hand state before
    /// any grab or release happens.
    pub fn update(
        &mut self,
        hand: &HandState,
        active: GestureType,
        registry: &mut ObjectRegistry,
    ) -> Vec<InteractionEvent> {
        let mut events = Vec::new();
        let pointer = self.pointer(hand);
        registry.update_hover(pointer);

        // Pinch edge memory only advances while a hand is visible.
        let Some(pointer) = pointer else {
            return events;
        };

        if hand.is_pinching {
            registry.update_grabbed_position(pointer);
        }

        match (self.prev_pinch, hand.is_pinching) {
            (false, true) => {
                if let Some(id) = registry.grab(Some(pointer)) {
                    events.push(InteractionEvent::Grabbed(id));
                }
            }
            (true, false) => {
                if hand.is_two_handed && active == GestureType::Grab {
                    if let Some(id) = registry.grabbed_id() {
                        debug!(id = %id, "release suppressed: two hands while grabbing");
                        events.push(InteractionEvent::ReleaseSuppressed(id));
                    }
                } else if let Some(id) = registry.release() {
                    events.push(InteractionEvent::Released(id));
                }
            }
            _ => {}
        }
        self.prev_pinch = hand.is_pinching;
        events
    }

    pub fn reset(&mut self) {
        self.prev_pinch = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::ObjectConfig;
    use approx::assert_relative_eq;

    fn hand_at(x: f32, y: f32, pinching: bool) -> HandState {
        HandState {
            index_tip: Some(Vec3::new(x, y, 0.0)),
            thumb_tip: Some(Vec3::new(x, y, 0.0)),
            wrist: Some(Vec3::new(x, y + 0.3, 0.0)),
            is_present: true,
            is_pinching: pinching,
            ..HandState::absent()
        }
    }

    /// Registry with one object placed at the world point under (0.5, 0.5).
    fn registry_with_object_at_centre() -> (ObjectRegistry, ObjectId) {
        let mut reg = ObjectRegistry::with_seed(ObjectConfig::default(), 1);
        let id = reg.spawn().unwrap();
        // Walk the object to the origin via a throwaway grab.
        let spawned_at = reg.get(id).unwrap().position;
        reg.update_hover(Some(spawned_at));
        reg.grab(Some(Vec3::ZERO));
        for _ in 0..200 {
            reg.update_grabbed_position(Vec3::ZERO);
        }
        reg.release();
        (reg, id)
    }

    #[test]
    fn to_world_mirrors_and_centres() {
        let vp = Viewport {
            width: 10.0,
            height: 6.0,
        };
        let w = vp.to_world(&Vec3::new(0.0, 1.0, 0.4));
        assert_relative_eq!(w.x, 5.0);
        assert_relative_eq!(w.y, -3.0);
        assert_relative_eq!(w.z, 0.0);
    }

    #[test]
    fn pinch_rising_edge_grabs_hovered_object() {
        let (mut reg, id) = registry_with_object_at_centre();
        let mut ctl = InteractionController::default();
        ctl.update(&hand_at(0.5, 0.5, false), GestureType::Move, &mut reg);
        assert!(reg.get(id).unwrap().is_hovered);

        let events = ctl.update(&hand_at(0.5, 0.5, true), GestureType::Move, &mut reg);
        assert_eq!(events, vec![InteractionEvent::Grabbed(id)]);
        assert_eq!(reg.grabbed_id(), Some(id));
    }

    #[test]
    fn grabbed_object_follows_and_releases_on_falling_edge() {
        let (mut reg, id) = registry_with_object_at_centre();
        let mut ctl = InteractionController::default();
        ctl.update(&hand_at(0.5, 0.5, true), GestureType::Move, &mut reg);
        ctl.update(&hand_at(0.4, 0.5, true), GestureType::Grab, &mut reg);
        let x = reg.get(id).unwrap().position.x;
        assert!(x > 0.0, "object should move toward the pointer, x={x}");

        let events = ctl.update(&hand_at(0.4, 0.5, false), GestureType::Grab, &mut reg);
        assert_eq!(events, vec![InteractionEvent::Released(id)]);
        assert!(reg.grabbed().is_none());
    }

    #[test]
    fn second_hand_keeps_the_grab() {
        let (mut reg, id) = registry_with_object_at_centre();
        let mut ctl = InteractionController::default();
        ctl.update(&hand_at(0.5, 0.5, true), GestureType::Move, &mut reg);

        let two = HandState {
            is_two_handed: true,
            ..hand_at(0.5, 0.5, false)
        };
        let events = ctl.update(&two, GestureType::Grab, &mut reg);
        assert_eq!(events, vec![InteractionEvent::ReleaseSuppressed(id)]);
        assert_eq!(reg.grabbed_id(), Some(id));
    }

    #[test]
    fn absence_clears_hover_but_keeps_grab() {
        let (mut reg, id) = registry_with_object_at_centre();
        let mut ctl = InteractionController::default();
        ctl.update(&hand_at(0.5, 0.5, true), GestureType::Move, &mut reg);
        assert!(ctl.update(&HandState::absent(), GestureType::Grab, &mut reg).is_empty());
        assert!(!reg.get(id).unwrap().is_hovered);
        assert_eq!(reg.grabbed_id(), Some(id));

        // Back with the pinch still held: no new edge, still grabbed.
        let events = ctl.update(&hand_at(0.5, 0.5, true), GestureType::Grab, &mut reg);
        assert!(events.is_empty());
        assert_eq!(reg.grabbed_id(), Some(id));
    }

    #[test]
    fn pinch_over_empty_space_grabs_nothing() {
        let (mut reg, _) = registry_with_object_at_centre();
        let mut ctl = InteractionController::default();
        ctl.update(&hand_at(0.05, 0.05, false), GestureType::Move, &mut reg);
        let events = ctl.update(&hand_at(0.05, 0.05, true), GestureType::Move, &mut reg);
        assert!(events.is_empty());
        assert!(reg.grabbed().is_none());
    }
}
