//! `HandInterpreter`: turns each `HandFrame` into a `HandState` plus
//! gesture-start edges.

use tracing::{trace, warn};

use super::{HandEdge, HandState, HandThresholds, SwipeDetector, SwipeDirection};
use crate::landmarks::{hand_index, HandFrame, HandLandmarks};

/// Result of interpreting one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HandUpdate {
    pub state: HandState,
    /// Gesture-start edges raised on this frame, in detection order.
    pub edges: Vec<HandEdge>,
}

/// Stateful landmark interpreter for the primary (and optional second) hand.
#[derive(Debug, Clone)]
pub struct HandInterpreter {
    thresholds: HandThresholds,
    swipe: SwipeDetector,
    was_pinching: bool,
    was_fist: bool,
    was_two_handed: bool,
    state: HandState,
}

impl HandInterpreter {
    pub fn new(thresholds: HandThresholds) -> Self {
        let swipe = SwipeDetector::new(&thresholds);
        Self {
            thresholds,
            swipe,
            was_pinching: false,
            was_fist: false,
            was_two_handed: false,
            state: HandState::absent(),
        }
    }

    /// Latest derived state.
    pub fn state(&self) -> &HandState {
        &self.state
    }

    /// Interpret one tracker frame.
    pub fn process(&mut self, frame: &HandFrame) -> HandUpdate {
        let mut complete = frame.hands.iter().filter(|h| h.is_complete());
        let primary = complete.next();
        let secondary = complete.next();

        if frame.hands.iter().any(|h| !h.is_complete()) {
            warn!(
                hands = frame.hands.len(),
                "hand frame contained an incomplete landmark set: ignoring it"
            );
        }

        let Some(primary) = primary else {
            // Absence: reset to defaults and drop the swipe window. Edge
            // memory and the swipe cooldown are left as they are.
            self.swipe.clear_window();
            self.state = HandState::absent();
            return HandUpdate {
                state: self.state.clone(),
                edges: Vec::new(),
            };
        };

        let mut edges = Vec::new();
        let th = &self.thresholds;

        let wrist = primary.wrist();
        let thumb_tip = primary.thumb_tip();
        let index_tip = primary.index_tip();

        // ── Two hands ──────────────────────────────────────────────────────
        let (is_two_handed, hand_distance, center_point) = match secondary {
            Some(second) => {
                let wrist2 = second.wrist();
                (true, wrist.planar_distance(&wrist2), Some(wrist.midpoint(&wrist2)))
            }
            None => (false, 0.0, None),
        };
        if is_two_handed && !self.was_two_handed {
            edges.push(HandEdge::TwoHandStarted);
        }
        self.was_two_handed = is_two_handed;

        // ── Single-hand gestures ───────────────────────────────────────────
        let is_pinching = index_tip.planar_distance(&thumb_tip) < th.pinch_distance;
        let is_tapping = !is_pinching && nearest_index_joint(primary) < th.tap_distance;
        let is_fist = index_tip.planar_distance(&wrist) < th.fist_distance;

        // ── Swipe (single hand only) ───────────────────────────────────────
        let swipe_direction = if is_two_handed {
            self.swipe.clear_window();
            SwipeDirection::None
        } else {
            self.swipe.push(wrist.x, frame.timestamp_ms)
        };
        if swipe_direction.is_some() {
            edges.push(HandEdge::Swipe(swipe_direction));
        }

        if is_pinching && !self.was_pinching {
            edges.push(HandEdge::PinchStarted);
        }
        if is_fist && !self.was_fist {
            edges.push(HandEdge::FistStarted);
        }
        self.was_pinching = is_pinching;
        self.was_fist = is_fist;

        self.state = HandState {
            index_tip: Some(index_tip),
            thumb_tip: Some(thumb_tip),
            wrist: Some(wrist),
            is_present: true,
            is_pinching,
            is_tapping,
            is_fist,
            is_two_handed,
            hand_distance,
            center_point,
            swipe_direction,
        };

        trace!(
            pinch = is_pinching,
            tap = is_tapping,
            fist = is_fist,
            two_handed = is_two_handed,
            "hand frame interpreted"
        );

        HandUpdate {
            state: self.state.clone(),
            edges,
        }
    }

    /// Forget all history, including the swipe cooldown.
    pub fn reset(&mut self) {
        self.swipe.reset();
        self.was_pinching = false;
        self.was_fist = false;
        self.was_two_handed = false;
        self.state = HandState::absent();
    }
}

/// Thumb-tip distance to the closest of the index base knuckle, middle joint
/// and upper joint.
fn nearest_index_joint(hand: &HandLandmarks) -> f32 {
    let thumb = hand.thumb_tip();
    [
        hand_index::INDEX_MCP,
        hand_index::INDEX_PIP,
        hand_index::INDEX_DIP,
    ]
    .iter()
    .map(|&i| hand.point(i).planar_distance(&thumb))
    .fold(f32::INFINITY, f32::min)
}
