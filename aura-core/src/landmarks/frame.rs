//! Typed per-frame tracker output passed from the input sink to the session.

use serde::{Deserialize, Serialize};

use super::{hand_index, Landmark, FACE_LANDMARK_MIN, HAND_LANDMARK_COUNT};
use crate::error::{AuraError, Result};

/// One detected hand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandLandmarks {
    points: Vec<Landmark>,
}

impl HandLandmarks {
    /// Wrap a tracker landmark list, rejecting sets that are too short to
    /// index safely.
    pub fn new(points: Vec<Landmark>) -> Result<Self> {
        if points.len() < HAND_LANDMARK_COUNT {
            return Err(AuraError::MalformedLandmarks {
                expected: HAND_LANDMARK_COUNT,
                got: points.len(),
            });
        }
        Ok(Self { points })
    }

    /// Whether every index of the hand model is addressable.
    ///
    /// Deserialized sets bypass `new`, so the interpreter checks this before
    /// indexing.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= HAND_LANDMARK_COUNT
    }

    pub fn point(&self, index: usize) -> Landmark {
        self.points[index]
    }

    pub fn wrist(&self) -> Landmark {
        self.points[hand_index::WRIST]
    }

    pub fn thumb_tip(&self) -> Landmark {
        self.points[hand_index::THUMB_TIP]
    }

    pub fn index_tip(&self) -> Landmark {
        self.points[hand_index::INDEX_TIP]
    }
}

/// Output of the hand tracker for one camera frame.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandFrame {
    /// Detected hands, primary first. Empty when no hand is visible.
    pub hands: Vec<HandLandmarks>,
    /// Capture time in engine milliseconds (see `InputSink::now_ms`).
    pub timestamp_ms: u64,
}

impl HandFrame {
    pub fn new(hands: Vec<HandLandmarks>, timestamp_ms: u64) -> Self {
        Self {
            hands,
            timestamp_ms,
        }
    }

    /// A frame in which the tracker saw no hand.
    pub fn empty(timestamp_ms: u64) -> Self {
        Self {
            hands: Vec::new(),
            timestamp_ms,
        }
    }
}

/// Output of the face tracker for one camera frame (first face only).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceFrame {
    pub landmarks: Vec<Landmark>,
    pub timestamp_ms: u64,
}

impl FaceFrame {
    pub fn new(landmarks: Vec<Landmark>, timestamp_ms: u64) -> Self {
        Self {
            landmarks,
            timestamp_ms,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.landmarks.len() >= FACE_LANDMARK_MIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_hand_is_rejected() {
        let err = HandLandmarks::new(vec![Landmark::ZERO; 5]).unwrap_err();
        assert!(matches!(
            err,
            AuraError::MalformedLandmarks {
                expected: 21,
                got: 5
            }
        ));
    }

    #[test]
    fn hand_frame_serializes_hands_as_plain_point_lists() {
        let hand = HandLandmarks::new(vec![Landmark::new(0.5, 0.5, 0.0); 21]).unwrap();
        let frame = HandFrame::new(vec![hand], 42);
        let json = serde_json::to_value(&frame).expect("serialize hand frame");
        assert_eq!(json["timestampMs"], 42);
        assert_eq!(json["hands"][0].as_array().map(|a| a.len()), Some(21));
    }

    #[test]
    fn deserialized_short_hand_reports_incomplete() {
        let raw = r#"{"hands":[[{"x":0.1,"y":0.2,"z":0.0}]],"timestampMs":1}"#;
        let frame: HandFrame = serde_json::from_str(raw).expect("deserialize");
        assert!(!frame.hands[0].is_complete());
    }
}
