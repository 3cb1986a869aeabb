//! Eye-aspect-ratio blink detector with latch + cooldown.
//!
//! ## Algorithm
//!
//! 1. For each eye, `EAR = (|p2−p6| + |p3−p5|) / (2·|p1−p4|)`; average both.
//! 2. `EAR < threshold` (strict) counts a closed frame; otherwise the counter
//!    resets and the latch clears.
//! 3. When the counter reaches `consecutive_frames`, the latch is clear and
//!    more than `cooldown_ms` passed since the last accepted blink → emit one
//!    blink and latch until the eyes reopen.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{BlinkDetector, BlinkReading};
use crate::error::{AuraError, Result};
use crate::landmarks::{face_index, FaceFrame, Landmark, FACE_LANDMARK_MIN};

/// Blink detection tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct BlinkConfig {
    /// Average EAR strictly below this counts as closed.
    pub ear_threshold: f32,
    /// Closed frames required before a blink is accepted (minimum 1).
    pub consecutive_frames: u32,
    /// Minimum time between accepted blinks.
    pub cooldown_ms: u64,
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            ear_threshold: 0.25,
            consecutive_frames: 1,
            cooldown_ms: 300,
        }
    }
}

/// Eye-aspect-ratio of a six-point eye outline.
///
/// A zero-width eye yields 0.0 (treated as fully closed).
pub fn eye_aspect_ratio(eye: &[Landmark; 6]) -> f32 {
    let vertical_1 = eye[1].planar_distance(&eye[5]);
    let vertical_2 = eye[2].planar_distance(&eye[4]);
    let horizontal = eye[0].planar_distance(&eye[3]);
    if horizontal == 0.0 {
        return 0.0;
    }
    (vertical_1 + vertical_2) / (2.0 * horizontal)
}

fn eye_outline(landmarks: &[Landmark], indices: &[usize; 6]) -> [Landmark; 6] {
    std::array::from_fn(|k| landmarks[indices[k]])
}

/// Default blink detector.
#[derive(Debug, Clone)]
pub struct EarBlinkDetector {
    config: BlinkConfig,
    closed_frames: u32,
    /// Set once a blink fires; cleared when the eyes reopen.
    latched: bool,
    last_blink_ms: Option<u64>,
    blink_count: u64,
}

impl EarBlinkDetector {
    pub fn new(mut config: BlinkConfig) -> Self {
        config.consecutive_frames = config.consecutive_frames.max(1);
        Self {
            config,
            closed_frames: 0,
            latched: false,
            last_blink_ms: None,
            blink_count: 0,
        }
    }

    fn cooldown_elapsed(&self, now_ms: u64) -> bool {
        self.last_blink_ms
            .map(|last| now_ms.saturating_sub(last) > self.config.cooldown_ms)
            .unwrap_or(true)
    }
}

impl Default for EarBlinkDetector {
    fn default() -> Self {
        Self::new(BlinkConfig::default())
    }
}

impl BlinkDetector for EarBlinkDetector {
    fn observe(&mut self, frame: &FaceFrame) -> Result<BlinkReading> {
        if !frame.is_complete() {
            return Err(AuraError::MalformedLandmarks {
                expected: FACE_LANDMARK_MIN,
                got: frame.landmarks.len(),
            });
        }

        let left_ear = eye_aspect_ratio(&eye_outline(&frame.landmarks, &face_index::LEFT_EYE));
        let right_ear = eye_aspect_ratio(&eye_outline(&frame.landmarks, &face_index::RIGHT_EYE));
        let average_ear = (left_ear + right_ear) / 2.0;

        let eyes_closed = average_ear < self.config.ear_threshold;
        if eyes_closed {
            self.closed_frames = self.closed_frames.saturating_add(1);
        } else {
            self.closed_frames = 0;
            self.latched = false;
        }

        let now_ms = frame.timestamp_ms;
        let mut blink = false;
        if self.closed_frames >= self.config.consecutive_frames
            && !self.latched
            && self.cooldown_elapsed(now_ms)
        {
            blink = true;
            self.latched = true;
            self.last_blink_ms = Some(now_ms);
            self.blink_count += 1;
            debug!(average_ear, count = self.blink_count, "blink detected");
        }

        Ok(BlinkReading {
            blink,
            eyes_closed,
            left_ear,
            right_ear,
            average_ear,
            blink_count: self.blink_count,
        })
    }

    fn reset(&mut self) {
        self.closed_frames = 0;
        self.latched = false;
        self.last_blink_ms = None;
        self.blink_count = 0;
    }
}
