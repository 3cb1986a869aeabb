//! Blink detection abstraction.
//!
//! The `BlinkDetector` trait is the seam between the face tracker output and
//! the click arbiter: `EarBlinkDetector` (eye-aspect-ratio with hysteresis)
//! is the default, and any other closure classifier can be swapped in without
//! touching the session.

pub mod ear;

pub use ear::{eye_aspect_ratio, BlinkConfig, EarBlinkDetector};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::landmarks::FaceFrame;

/// Per-frame blink output: the edge plus continuous diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlinkReading {
    /// `true` on exactly one frame per accepted blink.
    pub blink: bool,
    /// Eyes are currently below the closure threshold.
    pub eyes_closed: bool,
    pub left_ear: f32,
    pub right_ear: f32,
    pub average_ear: f32,
    /// Blinks accepted since the detector was created or reset.
    pub blink_count: u64,
}

/// Trait for all blink detectors.
///
/// Implementors are stateful (consecutive-frame counters, latches, cooldowns).
pub trait BlinkDetector: Send + 'static {
    /// Analyse one face frame.
    ///
    /// # Errors
    /// `AuraError::MalformedLandmarks` if the frame is too short to index the
    /// eye outlines. The caller treats that as "no face this frame".
    fn observe(&mut self, frame: &FaceFrame) -> Result<BlinkReading>;

    /// Reset counters, latch and cooldown.
    fn reset(&mut self);
}
