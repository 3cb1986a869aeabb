//! Swipe detection over a short wrist-x sliding window.
//!
//! ## Algorithm
//!
//! 1. Append `(wrist_x, t)`; keep only the newest `swipe_samples`.
//! 2. Once the window is full and no cooldown is running, compare the oldest
//!    and newest sample.
//! 3. If `Δt < swipe_window_ms` and `|Δx| > swipe_distance`, fire
//!    (`Δx > 0` ⇒ `Left`), clear the window and arm the cooldown.

use std::collections::VecDeque;

use tracing::debug;

use super::{HandThresholds, SwipeDirection};
use crate::timer::OneShotTimer;

#[derive(Debug, Clone, Copy)]
struct WristSample {
    x: f32,
    t_ms: u64,
}

/// Detects fast unidirectional wrist motion for a single hand.
#[derive(Debug, Clone)]
pub struct SwipeDetector {
    samples: VecDeque<WristSample>,
    window_samples: usize,
    max_span_ms: u64,
    min_distance: f32,
    cooldown_ms: u64,
    cooldown: OneShotTimer,
}

impl SwipeDetector {
    pub fn new(thresholds: &HandThresholds) -> Self {
        let window_samples = thresholds.swipe_samples.max(2);
        Self {
            samples: VecDeque::with_capacity(window_samples),
            window_samples,
            max_span_ms: thresholds.swipe_window_ms,
            min_distance: thresholds.swipe_distance,
            cooldown_ms: thresholds.swipe_cooldown_ms,
            cooldown: OneShotTimer::new(),
        }
    }

    /// Feed one wrist sample; returns the swipe pulse for this frame.
    pub fn push(&mut self, wrist_x: f32, now_ms: u64) -> SwipeDirection {
        // Expire the cooldown lazily on the frame tick.
        self.cooldown.fire(now_ms);

        self.samples.push_back(WristSample { x: wrist_x, t_ms: now_ms });
        while self.samples.len() > self.window_samples {
            self.samples.pop_front();
        }

        if self.cooldown.is_pending() || self.samples.len() < self.window_samples {
            return SwipeDirection::None;
        }

        let (Some(oldest), Some(newest)) = (self.samples.front(), self.samples.back()) else {
            return SwipeDirection::None;
        };
        let dt = newest.t_ms.saturating_sub(oldest.t_ms);
        let dx = newest.x - oldest.x;

        if dt < self.max_span_ms && dx.abs() > self.min_distance {
            let direction = if dx > 0.0 {
                SwipeDirection::Left
            } else {
                SwipeDirection::Right
            };
            debug!(dx, dt_ms = dt, direction = direction.as_str(), "swipe detected");
            self.samples.clear();
            self.cooldown.arm(now_ms, self.cooldown_ms);
            return direction;
        }

        SwipeDirection::None
    }

    /// Drop the sample window (hand lost or two hands in view).
    /// A running cooldown is kept.
    pub fn clear_window(&mut self) {
        self.samples.clear();
    }

    /// Whether a cooldown is still suppressing swipes at `now_ms`.
    pub fn is_cooling_down(&self, now_ms: u64) -> bool {
        self.cooldown.is_running(now_ms)
    }

    pub fn reset(&mut self) {
        self.samples.clear();
        self.cooldown.cancel();
    }
}
