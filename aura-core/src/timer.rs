//! Single-shot deadline timer driven by the frame tick.
//!
//! The session never sleeps. Each concern (swipe cooldown, listening window,
//! log expiry) owns one `OneShotTimer`; arming it again replaces the pending
//! deadline, so timers never stack.

/// A cancellable deadline in engine milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OneShotTimer {
    deadline_ms: Option<u64>,
}

impl OneShotTimer {
    pub fn new() -> Self {
        Self { deadline_ms: None }
    }

    /// Start (or restart) the timer so it expires `duration_ms` after `now_ms`.
    pub fn arm(&mut self, now_ms: u64, duration_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(duration_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Armed and not yet expired at `now_ms`.
    pub fn is_running(&self, now_ms: u64) -> bool {
        matches!(self.deadline_ms, Some(deadline) if now_ms < deadline)
    }

    /// Returns `true` exactly once, on the first poll at or after the
    /// deadline, and disarms the timer.
    pub fn fire(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}
