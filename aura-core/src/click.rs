//! Click Arbiter: tap and blink share one cooldown window, so a
//! near-simultaneous tap + blink registers as a single click.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Where a click came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickSource {
    Tap,
    Blink,
}

impl ClickSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tap => "tap",
            Self::Blink => "blink",
        }
    }

    /// HUD line for an accepted click.
    pub fn log_message(&self) -> &'static str {
        match self {
            Self::Tap => "CLICK (TAP)",
            Self::Blink => "CLICK (BLINK)",
        }
    }
}

/// Per-source settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickMethod {
    pub enabled: bool,
    /// Minimum time since the last accepted click (from any source).
    pub cooldown_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ClickConfig {
    pub tap: ClickMethod,
    pub blink: ClickMethod,
}

impl Default for ClickConfig {
    fn default() -> Self {
        Self {
            tap: ClickMethod {
                enabled: true,
                cooldown_ms: 300,
            },
            blink: ClickMethod {
                enabled: true,
                cooldown_ms: 500,
            },
        }
    }
}

impl ClickConfig {
    pub fn method(&self, source: ClickSource) -> &ClickMethod {
        match source {
            ClickSource::Tap => &self.tap,
            ClickSource::Blink => &self.blink,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickState {
    pub count: u64,
    pub last_click_ms: Option<u64>,
    pub source: Option<ClickSource>,
}

#[derive(Debug, Clone, Default)]
pub struct ClickArbiter {
    config: ClickConfig,
    state: ClickState,
}

impl ClickArbiter {
    pub fn new(config: ClickConfig) -> Self {
        Self {
            config,
            state: ClickState::default(),
        }
    }

    pub fn state(&self) -> ClickState {
        self.state
    }

    /// Offer a click from `source`. Returns `true` if it was accepted.
    pub fn trigger(&mut self, source: ClickSource, now_ms: u64) -> bool {
        let method = self.config.method(source);
        if !method.enabled {
            debug!(source = source.as_str(), "click ignored: method disabled");
            return false;
        }
        let cooled = self
            .state
            .last_click_ms
            .map_or(true, |last| now_ms.saturating_sub(last) > method.cooldown_ms);
        if !cooled {
            debug!(source = source.as_str(), "click suppressed: cooldown");
            return false;
        }
        self.state.count += 1;
        self.state.last_click_ms = Some(now_ms);
        self.state.source = Some(source);
        info!(source = source.as_str(), count = self.state.count, "click");
        true
    }
}
