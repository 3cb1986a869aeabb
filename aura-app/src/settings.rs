//! Persistent application settings (JSON file in app data directory).

use std::fs;
use std::path::{Path, PathBuf};

use aura_core::{
    click::ClickMethod, BlinkConfig, ClickConfig, EngineConfig, HandThresholds, ObjectConfig,
    Viewport, VoiceConfig,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AppSettings {
    pub pinch_distance: f32,
    pub tap_distance: f32,
    pub fist_distance: f32,
    pub swipe_distance: f32,
    pub swipe_cooldown_ms: u64,
    pub ear_threshold: f32,
    pub blink_consecutive_frames: u32,
    pub blink_cooldown_ms: u64,
    pub max_objects: usize,
    pub hover_distance: f32,
    pub follow_smoothing: f32,
    pub tap_click_enabled: bool,
    pub tap_click_cooldown_ms: u64,
    pub blink_click_enabled: bool,
    pub blink_click_cooldown_ms: u64,
    pub wake_word: String,
    pub require_wake_word: bool,
    pub listening_window_ms: u64,
    pub log_display_ms: u64,
    pub input_queue_capacity: usize,
    pub tick_interval_ms: u64,
    pub viewport_width: f32,
    pub viewport_height: f32,
    pub spawn_seed: Option<u64>,
}

impl Default for AppSettings {
    fn default() -> Self {
        let hand = HandThresholds::default();
        let blink = BlinkConfig::default();
        let objects = ObjectConfig::default();
        let click = ClickConfig::default();
        let voice = VoiceConfig::default();
        let viewport = Viewport::default();
        let engine = EngineConfig::default();
        Self {
            pinch_distance: hand.pinch_distance,
            tap_distance: hand.tap_distance,
            fist_distance: hand.fist_distance,
            swipe_distance: hand.swipe_distance,
            swipe_cooldown_ms: hand.swipe_cooldown_ms,
            ear_threshold: blink.ear_threshold,
            blink_consecutive_frames: blink.consecutive_frames,
            blink_cooldown_ms: blink.cooldown_ms,
            max_objects: objects.max_objects,
            hover_distance: objects.hover_distance,
            follow_smoothing: objects.follow_smoothing,
            tap_click_enabled: click.tap.enabled,
            tap_click_cooldown_ms: click.tap.cooldown_ms,
            blink_click_enabled: click.blink.enabled,
            blink_click_cooldown_ms: click.blink.cooldown_ms,
            wake_word: voice.wake_word,
            require_wake_word: voice.require_wake_word,
            listening_window_ms: voice.listening_window_ms,
            log_display_ms: engine.log_display_ms,
            input_queue_capacity: engine.input_queue_capacity,
            tick_interval_ms: engine.tick_interval_ms,
            viewport_width: viewport.width,
            viewport_height: viewport.height,
            spawn_seed: None,
        }
    }
}

impl AppSettings {
    pub fn normalize(&mut self) {
        self.pinch_distance = self.pinch_distance.clamp(0.005, 0.5);
        self.tap_distance = self.tap_distance.clamp(0.005, 0.5);
        self.fist_distance = self.fist_distance.clamp(0.01, 1.0);
        self.swipe_distance = self.swipe_distance.clamp(0.01, 1.0);
        self.swipe_cooldown_ms = self.swipe_cooldown_ms.clamp(50, 10_000);
        self.ear_threshold = self.ear_threshold.clamp(0.05, 0.6);
        self.blink_consecutive_frames = self.blink_consecutive_frames.clamp(1, 30);
        self.blink_cooldown_ms = self.blink_cooldown_ms.min(10_000);
        self.max_objects = self.max_objects.clamp(1, 64);
        self.hover_distance = self.hover_distance.clamp(0.1, 10.0);
        self.follow_smoothing = self.follow_smoothing.clamp(0.01, 1.0);
        self.tap_click_cooldown_ms = self.tap_click_cooldown_ms.min(10_000);
        self.blink_click_cooldown_ms = self.blink_click_cooldown_ms.min(10_000);
        self.wake_word = normalize_wake_word(&self.wake_word);
        self.listening_window_ms = self.listening_window_ms.clamp(500, 60_000);
        self.log_display_ms = self.log_display_ms.clamp(100, 60_000);
        self.input_queue_capacity = self.input_queue_capacity.clamp(1, 65_536);
        self.tick_interval_ms = self.tick_interval_ms.clamp(1, 1_000);
        self.viewport_width = self.viewport_width.clamp(0.1, 1_000.0);
        self.viewport_height = self.viewport_height.clamp(0.1, 1_000.0);
    }

    /// Map the flat settings file onto the engine's component configs.
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig {
            hand: HandThresholds {
                pinch_distance: self.pinch_distance,
                tap_distance: self.tap_distance,
                fist_distance: self.fist_distance,
                swipe_distance: self.swipe_distance,
                swipe_cooldown_ms: self.swipe_cooldown_ms,
                ..HandThresholds::default()
            },
            blink: BlinkConfig {
                ear_threshold: self.ear_threshold,
                consecutive_frames: self.blink_consecutive_frames,
                cooldown_ms: self.blink_cooldown_ms,
            },
            objects: ObjectConfig {
                max_objects: self.max_objects,
                hover_distance: self.hover_distance,
                follow_smoothing: self.follow_smoothing,
                ..ObjectConfig::default()
            },
            click: ClickConfig {
                tap: ClickMethod {
                    enabled: self.tap_click_enabled,
                    cooldown_ms: self.tap_click_cooldown_ms,
                },
                blink: ClickMethod {
                    enabled: self.blink_click_enabled,
                    cooldown_ms: self.blink_click_cooldown_ms,
                },
            },
            voice: VoiceConfig {
                wake_word: self.wake_word.clone(),
                listening_window_ms: self.listening_window_ms,
                require_wake_word: self.require_wake_word,
            },
            viewport: Viewport {
                width: self.viewport_width,
                height: self.viewport_height,
            },
            log_display_ms: self.log_display_ms,
            input_queue_capacity: self.input_queue_capacity,
            tick_interval_ms: self.tick_interval_ms,
            spawn_seed: self.spawn_seed,
        }
    }
}

pub fn normalize_wake_word(raw: &str) -> String {
    let word = raw.trim().to_lowercase();
    if word.is_empty() {
        "aura".into()
    } else {
        word
    }
}

pub fn default_settings_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Lattice Labs")
            .join("Aura")
            .join("settings.json")
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                std::env::var_os("HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
                    .join(".config")
            })
            .join("aura")
            .join("settings.json")
    }
}

/// Missing or unreadable files fall back to defaults.
pub fn load_settings(path: &Path) -> AppSettings {
    let mut settings = fs::read_to_string(path)
        .ok()
        .and_then(|raw| serde_json::from_str::<AppSettings>(&raw).ok())
        .unwrap_or_default();
    settings.normalize();
    settings
}

pub fn save_settings(path: &Path, settings: &AppSettings) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(settings).map_err(std::io::Error::other)?;
    fs::write(path, json)
}
