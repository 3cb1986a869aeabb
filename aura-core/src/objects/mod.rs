//! Spatial objects and the exclusive grab protocol.
//!
//! `ObjectRegistry` owns the objects and enforces the capacity bound and the
//! single-grab invariant. `InteractionController` drives hover / grab /
//! release from the per-frame `HandState`.

pub mod interaction;
pub mod registry;

pub use interaction::{InteractionController, InteractionEvent, Viewport};
pub use registry::ObjectRegistry;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::Vec3;

/// Colour used when the spawn palette is empty.
pub const DEFAULT_OBJECT_COLOR: &str = "#ffffff";

/// Unique, monotonically assigned object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj-{}", self.0)
    }
}

/// One manipulable object in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractiveObject {
    pub id: ObjectId,
    pub position: Vec3,
    /// Display colour token (`#rrggbb`).
    pub color: String,
    pub is_hovered: bool,
    pub is_grabbed: bool,
}

/// Inclusive-exclusive sampling range for one spawn axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnRange {
    pub min: f32,
    pub max: f32,
}

impl SpawnRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// World-space box new objects are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnBounds {
    pub x: SpawnRange,
    pub y: SpawnRange,
    pub z: SpawnRange,
}

impl Default for SpawnBounds {
    fn default() -> Self {
        // Same depth band as the hand plane so hover distances stay reachable.
        Self {
            x: SpawnRange::new(-3.0, 3.0),
            y: SpawnRange::new(-2.0, 2.0),
            z: SpawnRange::new(-1.0, -0.5),
        }
    }
}

/// Registry limits and interaction tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct ObjectConfig {
    pub max_objects: usize,
    /// Pointer-to-object distance (world units) below which an object is hovered.
    pub hover_distance: f32,
    /// Lerp factor applied per frame when a grabbed object follows the hand.
    pub follow_smoothing: f32,
    pub spawn_bounds: SpawnBounds,
    /// Colours picked at random for new objects.
    pub palette: Vec<String>,
    /// Preferred minimum distance between a new object and existing ones.
    pub min_spawn_separation: f32,
    /// Position samples tried before settling for the best-separated one.
    pub spawn_attempts: u32,
}

impl Default for ObjectConfig {
    fn default() -> Self {
        Self {
            max_objects: 3,
            hover_distance: 1.5,
            follow_smoothing: 0.3,
            spawn_bounds: SpawnBounds::default(),
            palette: ["#ff2a2a", "#2aff2a", "#2a2aff", "#22d3ee", "#bd00ff", "#ff7f00"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            min_spawn_separation: 1.0,
            spawn_attempts: 8,
        }
    }
}
