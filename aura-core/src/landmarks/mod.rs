//! Landmark sets delivered by the external hand and face trackers.
//!
//! Coordinates are normalized to 0–1 on x/y (z is relative depth). The core
//! never produces landmarks; it only reads the latest frame a tracker pushed.

pub mod frame;

pub use frame::{FaceFrame, HandFrame, HandLandmarks};

use crate::geometry::Vec3;

/// A single tracked point. Immutable once a frame is delivered.
pub type Landmark = Vec3;

/// Points per hand in the 21-landmark hand model.
pub const HAND_LANDMARK_COUNT: usize = 21;

/// Minimum points in a face mesh (the refined mesh adds iris points past this).
pub const FACE_LANDMARK_MIN: usize = 468;

/// Indices into a 21-point hand landmark set.
pub mod hand_index {
    pub const WRIST: usize = 0;
    pub const THUMB_TIP: usize = 4;
    /// Index finger base knuckle.
    pub const INDEX_MCP: usize = 5;
    /// Index finger middle joint.
    pub const INDEX_PIP: usize = 6;
    /// Index finger upper joint.
    pub const INDEX_DIP: usize = 7;
    pub const INDEX_TIP: usize = 8;
}

/// Six-point eye outlines in the face mesh, ordered
/// `[outer corner, top-left, top-right, inner corner, bottom-right, bottom-left]`.
pub mod face_index {
    pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];
    pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];
}
