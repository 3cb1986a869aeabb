//! Minimal 3D vector math shared by landmarks and world-space objects.

use serde::{Deserialize, Serialize};

/// A point in either normalized landmark space (0–1 per axis, z relative
/// depth) or world space, depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Full 3D Euclidean distance.
    pub fn distance(&self, other: &Vec3) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Distance in the image plane, ignoring z.
    ///
    /// Tracker depth is relative and noisy, so hand and eye geometry is
    /// measured on x/y only.
    pub fn planar_distance(&self, other: &Vec3) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn midpoint(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            (self.x + other.x) / 2.0,
            (self.y + other.y) / 2.0,
            (self.z + other.z) / 2.0,
        )
    }

    /// Linear interpolation toward `target` by factor `t` in [0, 1].
    pub fn lerp(&self, target: &Vec3, t: f32) -> Vec3 {
        Vec3::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
            self.z + (target.z - self.z) * t,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn planar_distance_ignores_depth() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(0.3, 0.4, 9.0);
        assert_relative_eq!(a.planar_distance(&b), 0.5, epsilon = 1e-6);
        assert!(a.distance(&b) > 9.0);
    }

    #[test]
    fn lerp_moves_fraction_of_the_way() {
        let a = Vec3::new(0.0, 0.0, 0.0);
        let b = Vec3::new(10.0, -10.0, 1.0);
        let c = a.lerp(&b, 0.3);
        assert_relative_eq!(c.x, 3.0, epsilon = 1e-6);
        assert_relative_eq!(c.y, -3.0, epsilon = 1e-6);
        assert_relative_eq!(c.z, 0.3, epsilon = 1e-6);
    }

    #[test]
    fn midpoint_is_symmetric() {
        let a = Vec3::new(0.2, 0.4, 0.0);
        let b = Vec3::new(0.6, 0.8, 0.0);
        assert_eq!(a.midpoint(&b), b.midpoint(&a));
        assert_relative_eq!(a.midpoint(&b).x, 0.4, epsilon = 1e-6);
    }
}
