//! `ObjectRegistry`: capacity-bounded object set with single-owner grab.
//!
//! Invariants held after every call:
//! - `len() <= config.max_objects`
//! - at most one object has `is_grabbed == true`
//! - grabbed objects keep their hover flag untouched by hover passes

use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tracing::{debug, info, warn};

use super::{InteractiveObject, ObjectConfig, ObjectId, SpawnRange, DEFAULT_OBJECT_COLOR};
use crate::error::{AuraError, Result};
use crate::geometry::Vec3;

pub struct ObjectRegistry {
    config: ObjectConfig,
    /// Insertion (spawn) order; grab scans in this order.
    objects: Vec<InteractiveObject>,
    next_id: u64,
    rng: StdRng,
}

impl ObjectRegistry {
    pub fn new(config: ObjectConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic placement for tests and replays.
    pub fn with_seed(config: ObjectConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ObjectConfig, rng: StdRng) -> Self {
        Self {
            config,
            objects: Vec::new(),
            next_id: 0,
            rng,
        }
    }

    pub fn config(&self) -> &ObjectConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> &[InteractiveObject] {
        &self.objects
    }

    pub fn get(&self, id: ObjectId) -> Option<&InteractiveObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    pub fn grabbed(&self) -> Option<&InteractiveObject> {
        self.objects.iter().find(|o| o.is_grabbed)
    }

    pub fn grabbed_id(&self) -> Option<ObjectId> {
        self.grabbed().map(|o| o.id)
    }

    /// Spawn one object.
    ///
    /// # Errors
    /// `AuraError::CapacityExceeded` when the registry is full; nothing changes.
    pub fn spawn(&mut self) -> Result<ObjectId> {
        let mut ids = self.spawn_many(1)?;
        ids.pop()
            .ok_or_else(|| AuraError::Other(anyhow::anyhow!("spawn produced no object")))
    }

    /// Spawn `quantity` objects, all or none.
    ///
    /// Each placement is sampled away from the objects already present
    /// (including those spawned earlier in the same batch).
    ///
    /// # Errors
    /// `AuraError::CapacityExceeded` if `len() + quantity > max_objects`.
    pub fn spawn_many(&mut self, quantity: usize) -> Result<Vec<ObjectId>> {
        let current = self.objects.len();
        if current + quantity > self.config.max_objects {
            warn!(
                current,
                requested = quantity,
                max = self.config.max_objects,
                "spawn rejected: capacity"
            );
            return Err(AuraError::CapacityExceeded {
                current,
                requested: quantity,
                max: self.config.max_objects,
            });
        }

        let mut ids = Vec::with_capacity(quantity);
        for _ in 0..quantity {
            let position = self.pick_position();
            let color = self
                .config
                .palette
                .choose(&mut self.rng)
                .cloned()
                .unwrap_or_else(|| DEFAULT_OBJECT_COLOR.to_string());
            let id = ObjectId(self.next_id);
            self.next_id += 1;

            info!(
                id = %id,
                x = format_args!("{:.2}", position.x),
                y = format_args!("{:.2}", position.y),
                z = format_args!("{:.2}", position.z),
                color = %color,
                "object spawned"
            );
            self.objects.push(InteractiveObject {
                id,
                position,
                color,
                is_hovered: false,
                is_grabbed: false,
            });
            ids.push(id);
        }
        Ok(ids)
    }

    /// Remove everything, including a grabbed object. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.objects.len();
        self.objects.clear();
        info!(removed, "all objects cleared");
        removed
    }

    /// Delete one object; `false` if `id` was not present.
    pub fn remove(&mut self, id: ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != id);
        let removed = self.objects.len() != before;
        if removed {
            info!(id = %id, "object removed");
        }
        removed
    }

    /// Recompute hover for every non-grabbed object. `None` (no hand) clears
    /// all hover flags.
    pub fn update_hover(&mut self, pointer: Option<Vec3>) {
        let threshold = self.config.hover_distance;
        match pointer {
            None => {
                for obj in &mut self.objects {
                    obj.is_hovered = false;
                }
            }
            Some(p) => {
                for obj in self.objects.iter_mut().filter(|o| !o.is_grabbed) {
                    obj.is_hovered = p.distance(&obj.position) < threshold;
                }
            }
        }
    }

    /// Grab the first hovered object in spawn order.
    ///
    /// No-op (returns `None`) without a pointer, with nothing hovered, or
    /// while another object is already grabbed.
    pub fn grab(&mut self, pointer: Option<Vec3>) -> Option<ObjectId> {
        pointer?;
        if let Some(held) = self.grabbed_id() {
            debug!(held = %held, "grab ignored: an object is already grabbed");
            return None;
        }
        let obj = self
            .objects
            .iter_mut()
            .find(|o| o.is_hovered && !o.is_grabbed)?;
        obj.is_grabbed = true;
        info!(id = %obj.id, "object grabbed");
        Some(obj.id)
    }

    /// Release whichever object is grabbed. Idempotent.
    pub fn release(&mut self) -> Option<ObjectId> {
        let obj = self.objects.iter_mut().find(|o| o.is_grabbed)?;
        obj.is_grabbed = false;
        info!(id = %obj.id, "object released");
        Some(obj.id)
    }

    /// Move the grabbed object toward `target` with exponential smoothing.
    /// Returns `false` when nothing is grabbed.
    pub fn update_grabbed_position(&mut self, target: Vec3) -> bool {
        let smoothing = self.config.follow_smoothing;
        match self.objects.iter_mut().find(|o| o.is_grabbed) {
            Some(obj) => {
                obj.position = obj.position.lerp(&target, smoothing);
                true
            }
            None => false,
        }
    }

    /// Recolour one object.
    ///
    /// # Errors
    /// `AuraError::UnknownObject` if `id` is not present.
    pub fn set_color(&mut self, id: ObjectId, color: &str) -> Result<()> {
        let obj = self
            .objects
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(AuraError::UnknownObject(id))?;
        obj.color = color.to_string();
        info!(id = %id, color, "object colour updated");
        Ok(())
    }

    /// Sample a spawn position, preferring one at least
    /// `min_spawn_separation` from every existing object.
    fn pick_position(&mut self) -> Vec3 {
        let bounds = self.config.spawn_bounds;
        let attempts = self.config.spawn_attempts.max(1);
        let mut best = Vec3::ZERO;
        let mut best_gap = f32::NEG_INFINITY;

        for _ in 0..attempts {
            let candidate = Vec3::new(
                sample(&mut self.rng, bounds.x),
                sample(&mut self.rng, bounds.y),
                sample(&mut self.rng, bounds.z),
            );
            let gap = self
                .objects
                .iter()
                .map(|o| o.position.distance(&candidate))
                .fold(f32::INFINITY, f32::min);
            if gap >= self.config.min_spawn_separation {
                return candidate;
            }
            if gap > best_gap {
                best_gap = gap;
                best = candidate;
            }
        }
        best
    }
}

fn sample(rng: &mut StdRng, range: SpawnRange) -> f32 {
    if range.max > range.min {
        rng.gen_range(range.min..range.max)
    } else {
        range.min
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::SpawnBounds;

    fn registry() -> ObjectRegistry {
        ObjectRegistry::with_seed(ObjectConfig::default(), 7)
    }

    fn grabbed_count(reg: &ObjectRegistry) -> usize {
        reg.objects().iter().filter(|o| o.is_grabbed).count()
    }

    #[test]
    fn spawn_within_bounds_with_palette_colour() {
        let mut reg = registry();
        let id = reg.spawn().unwrap();
        let obj = reg.get(id).unwrap();
        let b = SpawnBounds::default();
        assert!(obj.position.x >= b.x.min && obj.position.x < b.x.max);
        assert!(obj.position.y >= b.y.min && obj.position.y < b.y.max);
        assert!(obj.position.z >= b.z.min && obj.position.z < b.z.max);
        assert!(reg.config().palette.contains(&obj.color));
        assert!(!obj.is_hovered && !obj.is_grabbed);
    }

    #[test]
    fn ids_are_monotonic_even_after_removal() {
        let mut reg = registry();
        let a = reg.spawn().unwrap();
        assert!(reg.remove(a));
        let b = reg.spawn().unwrap();
        assert!(b > a);
    }

    #[test]
    fn fourth_spawn_is_rejected() {
        let mut reg = registry();
        reg.spawn_many(3).unwrap();
        let err = reg.spawn().unwrap_err();
        assert!(matches!(
            err,
            AuraError::CapacityExceeded {
                current: 3,
                requested: 1,
                max: 3
            }
        ));
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn batch_over_capacity_spawns_nothing() {
        let mut reg = registry();
        reg.spawn_many(2).unwrap();
        assert!(reg.spawn_many(2).is_err());
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn clear_removes_grabbed_objects_too() {
        let mut reg = registry();
        let id = reg.spawn().unwrap();
        let pos = reg.get(id).unwrap().position;
        reg.update_hover(Some(pos));
        reg.grab(Some(pos));
        assert_eq!(reg.clear(), 1);
        assert!(reg.is_empty());
        assert!(reg.grabbed().is_none());
    }

    #[test]
    fn remove_absent_id_is_noop() {
        let mut reg = registry();
        reg.spawn().unwrap();
        assert!(!reg.remove(ObjectId(99)));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn hover_uses_threshold_and_clears_without_pointer() {
        let mut reg = registry();
        let id = reg.spawn().unwrap();
        let pos = reg.get(id).unwrap().position;

        reg.update_hover(Some(Vec3::new(pos.x + 1.0, pos.y, pos.z)));
        assert!(reg.get(id).unwrap().is_hovered);

        reg.update_hover(Some(Vec3::new(pos.x + 1.6, pos.y, pos.z)));
        assert!(!reg.get(id).unwrap().is_hovered);

        reg.update_hover(Some(pos));
        reg.update_hover(None);
        assert!(!reg.get(id).unwrap().is_hovered);
    }

    #[test]
    fn grab_takes_first_hovered_only() {
        let mut reg = registry();
        let ids = reg.spawn_many(3).unwrap();
        // Force every object under the pointer.
        for obj in reg.objects.iter_mut() {
            obj.position = Vec3::ZERO;
        }
        reg.update_hover(Some(Vec3::ZERO));
        assert_eq!(reg.grab(Some(Vec3::ZERO)), Some(ids[0]));
        assert_eq!(grabbed_count(&reg), 1);

        // A second grab while holding is a no-op.
        assert_eq!(reg.grab(Some(Vec3::ZERO)), None);
        assert_eq!(grabbed_count(&reg), 1);
    }

    #[test]
    fn grab_without_hover_or_pointer_is_noop() {
        let mut reg = registry();
        reg.spawn().unwrap();
        assert_eq!(reg.grab(Some(Vec3::new(100.0, 100.0, 0.0))), None);
        assert_eq!(reg.grab(None), None);
        assert_eq!(grabbed_count(&reg), 0);
    }

    #[test]
    fn release_is_idempotent() {
        let mut reg = registry();
        reg.spawn_many(2).unwrap();
        let before: Vec<_> = reg.objects().to_vec();
        assert_eq!(reg.release(), None);
        assert_eq!(reg.objects(), before.as_slice());
    }

    #[test]
    fn grabbed_object_keeps_hover_and_follows_smoothly() {
        let mut reg = registry();
        let id = reg.spawn().unwrap();
        for obj in reg.objects.iter_mut() {
            obj.position = Vec3::ZERO;
        }
        reg.update_hover(Some(Vec3::ZERO));
        reg.grab(Some(Vec3::ZERO));

        // Pointer far away: grabbed object is excluded from the hover pass.
        reg.update_hover(Some(Vec3::new(50.0, 0.0, 0.0)));
        assert!(reg.get(id).unwrap().is_hovered);

        assert!(reg.update_grabbed_position(Vec3::new(10.0, 0.0, 0.0)));
        let x = reg.get(id).unwrap().position.x;
        assert!((x - 3.0).abs() < 1e-5, "x={x}");
    }

    #[test]
    fn set_color_requires_known_id() {
        let mut reg = registry();
        let id = reg.spawn().unwrap();
        reg.set_color(id, "#ffd700").unwrap();
        assert_eq!(reg.get(id).unwrap().color, "#ffd700");
        assert!(matches!(
            reg.set_color(ObjectId(42), "#ffffff"),
            Err(AuraError::UnknownObject(ObjectId(42)))
        ));
    }

    #[test]
    fn batch_spawns_are_spread_apart() {
        let mut reg = registry();
        reg.spawn_many(3).unwrap();
        let objs = reg.objects();
        for i in 0..objs.len() {
            for j in (i + 1)..objs.len() {
                assert!(objs[i].position.distance(&objs[j].position) >= 1.0);
            }
        }
    }
}
