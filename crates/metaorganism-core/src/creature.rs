//! File creatures
//!
//! A creature is a ball of voxels grown from the bytes of one input file. It
//! travels toward the organism and, on arrival, is either integrated into the
//! body or rejected.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use metaorganism_voxel::{CreatureId, Emotion, SemanticVector, Voxel, semantic_fingerprint};

use crate::config::CreatureParams;
use crate::rng_trait::OrganismRng;

const GOLDEN_RATIO: f32 = 1.618_034;

/// Lifecycle of a creature; both outcomes are terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreatureFate {
    #[default]
    Traveling,
    Integrated,
    Rejected,
}

impl CreatureFate {
    pub fn is_terminal(self) -> bool {
        !matches!(self, CreatureFate::Traveling)
    }
}

/// Voxel count for a file of `size` bytes
///
/// `floor(log2(size + 1) * voxels_per_bit)`, clamped into the configured range.
pub fn voxel_count_for(size: usize, params: &CreatureParams) -> usize {
    let raw = ((size as f64 + 1.0).log2() * params.voxels_per_bit as f64).floor() as usize;
    raw.clamp(params.min_voxels, params.max_voxels)
}

/// Radius of a ball holding `count` voxels, scaled by `scale`
pub fn sphere_radius(count: usize, scale: f32) -> f32 {
    (count as f32 / (4.0 / 3.0 * std::f32::consts::PI)).cbrt() * scale
}

/// Unit direction of the `i`-th of `n` Fibonacci lattice points
pub(crate) fn fibonacci_direction(i: usize, n: usize) -> (f32, f32, Vec3) {
    let theta = std::f32::consts::TAU * i as f32 / GOLDEN_RATIO;
    let phi = (1.0 - 2.0 * (i as f32 + 0.5) / n as f32).clamp(-1.0, 1.0).acos();
    let direction = Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    );
    (theta, phi, direction)
}

/// A transient voxel cluster grown from one file
#[derive(Debug, Clone)]
pub struct FileCreature {
    pub id: CreatureId,
    /// Opaque origin label, usually a path
    pub label: String,
    pub semantic: SemanticVector,
    pub base_emotion: Emotion,
    pub spawn_position: Vec3,
    /// Tracked center, moved together with the voxels
    pub position: Vec3,
    pub voxels: Vec<Voxel>,
    pub fate: CreatureFate,
}

impl FileCreature {
    /// Grow a creature from raw file bytes
    pub fn from_bytes<R: OrganismRng + ?Sized>(
        label: impl Into<String>,
        bytes: &[u8],
        spawn: Vec3,
        voxel_count: usize,
        params: &CreatureParams,
        rng: &mut R,
    ) -> Self {
        let semantic = semantic_fingerprint(bytes);
        let base_emotion = Emotion::from_semantic(&semantic);
        Self::from_signature(label, semantic, base_emotion, spawn, voxel_count, params, rng)
    }

    /// Grow a creature with an explicit semantic and emotional signature
    pub fn from_signature<R: OrganismRng + ?Sized>(
        label: impl Into<String>,
        semantic: SemanticVector,
        base_emotion: Emotion,
        spawn: Vec3,
        voxel_count: usize,
        params: &CreatureParams,
        rng: &mut R,
    ) -> Self {
        let id = CreatureId::new();
        let voxels = grow_voxels(
            id,
            &semantic,
            &base_emotion,
            spawn,
            voxel_count,
            params,
            rng,
        );
        Self {
            id,
            label: label.into(),
            semantic,
            base_emotion,
            spawn_position: spawn,
            position: spawn,
            voxels,
            fate: CreatureFate::Traveling,
        }
    }

    /// Still traveling (neither integrated nor rejected)
    pub fn is_alive(&self) -> bool {
        self.fate == CreatureFate::Traveling
    }

    pub fn is_integrated(&self) -> bool {
        self.fate == CreatureFate::Integrated
    }

    pub fn is_rejected(&self) -> bool {
        self.fate == CreatureFate::Rejected
    }

    /// Step toward `target` by at most `speed`
    ///
    /// Returns `true` without moving once the remaining distance is below
    /// `arrival_distance`. A single large step may overshoot the target.
    pub fn move_towards(&mut self, target: Vec3, speed: f32, arrival_distance: f32) -> bool {
        let offset = target - self.position;
        let distance = offset.length();
        if distance < arrival_distance {
            return true;
        }

        let movement = offset / distance * speed.min(distance);
        for voxel in &mut self.voxels {
            voxel.position += movement;
        }
        self.position += movement;
        false
    }

    /// Shift the whole creature so its tracked center sits at `position`
    pub fn teleport(&mut self, position: Vec3) {
        let movement = position - self.position;
        for voxel in &mut self.voxels {
            voxel.position += movement;
        }
        self.position = position;
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.voxels.iter().map(|v| v.position).collect()
    }

    pub fn voxel_count(&self) -> usize {
        self.voxels.len()
    }
}

fn grow_voxels<R: OrganismRng + ?Sized>(
    id: CreatureId,
    semantic: &SemanticVector,
    base_emotion: &Emotion,
    center: Vec3,
    count: usize,
    params: &CreatureParams,
    rng: &mut R,
) -> Vec<Voxel> {
    let radius = sphere_radius(count, params.radius_scale);

    (0..count)
        .map(|i| {
            let (_, _, direction) = fibonacci_direction(i, count);
            // Cube-root radius fills the volume instead of the surface
            let r = radius * rng.gen_f32().cbrt();
            let emotion = base_emotion
                .offset_by(rng.gen_gaussian_array(params.emotion_jitter))
                .clamped(0.05, 1.0)
                .normalized();

            Voxel::new(center + direction * r)
                .with_energy(rng.gen_range_f32(0.8, 1.0))
                .with_emotion(emotion)
                .with_semantic(*semantic)
                .with_entity(Some(id))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    fn rng() -> Xoshiro256StarStar {
        Xoshiro256StarStar::seed_from_u64(42)
    }

    #[test]
    fn test_voxel_count_for_clamps() {
        let params = CreatureParams::default();
        assert_eq!(voxel_count_for(0, &params), 500);
        assert_eq!(voxel_count_for(10, &params), 500);
        // log2(1025) * 100 = 1000.14
        assert_eq!(voxel_count_for(1024, &params), 1000);
        assert_eq!(voxel_count_for(1 << 30, &params), 2000);
    }

    #[test]
    fn test_from_bytes_generates_voxels() {
        let params = CreatureParams::default();
        let spawn = Vec3::new(30.0, 0.0, 0.0);
        let creature =
            FileCreature::from_bytes("test.txt", b"hello", spawn, 600, &params, &mut rng());

        assert_eq!(creature.voxel_count(), 600);
        assert!(creature.is_alive());
        assert_eq!(creature.position, spawn);
        assert_eq!(creature.semantic, semantic_fingerprint(b"hello"));

        let radius = sphere_radius(600, params.radius_scale);
        for voxel in &creature.voxels {
            assert!(voxel.position.distance(spawn) <= radius + 1e-3);
            assert!((0.8..=1.0).contains(&voxel.energy));
            assert_eq!(voxel.entity, Some(creature.id));
            assert_eq!(voxel.semantic, creature.semantic);
            assert!((voxel.emotion.sum() - 1.0).abs() < 1e-5);
            assert!(voxel.emotion.to_array().iter().all(|v| *v > 0.0));
        }
    }

    #[test]
    fn test_creature_ids_are_unique() {
        let params = CreatureParams::default();
        let a = FileCreature::from_bytes("a", b"a", Vec3::ZERO, 10, &params, &mut rng());
        let b = FileCreature::from_bytes("b", b"b", Vec3::ZERO, 10, &params, &mut rng());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_move_towards_steps_and_arrives() {
        let params = CreatureParams::default();
        let mut creature =
            FileCreature::from_bytes("walker", b"data", Vec3::new(10.0, 0.0, 0.0), 20, &params, &mut rng());
        let first_voxel = creature.voxels[0].position;

        assert!(!creature.move_towards(Vec3::ZERO, 4.0, 1.0));
        assert!((creature.position.x - 6.0).abs() < 1e-5);
        assert!((creature.voxels[0].position - (first_voxel - Vec3::new(4.0, 0.0, 0.0))).length() < 1e-5);

        // Step is capped at the remaining distance
        assert!(!creature.move_towards(Vec3::ZERO, 100.0, 1.0));
        assert!(creature.position.length() < 1e-5);

        let before = creature.position;
        assert!(creature.move_towards(Vec3::ZERO, 100.0, 1.0));
        assert_eq!(creature.position, before);
    }

    #[test]
    fn test_teleport_moves_voxels() {
        let params = CreatureParams::default();
        let mut creature =
            FileCreature::from_bytes("jumper", b"data", Vec3::new(10.0, 0.0, 0.0), 20, &params, &mut rng());
        let offset = creature.voxels[3].position - creature.position;

        creature.teleport(Vec3::ZERO);
        assert_eq!(creature.position, Vec3::ZERO);
        assert!((creature.voxels[3].position - offset).length() < 1e-5);
    }

    #[test]
    fn test_fate_is_terminal() {
        assert!(!CreatureFate::Traveling.is_terminal());
        assert!(CreatureFate::Integrated.is_terminal());
        assert!(CreatureFate::Rejected.is_terminal());
    }
}
