//! The voxel: minimal simulated particle of the organism

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::emotion::Emotion;
use crate::semantic::SemanticVector;
use crate::types::{CreatureId, VoxelId};

/// Energy at or below this counts as dead tissue
const MIN_LIVING_ENERGY: f32 = 0.01;

/// Trauma at or above this counts as dead tissue
const MAX_LIVING_TRAUMA: f32 = 0.99;

/// A single voxel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voxel {
    /// Assigned by the store on insertion
    pub id: VoxelId,
    pub position: Vec3,
    /// Life energy, kept within [0, 1] by callers
    pub energy: f32,
    pub emotion: Emotion,
    /// Tissue damage in [0, 1], heals over time
    pub trauma: f32,
    /// Fixed at creation, copied from the owning creature or organism
    pub semantic: SemanticVector,
    /// `None` for body voxels, otherwise the creature that spawned it
    pub entity: Option<CreatureId>,
    /// Store tick at insertion
    pub birth_tick: u64,
}

impl Voxel {
    pub fn new(position: Vec3) -> Self {
        Self {
            id: VoxelId::UNASSIGNED,
            position,
            energy: 1.0,
            emotion: Emotion::default(),
            trauma: 0.0,
            semantic: SemanticVector::ZERO,
            entity: None,
            birth_tick: 0,
        }
    }

    pub fn with_energy(mut self, energy: f32) -> Self {
        self.energy = energy;
        self
    }

    pub fn with_emotion(mut self, emotion: Emotion) -> Self {
        self.emotion = emotion;
        self
    }

    pub fn with_semantic(mut self, semantic: SemanticVector) -> Self {
        self.semantic = semantic;
        self
    }

    pub fn with_entity(mut self, entity: Option<CreatureId>) -> Self {
        self.entity = entity;
        self
    }

    /// Part of the organism body rather than a traveling creature
    pub fn is_body(&self) -> bool {
        self.entity.is_none()
    }

    pub fn is_alive(&self) -> bool {
        self.energy > MIN_LIVING_ENERGY && self.trauma < MAX_LIVING_TRAUMA
    }

    /// Radial breathing displacement around `center`
    ///
    /// Voxels near the rim move most; voxels within `min_distance` of the
    /// center have no defined direction and stay put.
    pub fn breathe(&mut self, center: Vec3, radius: f32, pulse: f32, min_distance: f32) {
        let offset = self.position - center;
        let distance = offset.length();
        if distance <= min_distance {
            return;
        }
        let direction = offset / distance;
        self.position += direction * pulse * (1.0 - distance / radius);
    }

    /// Reduce trauma by `amount`, never below zero
    pub fn heal(&mut self, amount: f32) {
        if self.trauma > 0.0 {
            self.trauma = (self.trauma - amount).max(0.0);
        }
    }

    /// Drift emotion toward `target` by `rate` (exponential blend)
    pub fn coevolve(&mut self, target: &Emotion, rate: f32) {
        self.emotion = self.emotion.blend(target, rate);
    }

    pub fn boost_energy(&mut self, amount: f32) {
        self.energy = (self.energy + amount).min(1.0);
    }

    pub fn injure(&mut self, amount: f32) {
        self.trauma = (self.trauma + amount).clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voxel_defaults() {
        let voxel = Voxel::new(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(voxel.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(voxel.energy, 1.0);
        assert_eq!(voxel.trauma, 0.0);
        assert!(voxel.is_body());
        assert!(voxel.is_alive());
        assert!(!voxel.id.is_assigned());
        assert!((voxel.emotion.sum() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_is_alive_thresholds() {
        let mut voxel = Voxel::new(Vec3::ZERO).with_energy(0.5);
        voxel.trauma = 0.3;
        assert!(voxel.is_alive());

        voxel.energy = 0.0;
        assert!(!voxel.is_alive());

        voxel.energy = 0.5;
        voxel.trauma = 0.995;
        assert!(!voxel.is_alive());
    }

    #[test]
    fn test_breathe_moves_radially() {
        let mut voxel = Voxel::new(Vec3::new(5.0, 0.0, 0.0));
        voxel.breathe(Vec3::ZERO, 10.0, 0.1, 0.1);
        // 0.1 * (1 - 5/10) = 0.05 outward along +x
        assert!((voxel.position.x - 5.05).abs() < 1e-6);
        assert_eq!(voxel.position.y, 0.0);
    }

    #[test]
    fn test_breathe_skips_center() {
        let mut voxel = Voxel::new(Vec3::new(0.05, 0.0, 0.0));
        voxel.breathe(Vec3::ZERO, 10.0, 0.1, 0.1);
        assert_eq!(voxel.position, Vec3::new(0.05, 0.0, 0.0));
    }

    #[test]
    fn test_heal_and_injure_clamp() {
        let mut voxel = Voxel::new(Vec3::ZERO);
        voxel.injure(0.7);
        voxel.injure(0.7);
        assert_eq!(voxel.trauma, 1.0);

        voxel.heal(0.4);
        assert!((voxel.trauma - 0.6).abs() < 1e-6);
        voxel.heal(5.0);
        assert_eq!(voxel.trauma, 0.0);
    }

    #[test]
    fn test_boost_energy_caps() {
        let mut voxel = Voxel::new(Vec3::ZERO).with_energy(0.9);
        voxel.boost_energy(0.2);
        assert_eq!(voxel.energy, 1.0);
    }

    #[test]
    fn test_coevolve_keeps_distribution() {
        let mut voxel = Voxel::new(Vec3::ZERO);
        let target = Emotion::new(0.1, 0.1, 0.1, 0.7);
        for _ in 0..100 {
            voxel.coevolve(&target, 0.01);
        }
        assert!((voxel.emotion.sum() - 1.0).abs() < 1e-5);
        assert!(voxel.emotion.peace() > 0.3);
    }
}
