//! Organism state snapshot

use serde::{Deserialize, Serialize};

use metaorganism_voxel::Mood;

/// Derived organism state, rebuilt from scratch every tick
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OrganismState {
    pub tick: u64,
    /// `(mean energy + (1 - mean trauma)) / 2`, 0 for an empty body
    pub health: f32,
    pub mood: Mood,
    /// Value of the dominant global emotion channel
    pub mood_intensity: f32,
    pub total_voxels: usize,
    pub alive_voxels: usize,
    pub memory_saved_percent: f32,
    /// Creatures still traveling
    pub creature_count: usize,
    pub integration_count: u64,
    pub trauma_count: u64,
    /// Human-readable description of the most recent event
    pub last_event: String,
}

impl std::fmt::Display for OrganismState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "tick {} | health {:.1}% | mood {} ({:.2}) | voxels {}/{} | creatures {} | integrated {} | traumas {}",
            self.tick,
            self.health * 100.0,
            self.mood,
            self.mood_intensity,
            self.alive_voxels,
            self.total_voxels,
            self.creature_count,
            self.integration_count,
            self.trauma_count,
        )
    }
}
