//! Identifier types for voxels and creatures

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for a file creature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u64);

static NEXT_CREATURE_ID: AtomicU64 = AtomicU64::new(1);

impl CreatureId {
    /// Generate a new unique creature ID
    pub fn new() -> Self {
        CreatureId(NEXT_CREATURE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value (useful for logging/serialization)
    pub fn raw(&self) -> u64 {
        self.0
    }

    /// Create a CreatureId from a raw u64 (for deserialization)
    pub fn from_raw(id: u64) -> Self {
        // Keep freshly generated IDs above anything restored
        NEXT_CREATURE_ID.fetch_max(id + 1, Ordering::Relaxed);
        CreatureId(id)
    }
}

impl Default for CreatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CreatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Creature({})", self.0)
    }
}

/// Identifier assigned to a voxel by the store on insertion
///
/// IDs are monotonic per store; a voxel that was never stored carries
/// [`VoxelId::UNASSIGNED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoxelId(u64);

impl VoxelId {
    pub const UNASSIGNED: VoxelId = VoxelId(u64::MAX);

    pub fn from_raw(id: u64) -> Self {
        VoxelId(id)
    }

    pub fn raw(&self) -> u64 {
        self.0
    }

    pub fn is_assigned(&self) -> bool {
        *self != Self::UNASSIGNED
    }
}

impl Default for VoxelId {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

impl std::fmt::Display for VoxelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_assigned() {
            write!(f, "Voxel({})", self.0)
        } else {
            write!(f, "Voxel(unassigned)")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creature_ids_are_unique() {
        let a = CreatureId::new();
        let b = CreatureId::new();
        assert_ne!(a, b);
        assert!(b.raw() > a.raw());
    }

    #[test]
    fn test_creature_id_from_raw_bumps_counter() {
        let restored = CreatureId::from_raw(1_000_000);
        assert_eq!(restored.raw(), 1_000_000);

        let next = CreatureId::new();
        assert!(next.raw() > 1_000_000);
    }

    #[test]
    fn test_voxel_id_default_is_unassigned() {
        let id = VoxelId::default();
        assert!(!id.is_assigned());
        assert_eq!(id.to_string(), "Voxel(unassigned)");

        let id = VoxelId::from_raw(7);
        assert!(id.is_assigned());
        assert_eq!(id.raw(), 7);
        assert_eq!(id.to_string(), "Voxel(7)");
    }
}
