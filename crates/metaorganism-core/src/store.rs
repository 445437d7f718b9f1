//! Sparse voxel storage
//!
//! Voxels live in an arena of slots; a hash map from quantized grid cell to
//! slot index provides spatial lookup. At most one voxel occupies a cell, and
//! what happens on a collision is an explicit [`CollisionPolicy`].
//!
//! The grid cell of a voxel is its *home cell*, fixed at insertion. Later
//! position changes (breathing, creature travel before insertion) do not
//! re-key it; handle-based removal always removes the right voxel.

use ahash::AHashMap;
use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use metaorganism_voxel::{Voxel, VoxelId};

/// Axis-aligned neighbor offsets (+X, -X, +Y, -Y, +Z, -Z)
const NEIGHBOR_OFFSETS: [IVec3; 6] = [
    IVec3::new(1, 0, 0),
    IVec3::new(-1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(0, -1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(0, 0, -1),
];

/// What `add` does when the target cell is already occupied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CollisionPolicy {
    /// The incoming voxel replaces the occupant (lossy insert)
    #[default]
    Overwrite,
    /// The occupant stays; the incoming voxel is discarded
    KeepExisting,
}

/// Stable reference to an occupied slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VoxelHandle(usize);

#[derive(Debug, Clone)]
struct Slot {
    cell: IVec3,
    voxel: Voxel,
}

/// Aggregate numbers over the stored voxels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreStatistics {
    pub total_voxels: usize,
    pub alive_voxels: usize,
    pub mean_energy: f32,
    pub mean_trauma: f32,
    /// Savings versus a dense grid covering the bounding box, in percent
    pub memory_saved_percent: f32,
}

/// Hash-indexed sparse voxel grid
#[derive(Debug, Clone)]
pub struct SparseVoxelStore {
    resolution: f32,
    policy: CollisionPolicy,
    cells: AHashMap<IVec3, usize>,
    slots: Vec<Option<Slot>>,
    free: Vec<usize>,
    next_id: u64,
    tick: u64,
    collisions: u64,
}

impl SparseVoxelStore {
    /// Create an empty store
    ///
    /// # Panics
    /// Panics if `resolution` is not strictly positive.
    pub fn new(resolution: f32, policy: CollisionPolicy) -> Self {
        assert!(
            resolution > 0.0,
            "store resolution must be positive, got {}",
            resolution
        );
        Self {
            resolution,
            policy,
            cells: AHashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            next_id: 0,
            tick: 0,
            collisions: 0,
        }
    }

    pub fn resolution(&self) -> f32 {
        self.resolution
    }

    pub fn policy(&self) -> CollisionPolicy {
        self.policy
    }

    /// Quantize a world position to its grid cell
    pub fn quantize(&self, position: Vec3) -> IVec3 {
        (position / self.resolution).floor().as_ivec3()
    }

    /// Insert a voxel at its quantized cell
    ///
    /// Assigns a monotonic id and the current tick as birth tick. Returns the
    /// id of the voxel occupying the cell afterwards: the new voxel under
    /// [`CollisionPolicy::Overwrite`], the previous occupant when an occupied
    /// cell is kept under [`CollisionPolicy::KeepExisting`].
    pub fn add(&mut self, mut voxel: Voxel) -> VoxelId {
        let cell = self.quantize(voxel.position);
        voxel.id = VoxelId::from_raw(self.next_id);
        voxel.birth_tick = self.tick;
        self.next_id += 1;

        let occupant = self
            .cells
            .get(&cell)
            .copied()
            .and_then(|index| self.slots.get_mut(index))
            .and_then(|slot| slot.as_mut());
        if let Some(slot) = occupant {
            self.collisions += 1;
            return match self.policy {
                CollisionPolicy::Overwrite => {
                    log::trace!("Cell {:?} overwritten by {}", cell, voxel.id);
                    slot.voxel = voxel;
                    slot.voxel.id
                }
                CollisionPolicy::KeepExisting => slot.voxel.id,
            };
        }

        let id = voxel.id;
        let slot = Slot { cell, voxel };
        let index = match self.free.pop() {
            Some(index) => {
                self.slots[index] = Some(slot);
                index
            }
            None => {
                self.slots.push(Some(slot));
                self.slots.len() - 1
            }
        };
        self.cells.insert(cell, index);
        id
    }

    /// Voxel whose home cell contains `position`
    pub fn get(&self, position: Vec3) -> Option<&Voxel> {
        let index = *self.cells.get(&self.quantize(position))?;
        self.slots[index].as_ref().map(|slot| &slot.voxel)
    }

    pub fn get_mut(&mut self, position: Vec3) -> Option<&mut Voxel> {
        let index = *self.cells.get(&self.quantize(position))?;
        self.slots[index].as_mut().map(|slot| &mut slot.voxel)
    }

    /// Remove the voxel at the cell containing `position`
    pub fn remove(&mut self, position: Vec3) -> bool {
        let cell = self.quantize(position);
        match self.cells.get(&cell) {
            Some(&index) => self.remove_handle(VoxelHandle(index)).is_some(),
            None => false,
        }
    }

    pub fn get_handle(&self, handle: VoxelHandle) -> Option<&Voxel> {
        self.slots
            .get(handle.0)
            .and_then(|slot| slot.as_ref())
            .map(|slot| &slot.voxel)
    }

    pub fn get_handle_mut(&mut self, handle: VoxelHandle) -> Option<&mut Voxel> {
        self.slots
            .get_mut(handle.0)
            .and_then(|slot| slot.as_mut())
            .map(|slot| &mut slot.voxel)
    }

    /// Remove the voxel behind `handle`, freeing its cell
    pub fn remove_handle(&mut self, handle: VoxelHandle) -> Option<Voxel> {
        let slot = self.slots.get_mut(handle.0)?.take()?;
        self.cells.remove(&slot.cell);
        self.free.push(handle.0);
        Some(slot.voxel)
    }

    /// Occupied cells adjacent to the voxel's current position (up to 6)
    pub fn neighbors(&self, voxel: &Voxel) -> SmallVec<[&Voxel; 6]> {
        let mut neighbors = SmallVec::new();
        for offset in NEIGHBOR_OFFSETS {
            let position = voxel.position + offset.as_vec3() * self.resolution;
            if let Some(neighbor) = self.get(position) {
                neighbors.push(neighbor);
            }
        }
        neighbors
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of inserts that landed on an occupied cell
    pub fn collisions(&self) -> u64 {
        self.collisions
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_tick(&mut self) {
        self.tick += 1;
    }

    /// Iterate over all voxels in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = &Voxel> {
        self.slots.iter().flatten().map(|slot| &slot.voxel)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Voxel> {
        self.slots.iter_mut().flatten().map(|slot| &mut slot.voxel)
    }

    /// Iterate over `(handle, voxel)` pairs
    pub fn handles(&self) -> impl Iterator<Item = (VoxelHandle, &Voxel)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|s| (VoxelHandle(index), &s.voxel)))
    }

    /// Apply `f` to every voxel, fanned out over the rayon pool
    #[cfg(not(target_arch = "wasm32"))]
    pub fn par_for_each_mut<F>(&mut self, f: F)
    where
        F: Fn(&mut Voxel) + Sync + Send,
    {
        use rayon::prelude::*;

        self.slots
            .par_iter_mut()
            .flatten()
            .for_each(|slot| f(&mut slot.voxel));
    }

    /// Apply `f` to every voxel (single-threaded fallback)
    #[cfg(target_arch = "wasm32")]
    pub fn par_for_each_mut<F>(&mut self, f: F)
    where
        F: Fn(&mut Voxel) + Sync + Send,
    {
        self.iter_mut().for_each(f);
    }

    pub fn positions(&self) -> Vec<Vec3> {
        self.iter().map(|v| v.position).collect()
    }

    /// Totals, means and memory savings in one pass
    pub fn statistics(&self) -> StoreStatistics {
        if self.is_empty() {
            return StoreStatistics {
                memory_saved_percent: 100.0,
                ..StoreStatistics::default()
            };
        }

        let mut alive = 0usize;
        let mut energy = 0.0f64;
        let mut trauma = 0.0f64;
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for voxel in self.iter() {
            if voxel.is_alive() {
                alive += 1;
            }
            energy += voxel.energy as f64;
            trauma += voxel.trauma as f64;
            min = min.min(voxel.position);
            max = max.max(voxel.position);
        }

        let total = self.len();
        let extent = (max - min) / self.resolution + Vec3::ONE;
        let dense = (extent.x as f64 * extent.y as f64 * extent.z as f64).max(1.0);
        let saved = (100.0 * (1.0 - total as f64 / dense)).max(0.0);

        StoreStatistics {
            total_voxels: total,
            alive_voxels: alive,
            mean_energy: (energy / total as f64) as f32,
            mean_trauma: (trauma / total as f64) as f32,
            memory_saved_percent: saved as f32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SparseVoxelStore {
        SparseVoxelStore::new(1.0, CollisionPolicy::Overwrite)
    }

    #[test]
    fn test_add_get_remove() {
        let mut store = store();

        let id1 = store.add(Voxel::new(Vec3::new(0.0, 0.0, 0.0)));
        let id2 = store.add(Voxel::new(Vec3::new(1.0, 0.0, 0.0)));
        let id3 = store.add(Voxel::new(Vec3::new(0.0, 1.0, 0.0)));

        assert_eq!(store.len(), 3);
        assert!(id1 < id2 && id2 < id3);

        let retrieved = store.get(Vec3::new(0.2, 0.7, 0.9)).unwrap();
        assert_eq!(retrieved.id, id1);

        assert!(store.remove(Vec3::new(1.0, 0.0, 0.0)));
        assert!(!store.remove(Vec3::new(1.0, 0.0, 0.0)));
        assert_eq!(store.len(), 2);
        assert!(store.get(Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_quantize_floors_negative_coordinates() {
        let store = SparseVoxelStore::new(2.0, CollisionPolicy::Overwrite);
        assert_eq!(store.quantize(Vec3::new(-0.5, 1.9, 2.0)), IVec3::new(-1, 0, 1));
        assert_eq!(store.quantize(Vec3::new(-2.0, -2.1, 0.0)), IVec3::new(-1, -2, 0));
    }

    #[test]
    fn test_collision_overwrite_replaces_occupant() {
        let mut store = store();

        let first = store.add(Voxel::new(Vec3::new(0.1, 0.1, 0.1)).with_energy(0.2));
        let second = store.add(Voxel::new(Vec3::new(0.9, 0.9, 0.9)).with_energy(0.7));

        assert_ne!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.collisions(), 1);

        let occupant = store.get(Vec3::new(0.5, 0.5, 0.5)).unwrap();
        assert_eq!(occupant.id, second);
        assert_eq!(occupant.energy, 0.7);
    }

    #[test]
    fn test_collision_keep_existing_discards_incoming() {
        let mut store = SparseVoxelStore::new(1.0, CollisionPolicy::KeepExisting);

        let first = store.add(Voxel::new(Vec3::new(0.1, 0.1, 0.1)).with_energy(0.2));
        let returned = store.add(Voxel::new(Vec3::new(0.9, 0.9, 0.9)).with_energy(0.7));

        assert_eq!(returned, first);
        assert_eq!(store.len(), 1);
        assert_eq!(store.collisions(), 1);
        assert_eq!(store.get(Vec3::new(0.5, 0.5, 0.5)).unwrap().energy, 0.2);
    }

    #[test]
    fn test_neighbors_axis_aligned_only() {
        let mut store = store();

        store.add(Voxel::new(Vec3::ZERO));
        store.add(Voxel::new(Vec3::new(1.0, 0.0, 0.0)));
        store.add(Voxel::new(Vec3::new(0.0, 1.0, 0.0)));
        // Diagonal, not a neighbor
        store.add(Voxel::new(Vec3::new(1.0, 1.0, 0.0)));

        let center = store.get(Vec3::ZERO).unwrap().clone();
        let neighbors = store.neighbors(&center);
        assert_eq!(neighbors.len(), 2);
    }

    #[test]
    fn test_handles_survive_position_drift() {
        let mut store = store();
        store.add(Voxel::new(Vec3::new(0.5, 0.5, 0.5)));

        // Drift the voxel into another cell without re-keying
        for voxel in store.iter_mut() {
            voxel.position = Vec3::new(3.5, 0.5, 0.5);
        }

        let (handle, _) = store.handles().next().unwrap();
        assert!(store.remove_handle(handle).is_some());
        assert!(store.is_empty());
        assert!(store.get(Vec3::new(0.5, 0.5, 0.5)).is_none());
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut store = store();
        store.add(Voxel::new(Vec3::ZERO));
        store.add(Voxel::new(Vec3::new(5.0, 0.0, 0.0)));
        store.remove(Vec3::ZERO);
        store.add(Voxel::new(Vec3::new(9.0, 0.0, 0.0)));

        assert_eq!(store.len(), 2);
        assert_eq!(store.slots.len(), 2);
        assert_eq!(store.iter().count(), 2);
    }

    #[test]
    fn test_birth_tick_follows_store_tick() {
        let mut store = store();
        store.advance_tick();
        store.advance_tick();
        store.add(Voxel::new(Vec3::ZERO));
        assert_eq!(store.get(Vec3::ZERO).unwrap().birth_tick, 2);
    }

    #[test]
    fn test_par_for_each_mut_touches_every_voxel() {
        let mut store = store();
        for i in 0..100 {
            store.add(Voxel::new(Vec3::new(i as f32, 0.0, 0.0)).with_energy(0.5));
        }

        store.par_for_each_mut(|voxel| voxel.boost_energy(0.25));
        assert!(store.iter().all(|v| (v.energy - 0.75).abs() < 1e-6));
    }

    #[test]
    fn test_statistics() {
        let mut store = store();
        let empty = store.statistics();
        assert_eq!(empty.total_voxels, 0);
        assert_eq!(empty.memory_saved_percent, 100.0);

        store.add(Voxel::new(Vec3::ZERO).with_energy(1.0));
        let mut wounded = Voxel::new(Vec3::new(3.0, 0.0, 0.0)).with_energy(0.5);
        wounded.trauma = 1.0;
        store.add(wounded);

        let stats = store.statistics();
        assert_eq!(stats.total_voxels, 2);
        assert_eq!(stats.alive_voxels, 1);
        assert!((stats.mean_energy - 0.75).abs() < 1e-6);
        assert!((stats.mean_trauma - 0.5).abs() < 1e-6);
        // Bounding box is 4x1x1 cells, 2 occupied
        assert!((stats.memory_saved_percent - 50.0).abs() < 1e-4);
    }
}
