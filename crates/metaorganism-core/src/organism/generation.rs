//! Body growth
//!
//! The body is a Fibonacci-lattice ball with a lumpy rim (the core) plus
//! dendrite branches reaching past the radius.

use glam::Vec3;

use metaorganism_voxel::{Emotion, EmotionAxis, SemanticVector, Voxel};

use crate::config::{BodyParams, EmotionParams};
use crate::creature::fibonacci_direction;
use crate::rng_trait::OrganismRng;
use crate::store::SparseVoxelStore;

/// Inputs shared by every grown voxel
pub(crate) struct BodySeed<'a> {
    pub center: Vec3,
    pub radius: f32,
    pub semantic: &'a SemanticVector,
    pub emotion: &'a Emotion,
}

/// Grow the full body into `store`, returning how many voxels were offered
pub(crate) fn grow_body<R: OrganismRng + ?Sized>(
    store: &mut SparseVoxelStore,
    seed: &BodySeed<'_>,
    body: &BodyParams,
    emotion: &EmotionParams,
    rng: &mut R,
) -> usize {
    let core_count = (body.voxel_count as f32 * body.core_fraction) as usize;
    let dendrite_count = body.voxel_count - core_count;

    grow_core(store, seed, core_count, emotion.semantic_jitter, rng);
    let grown = grow_dendrites(store, seed, dendrite_count, body.dendrite_branches, rng);

    core_count + grown
}

fn grow_core<R: OrganismRng + ?Sized>(
    store: &mut SparseVoxelStore,
    seed: &BodySeed<'_>,
    count: usize,
    semantic_jitter: f32,
    rng: &mut R,
) {
    for i in 0..count {
        let (theta, phi, direction) = fibonacci_direction(i, count);
        let variation = 1.0 + 0.1 * (theta * 5.0).sin() * (phi * 3.0).cos();
        let r = seed.radius * rng.gen_f32().cbrt() * variation;
        let ratio = r / seed.radius;

        // Joyful heart, calm rim
        let emotion = seed
            .emotion
            .boosted(EmotionAxis::Joy, (1.0 - ratio) * 0.2)
            .boosted(EmotionAxis::Peace, ratio * 0.1)
            .clamped(0.0, 1.0)
            .normalized();

        let jitter: [f32; 8] = rng.gen_gaussian_array(semantic_jitter);
        let semantic = seed.semantic.add(&SemanticVector::from_array(jitter));

        let voxel = Voxel::new(seed.center + direction * r)
            .with_energy(0.9 - ratio * 0.3 + rng.gen_f32() * 0.1)
            .with_emotion(emotion)
            .with_semantic(semantic);
        store.add(voxel);
    }
}

fn grow_dendrites<R: OrganismRng + ?Sized>(
    store: &mut SparseVoxelStore,
    seed: &BodySeed<'_>,
    count: usize,
    branches: usize,
    rng: &mut R,
) -> usize {
    if branches == 0 {
        return 0;
    }
    let per_branch = count / branches;
    if per_branch == 0 {
        return 0;
    }

    for branch in 0..branches {
        let branch_theta = std::f32::consts::TAU * branch as f32 / branches as f32;
        let branch_phi = std::f32::consts::FRAC_PI_4 + rng.gen_f32() * std::f32::consts::FRAC_PI_2;
        let direction = Vec3::new(
            branch_phi.sin() * branch_theta.cos(),
            branch_phi.sin() * branch_theta.sin(),
            branch_phi.cos(),
        );

        for i in 0..per_branch {
            let t = i as f32 / per_branch as f32 * 1.5;
            // Branches widen as they grow
            let spread = 0.1 + t * 0.3;
            let jitter = Vec3::from_array(rng.gen_gaussian_array(spread));
            let position =
                seed.center + direction * (seed.radius + t * seed.radius * 0.5) + jitter;
            let energy = (0.7 - t * 0.2 + rng.gen_f32() * 0.1).max(0.3);

            let voxel = Voxel::new(position)
                .with_energy(energy)
                .with_emotion(*seed.emotion)
                .with_semantic(*seed.semantic);
            store.add(voxel);
        }
    }

    per_branch * branches
}
