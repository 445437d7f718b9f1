//! Voxel data types for the meta-organism
//!
//! This crate provides the leaf data types shared by the organism kernel:
//! - Voxel particles (Voxel, VoxelId, CreatureId)
//! - Four-channel emotion vectors and mood labels (Emotion, EmotionAxis, Mood)
//! - Eight-dimensional semantic fingerprints (SemanticVector, semantic_fingerprint)

mod emotion;
mod semantic;
mod types;
mod voxel;

pub use emotion::{Emotion, EmotionAxis, Mood};
pub use semantic::{
    FINGERPRINT_SAMPLE_LIMIT, SEMANTIC_DIMS, SemanticVector, cosine_similarity,
    semantic_fingerprint,
};
pub use types::{CreatureId, VoxelId};
pub use voxel::Voxel;

/// Norms and sums below this are treated as zero
pub const EPSILON: f32 = 1e-10;
