//! Meta-organism kernel
//!
//! A sparse voxel body that breathes, heals and co-evolves its emotions,
//! while creatures grown from arbitrary files travel toward it and are either
//! integrated or rejected.

pub mod config;
pub mod creature;
pub mod organism;
pub mod rng_trait;
pub mod store;

pub use config::{ConfigError, OrganismConfig};
pub use creature::{CreatureFate, FileCreature, voxel_count_for};
pub use organism::{
    BorderlinePolicy, Compatibility, EventLog, IntegrationReport, MetaOrganism, NoopObserver,
    OrganismEvent, OrganismObserver, OrganismState, RejectionReport, Verdict,
};
pub use rng_trait::{OrganismRng, seeded_rng};
pub use store::{CollisionPolicy, SparseVoxelStore, StoreStatistics, VoxelHandle};

// Re-export the data types so callers need a single dependency
pub use metaorganism_voxel::{
    CreatureId, Emotion, EmotionAxis, Mood, SemanticVector, Voxel, VoxelId, cosine_similarity,
    semantic_fingerprint,
};
