//! Compatibility between an arriving creature and the organism

use serde::{Deserialize, Serialize};

use metaorganism_voxel::{Emotion, SemanticVector};

use crate::config::CompatibilityParams;

/// How to resolve creatures that are neither clearly compatible nor hostile
///
/// The borderline band is `reject_threshold <= semantic <= integrate_threshold`
/// with no emotion mismatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderlinePolicy {
    /// Accept the creature, logging it as borderline
    #[default]
    Integrate,
    /// Reject it at the floor severity
    Reject,
}

/// Outcome of a compatibility check
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    Integrate { borderline: bool },
    Reject { severity: f32, borderline: bool },
}

impl Verdict {
    pub fn is_integrate(&self) -> bool {
        matches!(self, Verdict::Integrate { .. })
    }

    pub fn is_borderline(&self) -> bool {
        match *self {
            Verdict::Integrate { borderline } | Verdict::Reject { borderline, .. } => borderline,
        }
    }
}

/// Similarity numbers between a creature and the organism
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Compatibility {
    pub semantic_similarity: f32,
    pub emotion_similarity: f32,
    /// Weighted blend of both similarities
    pub combined: f32,
    /// L2 distance between the two emotion vectors
    pub emotion_distance: f32,
    pub emotion_mismatch: bool,
}

impl Compatibility {
    pub fn evaluate(
        creature_semantic: &SemanticVector,
        creature_emotion: &Emotion,
        organism_semantic: &SemanticVector,
        organism_emotion: &Emotion,
        params: &CompatibilityParams,
    ) -> Self {
        let semantic_similarity = creature_semantic.cosine(organism_semantic);
        let emotion_similarity = creature_emotion.cosine(organism_emotion);
        let emotion_distance = creature_emotion.distance(organism_emotion);

        Self {
            semantic_similarity,
            emotion_similarity,
            combined: params.semantic_weight * semantic_similarity
                + params.emotion_weight * emotion_similarity,
            emotion_distance,
            emotion_mismatch: emotion_distance > params.emotion_mismatch_distance,
        }
    }

    /// Rejection severity before clamping: `max(floor, base - combined)`
    pub fn severity(&self, params: &CompatibilityParams) -> f32 {
        params
            .severity_floor
            .max(params.severity_base - self.combined)
    }

    /// Decide the creature's fate, checked in priority order
    pub fn verdict(&self, params: &CompatibilityParams) -> Verdict {
        if self.semantic_similarity > params.integrate_threshold && !self.emotion_mismatch {
            return Verdict::Integrate { borderline: false };
        }
        if self.semantic_similarity < params.reject_threshold || self.emotion_mismatch {
            return Verdict::Reject {
                severity: self.severity(params),
                borderline: false,
            };
        }

        match params.borderline {
            BorderlinePolicy::Integrate => Verdict::Integrate { borderline: true },
            BorderlinePolicy::Reject => Verdict::Reject {
                severity: params.severity_floor,
                borderline: true,
            },
        }
    }
}
