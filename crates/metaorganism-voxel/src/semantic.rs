//! Semantic fingerprints
//!
//! A fingerprint is an 8-dimensional unit vector summarising arbitrary bytes:
//! four components mixed out of an MD5 digest, four from byte statistics.
//! MD5 is only used as a deterministic mixer here, never for security.

use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::ops::Neg;

use crate::EPSILON;

/// Number of semantic dimensions
pub const SEMANTIC_DIMS: usize = 8;

/// Only this many leading bytes feed the byte statistics
pub const FINGERPRINT_SAMPLE_LIMIT: usize = 10_000;

/// Cosine similarity between two equally sized vectors
///
/// Returns 0.0 when either vector has (near) zero norm.
///
/// # Panics
/// Panics if the slices differ in length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(
        a.len(),
        b.len(),
        "cosine_similarity needs equal lengths ({} vs {})",
        a.len(),
        b.len()
    );

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if norm_a < EPSILON || norm_b < EPSILON {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Eight-dimensional semantic vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SemanticVector([f32; SEMANTIC_DIMS]);

impl SemanticVector {
    pub const ZERO: SemanticVector = SemanticVector([0.0; SEMANTIC_DIMS]);

    pub fn from_array(values: [f32; SEMANTIC_DIMS]) -> Self {
        Self(values)
    }

    pub fn to_array(&self) -> [f32; SEMANTIC_DIMS] {
        self.0
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn norm(&self) -> f32 {
        self.0.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// L2-normalized copy; a zero vector stays zero
    pub fn normalized(&self) -> Self {
        let norm = self.norm();
        if norm < EPSILON {
            return *self;
        }
        Self(self.0.map(|v| v / norm))
    }

    pub fn cosine(&self, other: &SemanticVector) -> f32 {
        cosine_similarity(&self.0, &other.0)
    }

    /// Exponential moving average toward `other`, renormalized
    pub fn blend_towards(&self, other: &SemanticVector, rate: f32) -> Self {
        let mut out = [0.0; SEMANTIC_DIMS];
        for (i, slot) in out.iter_mut().enumerate() {
            *slot = self.0[i] * (1.0 - rate) + other.0[i] * rate;
        }
        Self(out).normalized()
    }

    /// Component-wise sum, not normalized
    pub fn add(&self, other: &SemanticVector) -> Self {
        let mut out = self.0;
        for (slot, v) in out.iter_mut().zip(other.0) {
            *slot += v;
        }
        Self(out)
    }
}

impl Neg for SemanticVector {
    type Output = SemanticVector;

    fn neg(self) -> Self::Output {
        Self(self.0.map(|v| -v))
    }
}

impl std::ops::Index<usize> for SemanticVector {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        &self.0[index]
    }
}

/// Compute the semantic fingerprint of `data`
///
/// Identical inputs always produce identical vectors. An empty input leaves
/// the statistics half at zero; normalization still applies to the digest half.
pub fn semantic_fingerprint(data: &[u8]) -> SemanticVector {
    let digest = Md5::digest(data);

    let mut semantic = [0.0f32; SEMANTIC_DIMS];
    for (i, slot) in semantic.iter_mut().take(4).enumerate() {
        *slot = (digest[i * 4] as f32 / 255.0) * 2.0 - 1.0;
    }

    if !data.is_empty() {
        let sample = &data[..data.len().min(FINGERPRINT_SAMPLE_LIMIT)];
        let n = sample.len() as f64;

        let mut seen = [false; 256];
        let mut sum = 0.0f64;
        let mut high = 0usize;
        for &b in sample {
            seen[b as usize] = true;
            sum += b as f64;
            if b > 127 {
                high += 1;
            }
        }
        let mean = sum / n;
        let variance = sample
            .iter()
            .map(|&b| {
                let d = b as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        let distinct = seen.iter().filter(|&&s| s).count();

        semantic[4] = ((mean / 255.0) * 2.0 - 1.0) as f32;
        semantic[5] = (variance.sqrt() / 128.0 - 1.0) as f32;
        semantic[6] = ((distinct as f64 / 256.0) * 2.0 - 1.0) as f32;
        semantic[7] = ((high as f64 / n) * 2.0 - 1.0) as f32;
    }

    SemanticVector(semantic).normalized()
}
