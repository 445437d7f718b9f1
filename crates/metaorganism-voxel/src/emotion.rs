//! Emotion vectors and mood labels
//!
//! An emotion is a distribution over four channels: joy, fear, anger, peace.
//! Every mutation is expected to end with [`Emotion::normalized`] so the
//! channels stay non-negative and sum to 1.

use glam::Vec4;
use serde::{Deserialize, Serialize};

use crate::EPSILON;
use crate::semantic::{SemanticVector, cosine_similarity};

/// One channel of an [`Emotion`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EmotionAxis {
    Joy,
    Fear,
    Anger,
    Peace,
}

impl EmotionAxis {
    pub const ALL: [EmotionAxis; 4] = [
        EmotionAxis::Joy,
        EmotionAxis::Fear,
        EmotionAxis::Anger,
        EmotionAxis::Peace,
    ];

    pub fn index(self) -> usize {
        match self {
            EmotionAxis::Joy => 0,
            EmotionAxis::Fear => 1,
            EmotionAxis::Anger => 2,
            EmotionAxis::Peace => 3,
        }
    }
}

/// Organism-wide mood label, derived from the dominant emotion channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mood {
    /// Joy dominates ("kaif")
    Bliss,
    /// Fear dominates
    Anxiety,
    /// Anger dominates
    Anger,
    /// Peace dominates
    #[default]
    Peace,
}

impl Mood {
    pub fn from_axis(axis: EmotionAxis) -> Self {
        match axis {
            EmotionAxis::Joy => Mood::Bliss,
            EmotionAxis::Fear => Mood::Anxiety,
            EmotionAxis::Anger => Mood::Anger,
            EmotionAxis::Peace => Mood::Peace,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mood::Bliss => "bliss",
            Mood::Anxiety => "anxiety",
            Mood::Anger => "anger",
            Mood::Peace => "peace",
        }
    }
}

impl std::fmt::Display for Mood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Four-channel emotion vector (joy, fear, anger, peace)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Emotion(Vec4);

impl Default for Emotion {
    /// Fresh voxel mood: mostly joyful, somewhat calm
    fn default() -> Self {
        Self::new(0.5, 0.1, 0.1, 0.3)
    }
}

impl Emotion {
    /// Build from raw channel values (not normalized)
    pub fn new(joy: f32, fear: f32, anger: f32, peace: f32) -> Self {
        Self(Vec4::new(joy, fear, anger, peace))
    }

    pub fn from_array(values: [f32; 4]) -> Self {
        Self(Vec4::from_array(values))
    }

    pub fn to_array(&self) -> [f32; 4] {
        self.0.to_array()
    }

    pub fn as_vec4(&self) -> Vec4 {
        self.0
    }

    pub fn joy(&self) -> f32 {
        self.0.x
    }

    pub fn fear(&self) -> f32 {
        self.0.y
    }

    pub fn anger(&self) -> f32 {
        self.0.z
    }

    pub fn peace(&self) -> f32 {
        self.0.w
    }

    pub fn get(&self, axis: EmotionAxis) -> f32 {
        self.0[axis.index()]
    }

    pub fn set(&mut self, axis: EmotionAxis, value: f32) {
        self.0[axis.index()] = value;
    }

    pub fn sum(&self) -> f32 {
        self.0.dot(Vec4::ONE)
    }

    /// Scale so the channels sum to 1; a (near) zero sum is left untouched
    pub fn normalized(&self) -> Self {
        let sum = self.sum();
        if sum.abs() < EPSILON {
            return *self;
        }
        Self(self.0 / sum)
    }

    /// Clamp every channel into `[min, max]` (not normalized)
    pub fn clamped(&self, min: f32, max: f32) -> Self {
        Self(self.0.clamp(Vec4::splat(min), Vec4::splat(max)))
    }

    /// Add `amount` to one channel, capped at 1.0 (not normalized)
    pub fn boosted(&self, axis: EmotionAxis, amount: f32) -> Self {
        let mut out = *self;
        out.set(axis, (self.get(axis) + amount).min(1.0));
        out
    }

    /// `(1 - rate) * self + rate * target`, renormalized
    pub fn blend(&self, target: &Emotion, rate: f32) -> Self {
        Self(self.0 * (1.0 - rate) + target.0 * rate).normalized()
    }

    /// Euclidean distance between the two vectors
    pub fn distance(&self, other: &Emotion) -> f32 {
        self.0.distance(other.0)
    }

    pub fn cosine(&self, other: &Emotion) -> f32 {
        cosine_similarity(&self.to_array(), &other.to_array())
    }

    /// Component-wise sum with raw offsets (not normalized)
    pub fn offset_by(&self, offsets: [f32; 4]) -> Self {
        Self(self.0 + Vec4::from_array(offsets))
    }

    pub fn dominant_axis(&self) -> EmotionAxis {
        let mut best = EmotionAxis::Joy;
        for axis in EmotionAxis::ALL {
            if self.get(axis) > self.get(best) {
                best = axis;
            }
        }
        best
    }

    /// Dominant mood and its intensity
    pub fn dominant(&self) -> (Mood, f32) {
        let axis = self.dominant_axis();
        (Mood::from_axis(axis), self.get(axis))
    }

    /// Derive a creature's base emotion from its semantic fingerprint
    ///
    /// Joy follows positive semantics, fear negative values and variability,
    /// anger sharp values, peace a balanced digest half.
    pub fn from_semantic(semantic: &SemanticVector) -> Self {
        let s = semantic.to_array();

        let head = &s[..4];
        let mean = head.iter().sum::<f32>() / 4.0;
        let std = (head.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / 4.0).sqrt();

        let joy = ((s[0] + s[4] + 1.0) / 3.0).max(0.1);
        let fear = ((-s[1] + s[5].abs() + 1.0) / 4.0).max(0.05);
        let anger = ((s[2].abs() + s[6].abs() - 0.5) / 2.0).max(0.05);
        let peace = (1.0 - std).max(0.1);

        Self::new(joy, fear, anger, peace)
            .clamped(0.05, 1.0)
            .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::semantic_fingerprint;

    fn assert_distribution(e: &Emotion) {
        assert!((e.sum() - 1.0).abs() < 1e-6, "sum was {}", e.sum());
        for v in e.to_array() {
            assert!(v >= 0.0);
        }
    }

    #[test]
    fn test_normalized_sums_to_one() {
        let e = Emotion::new(2.0, 1.0, 0.5, 0.5).normalized();
        assert_distribution(&e);
        assert!((e.joy() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_normalizing_zero_is_noop() {
        let zero = Emotion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(zero.normalized(), zero);
    }

    #[test]
    fn test_blend_moves_toward_target() {
        let a = Emotion::new(1.0, 0.0, 0.0, 0.0);
        let b = Emotion::new(0.0, 0.0, 0.0, 1.0);
        let blended = a.blend(&b, 0.01);
        assert_distribution(&blended);
        assert!((blended.joy() - 0.99).abs() < 1e-6);
        assert!((blended.peace() - 0.01).abs() < 1e-6);
    }

    #[test]
    fn test_boost_caps_at_one() {
        let e = Emotion::new(0.95, 0.0, 0.0, 0.05).boosted(EmotionAxis::Joy, 0.3);
        assert_eq!(e.joy(), 1.0);
        assert_eq!(e.peace(), 0.05);
    }

    #[test]
    fn test_dominant_mood() {
        assert_eq!(Emotion::new(0.8, 0.1, 0.05, 0.05).dominant().0, Mood::Bliss);
        assert_eq!(Emotion::new(0.1, 0.6, 0.2, 0.1).dominant().0, Mood::Anxiety);
        assert_eq!(Emotion::new(0.1, 0.2, 0.6, 0.1).dominant().0, Mood::Anger);
        let (mood, intensity) = Emotion::new(0.1, 0.1, 0.1, 0.7).dominant();
        assert_eq!(mood, Mood::Peace);
        assert!((intensity - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_distance_and_cosine() {
        let a = Emotion::new(0.4, 0.1, 0.1, 0.4);
        assert_eq!(a.distance(&a), 0.0);
        assert!((a.cosine(&a) - 1.0).abs() < 1e-6);

        let b = Emotion::new(0.05, 0.05, 0.85, 0.05);
        // Squared differences: 0.1225 + 0.0025 + 0.5625 + 0.1225 = 0.81
        assert!((a.distance(&b) - 0.9).abs() < 1e-5);
    }

    #[test]
    fn test_offset_by_adds_raw_values() {
        let e = Emotion::new(0.4, 0.1, 0.1, 0.4).offset_by([0.0, 0.15, 0.2, 0.0]);
        // Not capped or normalized
        assert!((e.fear() - 0.25).abs() < 1e-6);
        assert!((e.anger() - 0.3).abs() < 1e-6);
        assert!((e.sum() - 1.35).abs() < 1e-6);
    }

    #[test]
    fn test_from_semantic_is_distribution_with_floor() {
        for data in [&b"alpha"[..], b"beta", b"", &[0u8; 100][..]] {
            let e = Emotion::from_semantic(&semantic_fingerprint(data));
            assert_distribution(&e);
            // Every channel was clamped to >= 0.05 before dividing by a sum <= 4
            for v in e.to_array() {
                assert!(v >= 0.05 / 4.0);
            }
        }
    }

    #[test]
    fn test_mood_labels() {
        assert_eq!(Mood::Bliss.to_string(), "bliss");
        assert_eq!(Mood::default(), Mood::Peace);
    }
}
