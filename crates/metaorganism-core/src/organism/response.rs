//! Integration and rejection of arrived creatures

use metaorganism_voxel::{CreatureId, EmotionAxis};

use super::compatibility::Compatibility;
use super::observer::OrganismObserver;
use super::organism::MetaOrganism;
use crate::creature::{CreatureFate, FileCreature};

/// What an integration did to the organism
#[derive(Debug, Clone, PartialEq)]
pub struct IntegrationReport {
    pub creature: CreatureId,
    pub label: String,
    pub semantic_similarity: f32,
    pub emotion_similarity: f32,
    /// Voxels the creature brought
    pub voxels_offered: usize,
    /// Growth of the store; lower than offered when cells collided
    pub voxels_added: usize,
    /// Accepted from the uncertain middle band
    pub borderline: bool,
}

/// What a rejection did to the organism
#[derive(Debug, Clone, PartialEq)]
pub struct RejectionReport {
    pub creature: CreatureId,
    pub label: String,
    pub semantic_similarity: f32,
    pub emotion_similarity: f32,
    /// Severity actually applied, within [0, 1]
    pub severity: f32,
    /// Body voxels removed by atrophy
    pub voxels_lost: usize,
    /// Surviving voxels in the trauma zone that were injured
    pub voxels_traumatized: usize,
}

impl MetaOrganism {
    /// Merge `creature` into the body
    pub(crate) fn integrate(
        &mut self,
        creature: &mut FileCreature,
        compatibility: &Compatibility,
        borderline: bool,
        observer: &mut dyn OrganismObserver,
    ) -> IntegrationReport {
        let params = self.config.integration.clone();
        let voxels = std::mem::take(&mut creature.voxels);
        let offered = voxels.len();
        let before = self.store.len();

        for mut voxel in voxels {
            voxel.entity = None;
            voxel.boost_energy(params.voxel_energy_boost);
            voxel.emotion = voxel
                .emotion
                .boosted(EmotionAxis::Joy, params.voxel_joy_boost)
                .normalized();
            self.store.add(voxel);
        }
        let added = self.store.len().saturating_sub(before);

        self.base_semantic = self
            .base_semantic
            .blend_towards(&creature.semantic, params.semantic_rate);
        self.global_emotion = self
            .global_emotion
            .boosted(EmotionAxis::Joy, params.global_joy_boost)
            .normalized();

        let warmth_zone = self.radius * params.warmth_radius;
        let origin = creature.position;
        for voxel in self.store.iter_mut() {
            if voxel.position.distance(origin) < warmth_zone {
                voxel.boost_energy(params.warmth_energy);
            }
        }

        creature.fate = CreatureFate::Integrated;
        self.integration_count += 1;
        self.last_event = format!("Integrated {}", creature.label);

        if borderline {
            log::warn!(
                "Borderline compatibility for {} (sem={:.2}), integrating anyway",
                creature.label,
                compatibility.semantic_similarity
            );
        }
        log::info!(
            "Integrated {} ({}): +{} voxels of {}",
            creature.label,
            creature.id,
            added,
            offered
        );

        let report = IntegrationReport {
            creature: creature.id,
            label: creature.label.clone(),
            semantic_similarity: compatibility.semantic_similarity,
            emotion_similarity: compatibility.emotion_similarity,
            voxels_offered: offered,
            voxels_added: added,
            borderline,
        };
        observer.on_integration(&report);
        report
    }

    /// Atrophy and injure the tissue around `creature`
    pub(crate) fn reject(
        &mut self,
        creature: &mut FileCreature,
        compatibility: &Compatibility,
        severity: f32,
        observer: &mut dyn OrganismObserver,
    ) -> RejectionReport {
        let params = self.config.rejection.clone();
        let severity = severity.clamp(0.0, 1.0);
        let atrophy = params.atrophy_base + params.atrophy_per_severity * severity;
        let zone = self.radius * params.zone_radius;
        let origin = creature.position;

        let mut candidates: Vec<_> = self
            .store
            .handles()
            .filter_map(|(handle, voxel)| {
                let distance = voxel.position.distance(origin);
                (distance < zone).then_some((handle, distance))
            })
            .collect();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let lost = (candidates.len() as f32 * atrophy).floor() as usize;
        let (dying, injured) = candidates.split_at(lost);

        for &(handle, _) in dying {
            self.store.remove_handle(handle);
        }
        for &(handle, distance) in injured {
            if let Some(voxel) = self.store.get_handle_mut(handle) {
                voxel.injure((1.0 - distance / zone) * severity);
                voxel.emotion = voxel
                    .emotion
                    .boosted(EmotionAxis::Fear, params.voxel_fear_boost)
                    .boosted(EmotionAxis::Anger, params.voxel_anger_boost)
                    .normalized();
            }
        }

        let joy = (self.global_emotion.joy() - params.global_joy_loss).max(params.global_joy_floor);
        let mut global = self.global_emotion.offset_by([
            0.0,
            params.global_fear_boost,
            params.global_anger_boost,
            0.0,
        ]);
        global.set(EmotionAxis::Joy, joy);
        self.global_emotion = global.normalized();

        creature.fate = CreatureFate::Rejected;
        creature.voxels.clear();
        self.trauma_count += 1;
        self.last_event = format!("Rejected {} ({} voxels lost)", creature.label, lost);

        log::info!(
            "Rejected {} ({}): severity {:.2}, {} voxels lost, {} traumatized",
            creature.label,
            creature.id,
            severity,
            lost,
            injured.len()
        );

        let report = RejectionReport {
            creature: creature.id,
            label: creature.label.clone(),
            semantic_similarity: compatibility.semantic_similarity,
            emotion_similarity: compatibility.emotion_similarity,
            severity,
            voxels_lost: lost,
            voxels_traumatized: injured.len(),
        };
        observer.on_rejection(&report);
        report
    }
}
