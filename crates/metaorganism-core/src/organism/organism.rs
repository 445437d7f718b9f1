use glam::Vec3;
use rand_xoshiro::Xoshiro256StarStar;

use metaorganism_voxel::{CreatureId, Emotion, EmotionAxis, SemanticVector, Voxel};

use super::compatibility::{Compatibility, Verdict};
use super::generation::{BodySeed, grow_body};
use super::observer::OrganismObserver;
use super::response::{IntegrationReport, RejectionReport};
use super::state::OrganismState;
use crate::config::{ConfigError, OrganismConfig};
use crate::creature::{FileCreature, sphere_radius, voxel_count_for};
use crate::rng_trait::{OrganismRng, seeded_rng};
use crate::store::SparseVoxelStore;

/// The central organism: a breathing voxel body that absorbs or rejects
/// creatures grown from files
pub struct MetaOrganism {
    pub(crate) config: OrganismConfig,
    pub(crate) store: SparseVoxelStore,
    rng: Xoshiro256StarStar,
    center: Vec3,
    pub(crate) radius: f32,
    pub(crate) base_semantic: SemanticVector,
    pub(crate) global_emotion: Emotion,
    pulse_phase: f32,
    creatures: Vec<FileCreature>,
    state: OrganismState,
    pub(crate) integration_count: u64,
    pub(crate) trauma_count: u64,
    pub(crate) last_event: String,
}

impl MetaOrganism {
    /// Validate `config` and grow a fresh body
    pub fn new(config: OrganismConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = seeded_rng(config.seed);
        let center = Vec3::from_array(config.body.center);
        let radius = sphere_radius(config.body.voxel_count, config.body.radius_scale);
        let base_semantic = SemanticVector::from_array(rng.gen_gaussian_array(1.0)).normalized();
        let global_emotion = Emotion::from_array(config.emotion.initial).normalized();
        let store = SparseVoxelStore::new(config.body.resolution, config.body.collision_policy);

        let mut organism = Self {
            config,
            store,
            rng,
            center,
            radius,
            base_semantic,
            global_emotion,
            pulse_phase: 0.0,
            creatures: Vec::new(),
            state: OrganismState::default(),
            integration_count: 0,
            trauma_count: 0,
            last_event: String::from("Born"),
        };
        organism.grow();
        Ok(organism)
    }

    fn grow(&mut self) {
        log::info!(
            "Growing organism from {} voxels (radius {:.1})",
            self.config.body.voxel_count,
            self.radius
        );

        let seed = BodySeed {
            center: self.center,
            radius: self.radius,
            semantic: &self.base_semantic,
            emotion: &self.global_emotion,
        };
        let offered = grow_body(
            &mut self.store,
            &seed,
            &self.config.body,
            &self.config.emotion,
            &mut self.rng,
        );

        log::info!(
            "Organism grown: {} voxels stored of {} ({} cell collisions)",
            self.store.len(),
            offered,
            self.store.collisions()
        );
        self.refresh_state();
    }

    /// Grow a creature from file bytes at a random point around the body
    pub fn spawn_creature(
        &mut self,
        label: &str,
        bytes: &[u8],
        observer: &mut dyn OrganismObserver,
    ) -> CreatureId {
        let angle = self.rng.gen_f32() * std::f32::consts::TAU;
        let phi = self.rng.gen_f32() * std::f32::consts::PI;
        let distance = self.radius * self.config.creature.spawn_distance;
        let spawn = self.center
            + distance * Vec3::new(phi.sin() * angle.cos(), phi.sin() * angle.sin(), phi.cos());

        let count = voxel_count_for(bytes.len(), &self.config.creature);
        let creature = FileCreature::from_bytes(
            label,
            bytes,
            spawn,
            count,
            &self.config.creature,
            &mut self.rng,
        );
        self.adopt_creature(creature, observer)
    }

    /// Start tracking a prebuilt creature
    pub fn adopt_creature(
        &mut self,
        creature: FileCreature,
        observer: &mut dyn OrganismObserver,
    ) -> CreatureId {
        let id = creature.id;
        log::info!(
            "Creature spawned from {}: {} voxels ({})",
            creature.label,
            creature.voxel_count(),
            id
        );
        observer.on_spawn(id, &creature.label, creature.voxel_count());
        self.last_event = format!("Spawned {}", creature.label);
        self.creatures.push(creature);
        self.state.creature_count = self.creatures.len();
        id
    }

    /// Build a creature with this organism's RNG and creature settings
    pub fn build_creature(
        &mut self,
        label: &str,
        semantic: SemanticVector,
        base_emotion: Emotion,
        spawn: Vec3,
        voxel_count: usize,
    ) -> FileCreature {
        FileCreature::from_signature(
            label,
            semantic,
            base_emotion,
            spawn,
            voxel_count,
            &self.config.creature,
            &mut self.rng,
        )
    }

    /// Compatibility of a creature with the organism as it is now
    pub fn compatibility(&self, creature: &FileCreature) -> Compatibility {
        Compatibility::evaluate(
            &creature.semantic,
            &creature.base_emotion,
            &self.base_semantic,
            &self.global_emotion,
            &self.config.compatibility,
        )
    }

    /// Advance the organism by `dt` seconds
    ///
    /// A negative or non-finite `dt` is ignored: nothing moves and the tick
    /// does not advance.
    pub fn update(&mut self, dt: f32, observer: &mut dyn OrganismObserver) {
        if !dt.is_finite() || dt < 0.0 {
            log::warn!("Ignoring update with invalid dt {}", dt);
            return;
        }

        self.update_voxels(dt);

        // Creatures move first, then arrivals resolve in order
        let speed = dt * self.config.creature.speed;
        let arrival = self.config.creature.arrival_distance;
        let mut creatures = std::mem::take(&mut self.creatures);
        for creature in creatures.iter_mut().filter(|c| c.is_alive()) {
            if creature.move_towards(self.center, speed, arrival) {
                self.resolve_arrival(creature, observer);
            }
        }
        creatures.retain(|c| c.is_alive());
        self.creatures = creatures;

        let peace =
            (self.global_emotion.peace() + dt * self.config.emotion.peace_drift_rate).min(1.0);
        self.global_emotion.set(EmotionAxis::Peace, peace);
        self.global_emotion = self.global_emotion.normalized();

        self.store.advance_tick();
        self.refresh_state();
        log::trace!("{}", self.state);
        observer.on_tick(&self.state);
    }

    /// Breathing, healing and emotional co-evolution for every body voxel
    fn update_voxels(&mut self, dt: f32) {
        let pulse_params = &self.config.pulse;
        let breathe = dt != 0.0;
        if breathe {
            self.pulse_phase += dt * pulse_params.frequency * std::f32::consts::TAU;
        }

        let pulse = self.pulse_phase.sin() * pulse_params.amplitude;
        let min_distance = pulse_params.min_distance;
        let center = self.center;
        let radius = self.radius;
        let heal = dt * self.config.emotion.trauma_heal_rate;
        let rate = self.config.emotion.coevolution_rate;
        let global = self.global_emotion;

        let step = move |voxel: &mut Voxel| {
            if breathe {
                voxel.breathe(center, radius, pulse, min_distance);
            }
            voxel.heal(heal);
            voxel.coevolve(&global, rate);
        };

        if self.store.len() > self.config.parallel_threshold {
            self.store.par_for_each_mut(step);
        } else {
            self.store.iter_mut().for_each(step);
        }
    }

    fn resolve_arrival(&mut self, creature: &mut FileCreature, observer: &mut dyn OrganismObserver) {
        let compatibility = self.compatibility(creature);
        log::debug!(
            "Compatibility of {}: sem={:.2}, emo={:.2}, combined={:.2}, emotion distance={:.2}",
            creature.label,
            compatibility.semantic_similarity,
            compatibility.emotion_similarity,
            compatibility.combined,
            compatibility.emotion_distance
        );

        match compatibility.verdict(&self.config.compatibility) {
            Verdict::Integrate { borderline } => {
                self.integrate(creature, &compatibility, borderline, observer);
            }
            Verdict::Reject { severity, borderline } => {
                if borderline {
                    log::warn!(
                        "Borderline compatibility for {} (sem={:.2}), rejecting",
                        creature.label,
                        compatibility.semantic_similarity
                    );
                }
                self.reject(creature, &compatibility, severity, observer);
            }
        }
    }

    fn take_creature(&mut self, id: CreatureId) -> Option<FileCreature> {
        let index = self.creatures.iter().position(|c| c.id == id)?;
        Some(self.creatures.remove(index))
    }

    /// Integrate a traveling creature right away, wherever it is
    pub fn integrate_creature(
        &mut self,
        id: CreatureId,
        observer: &mut dyn OrganismObserver,
    ) -> Option<IntegrationReport> {
        let mut creature = self.take_creature(id)?;
        let compatibility = self.compatibility(&creature);
        let report = self.integrate(&mut creature, &compatibility, false, observer);
        self.refresh_state();
        Some(report)
    }

    /// Reject a traveling creature right away with the given severity
    pub fn reject_creature(
        &mut self,
        id: CreatureId,
        severity: f32,
        observer: &mut dyn OrganismObserver,
    ) -> Option<RejectionReport> {
        let mut creature = self.take_creature(id)?;
        let compatibility = self.compatibility(&creature);
        let report = self.reject(&mut creature, &compatibility, severity, observer);
        self.refresh_state();
        Some(report)
    }

    fn refresh_state(&mut self) {
        let stats = self.store.statistics();
        let health = if stats.total_voxels == 0 {
            0.0
        } else {
            (stats.mean_energy + (1.0 - stats.mean_trauma)) / 2.0
        };
        let (mood, mood_intensity) = self.global_emotion.dominant();

        self.state = OrganismState {
            tick: self.store.tick(),
            health,
            mood,
            mood_intensity,
            total_voxels: stats.total_voxels,
            alive_voxels: stats.alive_voxels,
            memory_saved_percent: stats.memory_saved_percent,
            creature_count: self.creatures.len(),
            integration_count: self.integration_count,
            trauma_count: self.trauma_count,
            last_event: self.last_event.clone(),
        };
    }

    pub fn state(&self) -> &OrganismState {
        &self.state
    }

    pub fn config(&self) -> &OrganismConfig {
        &self.config
    }

    pub fn global_emotion(&self) -> Emotion {
        self.global_emotion
    }

    pub fn base_semantic(&self) -> SemanticVector {
        self.base_semantic
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn pulse_phase(&self) -> f32 {
        self.pulse_phase
    }

    pub fn store(&self) -> &SparseVoxelStore {
        &self.store
    }

    /// Creatures still traveling
    pub fn creatures(&self) -> &[FileCreature] {
        &self.creatures
    }

    pub fn creature(&self, id: CreatureId) -> Option<&FileCreature> {
        self.creatures.iter().find(|c| c.id == id)
    }

    /// Mutable access for placing creatures by hand
    pub fn creature_mut(&mut self, id: CreatureId) -> Option<&mut FileCreature> {
        self.creatures.iter_mut().find(|c| c.id == id)
    }

    /// Body voxel positions followed by traveling creature voxels
    pub fn all_positions(&self) -> Vec<Vec3> {
        let mut positions = self.store.positions();
        for creature in &self.creatures {
            positions.extend(creature.voxels.iter().map(|v| v.position));
        }
        positions
    }
}
