//! Organism event observers
//!
//! The kernel reports what happens through this trait instead of owning any
//! UI. Callers pass `&mut dyn OrganismObserver` into each mutating call.

use metaorganism_voxel::CreatureId;

use super::response::{IntegrationReport, RejectionReport};
use super::state::OrganismState;

/// Receives organism events; every hook defaults to a no-op
pub trait OrganismObserver {
    /// A creature was spawned and starts traveling
    fn on_spawn(&mut self, _id: CreatureId, _label: &str, _voxels: usize) {}

    fn on_integration(&mut self, _report: &IntegrationReport) {}

    fn on_rejection(&mut self, _report: &RejectionReport) {}

    /// Called once at the end of every update
    fn on_tick(&mut self, _state: &OrganismState) {}
}

/// Observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl OrganismObserver for NoopObserver {}

/// Single recorded event
#[derive(Debug, Clone, PartialEq)]
pub enum OrganismEvent {
    Spawned {
        id: CreatureId,
        label: String,
        voxels: usize,
    },
    Integrated(IntegrationReport),
    Rejected(RejectionReport),
}

/// Buffers events and the latest state until drained
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<OrganismEvent>,
    latest: Option<OrganismState>,
    ticks: u64,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[OrganismEvent] {
        &self.events
    }

    /// Take all buffered events, leaving the log empty
    pub fn drain(&mut self) -> Vec<OrganismEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn latest_state(&self) -> Option<&OrganismState> {
        self.latest.as_ref()
    }

    /// Number of `on_tick` calls seen
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn integrations(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, OrganismEvent::Integrated(_)))
            .count()
    }

    pub fn rejections(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, OrganismEvent::Rejected(_)))
            .count()
    }
}

impl OrganismObserver for EventLog {
    fn on_spawn(&mut self, id: CreatureId, label: &str, voxels: usize) {
        self.events.push(OrganismEvent::Spawned {
            id,
            label: label.to_string(),
            voxels,
        });
    }

    fn on_integration(&mut self, report: &IntegrationReport) {
        self.events.push(OrganismEvent::Integrated(report.clone()));
    }

    fn on_rejection(&mut self, report: &RejectionReport) {
        self.events.push(OrganismEvent::Rejected(report.clone()));
    }

    fn on_tick(&mut self, state: &OrganismState) {
        self.ticks += 1;
        self.latest = Some(state.clone());
    }
}
