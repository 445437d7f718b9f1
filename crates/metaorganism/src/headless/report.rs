//! Console reporting and RON snapshots

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use metaorganism_core::{
    CreatureId, IntegrationReport, OrganismObserver, OrganismState, RejectionReport,
};
use serde::{Deserialize, Serialize};

/// Totals collected over one run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: u64,
    pub spawned: usize,
    pub integrated: usize,
    pub rejected: usize,
    /// Integrations from the uncertain middle band
    pub borderline: usize,
    pub voxels_gained: usize,
    pub voxels_lost: usize,
}

/// Observer that logs organism events and tracks a [`RunSummary`]
pub struct ConsoleReporter {
    summary: RunSummary,
    progress: ProgressBar,
    summary_interval_ticks: u64,
}

impl ConsoleReporter {
    /// Reporter with a progress bar over `ticks`, or a spinner when unbounded
    pub fn new(ticks: Option<u64>, show_progress: bool, summary_interval_ticks: u64) -> Self {
        let progress = match (show_progress, ticks) {
            (false, _) => ProgressBar::hidden(),
            (true, Some(total)) => {
                let pb = ProgressBar::new(total);
                pb.set_style(Self::progress_style());
                pb
            }
            (true, None) => ProgressBar::new_spinner(),
        };
        Self {
            summary: RunSummary::default(),
            progress,
            summary_interval_ticks,
        }
    }

    /// Reporter that draws nothing
    pub fn quiet() -> Self {
        Self::new(None, false, 0)
    }

    fn progress_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓░")
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Event lines go through the log while no bar is drawn
    pub fn logs_events(&self) -> bool {
        self.progress.is_hidden()
    }

    fn emit(&self, line: String) {
        if self.logs_events() {
            log::info!("{}", line);
        } else {
            self.progress.println(line);
        }
    }

    pub fn finish(&self) {
        self.progress.finish_and_clear();
    }
}

impl OrganismObserver for ConsoleReporter {
    fn on_spawn(&mut self, id: CreatureId, label: &str, voxels: usize) {
        self.summary.spawned += 1;
        log::debug!("{} spawned from {} with {} voxels", id, label, voxels);
    }

    fn on_integration(&mut self, report: &IntegrationReport) {
        self.summary.integrated += 1;
        self.summary.voxels_gained += report.voxels_added;
        if report.borderline {
            self.summary.borderline += 1;
        }
        self.emit(format!(
            "+ integrated {} (sem {:.2}, emo {:.2}): +{} voxels",
            report.label, report.semantic_similarity, report.emotion_similarity, report.voxels_added
        ));
    }

    fn on_rejection(&mut self, report: &RejectionReport) {
        self.summary.rejected += 1;
        self.summary.voxels_lost += report.voxels_lost;
        self.emit(format!(
            "- rejected {} (sem {:.2}, severity {:.2}): -{} voxels, {} traumatized",
            report.label,
            report.semantic_similarity,
            report.severity,
            report.voxels_lost,
            report.voxels_traumatized
        ));
    }

    fn on_tick(&mut self, state: &OrganismState) {
        self.summary.ticks += 1;
        self.progress.inc(1);
        self.progress.set_message(format!(
            "health {:.0}% {}",
            state.health * 100.0,
            state.mood
        ));
        if self.summary_interval_ticks > 0 && state.tick % self.summary_interval_ticks == 0 {
            log::info!("{}", state);
        }
    }
}

/// Final organism state written at the end of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// RFC 3339 wall-clock time of the snapshot
    pub timestamp: String,
    pub state: OrganismState,
    pub summary: RunSummary,
}

impl Snapshot {
    pub fn new(state: &OrganismState, summary: &RunSummary) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            state: state.clone(),
            summary: summary.clone(),
        }
    }

    /// Save as pretty RON, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create snapshot directory")?;
        }
        let text = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .context("Failed to serialize snapshot")?;
        fs::write(path, text).context("Failed to write snapshot")?;
        log::info!("Snapshot written to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path).context("Failed to read snapshot")?;
        ron::from_str(&text).context("Failed to parse snapshot")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integration(borderline: bool) -> IntegrationReport {
        IntegrationReport {
            creature: CreatureId::from_raw(1),
            label: "good.py".into(),
            semantic_similarity: 0.2,
            emotion_similarity: 0.9,
            voxels_offered: 600,
            voxels_added: 550,
            borderline,
        }
    }

    #[test]
    fn test_reporter_tracks_summary() {
        let mut reporter = ConsoleReporter::quiet();
        reporter.on_spawn(CreatureId::from_raw(1), "good.py", 600);
        reporter.on_integration(&integration(true));
        reporter.on_rejection(&RejectionReport {
            creature: CreatureId::from_raw(2),
            label: "bad.exe".into(),
            semantic_similarity: -0.4,
            emotion_similarity: 0.3,
            severity: 1.0,
            voxels_lost: 12,
            voxels_traumatized: 40,
        });
        reporter.on_tick(&OrganismState::default());

        let summary = reporter.summary();
        assert_eq!(summary.spawned, 1);
        assert_eq!(summary.integrated, 1);
        assert_eq!(summary.borderline, 1);
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.voxels_gained, 550);
        assert_eq!(summary.voxels_lost, 12);
        assert_eq!(summary.ticks, 1);
    }

    #[test]
    fn test_hidden_bar_falls_back_to_log() {
        assert!(ConsoleReporter::quiet().logs_events());
        let mut reporter = ConsoleReporter::new(Some(100), false, 10);
        assert!(reporter.logs_events());
        reporter.on_integration(&integration(false));
        assert_eq!(reporter.summary().integrated, 1);
        assert_eq!(reporter.summary().borderline, 0);
    }

    #[test]
    fn test_snapshot_save_and_load() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("out").join("state.ron");
        let state = OrganismState {
            tick: 42,
            health: 0.8,
            last_event: "Integrated good.py".into(),
            ..OrganismState::default()
        };
        let summary = RunSummary {
            ticks: 42,
            integrated: 1,
            ..RunSummary::default()
        };

        Snapshot::new(&state, &summary).save(&path).expect("Failed to save");
        let loaded = Snapshot::load(&path).expect("Failed to load");
        assert_eq!(loaded.state, state);
        assert_eq!(loaded.summary, summary);
        assert!(chrono::DateTime::parse_from_rfc3339(&loaded.timestamp).is_ok());
    }
}
