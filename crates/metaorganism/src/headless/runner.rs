//! Headless tick loop

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use metaorganism_core::{CreatureId, MetaOrganism};

use super::drop_zone::DropZone;
use super::report::{ConsoleReporter, RunSummary, Snapshot};
use crate::config::{AppConfig, RunConfig};

/// Drives a [`MetaOrganism`] without a window
pub struct Runner {
    organism: MetaOrganism,
    reporter: ConsoleReporter,
    drop_zone: Option<DropZone>,
    run: RunConfig,
}

impl Runner {
    pub fn new(config: AppConfig) -> Result<Self> {
        let reporter = ConsoleReporter::new(
            config.run.ticks,
            config.run.progress,
            config.run.summary_interval_ticks,
        );
        Self::with_reporter(config, reporter)
    }

    pub fn with_reporter(config: AppConfig, reporter: ConsoleReporter) -> Result<Self> {
        config.run.validate()?;
        let AppConfig { run, organism } = config;
        let drop_zone = match &run.drop_zone {
            Some(dir) => Some(DropZone::open(dir, run.poll_interval_ticks)?),
            None => None,
        };

        let started = Instant::now();
        let organism = MetaOrganism::new(organism).context("Failed to create organism")?;
        log::info!(
            "Organism grown in {:.2}s: {}",
            started.elapsed().as_secs_f32(),
            organism.state()
        );

        Ok(Self {
            organism,
            reporter,
            drop_zone,
            run,
        })
    }

    pub fn organism(&self) -> &MetaOrganism {
        &self.organism
    }

    pub fn summary(&self) -> &RunSummary {
        self.reporter.summary()
    }

    /// Spawn a creature from in-memory bytes
    pub fn spawn_bytes(&mut self, label: &str, bytes: &[u8]) -> CreatureId {
        self.organism
            .spawn_creature(label, bytes, &mut self.reporter)
    }

    /// Spawn a creature from a file; unreadable files are logged and skipped
    pub fn spawn_path(&mut self, path: &Path) -> Option<CreatureId> {
        match fs::read(path) {
            Ok(bytes) => {
                let label = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                Some(self.spawn_bytes(&label, &bytes))
            }
            Err(e) => {
                log::error!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Whether the loop should keep ticking after `ticks_run` ticks
    fn keep_running(&self, ticks_run: u64) -> bool {
        match self.run.ticks {
            Some(limit) => ticks_run < limit,
            // A drop zone keeps the organism alive until the process is stopped
            None if self.drop_zone.is_some() => true,
            None => !self.organism.creatures().is_empty(),
        }
    }

    fn poll_drop_zone(&mut self) -> Result<()> {
        let tick = self.organism.state().tick;
        let Some(zone) = self.drop_zone.as_mut() else {
            return Ok(());
        };
        if !zone.is_due(tick) {
            return Ok(());
        }
        for file in zone.poll()? {
            let label = file.label();
            self.organism
                .spawn_creature(&label, &file.bytes, &mut self.reporter);
        }
        Ok(())
    }

    /// Advance one tick
    pub fn step(&mut self) -> Result<()> {
        self.poll_drop_zone()?;
        self.organism.update(self.run.dt, &mut self.reporter);
        Ok(())
    }

    /// Run the loop to completion and write the snapshot if one is configured
    pub fn run(&mut self) -> Result<RunSummary> {
        let frame = Duration::from_secs_f32(self.run.dt.max(0.0));
        let mut ticks_run = 0;

        while self.keep_running(ticks_run) {
            let started = Instant::now();
            self.step()?;
            ticks_run += 1;

            if self.run.realtime {
                let elapsed = started.elapsed();
                if elapsed < frame {
                    std::thread::sleep(frame - elapsed);
                }
            }
        }

        self.reporter.finish();
        log::info!("Finished after {} ticks: {}", ticks_run, self.organism.state());

        if let Some(path) = &self.run.snapshot {
            Snapshot::new(self.organism.state(), self.reporter.summary())
                .save(path)
                .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
        }
        Ok(self.reporter.summary().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metaorganism_core::OrganismConfig;

    fn small_config() -> AppConfig {
        AppConfig {
            run: RunConfig {
                progress: false,
                summary_interval_ticks: 0,
                ..RunConfig::default()
            },
            organism: OrganismConfig::with_voxels(500).seeded(21),
        }
    }

    #[test]
    fn test_bounded_run_counts_ticks() {
        let mut config = small_config();
        config.run.ticks = Some(5);
        let mut runner = Runner::new(config).expect("Failed to create runner");

        let summary = runner.run().expect("Run failed");
        assert_eq!(summary.ticks, 5);
        assert_eq!(runner.organism().state().tick, 5);
    }

    #[test]
    fn test_unbounded_run_stops_when_creatures_resolve() {
        let mut runner = Runner::new(small_config()).expect("Failed to create runner");
        runner.spawn_bytes("note.txt", b"a short note for the organism");
        runner.spawn_bytes("blob.bin", &[0xAB; 512]);

        let summary = runner.run().expect("Run failed");
        assert_eq!(summary.spawned, 2);
        assert_eq!(summary.integrated + summary.rejected, 2);
        assert!(runner.organism().creatures().is_empty());
    }

    #[test]
    fn test_runner_refuses_negative_dt() {
        let mut config = small_config();
        config.run.dt = -0.1;
        assert!(Runner::new(config).is_err());

        let mut config = small_config();
        config.run.dt = f32::INFINITY;
        assert!(Runner::new(config).is_err());
    }

    #[test]
    fn test_missing_file_is_skipped() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut runner = Runner::new(small_config()).expect("Failed to create runner");
        assert!(runner.spawn_path(&dir.path().join("absent.txt")).is_none());
        assert_eq!(runner.summary().spawned, 0);
    }
}
