//! Runner configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults
//! 2. `metaorganism.ron` in the working directory, or an explicit `--config` file
//! 3. Environment variables prefixed with `METAORGANISM_`
//!
//! Command-line flags are applied on top by `main`. Enum values are written
//! as strings in the file, e.g. `borderline: "Reject"`.
//!
//! Example environment variable: `METAORGANISM_ORGANISM__BODY__VOXEL_COUNT=20000`

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use metaorganism_core::OrganismConfig;
use serde::{Deserialize, Serialize};

/// Complete runner configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub organism: OrganismConfig,
}

/// Tick loop and I/O settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Stop after this many ticks; unbounded when `None`
    pub ticks: Option<u64>,
    /// Simulated seconds per tick
    pub dt: f32,
    /// Sleep so one tick takes `dt` of wall time
    pub realtime: bool,
    /// Directory polled for new files
    pub drop_zone: Option<PathBuf>,
    /// Ticks between two drop zone scans
    pub poll_interval_ticks: u64,
    /// Write the final state here as RON
    pub snapshot: Option<PathBuf>,
    /// Draw a progress bar on stderr
    pub progress: bool,
    /// Log a state summary every this many ticks (0 disables)
    pub summary_interval_ticks: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            ticks: None,
            dt: 0.016,
            realtime: false,
            drop_zone: None,
            poll_interval_ticks: 30,
            snapshot: None,
            progress: true,
            summary_interval_ticks: 100,
        }
    }
}

impl RunConfig {
    /// Reject settings the tick loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.dt.is_finite() || self.dt < 0.0 {
            anyhow::bail!("run.dt must be finite and non-negative, got {}", self.dt);
        }
        // Creatures never arrive at dt 0, so the loop needs another way to end
        if self.dt == 0.0 && self.ticks.is_none() && self.drop_zone.is_none() {
            anyhow::bail!("run.dt of 0 needs run.ticks or run.drop_zone");
        }
        Ok(())
    }
}

impl AppConfig {
    /// Check both the run settings and the organism parameters
    pub fn validate(&self) -> Result<()> {
        self.run.validate().context("Invalid run configuration")?;
        self.organism
            .validate()
            .context("Invalid organism configuration")?;
        Ok(())
    }


    /// Load with layered priority, using `metaorganism.ron` if present
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load with layered priority; an explicit `path` must exist
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let defaults =
            Config::try_from(&Self::default()).context("Failed to encode default configuration")?;

        let file = match path {
            Some(path) => File::from(path).format(FileFormat::Ron).required(true),
            None => File::with_name("metaorganism")
                .format(FileFormat::Ron)
                .required(false),
        };

        let builder = Config::builder()
            // Layer 1: Compiled defaults
            .add_source(defaults)
            // Layer 2: Config file
            .add_source(file)
            // Layer 3: Environment variables (METAORGANISM_RUN__DT, etc.)
            .add_source(
                Environment::with_prefix("METAORGANISM")
                    .prefix_separator("_")
                    .separator("__"),
            );

        let config = builder.build().context("Failed to build configuration")?;

        let app: Self = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app.validate()?;
        Ok(app)
    }
}
