use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use metaorganism::{AppConfig, Runner};
use metaorganism_core::BorderlinePolicy;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Borderline {
    /// Accept creatures in the uncertain band
    Integrate,
    /// Reject them at the floor severity
    Reject,
}

impl From<Borderline> for BorderlinePolicy {
    fn from(value: Borderline) -> Self {
        match value {
            Borderline::Integrate => BorderlinePolicy::Integrate,
            Borderline::Reject => BorderlinePolicy::Reject,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Files to feed to the organism at startup
    files: Vec<PathBuf>,

    /// Configuration file (RON); defaults to ./metaorganism.ron if present
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of body voxels to grow
    #[arg(long)]
    voxels: Option<usize>,

    /// Stop after this many ticks
    #[arg(long)]
    ticks: Option<u64>,

    /// Simulated seconds per tick
    #[arg(long)]
    dt: Option<f32>,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Directory watched for new files
    #[arg(long)]
    drop_zone: Option<PathBuf>,

    /// Pace ticks to wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Write the final state to this RON file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// What to do with creatures in the uncertain band
    #[arg(long, value_enum)]
    borderline: Option<Borderline>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    /// Apply flags on top of the loaded configuration
    fn apply(&self, config: &mut AppConfig) {
        if let Some(voxels) = self.voxels {
            config.organism.body.voxel_count = voxels;
        }
        if let Some(seed) = self.seed {
            config.organism.seed = Some(seed);
        }
        if let Some(borderline) = self.borderline {
            config.organism.compatibility.borderline = borderline.into();
        }
        if self.ticks.is_some() {
            config.run.ticks = self.ticks;
        }
        if let Some(dt) = self.dt {
            config.run.dt = dt;
        }
        if self.drop_zone.is_some() {
            config.run.drop_zone = self.drop_zone.clone();
        }
        if self.snapshot.is_some() {
            config.run.snapshot = self.snapshot.clone();
        }
        config.run.realtime |= self.realtime;
        if self.no_progress {
            config.run.progress = false;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let mut config = AppConfig::load_from(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    let mut runner = Runner::new(config)?;
    for path in &args.files {
        runner.spawn_path(path);
    }

    let summary = runner.run()?;
    log::info!(
        "Spawned {}, integrated {} ({} borderline), rejected {}; +{} / -{} voxels",
        summary.spawned,
        summary.integrated,
        summary.borderline,
        summary.rejected,
        summary.voxels_gained,
        summary.voxels_lost
    );
    Ok(())
}
