//! # Metaorganism - headless runner
//!
//! Feeds files to a living voxel body and reports what it accepts or rejects.

pub mod config;
pub mod headless;

pub use config::{AppConfig, RunConfig};
pub use headless::Runner;
