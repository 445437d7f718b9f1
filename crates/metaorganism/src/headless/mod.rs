//! Headless driver for the meta-organism
//!
//! - Drop zone polling for new files
//! - Console reporting with a progress bar
//! - RON snapshots of the final state

mod drop_zone;
mod report;
mod runner;

pub use drop_zone::{DropZone, DroppedFile};
pub use report::{ConsoleReporter, RunSummary, Snapshot};
pub use runner::Runner;
