//! Directory watcher that turns new files into creatures

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// A file picked up from the drop zone
#[derive(Debug, Clone)]
pub struct DroppedFile {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl DroppedFile {
    /// File name for logs and creature labels
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Polls a directory and yields each regular file exactly once
#[derive(Debug)]
pub struct DropZone {
    dir: PathBuf,
    poll_interval_ticks: u64,
    seen: HashSet<PathBuf>,
}

impl DropZone {
    /// Open `dir`, creating it if missing
    pub fn open(dir: impl Into<PathBuf>, poll_interval_ticks: u64) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create drop zone {}", dir.display()))?;
        log::info!("Drop zone: {}", dir.display());
        Ok(Self {
            dir,
            poll_interval_ticks: poll_interval_ticks.max(1),
            seen: HashSet::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Whether `tick` is a scan tick
    pub fn is_due(&self, tick: u64) -> bool {
        tick % self.poll_interval_ticks == 0
    }

    /// Read every regular file not returned before, in name order
    ///
    /// Unreadable files are logged and retried on the next poll.
    pub fn poll(&mut self) -> Result<Vec<DroppedFile>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to scan drop zone {}", self.dir.display()))?;

        let mut fresh: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|entry| entry.path())
            .filter(|path| !self.seen.contains(path))
            .collect();
        fresh.sort();

        let mut dropped = Vec::with_capacity(fresh.len());
        for path in fresh {
            match fs::read(&path) {
                Ok(bytes) => {
                    self.seen.insert(path.clone());
                    dropped.push(DroppedFile { path, bytes });
                }
                Err(e) => log::warn!("Skipping {}: {}", path.display(), e),
            }
        }
        Ok(dropped)
    }

    /// Number of files picked up so far
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_creates_directory() {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        let dir = root.path().join("drop_zone");
        let zone = DropZone::open(&dir, 10).expect("Failed to open drop zone");
        assert!(dir.is_dir());
        assert_eq!(zone.dir(), dir.as_path());
    }

    #[test]
    fn test_poll_returns_each_file_once() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut zone = DropZone::open(dir.path(), 1).expect("Failed to open drop zone");

        fs::write(dir.path().join("b.txt"), b"beta").unwrap();
        fs::write(dir.path().join("a.txt"), b"alpha").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();

        let first = zone.poll().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].label(), "a.txt");
        assert_eq!(first[0].bytes, b"alpha");
        assert_eq!(first[1].label(), "b.txt");

        assert!(zone.poll().unwrap().is_empty());

        fs::write(dir.path().join("c.bin"), [0u8, 1, 2]).unwrap();
        let second = zone.poll().unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].label(), "c.bin");
        assert_eq!(zone.seen_count(), 3);
    }

    #[test]
    fn test_is_due_follows_interval() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let zone = DropZone::open(dir.path(), 30).expect("Failed to open drop zone");
        assert!(zone.is_due(0));
        assert!(!zone.is_due(29));
        assert!(zone.is_due(60));

        let every_tick = DropZone::open(dir.path(), 0).expect("Failed to open drop zone");
        assert!(every_tick.is_due(7));
    }
}
