use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use tracing::trace;

use crate::error::{DefError, DefResult};

/// Watches the modification time of an editor snapshot file.
///
/// Checks are rate limited to `interval`; the caller supplies `now` so the
/// cadence stays deterministic under test.
#[derive(Debug, Clone)]
pub struct SnapshotWatcher {
    path: PathBuf,
    interval: Duration,
    last_modified: Option<SystemTime>,
    last_check: Option<Instant>,
}

impl SnapshotWatcher {
    /// Arms a watcher with the file's current modification time as baseline.
    pub fn arm(path: impl Into<PathBuf>, interval: Duration) -> DefResult<Self> {
        let path = path.into();
        let last_modified = Some(modified(&path)?);
        Ok(Self {
            path,
            interval,
            last_modified,
            last_check: None,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Returns `true` when the file changed since the last observed change.
    ///
    /// Calls closer than `interval` to the previous check return `false`
    /// without touching the file system.
    pub fn poll(&mut self, now: Instant) -> DefResult<bool> {
        if let Some(previous) = self.last_check {
            if now.saturating_duration_since(previous) < self.interval {
                return Ok(false);
            }
        }
        self.last_check = Some(now);

        let current = modified(&self.path)?;
        if self.last_modified == Some(current) {
            return Ok(false);
        }
        trace!(path = %self.path.display(), "editor snapshot changed");
        self.last_modified = Some(current);
        Ok(true)
    }
}

fn modified(path: &Path) -> DefResult<SystemTime> {
    std::fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|source| DefError::io(path, source))
}
