// src/report/prune.rs

use std::fs;
use std::path::Path;
use std::time::{Duration, SystemTime};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::{ARTIFACT_PREFIX, ARTIFACT_SUFFIX};

/// Delete report artifacts whose mtime is older than the retention window.
///
/// Only files matching the `daily_report_*.txt` naming pattern are
/// candidates; unrelated files in the reports directory are never touched.
/// Age is computed against the `now` passed by the caller.
///
/// Returns the number of deleted artifacts. A missing reports directory is
/// treated as "nothing to prune".
pub fn prune_artifacts(dir: &Path, retention_days: u64, now: SystemTime) -> Result<usize> {
    if !dir.is_dir() {
        return Ok(0);
    }

    let max_age = Duration::from_secs(retention_days * 24 * 60 * 60);
    let mut deleted = 0;

    let entries =
        fs::read_dir(dir).with_context(|| format!("reading reports directory {:?}", dir))?;

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "skipping unreadable directory entry");
                continue;
            }
        };

        let path = entry.path();
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.starts_with(ARTIFACT_PREFIX) || !name.ends_with(ARTIFACT_SUFFIX) {
            continue;
        }

        let mtime = match entry.metadata().and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(e) => {
                warn!(path = ?path, error = %e, "could not read artifact mtime; skipping");
                continue;
            }
        };

        // duration_since errors when mtime is in the future (clock skew);
        // such artifacts are never pruned.
        let expired = now
            .duration_since(mtime)
            .map_or(false, |age| age > max_age);

        if !expired {
            debug!(path = ?path, "artifact within retention window");
            continue;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                info!(path = ?path, "pruned expired artifact");
                deleted += 1;
            }
            Err(e) => warn!(path = ?path, error = %e, "could not prune artifact"),
        }
    }

    Ok(deleted)
}
