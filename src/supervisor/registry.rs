// src/supervisor/registry.rs

use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

/// Persisted record of the pid the supervisor last launched.
pub trait ProcessRegistry: Send + Sync + Debug {
    /// The recorded pid, if a record exists and parses.
    fn get(&self) -> Result<Option<u32>>;

    /// Record a pid, overwriting any prior value.
    fn set(&self, pid: u32) -> Result<()>;

    /// Delete the record. Missing record is not an error.
    fn clear(&self) -> Result<()>;
}

/// File-backed registry: a single line holding the pid.
#[derive(Debug, Clone)]
pub struct FileRegistry {
    path: PathBuf,
}

impl FileRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProcessRegistry for FileRegistry {
    fn get(&self) -> Result<Option<u32>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("reading pid record at {:?}", self.path))?;

        match contents.trim().parse::<u32>() {
            Ok(pid) => Ok(Some(pid)),
            Err(_) => {
                // A mangled record is treated the same as no record; the next
                // start() overwrites it.
                warn!(path = ?self.path, "pid record does not contain a pid; ignoring");
                Ok(None)
            }
        }
    }

    fn set(&self, pid: u32) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating pid record directory {:?}", parent))?;
            }
        }

        fs::write(&self.path, format!("{pid}\n"))
            .with_context(|| format!("writing pid record at {:?}", self.path))
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("removing pid record at {:?}", self.path))
            }
        }
    }
}
