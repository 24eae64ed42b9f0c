// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Most modules use `anyhow` directly; the structured exception is
//! [`OsError`], returned explicitly by process-table operations so the
//! supervisor's log-and-continue policy stays auditable instead of being
//! buried inside the seams.

use thiserror::Error;

/// Failure of an OS-level process operation (liveness check, termination,
/// launch). Callers treat these as best-effort and typically log-and-continue.
#[derive(Error, Debug)]
pub enum OsError {
    #[error("no such process: pid {0}")]
    NoSuchProcess(u32),

    #[error("failed to signal pid {pid}: {reason}")]
    SignalFailed { pid: u32, reason: String },

    #[error("failed to launch '{command}': {source}")]
    LaunchFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub use anyhow::{Error, Result};
