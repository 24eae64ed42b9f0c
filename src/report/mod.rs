// src/report/mod.rs

//! Report job glue.
//!
//! One invocation produces one dated artifact: a header block, the combined
//! stdout/stderr of the external generator, and a trailer recording whether
//! the generator exited cleanly. A one-line record also goes to a rolling
//! activity log. Nothing is retried or escalated; a failure is visible only
//! to whoever reads the artifact or the log.

pub mod prune;

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use anyhow::{Context, Result};
use time::macros::format_description;
use time::{Date, OffsetDateTime};
use tokio::process::Command;
use tracing::{info, warn};

use crate::config::ReportSection;

pub use prune::prune_artifacts;

pub(crate) const ARTIFACT_PREFIX: &str = "daily_report_";
pub(crate) const ARTIFACT_SUFFIX: &str = ".txt";

/// Result of one generator invocation, as recorded in the trailer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    Success,
    Failed(i32),
}

impl fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportOutcome::Success => write!(f, "SUCCESS"),
            ReportOutcome::Failed(code) => write!(f, "FAILED({code})"),
        }
    }
}

/// Wraps the external report generator.
#[derive(Debug, Clone)]
pub struct ReportJob {
    cfg: ReportSection,
}

impl ReportJob {
    pub fn new(cfg: ReportSection) -> Self {
        Self { cfg }
    }

    /// Deterministic artifact path for a given date.
    pub fn artifact_path(&self, date: Date) -> PathBuf {
        let fmt = format_description!("[year]-[month]-[day]");
        let key = date.format(&fmt).unwrap_or_else(|_| "unknown-date".to_string());
        Path::new(&self.cfg.reports_dir).join(format!("{ARTIFACT_PREFIX}{key}{ARTIFACT_SUFFIX}"))
    }

    /// Run the generator once for the date of `now`.
    ///
    /// The artifact for that date is (re)created, so repeating a run on the
    /// same day replaces the earlier artifact rather than duplicating it.
    pub async fn run(&self, now: OffsetDateTime) -> Result<ReportOutcome> {
        fs::create_dir_all(&self.cfg.reports_dir)
            .with_context(|| format!("creating reports directory {:?}", self.cfg.reports_dir))?;

        let path = self.artifact_path(now.date());
        let mut artifact = File::create(&path)
            .with_context(|| format!("creating report artifact {:?}", path))?;

        self.write_header(&mut artifact, now)
            .with_context(|| format!("writing report header to {:?}", path))?;

        let outcome = self.run_generator(&artifact).await;

        self.write_trailer(&mut artifact, outcome)
            .with_context(|| format!("writing report trailer to {:?}", path))?;

        info!(artifact = ?path, outcome = %outcome, "report run finished");
        self.append_activity(now, &path, outcome);

        Ok(outcome)
    }

    fn write_header(&self, artifact: &mut File, now: OffsetDateTime) -> std::io::Result<()> {
        let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        let stamp = now.format(&fmt).unwrap_or_else(|_| "unknown-time".to_string());

        writeln!(artifact, "{}", "=".repeat(70))?;
        writeln!(
            artifact,
            "DAILY REPORT - {} ({})",
            self.cfg.label, self.cfg.ticker
        )?;
        writeln!(artifact, "Generated: {stamp}")?;
        writeln!(artifact, "{}", "=".repeat(70))?;
        writeln!(artifact)?;
        artifact.flush()
    }

    /// Spawn the generator with the artifact as combined stdout/stderr and
    /// map its exit status. Spawn failures become `Failed(-1)`.
    async fn run_generator(&self, artifact: &File) -> ReportOutcome {
        let stdio = match (artifact.try_clone(), artifact.try_clone()) {
            (Ok(out), Ok(err)) => (out, err),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "could not clone artifact handle for generator output");
                return ReportOutcome::Failed(-1);
            }
        };

        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(format!(
                "{} {} {}",
                self.cfg.command, self.cfg.ticker, self.cfg.label
            ));
            c
        } else {
            // "$@" carries ticker and label through intact; the extra
            // "appkeeper" argument is consumed as $0 by `sh -c`.
            let mut c = Command::new("sh");
            c.arg("-c").arg(format!("{} \"$@\"", self.cfg.command));
            c.arg("appkeeper").arg(&self.cfg.ticker).arg(&self.cfg.label);
            c
        };

        cmd.stdin(Stdio::null())
            .stdout(Stdio::from(stdio.0))
            .stderr(Stdio::from(stdio.1));

        match cmd.status().await {
            Ok(status) if status.success() => ReportOutcome::Success,
            Ok(status) => ReportOutcome::Failed(status.code().unwrap_or(-1)),
            Err(e) => {
                warn!(cmd = %self.cfg.command, error = %e, "could not run generator");
                ReportOutcome::Failed(-1)
            }
        }
    }

    fn write_trailer(&self, artifact: &mut File, outcome: ReportOutcome) -> std::io::Result<()> {
        writeln!(artifact)?;
        writeln!(artifact, "{}", "-".repeat(70))?;
        match outcome {
            ReportOutcome::Success => writeln!(artifact, "SUCCESS - report generated")?,
            ReportOutcome::Failed(code) => {
                writeln!(artifact, "FAILED - generator exited with code {code}")?
            }
        }
        artifact.flush()
    }

    /// One line per invocation in the rolling activity log. Best-effort.
    fn append_activity(&self, now: OffsetDateTime, artifact: &Path, outcome: ReportOutcome) {
        let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
        let stamp = now.format(&fmt).unwrap_or_else(|_| "unknown-time".to_string());
        let name = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let line = format!("[{stamp}] {name} {outcome}\n");

        let result = (|| -> std::io::Result<()> {
            let path = Path::new(&self.cfg.activity_log);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(line.as_bytes())
        })();

        if let Err(e) = result {
            warn!(path = %self.cfg.activity_log, error = %e, "could not append activity line");
        }
    }
}

/// Wall-clock now in the local offset, falling back to UTC when the local
/// offset cannot be determined (multi-threaded runtimes on some platforms).
pub fn local_now() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
