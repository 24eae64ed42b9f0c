// src/supervisor/mod.rs

//! Lifecycle supervision of the single managed application process.
//!
//! The supervisor tracks two states, `Running` and `Stopped`, derived from
//! the pid record plus the OS process table. Transitions are fire-and-forget:
//! there are no intermediate states and no monitor loop. Self-healing comes
//! from an external periodic trigger invoking [`Supervisor::reconcile`].
//!
//! All OS-level failures are surfaced as explicit `OsError`s by the seams in
//! [`process`] and then handled here as log-and-continue.

pub mod mock;
pub mod process;
pub mod registry;

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use time::OffsetDateTime;
use time::macros::format_description;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::AppSection;
use crate::errors::OsError;

pub use process::{AppLauncher, ProcessTable, ShellLauncher, SystemTable};
pub use registry::{FileRegistry, ProcessRegistry};

/// Observed state of the supervised application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running(u32),
    Stopped,
}

/// Owns the lifecycle of one named external process.
#[derive(Debug)]
pub struct Supervisor {
    name: String,
    signature: String,
    log_file: PathBuf,
    restart_delay: Duration,
    startup_grace: Duration,

    registry: Box<dyn ProcessRegistry>,
    table: Box<dyn ProcessTable>,
    launcher: Box<dyn AppLauncher>,
}

impl Supervisor {
    /// Wire up the production implementations from the `[app]` config.
    pub fn from_config(app: &AppSection) -> Self {
        let registry = Box::new(FileRegistry::new(&app.pid_file));
        let table = Box::new(SystemTable::new());
        let launcher = Box::new(ShellLauncher::new(&app.command, &app.log_file));
        Self::with_parts(app, registry, table, launcher)
    }

    /// Construct with injected seams. Tests use this with the mocks in
    /// [`mock`].
    pub fn with_parts(
        app: &AppSection,
        registry: Box<dyn ProcessRegistry>,
        table: Box<dyn ProcessTable>,
        launcher: Box<dyn AppLauncher>,
    ) -> Self {
        Self {
            name: app.name.clone(),
            signature: app.effective_signature().to_string(),
            log_file: PathBuf::from(&app.log_file),
            restart_delay: Duration::from_secs(app.restart_delay_secs),
            startup_grace: Duration::from_millis(app.startup_grace_ms),
            registry,
            table,
            launcher,
        }
    }

    /// Current state: `Running` iff a pid record exists, parses, and the pid
    /// is live in the process table. No side effects.
    pub fn status(&mut self) -> Status {
        let pid = match self.registry.get() {
            Ok(Some(pid)) => pid,
            Ok(None) => return Status::Stopped,
            Err(e) => {
                warn!(error = %e, "could not read pid record; treating as stopped");
                return Status::Stopped;
            }
        };

        if self.table.alive(pid) {
            Status::Running(pid)
        } else {
            // Stale record: the process died or was killed externally. The
            // record is left in place; start() overwrites, stop() clears.
            debug!(pid, "pid record is stale");
            Status::Stopped
        }
    }

    /// Start the application if it is not already running.
    ///
    /// Before launching, any stray process matching the command signature
    /// is killed (orphaned instances are not tracked by the record). After
    /// launching, the pid is only recorded once the child has outlived a
    /// short grace period.
    pub async fn start(&mut self) -> Result<()> {
        if let Status::Running(pid) = self.status() {
            println!("{} is already running (pid {pid})", self.name);
            self.log_event(&format!("start requested but already running (pid {pid})"));
            return Ok(());
        }

        let strays = self.table.terminate_matching(&self.signature);
        if strays > 0 {
            warn!(count = strays, "killed untracked instances before start");
        }

        self.log_event("starting");

        let pid = match self.launcher.launch() {
            Ok(pid) => pid,
            Err(e) => {
                error!(app = %self.name, error = %e, "launch failed");
                self.log_event(&format!("launch failed: {e}"));
                return Ok(());
            }
        };

        // The pid is only trusted once the child has survived the grace
        // window; a launch that dies instantly (missing executable, bad
        // working directory) must not be recorded.
        sleep(self.startup_grace).await;

        if !self.table.alive(pid) {
            error!(app = %self.name, pid, "process died during startup");
            self.log_event(&format!("pid {pid} died during startup; not recorded"));
            self.registry.clear()?;
            return Ok(());
        }

        self.registry.set(pid)?;
        info!(app = %self.name, pid, "started");
        self.log_event(&format!("started (pid {pid})"));
        Ok(())
    }

    /// Stop unconditionally. Idempotent: a missing record or an already-dead
    /// pid are both treated as success.
    pub async fn stop(&mut self) -> Result<()> {
        match self.registry.get() {
            Ok(Some(pid)) => match self.table.terminate(pid) {
                Ok(()) => info!(app = %self.name, pid, "terminated recorded pid"),
                Err(OsError::NoSuchProcess(_)) => {
                    debug!(pid, "recorded pid already gone");
                }
                Err(e) => warn!(pid, error = %e, "could not terminate recorded pid"),
            },
            Ok(None) => debug!("no pid record to terminate"),
            Err(e) => warn!(error = %e, "could not read pid record during stop"),
        }

        // The record can be missing or point at an unrelated pid; the
        // signature sweep covers both.
        let strays = self.table.terminate_matching(&self.signature);
        if strays > 0 {
            debug!(count = strays, "killed matching instances during stop");
        }

        self.registry.clear()?;
        self.log_event("stopped");
        Ok(())
    }

    /// Stop, wait a fixed delay for OS resource release, then start.
    ///
    /// Not atomic: an observer during the delay window sees `Stopped`.
    pub async fn restart(&mut self) -> Result<()> {
        self.log_event("restart requested");
        self.stop().await?;
        sleep(self.restart_delay).await;
        self.start().await
    }

    /// Start only if stopped. The default no-argument action, intended to be
    /// invoked periodically by cron to self-heal crashed processes.
    pub async fn reconcile(&mut self) -> Result<()> {
        match self.status() {
            Status::Running(pid) => {
                debug!(app = %self.name, pid, "reconcile: already running");
                Ok(())
            }
            Status::Stopped => {
                info!(app = %self.name, "reconcile: not running, starting");
                self.start().await
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a timestamped lifecycle line to the app log. Best-effort; a
    /// write failure is only debug-logged.
    fn log_event(&self, event: &str) {
        let line = format!("[{}] appkeeper: {}\n", event_timestamp(), event);

        let result = (|| -> std::io::Result<()> {
            if let Some(parent) = self.log_file.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_file)?;
            file.write_all(line.as_bytes())
        })();

        if let Err(e) = result {
            debug!(path = ?self.log_file, error = %e, "could not append lifecycle event");
        }
    }
}

fn event_timestamp() -> String {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let fmt = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    now.format(&fmt).unwrap_or_else(|_| "unknown-time".to_string())
}
