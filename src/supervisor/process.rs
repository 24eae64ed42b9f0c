// src/supervisor/process.rs

//! OS process table access and application launching.
//!
//! Both seams are traits; the production implementations sit on `sysinfo`
//! and `sh -c`, and [`super::mock`] provides in-memory stand-ins.

use std::fmt::Debug;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::Stdio;

use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System, UpdateKind};
use tracing::{debug, info};

use crate::errors::OsError;

/// Liveness checks and termination against the OS process table.
pub trait ProcessTable: Send + Debug {
    /// Whether `pid` currently maps to a live process.
    fn alive(&mut self, pid: u32) -> bool;

    /// Terminate `pid`. `NoSuchProcess` is returned for a pid that is
    /// already gone; the caller decides whether that counts as success.
    fn terminate(&mut self, pid: u32) -> Result<(), OsError>;

    /// Terminate every process whose command line contains `signature`,
    /// excluding the calling process. Returns how many were signalled.
    fn terminate_matching(&mut self, signature: &str) -> usize;
}

/// `sysinfo`-backed process table.
pub struct SystemTable {
    system: System,
}

impl Debug for SystemTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemTable").finish_non_exhaustive()
    }
}

impl SystemTable {
    pub fn new() -> Self {
        let system = System::new_with_specifics(
            RefreshKind::nothing()
                .with_processes(ProcessRefreshKind::nothing().with_cmd(UpdateKind::Always)),
        );
        Self { system }
    }

    fn refresh_pid(&mut self, pid: u32) {
        self.system.refresh_processes(
            ProcessesToUpdate::Some(&[Pid::from_u32(pid)]),
            true,
        );
    }
}

impl Default for SystemTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemTable {
    fn alive(&mut self, pid: u32) -> bool {
        self.refresh_pid(pid);
        self.system.process(Pid::from_u32(pid)).is_some()
    }

    fn terminate(&mut self, pid: u32) -> Result<(), OsError> {
        self.refresh_pid(pid);
        match self.system.process(Pid::from_u32(pid)) {
            Some(process) => {
                if process.kill() {
                    Ok(())
                } else {
                    Err(OsError::SignalFailed {
                        pid,
                        reason: "kill signal not delivered".to_string(),
                    })
                }
            }
            None => Err(OsError::NoSuchProcess(pid)),
        }
    }

    fn terminate_matching(&mut self, signature: &str) -> usize {
        self.system
            .refresh_processes(ProcessesToUpdate::All, true);

        let own_pid = std::process::id();
        let mut killed = 0;

        for (pid, process) in self.system.processes() {
            if pid.as_u32() == own_pid {
                continue;
            }

            let cmdline = process
                .cmd()
                .iter()
                .map(|part| part.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ");

            if cmdline.contains(signature) {
                debug!(pid = pid.as_u32(), cmdline = %cmdline, "killing matching process");
                if process.kill() {
                    killed += 1;
                }
            }
        }

        killed
    }
}

/// Launches the supervised application.
pub trait AppLauncher: Send + Debug {
    /// Spawn the application detached, with output going to its log.
    /// Returns the new pid.
    fn launch(&self) -> Result<u32, OsError>;
}

/// Runs the configured shell command via `sh -c` with stdout/stderr appended
/// to the app log file. The child is placed in its own process group so it
/// survives the supervisor exiting.
#[derive(Debug, Clone)]
pub struct ShellLauncher {
    command: String,
    log_file: PathBuf,
}

impl ShellLauncher {
    pub fn new(command: impl Into<String>, log_file: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            log_file: log_file.into(),
        }
    }
}

impl AppLauncher for ShellLauncher {
    fn launch(&self) -> Result<u32, OsError> {
        if let Some(parent) = self.log_file.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)?;
        let log_err = log.try_clone()?;

        let mut cmd = if cfg!(windows) {
            let mut c = std::process::Command::new("cmd");
            c.arg("/C").arg(&self.command);
            c
        } else {
            let mut c = std::process::Command::new("sh");
            c.arg("-c").arg(&self.command);
            c
        };

        cmd.stdin(Stdio::null()).stdout(log).stderr(log_err);

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let child = cmd.spawn().map_err(|source| OsError::LaunchFailed {
            command: self.command.clone(),
            source,
        })?;

        let pid = child.id();
        info!(pid, cmd = %self.command, "launched application process");
        Ok(pid)
    }
}
