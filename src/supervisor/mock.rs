// src/supervisor/mock.rs

//! In-memory implementations of the supervisor seams.
//!
//! [`MockWorld`] is a tiny fake process table shared between a
//! [`MockTable`], a [`MockLauncher`] and the test itself, so lifecycle
//! sequences can be driven deterministically without spawning anything.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use anyhow::Result;

use super::process::{AppLauncher, ProcessTable};
use super::registry::ProcessRegistry;
use crate::errors::OsError;

#[derive(Debug, Default)]
struct WorldInner {
    alive: HashSet<u32>,
    /// Pids whose command line would match the app signature.
    matching: HashSet<u32>,
    next_pid: u32,
    launches: usize,
    terminations: usize,
    fail_launch: bool,
    die_after_launch: bool,
}

/// Shared fake process world.
#[derive(Debug, Clone)]
pub struct MockWorld {
    inner: Arc<Mutex<WorldInner>>,
}

impl MockWorld {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(WorldInner {
                next_pid: 100,
                ..WorldInner::default()
            })),
        }
    }

    pub fn table(&self) -> MockTable {
        MockTable {
            world: self.clone(),
        }
    }

    pub fn launcher(&self) -> MockLauncher {
        MockLauncher {
            world: self.clone(),
        }
    }

    /// Add a live process that matches the signature but is not tracked by
    /// any registry (an orphaned instance).
    pub fn spawn_untracked(&self, pid: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.alive.insert(pid);
        inner.matching.insert(pid);
    }

    /// Kill a process from outside the supervisor (e.g. OOM, manual kill).
    pub fn kill_externally(&self, pid: u32) {
        self.inner.lock().unwrap().alive.remove(&pid);
    }

    pub fn is_alive(&self, pid: u32) -> bool {
        self.inner.lock().unwrap().alive.contains(&pid)
    }

    pub fn launches(&self) -> usize {
        self.inner.lock().unwrap().launches
    }

    pub fn terminations(&self) -> usize {
        self.inner.lock().unwrap().terminations
    }

    /// Make the next launch return an error (e.g. missing executable).
    pub fn set_fail_launch(&self, fail: bool) {
        self.inner.lock().unwrap().fail_launch = fail;
    }

    /// Make launched processes die immediately, before any grace check.
    pub fn set_die_after_launch(&self, die: bool) {
        self.inner.lock().unwrap().die_after_launch = die;
    }
}

impl Default for MockWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// `ProcessTable` view of a [`MockWorld`].
#[derive(Debug)]
pub struct MockTable {
    world: MockWorld,
}

impl ProcessTable for MockTable {
    fn alive(&mut self, pid: u32) -> bool {
        self.world.inner.lock().unwrap().alive.contains(&pid)
    }

    fn terminate(&mut self, pid: u32) -> Result<(), OsError> {
        let mut inner = self.world.inner.lock().unwrap();
        if inner.alive.remove(&pid) {
            inner.terminations += 1;
            Ok(())
        } else {
            Err(OsError::NoSuchProcess(pid))
        }
    }

    fn terminate_matching(&mut self, _signature: &str) -> usize {
        let mut inner = self.world.inner.lock().unwrap();
        let targets: Vec<u32> = inner
            .matching
            .iter()
            .copied()
            .filter(|pid| inner.alive.contains(pid))
            .collect();

        for pid in &targets {
            inner.alive.remove(pid);
        }
        inner.terminations += targets.len();
        targets.len()
    }
}

/// `AppLauncher` view of a [`MockWorld`]: hands out increasing pids.
#[derive(Debug)]
pub struct MockLauncher {
    world: MockWorld,
}

impl AppLauncher for MockLauncher {
    fn launch(&self) -> Result<u32, OsError> {
        let mut inner = self.world.inner.lock().unwrap();

        if inner.fail_launch {
            return Err(OsError::LaunchFailed {
                command: "mock".to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "mock launch failure",
                ),
            });
        }

        let pid = inner.next_pid;
        inner.next_pid += 1;
        inner.launches += 1;

        if !inner.die_after_launch {
            inner.alive.insert(pid);
            inner.matching.insert(pid);
        }

        Ok(pid)
    }
}

/// In-memory `ProcessRegistry`.
#[derive(Debug, Clone, Default)]
pub struct MockRegistry {
    record: Arc<Mutex<Option<u32>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Option<u32> {
        *self.record.lock().unwrap()
    }
}

impl ProcessRegistry for MockRegistry {
    fn get(&self) -> Result<Option<u32>> {
        Ok(*self.record.lock().unwrap())
    }

    fn set(&self, pid: u32) -> Result<()> {
        *self.record.lock().unwrap() = Some(pid);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.record.lock().unwrap() = None;
        Ok(())
    }
}
