// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod report;
pub mod supervisor;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::Result;
use tracing::{error, info};

use crate::cli::{Action, CliArgs};
use crate::config::loader::load_and_validate;
use crate::config::ReportSection;
use crate::report::{prune_artifacts, ReportJob};
use crate::supervisor::{Status, Supervisor};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the supervisor for lifecycle actions (start/stop/restart/status and
///   the no-argument reconcile)
/// - the report job for `report`
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    if let Some(Action::Report) = args.action {
        return run_report(&cfg.report).await;
    }

    let mut supervisor = Supervisor::from_config(&cfg.app);

    match args.action {
        Some(Action::Start) => supervisor.start().await,
        Some(Action::Stop) => supervisor.stop().await,
        Some(Action::Restart) => supervisor.restart().await,
        Some(Action::Status) => {
            print_status(&mut supervisor);
            Ok(())
        }
        // `Report` was handled above; no action means reconcile.
        _ => supervisor.reconcile().await,
    }
}

/// Interactive `status` output on stdout.
fn print_status(supervisor: &mut Supervisor) {
    match supervisor.status() {
        Status::Running(pid) => println!("{} is running (pid {pid})", supervisor.name()),
        Status::Stopped => println!("{} is stopped", supervisor.name()),
    }
}

/// Run the generator once, then sweep the retention window. The sweep runs
/// regardless of how the generator run went.
async fn run_report(cfg: &ReportSection) -> Result<()> {
    let job = ReportJob::new(cfg.clone());

    if let Err(e) = job.run(report::local_now()).await {
        error!(error = ?e, "report run failed");
    }

    let pruned = prune_artifacts(
        Path::new(&cfg.reports_dir),
        cfg.retention_days,
        SystemTime::now(),
    )?;
    if pruned > 0 {
        info!(pruned, "retention sweep deleted old artifacts");
    }

    Ok(())
}
