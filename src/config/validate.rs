// src/config/validate.rs

use anyhow::{anyhow, Result};

use crate::config::model::ConfigFile;

/// Run basic semantic validation against a loaded configuration.
///
/// This checks:
/// - `[app].command` and `[report].command` are non-empty
/// - the effective process-table signature is non-empty
/// - `retention_days >= 1`
///
/// It does **not** check that the commands resolve to existing executables;
/// a missing program surfaces at launch time in the relevant log.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_app(cfg)?;
    validate_report(cfg)?;
    Ok(())
}

fn validate_app(cfg: &ConfigFile) -> Result<()> {
    if cfg.app.command.trim().is_empty() {
        return Err(anyhow!("[app].command must not be empty"));
    }

    if cfg.app.effective_signature().trim().is_empty() {
        return Err(anyhow!(
            "[app].match_signature must not be empty when provided"
        ));
    }

    Ok(())
}

fn validate_report(cfg: &ConfigFile) -> Result<()> {
    if cfg.report.command.trim().is_empty() {
        return Err(anyhow!("[report].command must not be empty"));
    }

    if cfg.report.retention_days == 0 {
        return Err(anyhow!(
            "[report].retention_days must be >= 1 (got 0)"
        ));
    }

    Ok(())
}
