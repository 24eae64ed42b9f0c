// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [app]
/// name = "dashboard"
/// command = "streamlit run app.py"
///
/// [report]
/// command = "python scripts/generate_report.py"
/// ticker = "ENGI.PA"
/// label = "ENGIE"
/// ```
///
/// Everything except the two `command` fields has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// The supervised application, from `[app]`.
    pub app: AppSection,

    /// The report job, from `[report]`.
    pub report: ReportSection,
}

/// `[app]` section: the process the supervisor owns.
#[derive(Debug, Clone, Deserialize)]
pub struct AppSection {
    /// Display name used in log lines and `status` output.
    #[serde(default = "default_app_name")]
    pub name: String,

    /// The command to launch, run through `sh -c`.
    pub command: String,

    /// Substring used to find stray instances in the process table.
    ///
    /// Defaults to `command`. Stop and defensive-cleanup kill every process
    /// whose command line contains this, so keep it specific to the app.
    #[serde(default)]
    pub match_signature: Option<String>,

    /// Where the pid record lives.
    #[serde(default = "default_pid_file")]
    pub pid_file: String,

    /// App output and lifecycle events are appended here.
    #[serde(default = "default_log_file")]
    pub log_file: String,

    /// Delay between stop and start during `restart`, in seconds.
    #[serde(default = "default_restart_delay_secs")]
    pub restart_delay_secs: u64,

    /// How long to wait after launch before trusting the new pid, in
    /// milliseconds. A child that dies within this window is not recorded.
    #[serde(default = "default_startup_grace_ms")]
    pub startup_grace_ms: u64,
}

fn default_app_name() -> String {
    "app".to_string()
}

fn default_pid_file() -> String {
    "run/app.pid".to_string()
}

fn default_log_file() -> String {
    "logs/app.log".to_string()
}

fn default_restart_delay_secs() -> u64 {
    2
}

fn default_startup_grace_ms() -> u64 {
    400
}

impl AppSection {
    /// Effective process-table signature: `match_signature` or `command`.
    pub fn effective_signature(&self) -> &str {
        self.match_signature.as_deref().unwrap_or(&self.command)
    }
}

/// `[report]` section: the wrapped report generator.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportSection {
    /// The generator command, run through `sh -c` with `ticker` and `label`
    /// appended as two positional arguments.
    pub command: String,

    /// First positional argument to the generator.
    #[serde(default = "default_ticker")]
    pub ticker: String,

    /// Second positional argument to the generator.
    #[serde(default = "default_label")]
    pub label: String,

    /// Directory receiving one dated artifact per invocation.
    #[serde(default = "default_reports_dir")]
    pub reports_dir: String,

    /// Rolling log receiving one line per invocation.
    #[serde(default = "default_activity_log")]
    pub activity_log: String,

    /// Artifacts with an mtime older than this many days are pruned.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
}

fn default_ticker() -> String {
    "ENGI.PA".to_string()
}

fn default_label() -> String {
    "ENGIE".to_string()
}

fn default_reports_dir() -> String {
    "reports".to_string()
}

fn default_activity_log() -> String {
    "logs/report_activity.log".to_string()
}

fn default_retention_days() -> u64 {
    30
}
