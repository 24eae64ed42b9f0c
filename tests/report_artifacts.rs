use std::error::Error;
use std::fs;
use std::path::Path;

use appkeeper::config::ReportSection;
use appkeeper::report::{ReportJob, ReportOutcome};
use time::macros::datetime;

type TestResult = Result<(), Box<dyn Error>>;

fn report_section(dir: &Path, command: &str) -> ReportSection {
    ReportSection {
        command: command.into(),
        ticker: "TST.PA".into(),
        label: "TestAsset".into(),
        reports_dir: dir.join("reports").to_string_lossy().into_owned(),
        activity_log: dir.join("activity.log").to_string_lossy().into_owned(),
        retention_days: 30,
    }
}

#[tokio::test]
async fn run_produces_one_artifact_with_header_and_success_trailer() -> TestResult {
    let dir = tempfile::tempdir()?;
    let job = ReportJob::new(report_section(dir.path(), "echo generator-output"));
    let now = datetime!(2024-03-05 20:00:00 UTC);

    let outcome = job.run(now).await?;
    assert_eq!(outcome, ReportOutcome::Success);

    let artifact = dir.path().join("reports/daily_report_2024-03-05.txt");
    assert!(artifact.is_file());

    let contents = fs::read_to_string(&artifact)?;
    assert!(contents.contains("DAILY REPORT - TestAsset (TST.PA)"));
    assert!(contents.contains("Generated: 2024-03-05 20:00:00"));
    assert!(contents.contains("generator-output"));
    assert!(contents.contains("SUCCESS - report generated"));

    // Exactly one artifact for the date.
    let entries = fs::read_dir(dir.path().join("reports"))?.count();
    assert_eq!(entries, 1);
    Ok(())
}

#[tokio::test]
async fn generator_failure_is_recorded_in_trailer_and_activity_log() -> TestResult {
    let dir = tempfile::tempdir()?;
    let job = ReportJob::new(report_section(dir.path(), "exit 3 ;"));
    let now = datetime!(2024-03-05 20:00:00 UTC);

    let outcome = job.run(now).await?;
    assert_eq!(outcome, ReportOutcome::Failed(3));

    let artifact = dir.path().join("reports/daily_report_2024-03-05.txt");
    let contents = fs::read_to_string(&artifact)?;
    assert!(contents.contains("FAILED - generator exited with code 3"));

    let activity = fs::read_to_string(dir.path().join("activity.log"))?;
    assert!(activity.contains("daily_report_2024-03-05.txt FAILED(3)"));
    Ok(())
}

#[tokio::test]
async fn generator_receives_ticker_and_label_as_positional_args() -> TestResult {
    let dir = tempfile::tempdir()?;
    let job = ReportJob::new(report_section(dir.path(), "echo"));
    let now = datetime!(2024-03-05 20:00:00 UTC);

    job.run(now).await?;

    let artifact = dir.path().join("reports/daily_report_2024-03-05.txt");
    let contents = fs::read_to_string(&artifact)?;
    assert!(contents.contains("TST.PA TestAsset"));
    Ok(())
}

#[tokio::test]
async fn rerun_on_the_same_date_replaces_the_artifact() -> TestResult {
    let dir = tempfile::tempdir()?;
    let job = ReportJob::new(report_section(dir.path(), "echo run-output"));
    let now = datetime!(2024-03-05 20:00:00 UTC);

    job.run(now).await?;
    job.run(now).await?;

    let entries = fs::read_dir(dir.path().join("reports"))?.count();
    assert_eq!(entries, 1);

    let artifact = dir.path().join("reports/daily_report_2024-03-05.txt");
    let contents = fs::read_to_string(&artifact)?;
    assert_eq!(contents.matches("DAILY REPORT").count(), 1);

    // But the activity log rolls: one line per invocation.
    let activity = fs::read_to_string(dir.path().join("activity.log"))?;
    assert_eq!(activity.lines().count(), 2);
    Ok(())
}

#[tokio::test]
async fn unrunnable_generator_is_recorded_as_failure() -> TestResult {
    let dir = tempfile::tempdir()?;
    let job = ReportJob::new(report_section(
        dir.path(),
        "/nonexistent/generator-binary",
    ));
    let now = datetime!(2024-03-05 20:00:00 UTC);

    let outcome = job.run(now).await?;
    assert!(matches!(outcome, ReportOutcome::Failed(_)));

    let artifact = dir.path().join("reports/daily_report_2024-03-05.txt");
    let contents = fs::read_to_string(&artifact)?;
    assert!(contents.contains("FAILED"));
    Ok(())
}
