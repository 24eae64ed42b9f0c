use std::error::Error;

use appkeeper::config::AppSection;
use appkeeper::supervisor::mock::{MockRegistry, MockWorld};
use appkeeper::supervisor::{Status, Supervisor};

type TestResult = Result<(), Box<dyn Error>>;

fn app_section(dir: &std::path::Path) -> AppSection {
    AppSection {
        name: "testapp".into(),
        command: "testapp --serve".into(),
        match_signature: None,
        pid_file: dir.join("app.pid").to_string_lossy().into_owned(),
        log_file: dir.join("app.log").to_string_lossy().into_owned(),
        // Keep lifecycle tests fast: no delay, no grace wait.
        restart_delay_secs: 0,
        startup_grace_ms: 0,
    }
}

fn supervisor(dir: &std::path::Path, world: &MockWorld, registry: &MockRegistry) -> Supervisor {
    Supervisor::with_parts(
        &app_section(dir),
        Box::new(registry.clone()),
        Box::new(world.table()),
        Box::new(world.launcher()),
    )
}

#[tokio::test]
async fn start_then_status_reports_running() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    sup.start().await?;

    let pid = registry.recorded().expect("pid recorded after start");
    assert_eq!(sup.status(), Status::Running(pid));
    assert!(world.is_alive(pid));
    Ok(())
}

#[tokio::test]
async fn start_when_already_running_is_a_noop() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    sup.start().await?;
    let pid = registry.recorded().unwrap();

    sup.start().await?;

    assert_eq!(world.launches(), 1);
    assert_eq!(registry.recorded(), Some(pid));
    Ok(())
}

#[tokio::test]
async fn stop_twice_is_idempotent() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    sup.start().await?;
    sup.stop().await?;
    sup.stop().await?;

    assert_eq!(sup.status(), Status::Stopped);
    assert_eq!(registry.recorded(), None);
    Ok(())
}

#[tokio::test]
async fn stop_without_ever_starting_succeeds() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    sup.stop().await?;

    assert_eq!(sup.status(), Status::Stopped);
    Ok(())
}

#[tokio::test]
async fn restart_records_a_different_pid() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    sup.start().await?;
    let before = registry.recorded().unwrap();

    sup.restart().await?;
    let after = registry.recorded().unwrap();

    assert_ne!(before, after);
    assert!(!world.is_alive(before));
    assert!(world.is_alive(after));
    Ok(())
}

#[tokio::test]
async fn reconcile_when_running_is_pid_stable() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    sup.start().await?;
    let pid = registry.recorded().unwrap();
    let terminations = world.terminations();

    sup.reconcile().await?;

    assert_eq!(registry.recorded(), Some(pid));
    assert_eq!(world.launches(), 1);
    assert_eq!(world.terminations(), terminations);
    Ok(())
}

#[tokio::test]
async fn reconcile_restarts_an_externally_killed_process() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    sup.start().await?;
    let pid = registry.recorded().unwrap();

    // Stale record: process dies but the record survives.
    world.kill_externally(pid);
    assert_eq!(sup.status(), Status::Stopped);

    sup.reconcile().await?;

    let new_pid = registry.recorded().unwrap();
    assert_ne!(new_pid, pid);
    assert_eq!(sup.status(), Status::Running(new_pid));
    Ok(())
}

#[tokio::test]
async fn start_kills_untracked_orphans_first() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    // An instance is running but nothing ever recorded it.
    world.spawn_untracked(42);

    sup.start().await?;

    assert!(!world.is_alive(42));
    assert!(registry.recorded().is_some());
    Ok(())
}

#[tokio::test]
async fn failed_launch_leaves_no_record() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    world.set_fail_launch(true);
    sup.start().await?;

    assert_eq!(registry.recorded(), None);
    assert_eq!(sup.status(), Status::Stopped);
    Ok(())
}

#[tokio::test]
async fn launch_that_dies_during_grace_window_is_not_recorded() -> TestResult {
    let dir = tempfile::tempdir()?;
    let world = MockWorld::new();
    let registry = MockRegistry::new();
    let mut sup = supervisor(dir.path(), &world, &registry);

    world.set_die_after_launch(true);
    sup.start().await?;

    assert_eq!(world.launches(), 1);
    assert_eq!(registry.recorded(), None);
    assert_eq!(sup.status(), Status::Stopped);
    Ok(())
}
