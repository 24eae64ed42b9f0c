use std::error::Error;
use std::fs;

use appkeeper::supervisor::{FileRegistry, ProcessRegistry};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn missing_record_reads_as_none() -> TestResult {
    let dir = tempfile::tempdir()?;
    let registry = FileRegistry::new(dir.path().join("app.pid"));

    assert_eq!(registry.get()?, None);
    Ok(())
}

#[test]
fn set_then_get_roundtrips_and_overwrites() -> TestResult {
    let dir = tempfile::tempdir()?;
    let registry = FileRegistry::new(dir.path().join("app.pid"));

    registry.set(1234)?;
    assert_eq!(registry.get()?, Some(1234));

    registry.set(5678)?;
    assert_eq!(registry.get()?, Some(5678));
    Ok(())
}

#[test]
fn set_creates_missing_parent_directories() -> TestResult {
    let dir = tempfile::tempdir()?;
    let registry = FileRegistry::new(dir.path().join("run/nested/app.pid"));

    registry.set(99)?;
    assert_eq!(registry.get()?, Some(99));
    Ok(())
}

#[test]
fn clear_is_idempotent() -> TestResult {
    let dir = tempfile::tempdir()?;
    let registry = FileRegistry::new(dir.path().join("app.pid"));

    registry.set(1234)?;
    registry.clear()?;
    registry.clear()?;

    assert_eq!(registry.get()?, None);
    Ok(())
}

#[test]
fn mangled_record_reads_as_none() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.pid");
    fs::write(&path, "not-a-pid\n")?;

    let registry = FileRegistry::new(&path);
    assert_eq!(registry.get()?, None);
    Ok(())
}

#[test]
fn record_file_holds_a_single_line() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("app.pid");

    let registry = FileRegistry::new(&path);
    registry.set(4321)?;

    assert_eq!(fs::read_to_string(&path)?, "4321\n");
    Ok(())
}
