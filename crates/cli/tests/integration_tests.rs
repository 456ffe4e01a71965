//! Integration tests for the replayctl binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use replay_director_capture_core::{CadenceClock, CaptureConfig, SessionState};
use replay_director_capture_recorder::{load_overlay, write_samples};
use replay_director_test_helpers::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn replayctl() -> Result<Command, Box<dyn std::error::Error>> {
    Ok(Command::cargo_bin("replayctl")?)
}

fn write_config(dir: &TempDir) -> Result<std::path::PathBuf, Box<dyn std::error::Error>> {
    let config = CaptureConfig::builder()
        .working_folder(dir.path())
        .alignment_hold_secs(0.0)
        .cadence_clock(CadenceClock::Session)
        .build()?;
    let path = dir.path().join("capture.json");
    config.save_to_path(&path)?;
    Ok(path)
}

fn write_race(path: &Path) -> Result<usize, Box<dyn std::error::Error>> {
    let session = session_with_cars(3);
    let samples = race_stream(&session, 0.0, 20.0, 0.25, |b, t| {
        if t >= 8.0 {
            b.state(SessionState::Checkered).cars(|c| c.lap = 2)
        } else {
            b
        }
    });
    Ok(write_samples(path, &samples)?)
}

#[test]
fn help_lists_commands() -> TestResult {
    replayctl()?
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("capture"))
        .stdout(predicate::str::contains("highlights"))
        .stdout(predicate::str::contains("inspect"));
    Ok(())
}

#[test]
fn version_is_reported() -> TestResult {
    replayctl()?
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("replayctl"));
    Ok(())
}

#[test]
fn config_init_refuses_to_overwrite() -> TestResult {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("capture.json");

    replayctl()?.args(["config", "init"]).arg(&path).assert().success();
    let written = CaptureConfig::load_from_path(&path)?;
    assert_eq!(written, CaptureConfig::default());

    replayctl()?
        .args(["config", "init"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    replayctl()?
        .args(["config", "init", "--force"])
        .arg(&path)
        .assert()
        .success();
    Ok(())
}

#[test]
fn capture_writes_overlay_next_to_video() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = write_config(&dir)?;
    let telemetry = dir.path().join("race.jsonl");
    let written = write_race(&telemetry)?;

    let output = replayctl()?
        .arg("--json")
        .args(["capture", "--telemetry"])
        .arg(&telemetry)
        .arg("--config")
        .arg(&config)
        .output()?;
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json.pointer("/success"), Some(&Value::Bool(true)));
    assert_eq!(json.pointer("/data/state").and_then(Value::as_str), Some("Done"));
    let processed = json
        .pointer("/data/samples_processed")
        .and_then(Value::as_u64)
        .ok_or("no sample count")?;
    assert!(processed > 0 && processed < u64::try_from(written)?);

    let overlay_file = json
        .pointer("/data/overlay_file")
        .and_then(Value::as_str)
        .ok_or("no overlay file")?;
    assert!(overlay_file.ends_with(".replayscript"));
    let overlay = load_overlay(Path::new(overlay_file))?;
    assert!(overlay.session_data.is_some());
    assert_eq!(overlay.video_files.len(), 1);
    assert!(!overlay.cam_drivers.is_empty());
    Ok(())
}

#[test]
fn inspect_reports_overlay_counts() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = write_config(&dir)?;
    let telemetry = dir.path().join("race.jsonl");
    write_race(&telemetry)?;

    replayctl()?
        .args(["capture", "--telemetry"])
        .arg(&telemetry)
        .arg("--config")
        .arg(&config)
        .assert()
        .success();

    let overlay = fs::read_dir(dir.path())?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .find(|p| p.extension().is_some_and(|ext| ext == "replayscript"))
        .ok_or("no overlay written")?;

    let output = replayctl()?
        .arg("inspect")
        .arg(&overlay)
        .arg("--json")
        .output()?;
    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json.pointer("/data/has_session_data"), Some(&Value::Bool(true)));
    let videos = json.pointer("/data/video_files").and_then(Value::as_array);
    assert_eq!(videos.map(Vec::len), Some(1));
    Ok(())
}

#[test]
fn invalid_configuration_exits_with_code_5() -> TestResult {
    let dir = tempfile::tempdir()?;
    let config = dir.path().join("capture.json");
    fs::write(&config, r#"{ "frames_per_second": 0 }"#)?;
    let telemetry = dir.path().join("race.jsonl");
    write_race(&telemetry)?;

    replayctl()?
        .args(["capture", "--telemetry"])
        .arg(&telemetry)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(5)
        .stderr(predicate::str::contains("frames_per_second"));
    Ok(())
}

#[test]
fn missing_overlay_exits_with_code_4() -> TestResult {
    let dir = tempfile::tempdir()?;
    replayctl()?
        .arg("inspect")
        .arg(dir.path().join("missing.replayscript"))
        .assert()
        .code(4);
    Ok(())
}

#[test]
fn json_errors_are_machine_readable() -> TestResult {
    let dir = tempfile::tempdir()?;
    let output = replayctl()?
        .args(["--json", "inspect"])
        .arg(dir.path().join("missing.replayscript"))
        .output()?;
    let json: Value = serde_json::from_slice(&output.stdout)?;
    assert_eq!(json.pointer("/success"), Some(&Value::Bool(false)));
    let message = json.pointer("/error/message").and_then(Value::as_str);
    assert!(message.is_some_and(|m| m.contains("not found")));
    Ok(())
}
