//! Capture sessions end to end against mock collaborators.

use std::path::Path;
use std::time::Duration;

use replay_director_capture_core::{
    CadenceClock, CamDriverSource, CaptureConfig, CaptureError, Hotkey, InterestLevel,
    IteratorSource, REPLAY_SPEED_NORMAL, REPLAY_SPEED_STOPPED, RaceEvent, Sample, SessionState,
    StrategyKind,
};
use replay_director_capture_orchestrator::prelude::*;
use replay_director_capture_orchestrator::{FullSessionCapture, strategy_for};
use replay_director_capture_recorder::load_overlay;
use replay_director_test_helpers::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const SIM: &str = "iRacingSim64DX11";

fn finished_race() -> Vec<Sample> {
    let session = session_with_cars(3);
    race_stream(&session, 0.0, 30.0, 0.25, |b, t| {
        if t >= 10.0 {
            b.state(SessionState::Checkered).cars(|c| c.lap = 2)
        } else {
            b
        }
    })
}

fn config(folder: &Path) -> Result<CaptureConfig, CaptureError> {
    CaptureConfig::builder()
        .working_folder(folder)
        .alignment_hold_secs(0.0)
        .cadence_clock(CadenceClock::Session)
        .build()
}

fn controller(
    config: CaptureConfig,
    log: &CallLog,
    video: MockVideoBackend,
) -> Result<CaptureController, CaptureError> {
    CaptureController::new(
        config,
        video,
        ReplayChannel::new(MockReplayEngine::new(log.clone())),
        MockProcessControl::new(log.clone(), 1),
        MockFocus::new(log.clone()),
    )
}

fn video_names(dir: &Path) -> Vec<String> {
    ["race-1.mp4", "race-2.mp4"]
        .iter()
        .map(|name| dir.join(name).to_string_lossy().into_owned())
        .collect()
}

#[test]
fn full_capture_saves_overlay_next_to_first_video() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let mut config = config(dir.path())?;
    config.intro_video = Some("intro.mp4".to_string());

    let names = video_names(dir.path());
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let video = MockVideoBackend::new(log.clone()).producing(&refs);
    let mut controller = controller(config, &log, video)?;

    let outcome = controller.run(
        Box::new(IteratorSource::new(finished_race())),
        &mut FullSessionCapture,
    )?;

    assert_eq!(outcome.state, CaptureState::Done);
    assert_eq!(outcome.report.samples_processed, 53);
    assert_eq!(outcome.overlay_file, dir.path().join("race-1.replayscript"));
    assert_eq!(
        controller.history(),
        &[
            CaptureState::Idle,
            CaptureState::Aligning,
            CaptureState::Recording,
            CaptureState::Finalizing,
            CaptureState::Done,
        ]
    );

    let overlay = load_overlay(&outcome.overlay_file)?;
    let intro = overlay.video_files.first().ok_or("no video files")?;
    assert!(intro.is_intro_video);
    assert_eq!(overlay.video_files.len(), 3);
    assert!(!overlay.leader_boards.is_empty());
    assert!(overlay.session_data.is_some());
    let first_driver = overlay.cam_drivers.first().ok_or("no cam drivers")?;
    assert_eq!(first_driver.source, CamDriverSource::Directed);
    assert!(first_driver.start_time.abs() < 1e-9);
    Ok(())
}

#[test]
fn finalize_runs_in_order() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let names = video_names(dir.path());
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let video = MockVideoBackend::new(log.clone()).producing(&refs);
    let mut controller = controller(config(dir.path())?, &log, video)?;

    controller.run(
        Box::new(IteratorSource::new(finished_race())),
        &mut FullSessionCapture,
    )?;

    let calls = log.calls();
    assert_eq!(
        calls.get(..3),
        Some(
            &[
                MockCall::MoveToFrame(0),
                MockCall::SetSpeed(REPLAY_SPEED_NORMAL),
                MockCall::Wait,
            ][..]
        )
    );
    let activate = log
        .position(&MockCall::Activate(dir.path().to_path_buf()))
        .ok_or("never activated")?;
    let deactivate = log.position(&MockCall::Deactivate).ok_or("never deactivated")?;
    let stopped = log
        .position(&MockCall::SetSpeed(REPLAY_SPEED_STOPPED))
        .ok_or("replay never stopped")?;
    let focus = log
        .position(&MockCall::Hotkey(Hotkey::ALT_TAB))
        .ok_or("focus never restored")?;
    assert!(activate < deactivate);
    assert!(deactivate < stopped);
    assert!(stopped < focus);
    Ok(())
}

#[test]
fn zero_video_files_fails_after_saving_fallback_overlay() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let mut controller = controller(config(dir.path())?, &log, MockVideoBackend::new(log.clone()))?;

    let result = controller.run(
        Box::new(IteratorSource::new(finished_race())),
        &mut FullSessionCapture,
    );

    match result {
        Err(CaptureError::NoVideoFiles { working_folder }) => {
            assert_eq!(working_folder, dir.path());
        }
        other => return Err(format!("expected NoVideoFiles, got {other:?}").into()),
    }
    assert_eq!(controller.state(), CaptureState::Failed);

    let saved = std::fs::read_dir(dir.path())?
        .filter_map(Result::ok)
        .filter_map(|e| e.file_name().to_str().map(str::to_string))
        .find(|name| name.starts_with("unknown_capture-") && name.ends_with(".replayscript"));
    assert!(saved.is_some());
    Ok(())
}

#[test]
fn missing_simulator_process_is_fatal() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let config = CaptureConfig {
        close_sim_after_recording: true,
        sim_process_name: SIM.to_string(),
        ..config(dir.path())?
    };
    let names = video_names(dir.path());
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut controller = CaptureController::new(
        config,
        MockVideoBackend::new(log.clone()).producing(&refs),
        ReplayChannel::new(MockReplayEngine::new(log.clone())),
        MockProcessControl::new(log.clone(), 0),
        MockFocus::new(log.clone()),
    )?;

    let result = controller.run(
        Box::new(IteratorSource::new(finished_race())),
        &mut FullSessionCapture,
    );

    assert!(matches!(result, Err(CaptureError::ProcessNotFound { ref name }) if name == SIM));
    assert_eq!(controller.state(), CaptureState::Failed);
    assert_eq!(log.count(&MockCall::Terminate(SIM.to_string())), 1);
    Ok(())
}

#[test]
fn shutdown_failure_after_a_failed_session_is_reported() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let config = CaptureConfig {
        close_sim_after_recording: true,
        sim_process_name: SIM.to_string(),
        ..config(dir.path())?
    };
    let mut controller = CaptureController::new(
        config,
        MockVideoBackend::new(log.clone()),
        ReplayChannel::new(MockReplayEngine::new(log.clone())),
        MockProcessControl::new(log.clone(), 0),
        MockFocus::new(log.clone()),
    )?;

    let result = controller.run(
        Box::new(IteratorSource::new(finished_race())),
        &mut FullSessionCapture,
    );

    let error = result.err().ok_or("session should fail")?;
    match &error {
        CaptureError::ShutdownFailed { cause, shutdown } => {
            assert!(matches!(**cause, CaptureError::NoVideoFiles { .. }));
            assert!(matches!(**shutdown, CaptureError::ProcessNotFound { ref name } if name == SIM));
        }
        other => return Err(format!("expected ShutdownFailed, got {other:?}").into()),
    }
    assert!(matches!(error.primary(), CaptureError::NoVideoFiles { .. }));
    assert_eq!(controller.state(), CaptureState::Failed);
    assert_eq!(log.count(&MockCall::Terminate(SIM.to_string())), 1);
    Ok(())
}

#[test]
fn simulator_is_closed_after_success() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let config = CaptureConfig {
        close_sim_after_recording: true,
        sim_process_name: SIM.to_string(),
        ..config(dir.path())?
    };
    let names = video_names(dir.path());
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let video = MockVideoBackend::new(log.clone()).producing(&refs);
    let mut controller = controller(config, &log, video)?;

    let outcome = controller.run(
        Box::new(IteratorSource::new(finished_race())),
        &mut FullSessionCapture,
    )?;

    assert_eq!(outcome.state, CaptureState::Done);
    let focus = log
        .position(&MockCall::Hotkey(Hotkey::ALT_TAB))
        .ok_or("focus never restored")?;
    let terminate = log
        .position(&MockCall::Terminate(SIM.to_string()))
        .ok_or("simulator never terminated")?;
    assert!(focus < terminate);
    Ok(())
}

#[test]
fn focus_failure_does_not_fail_the_session() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let names = video_names(dir.path());
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut controller = CaptureController::new(
        config(dir.path())?,
        MockVideoBackend::new(log.clone()).producing(&refs),
        ReplayChannel::new(MockReplayEngine::new(log.clone())),
        MockProcessControl::new(log.clone(), 1),
        MockFocus::new(log.clone()).failing(),
    )?;

    let outcome = controller.run(
        Box::new(IteratorSource::new(finished_race())),
        &mut FullSessionCapture,
    )?;
    assert_eq!(outcome.state, CaptureState::Done);
    Ok(())
}

#[test]
fn cancelled_before_recording_never_activates_video() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let mut controller = controller(config(dir.path())?, &log, MockVideoBackend::new(log.clone()))?;
    controller.cancel_token().cancel();

    let result = controller.run(
        Box::new(IteratorSource::new(finished_race())),
        &mut FullSessionCapture,
    );

    assert!(matches!(result, Err(CaptureError::Cancelled)));
    assert_eq!(controller.state(), CaptureState::Failed);
    assert_eq!(log.position(&MockCall::Activate(dir.path().to_path_buf())), None);
    Ok(())
}

#[test]
fn empty_telemetry_fails_during_alignment() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let mut controller = controller(config(dir.path())?, &log, MockVideoBackend::new(log.clone()))?;

    let result = controller.run(
        Box::new(IteratorSource::new(Vec::<Sample>::new())),
        &mut FullSessionCapture,
    );

    assert!(matches!(result, Err(CaptureError::EmptyStream)));
    assert_eq!(
        controller.history(),
        &[CaptureState::Idle, CaptureState::Aligning, CaptureState::Failed]
    );
    Ok(())
}

#[test]
fn highlight_reel_seeks_each_event_and_holds_for_its_duration() -> TestResult {
    let dir = tempfile::tempdir()?;
    let log = CallLog::new();
    let factor = 50;
    let config = CaptureConfig {
        strategy: StrategyKind::Highlights,
        short_test_only: true,
        timing_factor_for_short_test: factor,
        ..config(dir.path())?
    };
    let events = vec![
        RaceEvent::new(10.0, 5.0, InterestLevel::Battle)?,
        RaceEvent::new(20.0, 3.0, InterestLevel::Incident)?.with_car(2),
    ];
    let names = video_names(dir.path());
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let video = MockVideoBackend::new(log.clone()).producing(&refs);
    let mut strategy = strategy_for(&config, events);
    let mut controller = controller(config, &log, video)?;

    let outcome = controller.run(
        Box::new(IteratorSource::new(finished_race())),
        strategy.as_mut(),
    )?;

    assert_eq!(outcome.report.events_played, 2);
    // Alignment seeks to the race start first.
    assert_eq!(log.seeks(), vec![0, 600, 1200]);

    let resumes: Vec<_> = log
        .timed_calls()
        .into_iter()
        .filter(|(_, call)| matches!(call, MockCall::Resume | MockCall::Stop))
        .map(|(at, _)| at)
        .collect();
    let [first, second, stop] = resumes.as_slice() else {
        return Err(format!("expected two resumes and a stop, got {}", resumes.len()).into());
    };
    let first_hold = second.checked_duration_since(*first).ok_or("out of order")?;
    let second_hold = stop.checked_duration_since(*second).ok_or("out of order")?;
    // 5 s and 3 s at fifty times normal speed.
    assert!(first_hold >= Duration::from_millis(99));
    assert!(second_hold >= Duration::from_millis(59));

    let overlay = load_overlay(&outcome.overlay_file)?;
    assert_eq!(overlay.race_events.len(), 2);
    assert!((overlay.applied_timing_factor - 1.0 / f64::from(factor)).abs() < 1e-12);
    Ok(())
}
