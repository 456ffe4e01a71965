//! Mock implementations of the capture collaborators.
//!
//! Every mock records its calls, with a timestamp, into a [`CallLog`]. Mocks
//! created from the same log share it, so tests can assert the interleaving
//! of replay and recorder commands.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use replay_director_capture_core::{
    CaptureError, CaptureResult, CapturedVideoFile, FocusRestorer, Hotkey, ProcessControl,
    ReplayEngine, VideoBackend,
};

/// A call made to a mock collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    MoveToFrame(i32),
    SetSpeed(i32),
    Wait,
    CameraOnDriver { car_number: String, group: i32 },
    Activate(PathBuf),
    Resume,
    Pause,
    Stop,
    Deactivate,
    Terminate(String),
    Hotkey(Hotkey),
}

/// Shared, timestamped record of mock calls.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(Instant, MockCall)>>>,
}

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, call: MockCall) {
        self.calls.lock().push((Instant::now(), call));
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, MockCall)> {
        self.calls.lock().clone()
    }

    /// Frames passed to `move_to_frame`, in order.
    pub fn seeks(&self) -> Vec<i32> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::MoveToFrame(frame) => Some(frame),
                _ => None,
            })
            .collect()
    }

    /// Camera commands, in order.
    pub fn camera_commands(&self) -> Vec<(String, i32)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::CameraOnDriver { car_number, group } => Some((car_number, group)),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, call: &MockCall) -> usize {
        self.calls.lock().iter().filter(|(_, c)| c == call).count()
    }

    pub fn position(&self, call: &MockCall) -> Option<usize> {
        self.calls.lock().iter().position(|(_, c)| c == call)
    }
}

/// Replay engine that records commands.
#[derive(Debug, Clone, Default)]
pub struct MockReplayEngine {
    log: CallLog,
    fail_camera: bool,
}

impl MockReplayEngine {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            fail_camera: false,
        }
    }

    /// Make every camera command fail.
    #[must_use]
    pub fn failing_camera(mut self) -> Self {
        self.fail_camera = true;
        self
    }

    pub fn log(&self) -> &CallLog {
        &self.log
    }
}

impl ReplayEngine for MockReplayEngine {
    fn move_to_frame(&mut self, frame: i32) -> CaptureResult<()> {
        self.log.record(MockCall::MoveToFrame(frame));
        Ok(())
    }

    fn set_speed(&mut self, multiplier: i32) -> CaptureResult<()> {
        self.log.record(MockCall::SetSpeed(multiplier));
        Ok(())
    }

    fn wait(&mut self) -> CaptureResult<()> {
        self.log.record(MockCall::Wait);
        Ok(())
    }

    fn camera_on_driver(&mut self, car_number: &str, cam_group_number: i32) -> CaptureResult<()> {
        if self.fail_camera {
            return Err(CaptureError::replay("camera command rejected"));
        }
        self.log.record(MockCall::CameraOnDriver {
            car_number: car_number.to_string(),
            group: cam_group_number,
        });
        Ok(())
    }
}

/// Video backend that records commands and returns canned files.
#[derive(Debug, Clone, Default)]
pub struct MockVideoBackend {
    log: CallLog,
    files: Vec<CapturedVideoFile>,
    fail_activate: bool,
}

impl MockVideoBackend {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            files: Vec::new(),
            fail_activate: false,
        }
    }

    /// Files reported by `deactivate`.
    #[must_use]
    pub fn producing(mut self, files: &[&str]) -> Self {
        self.files = files.iter().map(|f| CapturedVideoFile::new(*f)).collect();
        self
    }

    #[must_use]
    pub fn failing_activate(mut self) -> Self {
        self.fail_activate = true;
        self
    }
}

impl VideoBackend for MockVideoBackend {
    fn activate(&mut self, destination_folder: &Path) -> CaptureResult<()> {
        if self.fail_activate {
            return Err(CaptureError::video_backend("recorder not running"));
        }
        self.log
            .record(MockCall::Activate(destination_folder.to_path_buf()));
        Ok(())
    }

    fn resume(&mut self) -> CaptureResult<()> {
        self.log.record(MockCall::Resume);
        Ok(())
    }

    fn pause(&mut self) -> CaptureResult<()> {
        self.log.record(MockCall::Pause);
        Ok(())
    }

    fn stop(&mut self) -> CaptureResult<()> {
        self.log.record(MockCall::Stop);
        Ok(())
    }

    fn deactivate(&mut self) -> CaptureResult<Vec<CapturedVideoFile>> {
        self.log.record(MockCall::Deactivate);
        Ok(self.files.clone())
    }
}

/// Process control returning a fixed number of matches.
#[derive(Debug, Clone, Default)]
pub struct MockProcessControl {
    log: CallLog,
    matches: usize,
}

impl MockProcessControl {
    pub fn new(log: CallLog, matches: usize) -> Self {
        Self { log, matches }
    }
}

impl ProcessControl for MockProcessControl {
    fn terminate_by_name(&self, name: &str) -> CaptureResult<usize> {
        self.log.record(MockCall::Terminate(name.to_string()));
        Ok(self.matches)
    }
}

/// Focus automation that records hotkeys, optionally failing.
#[derive(Debug, Clone, Default)]
pub struct MockFocus {
    log: CallLog,
    fail: bool,
}

impl MockFocus {
    pub fn new(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    #[must_use]
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl FocusRestorer for MockFocus {
    fn send_hotkey(&self, hotkey: Hotkey) -> CaptureResult<()> {
        self.log.record(MockCall::Hotkey(hotkey));
        if self.fail {
            return Err(CaptureError::Focus("no foreground window".to_string()));
        }
        Ok(())
    }
}
