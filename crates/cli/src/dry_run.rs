//! Collaborators for running the capture pipeline without a simulator.

use std::fs::File;
use std::path::PathBuf;

use chrono::Utc;
use replay_director_capture_core::{CaptureError, CaptureResult, ReplayEngine};
use replay_director_capture_recorder::RecorderControl;
use tracing::info;

/// Replay engine that logs every command and acknowledges immediately.
#[derive(Debug, Default)]
pub struct DryRunReplayEngine {
    frame: i32,
    speed: i32,
}

impl ReplayEngine for DryRunReplayEngine {
    fn move_to_frame(&mut self, frame: i32) -> CaptureResult<()> {
        info!(frame, from = self.frame, "[dry-run] replay seek");
        self.frame = frame;
        Ok(())
    }

    fn set_speed(&mut self, multiplier: i32) -> CaptureResult<()> {
        info!(multiplier, from = self.speed, "[dry-run] replay speed");
        self.speed = multiplier;
        Ok(())
    }

    fn wait(&mut self) -> CaptureResult<()> {
        Ok(())
    }

    fn camera_on_driver(&mut self, car_number: &str, cam_group_number: i32) -> CaptureResult<()> {
        info!(car_number, cam_group_number, "[dry-run] camera");
        Ok(())
    }
}

/// Recorder control that writes an empty placeholder video on start, so
/// the folder backend has a file to report.
#[derive(Debug)]
pub struct DryRunRecorderControl {
    folder: PathBuf,
}

impl DryRunRecorderControl {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }
}

impl RecorderControl for DryRunRecorderControl {
    fn start(&mut self) -> CaptureResult<()> {
        let path = self.folder.join(format!(
            "dry-run-{}.mp4",
            Utc::now().format("%Y-%m-%d-%H-%M-%S-%3f")
        ));
        File::create(&path).map_err(|e| CaptureError::persistence(&path, e))?;
        info!(path = %path.display(), "[dry-run] recording started");
        Ok(())
    }

    fn pause(&mut self) -> CaptureResult<()> {
        info!("[dry-run] recording paused");
        Ok(())
    }

    fn resume(&mut self) -> CaptureResult<()> {
        info!("[dry-run] recording resumed");
        Ok(())
    }

    fn stop(&mut self) -> CaptureResult<()> {
        info!("[dry-run] recording stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn start_leaves_a_placeholder_video() -> TestResult {
        let dir = tempfile::tempdir()?;
        DryRunRecorderControl::new(dir.path()).start()?;
        let videos = std::fs::read_dir(dir.path())?
            .filter_map(Result::ok)
            .filter(|e| e.path().extension().is_some_and(|ext| ext == "mp4"))
            .count();
        assert_eq!(videos, 1);
        Ok(())
    }
}
