//! Video backend driving an external recorder and discovering its output.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use replay_director_capture_core::{CaptureError, CaptureResult, CapturedVideoFile, VideoBackend};
use tracing::{debug, info, warn};

/// Extensions recognised as recorder output.
pub const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mkv", "avi", "wmv", "mov", "flv"];

/// Slack for file systems with coarse modification times.
const MTIME_TOLERANCE: Duration = Duration::from_secs(2);

/// Start/stop controls of an external screen recorder, typically sent as
/// hotkeys or over the recorder's control socket.
pub trait RecorderControl: Send {
    fn start(&mut self) -> CaptureResult<()>;
    fn pause(&mut self) -> CaptureResult<()>;
    fn resume(&mut self) -> CaptureResult<()>;
    fn stop(&mut self) -> CaptureResult<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecorderState {
    Idle,
    Recording,
    Paused,
    Stopped,
}

/// [`VideoBackend`] for recorders that write into a folder. Files modified
/// after activation are reported on deactivation, sorted by name.
#[derive(Debug)]
pub struct FolderVideoBackend<R> {
    control: R,
    folder: Option<PathBuf>,
    activated_at: Option<SystemTime>,
    state: RecorderState,
}

impl<R: RecorderControl> FolderVideoBackend<R> {
    pub fn new(control: R) -> Self {
        Self {
            control,
            folder: None,
            activated_at: None,
            state: RecorderState::Idle,
        }
    }

    pub fn control(&self) -> &R {
        &self.control
    }
}

impl<R: RecorderControl> VideoBackend for FolderVideoBackend<R> {
    fn activate(&mut self, destination_folder: &Path) -> CaptureResult<()> {
        if !destination_folder.is_dir() {
            return Err(CaptureError::video_backend(format!(
                "destination folder '{}' does not exist",
                destination_folder.display()
            )));
        }

        self.folder = Some(destination_folder.to_path_buf());
        self.activated_at = Some(SystemTime::now());
        self.control.start()?;
        self.state = RecorderState::Recording;
        info!(folder = %destination_folder.display(), "Video capture activated");
        Ok(())
    }

    fn resume(&mut self) -> CaptureResult<()> {
        if self.state == RecorderState::Paused || self.state == RecorderState::Stopped {
            self.control.resume()?;
            self.state = RecorderState::Recording;
        }
        Ok(())
    }

    fn pause(&mut self) -> CaptureResult<()> {
        if self.state == RecorderState::Recording {
            self.control.pause()?;
            self.state = RecorderState::Paused;
        }
        Ok(())
    }

    fn stop(&mut self) -> CaptureResult<()> {
        if matches!(self.state, RecorderState::Recording | RecorderState::Paused) {
            self.control.stop()?;
            self.state = RecorderState::Stopped;
        }
        Ok(())
    }

    fn deactivate(&mut self) -> CaptureResult<Vec<CapturedVideoFile>> {
        self.stop()?;
        self.state = RecorderState::Idle;

        let (Some(folder), Some(activated_at)) = (self.folder.take(), self.activated_at.take())
        else {
            return Err(CaptureError::video_backend("video capture was never activated"));
        };

        let since = activated_at
            .checked_sub(MTIME_TOLERANCE)
            .unwrap_or(activated_at);
        let files = discover_videos(&folder, since)?;
        info!(folder = %folder.display(), count = files.len(), "Video capture deactivated");
        Ok(files)
    }
}

/// Video files in `folder` modified at or after `since`, sorted by name.
pub fn discover_videos(folder: &Path, since: SystemTime) -> CaptureResult<Vec<CapturedVideoFile>> {
    let entries = fs::read_dir(folder).map_err(|e| CaptureError::persistence(folder, e))?;

    let mut paths = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable directory entry");
                continue;
            }
        };
        let path = entry.path();
        let is_video = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| VIDEO_EXTENSIONS.iter().any(|v| v.eq_ignore_ascii_case(ext)));
        if !is_video {
            continue;
        }

        let modified = entry.metadata().and_then(|m| m.modified());
        match modified {
            Ok(modified) if modified >= since => paths.push(path),
            Ok(_) => debug!(path = %path.display(), "Ignoring video older than this capture"),
            Err(e) => warn!(path = %path.display(), error = %e, "Cannot read modification time"),
        }
    }

    paths.sort();
    Ok(paths
        .into_iter()
        .map(|p| CapturedVideoFile::new(p.to_string_lossy().into_owned()))
        .collect())
}
