//! Capture session configuration.
//!
//! Loaded from a JSON file; every field has a default so partial files are
//! accepted. Call [`CaptureConfig::validate`] before starting a session.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{CaptureError, CaptureResult};

/// Which recording strategy a session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Record the whole race while following the live stream.
    #[default]
    Full,
    /// Seek to and record only precomputed highlight events.
    Highlights,
}

/// Time base used by the cadence gates and overlay timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CadenceClock {
    /// Wall time since the video backend was activated.
    #[default]
    Wall,
    /// Session time since the first recorded sample.
    Session,
}

/// Complete capture configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Folder the video recorder writes into and the overlay is saved to.
    pub working_folder: PathBuf,
    /// Video prepended to the produced file list.
    pub intro_video: Option<String>,
    pub strategy: StrategyKind,
    /// Terminate the simulator once capture has finished.
    pub close_sim_after_recording: bool,
    pub sim_process_name: String,
    /// Run the replay faster than real time for a quick test capture.
    pub short_test_only: bool,
    pub timing_factor_for_short_test: i32,
    /// How long a stop condition must hold, in session seconds.
    pub grace_window_secs: f64,
    /// Replay frames per session second.
    pub frames_per_second: u32,
    pub race_start_frame: i32,
    pub leaderboard_interval_secs: f64,
    pub cam_driver_interval_secs: f64,
    pub cam_driver_log_interval_secs: f64,
    /// Pause after each replay acknowledgement during alignment.
    pub alignment_hold_secs: f64,
    /// Target length of a highlight reel.
    pub highlight_target_secs: f64,
    pub cadence_clock: CadenceClock,
    pub camera: CameraConfig,
}

/// Camera director tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Minimum time on one car before switching to a new battle.
    pub dwell_secs: f64,
    /// Session seconds a car may be out of the world before it counts as retired.
    pub retire_after_secs: f64,
    pub tv_camera: String,
    pub incident_camera: String,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            dwell_secs: 20.0,
            retire_after_secs: 60.0,
            tv_camera: "TV1".to_string(),
            incident_camera: "Chase".to_string(),
        }
    }
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            working_folder: PathBuf::from("."),
            intro_video: None,
            strategy: StrategyKind::Full,
            close_sim_after_recording: false,
            sim_process_name: "iRacingSim64DX11".to_string(),
            short_test_only: false,
            timing_factor_for_short_test: 4,
            grace_window_secs: 3.0,
            frames_per_second: 60,
            race_start_frame: 0,
            leaderboard_interval_secs: 0.5,
            cam_driver_interval_secs: 0.25,
            cam_driver_log_interval_secs: 4.0,
            alignment_hold_secs: 1.0,
            highlight_target_secs: 300.0,
            cadence_clock: CadenceClock::Wall,
            camera: CameraConfig::default(),
        }
    }
}

impl CaptureConfig {
    /// Load configuration from a JSON file.
    pub fn load_from_path(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading capture configuration");
        let content =
            std::fs::read_to_string(path).map_err(|e| CaptureError::persistence(path, e))?;
        let config: CaptureConfig = serde_json::from_str(&content)?;
        config.validate()?;
        info!(path = %path.display(), strategy = ?config.strategy, "Capture configuration loaded");
        Ok(config)
    }

    /// Write configuration as pretty JSON.
    pub fn save_to_path(&self, path: impl AsRef<Path>) -> CaptureResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| CaptureError::persistence(path, e))
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> CaptureResult<()> {
        let intervals = [
            ("leaderboard_interval_secs", self.leaderboard_interval_secs),
            ("cam_driver_interval_secs", self.cam_driver_interval_secs),
            (
                "cam_driver_log_interval_secs",
                self.cam_driver_log_interval_secs,
            ),
        ];
        for (name, value) in intervals {
            if !value.is_finite() || value <= 0.0 {
                return Err(CaptureError::invalid_configuration(format!(
                    "{name} must be greater than 0"
                )));
            }
        }
        if self.frames_per_second == 0 {
            return Err(CaptureError::invalid_configuration(
                "frames_per_second must be greater than 0",
            ));
        }
        if self.short_test_only && self.timing_factor_for_short_test <= 0 {
            return Err(CaptureError::invalid_configuration(
                "timing_factor_for_short_test must be greater than 0",
            ));
        }
        if !self.grace_window_secs.is_finite() || self.grace_window_secs < 0.0 {
            return Err(CaptureError::invalid_configuration(
                "grace_window_secs must not be negative",
            ));
        }
        if !self.alignment_hold_secs.is_finite() || self.alignment_hold_secs < 0.0 {
            return Err(CaptureError::invalid_configuration(
                "alignment_hold_secs must not be negative",
            ));
        }
        if self.close_sim_after_recording && self.sim_process_name.trim().is_empty() {
            return Err(CaptureError::invalid_configuration(
                "sim_process_name is required when close_sim_after_recording is set",
            ));
        }
        if !self.camera.dwell_secs.is_finite() || self.camera.dwell_secs < 0.0 {
            return Err(CaptureError::invalid_configuration(
                "camera.dwell_secs must not be negative",
            ));
        }
        Ok(())
    }

    /// Speed multiplier for the replay: the short-test factor, or 1.
    pub fn speed_factor(&self) -> i32 {
        if self.short_test_only {
            self.timing_factor_for_short_test.max(1)
        } else {
            1
        }
    }

    pub fn alignment_hold(&self) -> Duration {
        Duration::from_secs_f64(self.alignment_hold_secs)
    }

    pub fn leaderboard_interval(&self) -> Duration {
        Duration::from_secs_f64(self.leaderboard_interval_secs)
    }

    pub fn cam_driver_interval(&self) -> Duration {
        Duration::from_secs_f64(self.cam_driver_interval_secs)
    }

    pub fn cam_driver_log_interval(&self) -> Duration {
        Duration::from_secs_f64(self.cam_driver_log_interval_secs)
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }
}

/// Builder for [`CaptureConfig`].
#[derive(Debug, Default)]
pub struct CaptureConfigBuilder {
    config: CaptureConfig,
}

impl CaptureConfigBuilder {
    #[must_use]
    pub fn working_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.config.working_folder = folder.into();
        self
    }

    #[must_use]
    pub fn intro_video(mut self, file_name: impl Into<String>) -> Self {
        self.config.intro_video = Some(file_name.into());
        self
    }

    #[must_use]
    pub fn strategy(mut self, strategy: StrategyKind) -> Self {
        self.config.strategy = strategy;
        self
    }

    #[must_use]
    pub fn close_sim_after_recording(mut self, process_name: impl Into<String>) -> Self {
        self.config.close_sim_after_recording = true;
        self.config.sim_process_name = process_name.into();
        self
    }

    #[must_use]
    pub fn short_test(mut self, timing_factor: i32) -> Self {
        self.config.short_test_only = true;
        self.config.timing_factor_for_short_test = timing_factor;
        self
    }

    #[must_use]
    pub fn grace_window_secs(mut self, secs: f64) -> Self {
        self.config.grace_window_secs = secs;
        self
    }

    #[must_use]
    pub fn frames_per_second(mut self, fps: u32) -> Self {
        self.config.frames_per_second = fps;
        self
    }

    #[must_use]
    pub fn race_start_frame(mut self, frame: i32) -> Self {
        self.config.race_start_frame = frame;
        self
    }

    #[must_use]
    pub fn alignment_hold_secs(mut self, secs: f64) -> Self {
        self.config.alignment_hold_secs = secs;
        self
    }

    #[must_use]
    pub fn highlight_target_secs(mut self, secs: f64) -> Self {
        self.config.highlight_target_secs = secs;
        self
    }

    #[must_use]
    pub fn cadence_clock(mut self, clock: CadenceClock) -> Self {
        self.config.cadence_clock = clock;
        self
    }

    #[must_use]
    pub fn camera(mut self, camera: CameraConfig) -> Self {
        self.config.camera = camera;
        self
    }

    /// Validate and return the configuration.
    pub fn build(self) -> CaptureResult<CaptureConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
