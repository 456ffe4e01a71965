//! Overlay metadata artifact.
//!
//! [`OverlayData`] is created when a capture session starts, appended to by the
//! extractors while samples are processed, and finalized (video file list
//! attached, written to disk) when the session ends. All `start_time` values
//! are seconds relative to the start of the recorded video.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CaptureError, CaptureResult};
use crate::sample::SessionData;

/// The aggregate metadata artifact describing a captured session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayData {
    pub captured_version: String,
    pub overlay_date_time: DateTime<Utc>,
    #[serde(default)]
    pub session_data: Option<SessionData>,
    #[serde(default)]
    pub race_events: Vec<RaceEvent>,
    #[serde(default)]
    pub cam_drivers: Vec<CamDriver>,
    #[serde(default)]
    pub leader_boards: Vec<LeaderBoard>,
    #[serde(default)]
    pub pit_stops: Vec<PitStopRecord>,
    #[serde(default)]
    pub fastest_laps: Vec<FastLapRecord>,
    #[serde(default)]
    pub removal_edits: Vec<RemovalEdit>,
    #[serde(default)]
    pub video_files: Vec<CapturedVideoFile>,
    /// Inverse of the test-run speed multiplier, 1.0 for a normal capture.
    #[serde(default = "default_timing_factor")]
    pub applied_timing_factor: f64,
}

fn default_timing_factor() -> f64 {
    1.0
}

impl Default for OverlayData {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl OverlayData {
    pub fn new(overlay_date_time: DateTime<Utc>) -> Self {
        Self {
            captured_version: String::new(),
            overlay_date_time,
            session_data: None,
            race_events: Vec::new(),
            cam_drivers: Vec::new(),
            leader_boards: Vec::new(),
            pit_stops: Vec::new(),
            fastest_laps: Vec::new(),
            removal_edits: Vec::new(),
            video_files: Vec::new(),
            applied_timing_factor: 1.0,
        }
    }

    /// Attach the produced video files, with the intro video (if any) first.
    pub fn attach_video_files(
        &mut self,
        intro_video: Option<&str>,
        files: impl IntoIterator<Item = CapturedVideoFile>,
    ) {
        let mut video_files = Vec::new();
        if let Some(intro) = intro_video {
            video_files.push(CapturedVideoFile::intro(intro));
        }
        video_files.extend(files.into_iter().filter(|f| !f.is_intro_video));
        self.video_files = video_files;
    }

    /// Removal ranges that were never closed.
    pub fn open_removal_edits(&self) -> usize {
        self.removal_edits.iter().filter(|e| e.is_open()).count()
    }
}

/// How interesting a detected interval is; declaration order is priority
/// order (most interesting first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestLevel {
    FirstLap,
    LastLap,
    Incident,
    Battle,
    Overtake,
    FastestLap,
    Pitting,
    LeaderOnLap,
}

/// A detected interval of interest used for highlight playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceEvent {
    /// Seconds since race start.
    pub start_time: f64,
    pub end_time: f64,
    pub interest: InterestLevel,
    #[serde(default)]
    pub car_idx: Option<usize>,
    #[serde(default)]
    pub description: String,
}

impl RaceEvent {
    /// Create an event; `duration` must be strictly positive.
    pub fn new(start_time: f64, duration: f64, interest: InterestLevel) -> CaptureResult<Self> {
        let valid = start_time.is_finite() && duration.is_finite() && duration > 0.0;
        if !valid {
            return Err(CaptureError::invalid_configuration(format!(
                "race event duration must be > 0 (start {start_time}, duration {duration})"
            )));
        }
        Ok(Self {
            start_time,
            end_time: start_time + duration,
            interest,
            car_idx: None,
            description: String::new(),
        })
    }

    #[must_use]
    pub fn with_car(mut self, car_idx: usize) -> Self {
        self.car_idx = Some(car_idx);
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// Who or what recorded a camera assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CamDriverSource {
    /// Read back from the sample's camera state.
    #[default]
    Observed,
    /// Decided and commanded by the camera director.
    Directed,
}

/// Camera-group / driver assignment at a point in the video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CamDriver {
    pub start_time: f64,
    pub car_idx: usize,
    pub car_number: String,
    pub driver_name: String,
    pub cam_group_number: i32,
    #[serde(default)]
    pub source: CamDriverSource,
}

impl CamDriver {
    /// True when both entries point the same camera at the same car.
    pub fn same_assignment(&self, other: &CamDriver) -> bool {
        self.car_idx == other.car_idx && self.cam_group_number == other.cam_group_number
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderBoardEntry {
    pub position: i32,
    pub car_idx: usize,
    pub car_number: String,
    pub user_name: String,
    /// Distance behind the leader in laps.
    pub gap_laps: f32,
}

/// Snapshot of the running order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderBoard {
    pub start_time: f64,
    pub race_position: String,
    pub entries: Vec<LeaderBoardEntry>,
    #[serde(default)]
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PitStopRecord {
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub car_idx: usize,
    pub car_number: String,
    pub stop_number: u32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FastLapRecord {
    pub start_time: f64,
    pub car_class_id: i32,
    pub car_idx: usize,
    pub car_number: String,
    pub driver_name: String,
    pub lap_time: f64,
}

/// A time range to excise from the final cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemovalEdit {
    pub start_time: f64,
    pub end_time: Option<f64>,
    pub reason: String,
}

impl RemovalEdit {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// True if `time` falls inside the range (open ranges extend forever).
    pub fn contains(&self, time: f64) -> bool {
        time >= self.start_time && self.end_time.is_none_or(|end| time < end)
    }
}

/// A video file produced by the recorder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedVideoFile {
    pub file_name: String,
    #[serde(default)]
    pub is_intro_video: bool,
}

impl CapturedVideoFile {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            is_intro_video: false,
        }
    }

    pub fn intro(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            is_intro_video: true,
        }
    }
}
