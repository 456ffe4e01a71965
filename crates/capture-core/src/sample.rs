//! Telemetry sample model.
//!
//! A [`Sample`] is an immutable snapshot of the simulator at one instant. The
//! raw fields come from the telemetry source; the annotation fields (marked
//! below) are only ever written by the stream transform stages.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One timestamped telemetry snapshot from the live session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sample {
    pub session: Arc<SessionData>,
    pub telemetry: Telemetry,
}

impl Sample {
    pub fn new(session: Arc<SessionData>, telemetry: Telemetry) -> Self {
        Self { session, telemetry }
    }

    /// Session time in seconds.
    pub fn session_time(&self) -> f64 {
        self.telemetry.session_time
    }

    /// Driver entry for a car index, if the session knows about it.
    pub fn driver(&self, car_idx: usize) -> Option<&Driver> {
        self.session.drivers.iter().find(|d| d.car_idx == car_idx)
    }

    /// Cars taking part in the race (pace car excluded).
    pub fn race_cars(&self) -> impl Iterator<Item = &CarTelemetry> {
        self.telemetry
            .cars
            .iter()
            .filter(|c| !self.driver(c.car_idx).is_some_and(|d| d.is_pace_car))
    }

    /// True when the leader has finished and every race car is either
    /// checkered, retired, or off the racing surface.
    pub fn race_is_over(&self) -> bool {
        self.telemetry.leader_has_finished
            && self.race_cars().all(|c| {
                c.has_seen_checkered_flag || c.has_retired || c.track_surface != TrackLocation::OnTrack
            })
    }

    /// True when the simulator replay is not advancing.
    pub fn replay_is_paused(&self) -> bool {
        !self.telemetry.is_replay_playing || self.telemetry.replay_play_speed == 0
    }
}

/// Session-level information, shared between all samples of one session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    /// Bumped by the simulator whenever any of the fields below change.
    pub session_info_update: i32,
    pub track_name: String,
    pub race_laps: i32,
    pub drivers: Vec<Driver>,
    pub camera_groups: Vec<CameraGroup>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub car_idx: usize,
    pub car_number: String,
    pub user_name: String,
    pub car_class_id: i32,
    pub car_class_name: String,
    #[serde(default)]
    pub is_pace_car: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CameraGroup {
    pub group_number: i32,
    pub group_name: String,
}

/// Simulator session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Invalid,
    GetInCar,
    Warmup,
    ParadeLaps,
    Racing,
    Checkered,
    CoolDown,
}

impl SessionState {
    pub fn is_racing(self) -> bool {
        matches!(self, SessionState::Racing)
    }

    pub fn is_finished(self) -> bool {
        self >= SessionState::Checkered
    }
}

/// Flags currently shown to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionFlags {
    pub green: bool,
    pub caution: bool,
    pub caution_waving: bool,
    pub checkered: bool,
}

impl SessionFlags {
    pub fn is_caution(&self) -> bool {
        self.caution || self.caution_waving
    }
}

/// Where a car currently is relative to the racing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackLocation {
    #[default]
    NotInWorld,
    OffTrack,
    InPitStall,
    ApproachingPits,
    OnTrack,
}

/// Result of comparing a sample's replay frame to its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FrameIntegrity {
    #[default]
    Unchecked,
    Ok,
    Duplicate,
    Gap { missing: u32 },
    Rewound,
}

/// Overall fastest lap seen so far in the session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FastestLap {
    pub car_idx: usize,
    pub lap_time: f64,
    pub recorded_at: f64,
}

/// Simulator-wide telemetry at one instant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Telemetry {
    pub session_time: f64,
    pub session_state: SessionState,
    #[serde(default)]
    pub session_flags: SessionFlags,
    pub replay_frame_num: i32,
    pub replay_play_speed: i32,
    pub is_replay_playing: bool,
    pub cam_car_idx: usize,
    pub cam_group_number: i32,
    pub cars: Vec<CarTelemetry>,

    // Annotations written by the transform chain.
    #[serde(default)]
    pub frame_integrity: FrameIntegrity,
    #[serde(default)]
    pub fastest_lap: Option<FastestLap>,
    #[serde(default)]
    pub leader_has_finished: bool,
}

impl Telemetry {
    pub fn car(&self, car_idx: usize) -> Option<&CarTelemetry> {
        self.cars.iter().find(|c| c.car_idx == car_idx)
    }

    /// Car currently classified first overall.
    pub fn leader(&self) -> Option<&CarTelemetry> {
        self.cars.iter().find(|c| c.position == 1)
    }

    /// Cars ordered by race position, unclassified cars (position 0) last.
    pub fn cars_by_position(&self) -> Vec<&CarTelemetry> {
        let mut cars: Vec<&CarTelemetry> = self.cars.iter().collect();
        cars.sort_by_key(|c| if c.position > 0 { c.position } else { i32::MAX });
        cars
    }
}

/// Per-car telemetry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CarTelemetry {
    pub car_idx: usize,
    pub lap: i32,
    pub lap_dist_pct: f32,
    pub position: i32,
    #[serde(default)]
    pub class_position: i32,
    pub track_surface: TrackLocation,
    #[serde(default)]
    pub on_pit_road: bool,
    #[serde(default)]
    pub last_lap_time: f64,

    // Annotations written by the transform chain.
    #[serde(default)]
    pub distance: f32,
    #[serde(default)]
    pub best_lap_time: Option<f64>,
    #[serde(default)]
    pub has_seen_checkered_flag: bool,
    #[serde(default)]
    pub has_retired: bool,
    #[serde(default)]
    pub pit_stop_count: u32,
}

impl CarTelemetry {
    pub fn is_in_world(&self) -> bool {
        self.track_surface != TrackLocation::NotInWorld
    }

    pub fn is_in_pits(&self) -> bool {
        self.on_pit_road
            || matches!(
                self.track_surface,
                TrackLocation::InPitStall | TrackLocation::ApproachingPits
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn session() -> Arc<SessionData> {
        Arc::new(SessionData {
            drivers: vec![
                Driver {
                    car_idx: 0,
                    car_number: "0".to_string(),
                    user_name: "Pace Car".to_string(),
                    is_pace_car: true,
                    ..Default::default()
                },
                Driver {
                    car_idx: 1,
                    car_number: "7".to_string(),
                    user_name: "A. Driver".to_string(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        })
    }

    #[test]
    fn race_is_over_ignores_pace_car() -> TestResult {
        let telemetry = Telemetry {
            leader_has_finished: true,
            cars: vec![
                CarTelemetry {
                    car_idx: 0,
                    track_surface: TrackLocation::OnTrack,
                    ..Default::default()
                },
                CarTelemetry {
                    car_idx: 1,
                    position: 1,
                    track_surface: TrackLocation::OnTrack,
                    has_seen_checkered_flag: true,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let sample = Sample::new(session(), telemetry);
        assert!(sample.race_is_over());
        Ok(())
    }

    #[test]
    fn race_not_over_until_leader_finishes() -> TestResult {
        let telemetry = Telemetry {
            leader_has_finished: false,
            cars: vec![CarTelemetry {
                car_idx: 1,
                track_surface: TrackLocation::InPitStall,
                ..Default::default()
            }],
            ..Default::default()
        };
        let sample = Sample::new(session(), telemetry);
        assert!(!sample.race_is_over());
        Ok(())
    }

    #[test]
    fn paused_when_speed_zero_or_not_playing() -> TestResult {
        let mut telemetry = Telemetry {
            is_replay_playing: true,
            replay_play_speed: 1,
            ..Default::default()
        };
        assert!(!Sample::new(session(), telemetry.clone()).replay_is_paused());

        telemetry.replay_play_speed = 0;
        assert!(Sample::new(session(), telemetry.clone()).replay_is_paused());

        telemetry.replay_play_speed = 1;
        telemetry.is_replay_playing = false;
        assert!(Sample::new(session(), telemetry).replay_is_paused());
        Ok(())
    }

    #[test]
    fn cars_by_position_puts_unclassified_last() -> TestResult {
        let telemetry = Telemetry {
            cars: vec![
                CarTelemetry {
                    car_idx: 3,
                    position: 0,
                    ..Default::default()
                },
                CarTelemetry {
                    car_idx: 4,
                    position: 2,
                    ..Default::default()
                },
                CarTelemetry {
                    car_idx: 5,
                    position: 1,
                    ..Default::default()
                },
            ],
            ..Default::default()
        };
        let order: Vec<usize> = telemetry.cars_by_position().iter().map(|c| c.car_idx).collect();
        assert_eq!(order, vec![5, 4, 3]);
        Ok(())
    }
}
