//! Annotation stages: fastest laps, finishing status and pit stop counts.

use std::collections::HashMap;

use replay_director_capture_core::{FastestLap, Sample};
use tracing::debug;

use crate::stage::SampleStage;

/// Seconds a car may be out of the world during racing before it is
/// considered retired.
pub const DEFAULT_RETIRE_AFTER_SECS: f64 = 60.0;

/// Tracks per-car best laps and the overall fastest lap.
///
/// A lap counts once the car's lap counter advances and the simulator
/// reports a positive `last_lap_time` for it.
#[derive(Debug, Clone, Default)]
pub struct FastestLaps {
    last_lap: HashMap<usize, i32>,
    best: HashMap<usize, f64>,
    overall: Option<FastestLap>,
}

impl FastestLaps {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleStage for FastestLaps {
    fn apply(&mut self, mut sample: Sample) -> Sample {
        let now = sample.telemetry.session_time;

        for car in &mut sample.telemetry.cars {
            let previous_lap = self.last_lap.insert(car.car_idx, car.lap);
            let completed = previous_lap.is_some_and(|lap| car.lap > lap);

            if completed && car.last_lap_time > 0.0 {
                let best = self.best.entry(car.car_idx).or_insert(car.last_lap_time);
                if car.last_lap_time < *best {
                    *best = car.last_lap_time;
                }

                let improves = self
                    .overall
                    .is_none_or(|f| car.last_lap_time < f.lap_time);
                if improves {
                    debug!(car_idx = car.car_idx, lap_time = car.last_lap_time, "New fastest lap");
                    self.overall = Some(FastestLap {
                        car_idx: car.car_idx,
                        lap_time: car.last_lap_time,
                        recorded_at: now,
                    });
                }
            }

            car.best_lap_time = self.best.get(&car.car_idx).copied();
        }

        sample.telemetry.fastest_lap = self.overall;
        sample
    }
}

#[derive(Debug, Clone, Default)]
struct CarFinish {
    lap: i32,
    checkered: bool,
    retired: bool,
    missing_since: Option<f64>,
}

/// Marks when the leader has finished, which cars have taken the chequered
/// flag and which cars have retired. All of these are sticky except a
/// retirement, which clears if the car rejoins before the leader finishes.
#[derive(Debug, Clone)]
pub struct FinishingStatus {
    retire_after_secs: f64,
    leader_finished: bool,
    cars: HashMap<usize, CarFinish>,
}

impl Default for FinishingStatus {
    fn default() -> Self {
        Self::new(DEFAULT_RETIRE_AFTER_SECS)
    }
}

impl FinishingStatus {
    pub fn new(retire_after_secs: f64) -> Self {
        Self {
            retire_after_secs,
            leader_finished: false,
            cars: HashMap::new(),
        }
    }
}

impl SampleStage for FinishingStatus {
    fn apply(&mut self, mut sample: Sample) -> Sample {
        let now = sample.telemetry.session_time;
        let state = sample.telemetry.session_state;

        let just_finished = !self.leader_finished && state.is_finished();
        if just_finished {
            self.leader_finished = true;
            debug!(session_time = now, "Leader has finished");
        }

        for car in &mut sample.telemetry.cars {
            let entry = self.cars.entry(car.car_idx).or_insert_with(|| CarFinish {
                lap: car.lap,
                ..Default::default()
            });

            if self.leader_finished && !entry.checkered {
                let crossed = car.lap > entry.lap;
                let is_leader = just_finished && car.position == 1;
                if crossed || is_leader {
                    entry.checkered = true;
                }
            }
            entry.lap = entry.lap.max(car.lap);

            if car.is_in_world() {
                entry.missing_since = None;
                if !self.leader_finished {
                    entry.retired = false;
                }
            } else {
                let since = *entry.missing_since.get_or_insert(now);
                if self.leader_finished {
                    entry.retired = true;
                } else if state.is_racing() && now - since >= self.retire_after_secs {
                    if !entry.retired {
                        debug!(car_idx = car.car_idx, session_time = now, "Car retired");
                    }
                    entry.retired = true;
                }
            }

            car.has_seen_checkered_flag = entry.checkered;
            car.has_retired = entry.retired;
        }

        sample.telemetry.leader_has_finished = self.leader_finished;
        sample
    }
}

/// Counts pit road entries per car while racing.
#[derive(Debug, Clone, Default)]
pub struct PitStopCounts {
    on_pit_road: HashMap<usize, bool>,
    counts: HashMap<usize, u32>,
}

impl PitStopCounts {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleStage for PitStopCounts {
    fn apply(&mut self, mut sample: Sample) -> Sample {
        let racing = sample.telemetry.session_state.is_racing();

        for car in &mut sample.telemetry.cars {
            let was_on_pit_road = self
                .on_pit_road
                .insert(car.car_idx, car.on_pit_road)
                .unwrap_or(car.on_pit_road);

            if racing && car.on_pit_road && !was_on_pit_road {
                *self.counts.entry(car.car_idx).or_default() += 1;
            }
            car.pit_stop_count = self.counts.get(&car.car_idx).copied().unwrap_or(0);
        }
        sample
    }
}
