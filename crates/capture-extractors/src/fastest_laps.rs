use std::collections::HashMap;
use std::time::Duration;

use replay_director_capture_cadence::SampleProcessor;
use replay_director_capture_core::{FastLapRecord, Sample};
use tracing::info;

use crate::shared::{SampleGuard, SharedOverlay};

/// Appends a record each time a car beats its class's best lap.
#[derive(Debug, Clone)]
pub struct RecordFastestLaps {
    overlay: SharedOverlay,
    class_best: HashMap<i32, f64>,
    guard: SampleGuard,
}

impl RecordFastestLaps {
    pub fn new(overlay: SharedOverlay) -> Self {
        Self {
            overlay,
            class_best: HashMap::new(),
            guard: SampleGuard::default(),
        }
    }
}

impl SampleProcessor for RecordFastestLaps {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        if !self.guard.is_new(sample.session_time()) {
            return;
        }

        for car in sample.race_cars() {
            let (Some(lap_time), Some(driver)) = (car.best_lap_time, sample.driver(car.car_idx))
            else {
                continue;
            };
            let improves = self
                .class_best
                .get(&driver.car_class_id)
                .is_none_or(|best| lap_time < *best);
            if !improves {
                continue;
            }

            info!(
                class = %driver.car_class_name,
                car_number = %driver.car_number,
                lap_time,
                "Class fastest lap"
            );
            self.class_best.insert(driver.car_class_id, lap_time);
            let record = FastLapRecord {
                start_time: elapsed.as_secs_f64(),
                car_class_id: driver.car_class_id,
                car_idx: car.car_idx,
                car_number: driver.car_number.clone(),
                driver_name: driver.user_name.clone(),
                lap_time,
            };
            self.overlay.update(|overlay| overlay.fastest_laps.push(record));
        }
    }
}
