//! Corrections for lap percentage and distance glitches.
//!
//! The simulator reports `-1` lap percentage for cars that are not in the
//! world and updates the lap counter a few samples before or after the
//! percentage wraps at the start/finish line.

use std::collections::HashMap;

use replay_director_capture_core::Sample;

use crate::stage::SampleStage;

const WRAP_HIGH: f32 = 0.9;
const WRAP_LOW: f32 = 0.1;

/// Replaces negative lap percentages with the car's last valid value.
#[derive(Debug, Clone, Default)]
pub struct CorrectedPercentages {
    last_valid: HashMap<usize, f32>,
}

impl CorrectedPercentages {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleStage for CorrectedPercentages {
    fn apply(&mut self, mut sample: Sample) -> Sample {
        for car in &mut sample.telemetry.cars {
            if car.lap_dist_pct < 0.0 {
                car.lap_dist_pct = self.last_valid.get(&car.car_idx).copied().unwrap_or(0.0);
            } else {
                self.last_valid.insert(car.car_idx, car.lap_dist_pct);
            }
        }
        sample
    }
}

#[derive(Debug, Clone, Copy)]
struct DistanceState {
    lap: i32,
    pct: f32,
    distance: f32,
}

/// Computes `distance = lap + pct`, compensating for lap-counter lag and
/// never letting a car's distance go backwards.
#[derive(Debug, Clone, Default)]
pub struct CorrectedDistances {
    cars: HashMap<usize, DistanceState>,
}

impl CorrectedDistances {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SampleStage for CorrectedDistances {
    fn apply(&mut self, mut sample: Sample) -> Sample {
        for car in &mut sample.telemetry.cars {
            let previous = self.cars.get(&car.car_idx).copied();

            if car.lap < 0 {
                car.distance = previous.map_or(0.0, |p| p.distance);
                continue;
            }

            let mut distance = car.lap as f32 + car.lap_dist_pct;
            if let Some(prev) = previous {
                let wrapped = prev.pct > WRAP_HIGH && car.lap_dist_pct < WRAP_LOW;
                let counter_early = car.lap > prev.lap
                    && prev.pct > WRAP_HIGH
                    && car.lap_dist_pct > WRAP_HIGH;

                if wrapped && car.lap == prev.lap {
                    distance += 1.0;
                } else if counter_early {
                    distance -= 1.0;
                }
                distance = distance.max(prev.distance);
            }

            car.distance = distance;
            self.cars.insert(
                car.car_idx,
                DistanceState {
                    lap: car.lap,
                    pct: car.lap_dist_pct,
                    distance,
                },
            );
        }
        sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_director_test_helpers::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn car_sample(lap: i32, pct: f32) -> Sample {
        SampleBuilder::new(session_with_cars(1))
            .car(1, |c| {
                c.lap = lap;
                c.lap_dist_pct = pct;
            })
            .build()
    }

    fn pct_of(sample: &Sample) -> Result<f32, &'static str> {
        Ok(sample.telemetry.car(1).ok_or("car missing")?.lap_dist_pct)
    }

    fn distance_of(sample: &Sample) -> Result<f32, &'static str> {
        Ok(sample.telemetry.car(1).ok_or("car missing")?.distance)
    }

    #[test]
    fn negative_percentage_uses_last_valid() -> TestResult {
        let mut stage = CorrectedPercentages::new();
        assert!((pct_of(&stage.apply(car_sample(1, -1.0)))? - 0.0).abs() < f32::EPSILON);
        assert!((pct_of(&stage.apply(car_sample(1, 0.4)))? - 0.4).abs() < f32::EPSILON);
        assert!((pct_of(&stage.apply(car_sample(1, -1.0)))? - 0.4).abs() < f32::EPSILON);
        Ok(())
    }

    #[test]
    fn late_lap_counter_adds_a_lap() -> TestResult {
        let mut stage = CorrectedDistances::new();
        stage.apply(car_sample(3, 0.98));
        let wrapped = stage.apply(car_sample(3, 0.02));
        assert!((distance_of(&wrapped)? - 4.02).abs() < 1e-4);
        let caught_up = stage.apply(car_sample(4, 0.03));
        assert!((distance_of(&caught_up)? - 4.03).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn early_lap_counter_is_compensated() -> TestResult {
        let mut stage = CorrectedDistances::new();
        stage.apply(car_sample(3, 0.97));
        let early = stage.apply(car_sample(4, 0.99));
        assert!((distance_of(&early)? - 3.99).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn distance_never_decreases() -> TestResult {
        let mut stage = CorrectedDistances::new();
        stage.apply(car_sample(2, 0.5));
        let glitch = stage.apply(car_sample(2, 0.3));
        assert!((distance_of(&glitch)? - 2.5).abs() < 1e-4);
        let not_in_world = stage.apply(car_sample(-1, 0.0));
        assert!((distance_of(&not_in_world)? - 2.5).abs() < 1e-4);
        Ok(())
    }
}
