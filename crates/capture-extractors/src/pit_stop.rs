use std::collections::HashMap;
use std::time::Duration;

use replay_director_capture_cadence::SampleProcessor;
use replay_director_capture_core::{PitStopRecord, Sample};
use tracing::debug;

use crate::commentary::CommentaryMessages;
use crate::shared::{SampleGuard, SharedOverlay};

#[derive(Debug, Clone, Copy, Default)]
struct PitState {
    on_pit_road: bool,
    stops: u32,
}

/// Appends a record when a car enters pit road during the race and closes
/// it when the car leaves. Each transition is also posted as commentary.
#[derive(Debug, Clone)]
pub struct RecordPitStop {
    overlay: SharedOverlay,
    commentary: CommentaryMessages,
    cars: HashMap<usize, PitState>,
    guard: SampleGuard,
}

impl RecordPitStop {
    pub fn new(overlay: SharedOverlay, commentary: CommentaryMessages) -> Self {
        Self {
            overlay,
            commentary,
            cars: HashMap::new(),
            guard: SampleGuard::default(),
        }
    }
}

impl SampleProcessor for RecordPitStop {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        if !self.guard.is_new(sample.session_time()) {
            return;
        }
        let racing = sample.telemetry.session_state.is_racing();
        let now = elapsed.as_secs_f64();

        for car in sample.race_cars() {
            let Some(driver) = sample.driver(car.car_idx) else {
                continue;
            };
            let state = self.cars.entry(car.car_idx).or_insert(PitState {
                on_pit_road: car.on_pit_road,
                stops: 0,
            });

            if car.on_pit_road && !state.on_pit_road && racing {
                state.stops = car.pit_stop_count.max(state.stops + 1);
                let message = format!("#{} {} pitting", driver.car_number, driver.user_name);
                debug!(car_idx = car.car_idx, stop = state.stops, "Pit stop started");

                self.commentary.add(message.clone(), elapsed);
                let record = PitStopRecord {
                    start_time: now,
                    end_time: None,
                    car_idx: car.car_idx,
                    car_number: driver.car_number.clone(),
                    stop_number: state.stops,
                    message,
                };
                self.overlay.update(|overlay| overlay.pit_stops.push(record));
            } else if !car.on_pit_road && state.on_pit_road {
                let car_idx = car.car_idx;
                let closed = self.overlay.update(|overlay| {
                    let open = overlay
                        .pit_stops
                        .iter_mut()
                        .rev()
                        .find(|p| p.car_idx == car_idx && p.end_time.is_none());
                    match open {
                        Some(stop) => {
                            stop.end_time = Some(now);
                            true
                        }
                        None => false,
                    }
                });
                if closed {
                    debug!(car_idx, "Pit stop finished");
                    self.commentary
                        .add(format!("#{} leaves pit road", driver.car_number), elapsed);
                }
            }

            state.on_pit_road = car.on_pit_road;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_director_test_helpers::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn pit_entry_and_exit_produce_one_record() -> TestResult {
        let overlay = SharedOverlay::default();
        let commentary = CommentaryMessages::default();
        let mut recorder = RecordPitStop::new(overlay.clone(), commentary.clone());
        let session = session_with_cars(2);

        for (t, on) in [(0.0, false), (1.0, true), (1.0, false), (2.0, true), (3.0, false)] {
            let sample = SampleBuilder::new(session.clone())
                .at(t)
                .car(2, |c| c.on_pit_road = on)
                .build();
            recorder.process(&sample, Duration::from_secs_f64(t));
        }

        let stops = overlay.read(|o| o.pit_stops.clone());
        assert_eq!(stops.len(), 1);
        let stop = stops.first().ok_or("no pit stop")?;
        assert_eq!(stop.car_number, "20");
        assert_eq!(stop.stop_number, 1);
        assert_eq!(stop.end_time, Some(3.0));
        assert_eq!(
            commentary.active(Duration::from_secs(3)),
            vec!["#20 Driver 2 pitting", "#20 leaves pit road"]
        );
        Ok(())
    }

    #[test]
    fn car_already_in_pits_at_start_is_not_a_stop() -> TestResult {
        let overlay = SharedOverlay::default();
        let mut recorder = RecordPitStop::new(overlay.clone(), CommentaryMessages::default());
        let sample = SampleBuilder::new(session_with_cars(1))
            .car(1, |c| c.on_pit_road = true)
            .build();
        recorder.process(&sample, Duration::ZERO);
        assert!(overlay.read(|o| o.pit_stops.is_empty()));
        Ok(())
    }
}
