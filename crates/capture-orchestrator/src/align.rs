//! First-lap alignment before recording starts.

use std::thread;
use std::time::Duration;

use replay_director_camera_director::{CameraDirector, Decision, ReplayChannel};
use replay_director_capture_core::{CaptureResult, REPLAY_SPEED_NORMAL, Sample};
use tracing::{debug, info};

/// Seeks the replay to the race start and pre-positions the camera so the
/// first recorded frame already shows the right car.
#[derive(Debug, Clone)]
pub struct Aligner {
    replay: ReplayChannel,
    race_start_frame: i32,
    hold: Duration,
}

impl Aligner {
    /// `hold` is slept after each replay acknowledgement.
    pub fn new(replay: ReplayChannel, race_start_frame: i32, hold: Duration) -> Self {
        Self {
            replay,
            race_start_frame,
            hold,
        }
    }

    /// Seek, play at normal speed, wait for the engine, then run the director
    /// once against `first` and wait again.
    pub fn align(
        &self,
        director: &mut CameraDirector,
        first: &Sample,
    ) -> CaptureResult<Option<Decision>> {
        info!(frame = self.race_start_frame, "Aligning replay to race start");
        self.replay.move_to_frame(self.race_start_frame)?;
        self.replay.set_speed(REPLAY_SPEED_NORMAL)?;
        self.replay.wait()?;
        thread::sleep(self.hold);

        let decision = director.process(first);
        if let Some(decision) = &decision {
            debug!(
                car_number = %decision.car_number,
                group = decision.cam_group_number,
                "Camera pre-positioned"
            );
        }

        self.replay.wait()?;
        thread::sleep(self.hold);
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_director_capture_core::CameraConfig;
    use replay_director_test_helpers::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn seeks_then_positions_camera_between_waits() -> TestResult {
        let log = CallLog::new();
        let session = session_with_cars(2);
        let replay = ReplayChannel::new(MockReplayEngine::new(log.clone()));
        let mut director = CameraDirector::new(&session, replay.clone(), &CameraConfig::default());
        let first = SampleBuilder::new(session).at(0.0).camera(2, 1).build();

        let decision = Aligner::new(replay, 300, Duration::ZERO).align(&mut director, &first)?;

        assert_eq!(decision.map(|d| d.car_idx), Some(1));
        assert_eq!(
            log.calls(),
            vec![
                MockCall::MoveToFrame(300),
                MockCall::SetSpeed(REPLAY_SPEED_NORMAL),
                MockCall::Wait,
                MockCall::CameraOnDriver {
                    car_number: "10".to_string(),
                    group: 9
                },
                MockCall::Wait,
            ]
        );
        Ok(())
    }
}
