//! Running-order snapshots.

use std::time::Duration;

use replay_director_capture_cadence::SampleProcessor;
use replay_director_capture_core::{LeaderBoard, LeaderBoardEntry, Sample};

use crate::commentary::CommentaryMessages;
use crate::removal_edits::RemovalEdits;
use crate::shared::{SampleGuard, SharedOverlay};

/// Snapshots the classified order, gaps to the leader and the commentary on
/// screen. No snapshot is taken while a removal range is open; retired cars
/// and cars not in the world are left out.
#[derive(Debug, Clone)]
pub struct CaptureLeaderBoard {
    overlay: SharedOverlay,
    commentary: CommentaryMessages,
    removal_edits: RemovalEdits,
    guard: SampleGuard,
}

impl CaptureLeaderBoard {
    pub fn new(
        overlay: SharedOverlay,
        commentary: CommentaryMessages,
        removal_edits: RemovalEdits,
    ) -> Self {
        Self {
            overlay,
            commentary,
            removal_edits,
            guard: SampleGuard::default(),
        }
    }
}

/// Lap counter text for the leaderboard header.
pub fn race_position(sample: &Sample) -> String {
    let race_laps = sample.session.race_laps;
    let lap = sample.telemetry.leader().map_or(0, |c| c.lap).max(1);

    if sample.telemetry.leader_has_finished {
        "Results".to_string()
    } else if race_laps > 0 && lap >= race_laps {
        "Final Lap".to_string()
    } else if race_laps > 0 {
        format!("Lap {lap}/{race_laps}")
    } else {
        format!("Lap {lap}")
    }
}

impl SampleProcessor for CaptureLeaderBoard {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        if !self.guard.is_new(sample.session_time()) || self.removal_edits.is_excluding() {
            return;
        }

        let leader_distance = sample.telemetry.leader().map_or(0.0, |c| c.distance);
        let entries = sample
            .telemetry
            .cars_by_position()
            .into_iter()
            .filter(|c| c.position > 0 && c.is_in_world() && !c.has_retired)
            .filter_map(|car| {
                let driver = sample.driver(car.car_idx)?;
                if driver.is_pace_car {
                    return None;
                }
                Some(LeaderBoardEntry {
                    position: car.position,
                    car_idx: car.car_idx,
                    car_number: driver.car_number.clone(),
                    user_name: driver.user_name.clone(),
                    gap_laps: (leader_distance - car.distance).max(0.0),
                })
            })
            .collect();

        let board = LeaderBoard {
            start_time: elapsed.as_secs_f64(),
            race_position: race_position(sample),
            entries,
            messages: self.commentary.active(elapsed),
        };
        self.overlay.update(|overlay| overlay.leader_boards.push(board));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_director_capture_core::TrackLocation;
    use replay_director_test_helpers::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn capture(overlay: &SharedOverlay) -> (CaptureLeaderBoard, RemovalEdits, CommentaryMessages) {
        let commentary = CommentaryMessages::default();
        let removal = RemovalEdits::new(overlay.clone());
        let board = CaptureLeaderBoard::new(overlay.clone(), commentary.clone(), removal.clone());
        (board, removal, commentary)
    }

    #[test]
    fn snapshot_omits_retired_and_missing_cars() -> TestResult {
        let overlay = SharedOverlay::default();
        let (mut board, _, commentary) = capture(&overlay);
        commentary.add("#20 pitting", Duration::from_secs(1));

        let sample = SampleBuilder::new(session_with_cars(4))
            .at(2.0)
            .cars(|c| c.distance = 5.0 - c.car_idx as f32 * 0.1)
            .car(3, |c| c.has_retired = true)
            .car(4, |c| c.track_surface = TrackLocation::NotInWorld)
            .build();
        board.process(&sample, Duration::from_secs(2));

        let boards = overlay.read(|o| o.leader_boards.clone());
        let snapshot = boards.first().ok_or("no snapshot")?;
        let numbers: Vec<&str> = snapshot.entries.iter().map(|e| e.car_number.as_str()).collect();
        assert_eq!(numbers, vec!["10", "20"]);
        assert_eq!(snapshot.race_position, "Lap 1/10");
        assert_eq!(snapshot.messages, vec!["#20 pitting"]);
        let second = snapshot.entries.get(1).ok_or("missing entry")?;
        assert!((second.gap_laps - 0.1).abs() < 1e-4);
        Ok(())
    }

    #[test]
    fn no_snapshot_while_excluding() -> TestResult {
        let overlay = SharedOverlay::default();
        let (mut board, mut removal, _) = capture(&overlay);
        let caution = SampleBuilder::new(session_with_cars(2))
            .at(1.0)
            .caution(true)
            .build();

        removal.process(&caution, Duration::from_secs(1));
        board.process(&caution, Duration::from_secs(1));

        assert!(overlay.read(|o| o.leader_boards.is_empty()));
        Ok(())
    }

    #[test]
    fn header_text_follows_leader_lap() -> TestResult {
        let session = session_with_cars(2);
        let final_lap = SampleBuilder::new(session.clone()).car(1, |c| c.lap = 10).build();
        assert_eq!(race_position(&final_lap), "Final Lap");

        let results = SampleBuilder::new(session).race_over().build();
        assert_eq!(race_position(&results), "Results");
        Ok(())
    }
}
