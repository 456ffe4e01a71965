//! Playing selected race events into the recorder.

use std::thread;
use std::time::Duration;

use replay_director_camera_director::ReplayChannel;
use replay_director_capture_core::{CaptureResult, REPLAY_SPEED_NORMAL, RaceEvent, VideoBackend};
use replay_director_capture_streams::Pacing;
use tracing::{debug, info};

/// Seeks the replay to each event and records it for its full duration.
///
/// Seeks never rewind within one pass: an event that starts at or before
/// the furthest end frame played so far is played from wherever the replay
/// is.
#[derive(Debug, Clone)]
pub struct EventPlayer {
    replay: ReplayChannel,
    frames_per_second: u32,
    race_start_frame: i32,
    pacing: Pacing,
}

/// What an [`EventPlayer`] pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackSummary {
    pub events_played: usize,
    pub seeks: Vec<i32>,
    pub recorded: Duration,
}

impl EventPlayer {
    pub fn new(
        replay: ReplayChannel,
        frames_per_second: u32,
        race_start_frame: i32,
        pacing: Pacing,
    ) -> Self {
        Self {
            replay,
            frames_per_second,
            race_start_frame,
            pacing,
        }
    }

    /// Replay frame at `race_time` seconds after the race start.
    pub fn frame_at(&self, race_time: f64) -> i32 {
        let offset = (race_time * f64::from(self.frames_per_second)).round() as i32;
        self.race_start_frame.saturating_add(offset)
    }

    /// Play `events` in order, then stop the recorder.
    pub fn play(
        &self,
        events: &[RaceEvent],
        video: &mut dyn VideoBackend,
    ) -> CaptureResult<PlaybackSummary> {
        let mut summary = PlaybackSummary::default();
        let mut furthest_end: Option<i32> = None;

        for event in events {
            let frame = self.frame_at(event.start_time);
            if furthest_end.is_none_or(|end| end < frame) {
                self.replay.move_to_frame(frame)?;
                summary.seeks.push(frame);
            }

            self.replay.set_speed(REPLAY_SPEED_NORMAL)?;
            video.resume()?;

            let hold = self
                .pacing
                .scale(Duration::try_from_secs_f64(event.duration()).unwrap_or_default());
            debug!(
                frame,
                interest = ?event.interest,
                duration_ms = hold.as_millis(),
                "Recording race event"
            );
            thread::sleep(hold);

            summary.events_played += 1;
            summary.recorded = summary.recorded.saturating_add(hold);
            let end = self.frame_at(event.end_time);
            furthest_end = Some(furthest_end.map_or(end, |furthest| furthest.max(end)));
        }

        info!(events = summary.events_played, "Race events recorded");
        video.stop()?;
        Ok(summary)
    }
}
