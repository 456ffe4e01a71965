//! Video-relative clocks.

use std::time::{Duration, Instant};

use replay_director_capture_core::{CadenceClock, Sample};
use tracing::debug;

/// Measures time since the start of the recorded video.
#[derive(Debug, Clone)]
pub enum VideoClock {
    /// Wall time since the video backend was activated.
    Wall { started: Instant },
    /// Session time since the first sample, divided by the replay speed.
    Session { first: Option<f64>, speed_factor: f64 },
}

impl VideoClock {
    /// Start a clock of the configured kind now.
    pub fn start(kind: CadenceClock, speed_factor: i32) -> Self {
        debug!(clock = ?kind, speed_factor, "Video clock started");
        match kind {
            CadenceClock::Wall => VideoClock::Wall {
                started: Instant::now(),
            },
            CadenceClock::Session => VideoClock::Session {
                first: None,
                speed_factor: f64::from(speed_factor.max(1)),
            },
        }
    }

    /// Elapsed video time at `sample`.
    pub fn elapsed(&mut self, sample: &Sample) -> Duration {
        match self {
            VideoClock::Wall { started } => started.elapsed(),
            VideoClock::Session {
                first,
                speed_factor,
            } => {
                let now = sample.session_time();
                let origin = *first.get_or_insert(now);
                let secs = ((now - origin) / *speed_factor).max(0.0);
                Duration::try_from_secs_f64(secs).unwrap_or_default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_director_test_helpers::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn session_clock_starts_at_first_sample() -> TestResult {
        let session = session_with_cars(1);
        let mut clock = VideoClock::start(CadenceClock::Session, 1);
        let at = |t: f64| SampleBuilder::new(session.clone()).at(t).build();

        assert_eq!(clock.elapsed(&at(120.0)), Duration::ZERO);
        assert_eq!(clock.elapsed(&at(122.5)), Duration::from_millis(2500));
        Ok(())
    }

    #[test]
    fn session_clock_divides_by_speed() -> TestResult {
        let session = session_with_cars(1);
        let mut clock = VideoClock::start(CadenceClock::Session, 4);
        let at = |t: f64| SampleBuilder::new(session.clone()).at(t).build();

        clock.elapsed(&at(0.0));
        assert_eq!(clock.elapsed(&at(8.0)), Duration::from_secs(2));
        Ok(())
    }
}
