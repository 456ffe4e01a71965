//! Composite debounced stop policy.
//!
//! Two conditions are watched over session time: the race being over and the
//! replay being paused. Each must hold continuously for a grace window before
//! it ends the stream. The sample that completes the first window is still
//! yielded when it falls inside the window; one that lands past the window
//! end is dropped. Nothing after it is yielded.

use std::fmt;

use replay_director_capture_core::Sample;
use tracing::{debug, info};

/// Session-time slack when comparing a held span against the grace window.
const TIME_EPSILON: f64 = 1e-6;

/// Why a stream was ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The leader finished and every car is checkered, retired or off track.
    RaceFinished,
    /// The simulator replay stopped advancing.
    ReplayPaused,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::RaceFinished => write!(f, "race finished"),
            StopReason::ReplayPaused => write!(f, "replay paused"),
        }
    }
}

/// A condition that must stay true for `grace` seconds of session time.
#[derive(Debug, Clone, Copy)]
pub struct DebouncedCondition {
    grace: f64,
    first_true: Option<f64>,
}

impl DebouncedCondition {
    pub fn new(grace_secs: f64) -> Self {
        Self {
            grace: grace_secs.max(0.0),
            first_true: None,
        }
    }

    /// Feed one observation; returns true once the condition has held for
    /// the whole grace window.
    pub fn observe(&mut self, holds: bool, session_time: f64) -> bool {
        if !holds {
            self.first_true = None;
            return false;
        }
        let since = *self.first_true.get_or_insert(session_time);
        session_time - since + TIME_EPSILON >= self.grace
    }

    /// Session time at which the condition last became true, if it holds.
    pub fn first_true(&self) -> Option<f64> {
        self.first_true
    }

    /// Session time at which the current window completes, if it holds.
    pub fn window_end(&self) -> Option<f64> {
        self.first_true.map(|since| since + self.grace)
    }
}

/// Race-finished and replay-paused conditions, each debounced.
#[derive(Debug, Clone, Copy)]
pub struct CompositeStopPolicy {
    race_finished: DebouncedCondition,
    replay_paused: DebouncedCondition,
}

impl CompositeStopPolicy {
    /// Both conditions share the same grace window.
    pub fn new(grace_secs: f64) -> Self {
        Self::with_windows(grace_secs, grace_secs)
    }

    pub fn with_windows(race_finished_secs: f64, replay_paused_secs: f64) -> Self {
        Self {
            race_finished: DebouncedCondition::new(race_finished_secs),
            replay_paused: DebouncedCondition::new(replay_paused_secs),
        }
    }

    /// Evaluate both conditions against one sample.
    pub fn evaluate(&mut self, sample: &Sample) -> Option<StopReason> {
        let now = sample.session_time();
        let finished = self.race_finished.observe(sample.race_is_over(), now);
        let paused = self.replay_paused.observe(sample.replay_is_paused(), now);

        if finished {
            Some(StopReason::RaceFinished)
        } else if paused {
            Some(StopReason::ReplayPaused)
        } else {
            None
        }
    }

    /// End of the grace window that produced `reason`.
    pub fn window_end(&self, reason: StopReason) -> Option<f64> {
        match reason {
            StopReason::RaceFinished => self.race_finished.window_end(),
            StopReason::ReplayPaused => self.replay_paused.window_end(),
        }
    }
}

/// Iterator adapter that ends the stream when the stop policy fires.
#[derive(Debug)]
pub struct TakeUntilStopped<I> {
    inner: I,
    policy: CompositeStopPolicy,
    stopped: Option<StopReason>,
}

impl<I> TakeUntilStopped<I> {
    pub fn new(inner: I, policy: CompositeStopPolicy) -> Self {
        Self {
            inner,
            policy,
            stopped: None,
        }
    }

    /// Why the stream ended, once it has.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }
}

impl<I: Iterator<Item = Sample>> Iterator for TakeUntilStopped<I> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.stopped.is_some() {
            return None;
        }

        let sample = self.inner.next()?;
        if let Some(reason) = self.policy.evaluate(&sample) {
            let now = sample.session_time();
            info!(%reason, session_time = now, "Sample stream stopped");
            self.stopped = Some(reason);
            if let Some(end) = self.policy.window_end(reason)
                && now > end + TIME_EPSILON
            {
                debug!(
                    session_time = now,
                    window_end = end,
                    "Dropping sample past the grace window"
                );
                return None;
            }
        }
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.stopped.is_some() {
            (0, Some(0))
        } else {
            (0, self.inner.size_hint().1)
        }
    }
}

impl<I: Iterator<Item = Sample>> std::iter::FusedIterator for TakeUntilStopped<I> {}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn condition_must_hold_continuously() -> TestResult {
        let mut condition = DebouncedCondition::new(3.0);
        assert!(!condition.observe(true, 10.0));
        assert!(!condition.observe(true, 12.0));
        assert!(!condition.observe(false, 12.5));
        assert_eq!(condition.first_true(), None);
        assert!(!condition.observe(true, 13.0));
        assert!(!condition.observe(true, 15.9));
        assert!(condition.observe(true, 16.0));
        Ok(())
    }

    #[test]
    fn window_end_follows_first_true() -> TestResult {
        let mut condition = DebouncedCondition::new(3.0);
        assert_eq!(condition.window_end(), None);
        condition.observe(true, 10.0);
        let end = condition.window_end().ok_or("window not open")?;
        assert!((end - 13.0).abs() < 1e-9);
        Ok(())
    }

    #[test]
    fn zero_grace_fires_immediately() -> TestResult {
        let mut condition = DebouncedCondition::new(0.0);
        assert!(condition.observe(true, 1.0));
        Ok(())
    }

    #[test]
    fn tolerates_float_accumulation() -> TestResult {
        let mut condition = DebouncedCondition::new(3.0);
        let mut t = 10.0;
        condition.observe(true, t);
        for _ in 0..30 {
            t += 0.1;
        }
        assert!(condition.observe(true, t));
        Ok(())
    }
}
