//! Replay speed multiplier for short test captures.

use std::time::Duration;

use replay_director_capture_core::Sample;
use tracing::info;

/// Playback speed multiplier and the timing factor it implies.
///
/// With a factor of 4 the replay runs four times faster than real time, so
/// one second of video covers four seconds of racing and every fixed wait
/// tied to replay progress is divided by four.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    factor: i32,
}

impl Default for Pacing {
    fn default() -> Self {
        Self::normal()
    }
}

impl Pacing {
    pub fn normal() -> Self {
        Self { factor: 1 }
    }

    /// Factors below one are treated as normal speed.
    pub fn at_speed(factor: i32) -> Self {
        Self {
            factor: factor.max(1),
        }
    }

    pub fn factor(&self) -> i32 {
        self.factor
    }

    pub fn is_normal(&self) -> bool {
        self.factor == 1
    }

    /// Multiplier applied to event durations: `1 / factor`.
    pub fn applied_timing_factor(&self) -> f64 {
        1.0 / f64::from(self.factor)
    }

    /// Scale a replay-bound wait to real time.
    pub fn scale(&self, wait: Duration) -> Duration {
        wait.mul_f64(self.applied_timing_factor())
    }
}

/// Iterator adapter that calls a hook with the speed factor once, just
/// before the first sample is pulled, then passes samples through.
pub struct AtSpeed<I, F> {
    inner: I,
    factor: i32,
    hook: Option<F>,
}

impl<I, F> AtSpeed<I, F> {
    pub fn new(inner: I, factor: i32, hook: F) -> Self {
        Self {
            inner,
            factor,
            hook: Some(hook),
        }
    }
}

impl<I, F> Iterator for AtSpeed<I, F>
where
    I: Iterator<Item = Sample>,
    F: FnOnce(i32),
{
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if let Some(hook) = self.hook.take() {
            info!(factor = self.factor, "Replaying at increased speed");
            hook(self.factor);
        }
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
