//! Minimum-interval gate for sample processors.

use std::time::Duration;

use replay_director_capture_core::Sample;

/// A stateful consumer of samples.
///
/// `elapsed` is the time since the start of the recorded video; every
/// timestamp the processor writes to the overlay is expressed in it.
pub trait SampleProcessor {
    fn process(&mut self, sample: &Sample, elapsed: Duration);
}

impl<P: SampleProcessor + ?Sized> SampleProcessor for Box<P> {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        (**self).process(sample, elapsed);
    }
}

impl<P: SampleProcessor + ?Sized> SampleProcessor for &mut P {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        (**self).process(sample, elapsed);
    }
}

/// Adapts a closure into a [`SampleProcessor`].
pub struct FnProcessor<F>(F);

impl<F> SampleProcessor for FnProcessor<F>
where
    F: FnMut(&Sample, Duration),
{
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        (self.0)(sample, elapsed);
    }
}

/// Wrap a closure as a processor.
pub fn from_fn<F>(f: F) -> FnProcessor<F>
where
    F: FnMut(&Sample, Duration),
{
    FnProcessor(f)
}

/// Invokes the wrapped processor at most once per `min_interval`.
///
/// The first sample is always accepted. A sample whose elapsed time is
/// earlier than the last accepted one is dropped.
#[derive(Debug)]
pub struct CadenceGate<P> {
    processor: P,
    min_interval: Duration,
    last_invoked: Option<Duration>,
    processed_count: u64,
    dropped_count: u64,
}

impl<P> CadenceGate<P> {
    pub fn new(min_interval: Duration, processor: P) -> Self {
        Self {
            processor,
            min_interval,
            last_invoked: None,
            processed_count: 0,
            dropped_count: 0,
        }
    }

    /// Returns true and moves the reference instant if `elapsed` is due.
    pub fn should_process(&mut self, elapsed: Duration) -> bool {
        if let Some(last) = self.last_invoked {
            let due = elapsed
                .checked_sub(last)
                .is_some_and(|since| since >= self.min_interval);
            if !due {
                self.dropped_count += 1;
                return false;
            }
        }

        self.last_invoked = Some(elapsed);
        self.processed_count += 1;
        true
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Elapsed time of the last accepted sample.
    pub fn last_invoked(&self) -> Option<Duration> {
        self.last_invoked
    }

    pub fn processor(&self) -> &P {
        &self.processor
    }

    pub fn processor_mut(&mut self) -> &mut P {
        &mut self.processor
    }

    pub fn into_inner(self) -> P {
        self.processor
    }

    pub fn processed_count(&self) -> u64 {
        self.processed_count
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    pub fn stats(&self) -> CadenceStats {
        CadenceStats::from(self)
    }
}

impl<P: SampleProcessor> SampleProcessor for CadenceGate<P> {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        if self.should_process(elapsed) {
            self.processor.process(sample, elapsed);
        }
    }
}

/// Gate statistics for logging at the end of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CadenceStats {
    pub min_interval: Duration,
    pub processed_count: u64,
    pub dropped_count: u64,
}

impl CadenceStats {
    pub fn drop_rate_percent(&self) -> f32 {
        let total = self.dropped_count + self.processed_count;
        if total == 0 {
            0.0
        } else {
            (self.dropped_count as f32 / total as f32) * 100.0
        }
    }
}

impl<P> From<&CadenceGate<P>> for CadenceStats {
    fn from(gate: &CadenceGate<P>) -> Self {
        Self {
            min_interval: gate.min_interval,
            processed_count: gate.processed_count,
            dropped_count: gate.dropped_count,
        }
    }
}
