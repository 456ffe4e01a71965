//! Per-sample transformation stages.

use replay_director_capture_core::Sample;

/// A stateful rewrite applied to every sample in stream order.
///
/// Stages never drop or reorder samples; they only correct or annotate the
/// sample they are handed.
pub trait SampleStage {
    fn apply(&mut self, sample: Sample) -> Sample;
}

/// Iterator adapter running a [`SampleStage`] over a sample stream.
#[derive(Debug)]
pub struct Staged<I, S> {
    inner: I,
    stage: S,
}

impl<I, S> Staged<I, S> {
    pub fn new(inner: I, stage: S) -> Self {
        Self { inner, stage }
    }

    pub fn stage(&self) -> &S {
        &self.stage
    }
}

impl<I, S> Iterator for Staged<I, S>
where
    I: Iterator<Item = Sample>,
    S: SampleStage,
{
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        self.inner.next().map(|sample| self.stage.apply(sample))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}
