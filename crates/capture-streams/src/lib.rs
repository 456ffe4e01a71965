//! Lazy sample transform chain for race replay capture.
//!
//! Every stage is an iterator adapter over [`Sample`]s, added through the
//! [`SampleStreamExt`] extension trait. Stages correct or annotate the sample
//! they are handed and never reorder or drop samples; only
//! [`SampleStreamExt::take_until_stopped`] ends a stream early.
//!
//! ```rust
//! use replay_director_capture_streams::prelude::*;
//! # use replay_director_capture_core::Sample;
//! # fn run(samples: Vec<Sample>) {
//! let recorded: Vec<_> = samples
//!     .into_iter()
//!     .verify_replay_frames(60)
//!     .with_corrected_percentages()
//!     .with_corrected_distances()
//!     .take_until_stopped(CompositeStopPolicy::new(3.0))
//!     .collect();
//! # let _ = recorded;
//! # }
//! ```

#![deny(static_mut_refs)]

pub mod annotations;
pub mod chain;
pub mod corrections;
pub mod pacing;
pub mod prelude;
pub mod stage;
pub mod stop_policy;
pub mod verify;

pub use annotations::{DEFAULT_RETIRE_AFTER_SECS, FastestLaps, FinishingStatus, PitStopCounts};
pub use chain::{ChainConfig, capture_chain};
pub use corrections::{CorrectedDistances, CorrectedPercentages};
pub use pacing::{AtSpeed, Pacing};
pub use stage::{SampleStage, Staged};
pub use stop_policy::{CompositeStopPolicy, DebouncedCondition, StopReason, TakeUntilStopped};
pub use verify::{FRAME_TOLERANCE, VerifyReplayFrames};

use replay_director_capture_core::Sample;

/// Transform stages available on any sample iterator.
pub trait SampleStreamExt: Iterator<Item = Sample> + Sized {
    /// Flag duplicate, missing and rewound replay frames.
    fn verify_replay_frames(self, fps: u32) -> Staged<Self, VerifyReplayFrames> {
        Staged::new(self, VerifyReplayFrames::new(fps))
    }

    fn with_corrected_percentages(self) -> Staged<Self, CorrectedPercentages> {
        Staged::new(self, CorrectedPercentages::new())
    }

    fn with_corrected_distances(self) -> Staged<Self, CorrectedDistances> {
        Staged::new(self, CorrectedDistances::new())
    }

    fn with_fastest_laps(self) -> Staged<Self, FastestLaps> {
        Staged::new(self, FastestLaps::new())
    }

    fn with_finishing_status(self, retire_after_secs: f64) -> Staged<Self, FinishingStatus> {
        Staged::new(self, FinishingStatus::new(retire_after_secs))
    }

    fn with_pit_stop_counts(self) -> Staged<Self, PitStopCounts> {
        Staged::new(self, PitStopCounts::new())
    }

    /// End the stream once either debounced stop condition fires.
    fn take_until_stopped(self, policy: CompositeStopPolicy) -> TakeUntilStopped<Self> {
        TakeUntilStopped::new(self, policy)
    }

    /// Call `hook(factor)` once before the first sample is pulled.
    fn at_speed<F: FnOnce(i32)>(self, factor: i32, hook: F) -> AtSpeed<Self, F> {
        AtSpeed::new(self, factor, hook)
    }
}

impl<I: Iterator<Item = Sample>> SampleStreamExt for I {}
