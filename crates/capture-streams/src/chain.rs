//! The fixed capture transform chain.

use replay_director_capture_core::{CaptureConfig, Sample};

use crate::SampleStreamExt;
use crate::annotations::DEFAULT_RETIRE_AFTER_SECS;
use crate::stop_policy::CompositeStopPolicy;

/// Parameters for [`capture_chain`].
#[derive(Debug, Clone, Copy)]
pub struct ChainConfig {
    pub frames_per_second: u32,
    pub grace_window_secs: f64,
    pub retire_after_secs: f64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 60,
            grace_window_secs: 3.0,
            retire_after_secs: DEFAULT_RETIRE_AFTER_SECS,
        }
    }
}

impl From<&CaptureConfig> for ChainConfig {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            frames_per_second: config.frames_per_second,
            grace_window_secs: config.grace_window_secs,
            retire_after_secs: config.camera.retire_after_secs,
        }
    }
}

/// Apply every correction and annotation stage in order, then the composite
/// stop policy.
pub fn capture_chain<I>(samples: I, config: ChainConfig) -> impl Iterator<Item = Sample>
where
    I: Iterator<Item = Sample>,
{
    samples
        .verify_replay_frames(config.frames_per_second)
        .with_corrected_percentages()
        .with_corrected_distances()
        .with_fastest_laps()
        .with_finishing_status(config.retire_after_secs)
        .with_pit_stop_counts()
        .take_until_stopped(CompositeStopPolicy::new(config.grace_window_secs))
}
