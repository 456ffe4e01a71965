//! Replay frame integrity verification.

use replay_director_capture_core::{FrameIntegrity, Sample};
use tracing::warn;

use crate::stage::SampleStage;

/// Extra frames tolerated between samples before a gap is reported.
pub const FRAME_TOLERANCE: i32 = 2;

/// Flags duplicate, missing and rewound replay frames.
///
/// Nothing is dropped: a failed check only marks the sample's
/// [`FrameIntegrity`] and logs.
#[derive(Debug, Clone)]
pub struct VerifyReplayFrames {
    fps: f64,
    last: Option<(i32, f64)>,
    anomalies: u64,
}

impl VerifyReplayFrames {
    pub fn new(fps: u32) -> Self {
        Self {
            fps: f64::from(fps),
            last: None,
            anomalies: 0,
        }
    }

    /// Samples flagged as duplicate, gapped or rewound so far.
    pub fn anomalies(&self) -> u64 {
        self.anomalies
    }

    fn check(&self, frame: i32, session_time: f64) -> FrameIntegrity {
        let Some((last_frame, last_time)) = self.last else {
            return FrameIntegrity::Ok;
        };

        if frame == last_frame {
            return FrameIntegrity::Duplicate;
        }
        if frame < last_frame {
            return FrameIntegrity::Rewound;
        }

        let step = frame.saturating_sub(last_frame);
        let expected = ((session_time - last_time).max(0.0) * self.fps).round() as i32;
        if step > expected.saturating_add(FRAME_TOLERANCE) {
            let missing = u32::try_from(step.saturating_sub(expected)).unwrap_or(0);
            return FrameIntegrity::Gap { missing };
        }

        FrameIntegrity::Ok
    }
}

impl SampleStage for VerifyReplayFrames {
    fn apply(&mut self, mut sample: Sample) -> Sample {
        let frame = sample.telemetry.replay_frame_num;
        let session_time = sample.telemetry.session_time;
        let integrity = self.check(frame, session_time);

        match integrity {
            FrameIntegrity::Gap { missing } => {
                self.anomalies += 1;
                warn!(frame, missing, "Replay frames missing from telemetry stream");
            }
            FrameIntegrity::Rewound => {
                self.anomalies += 1;
                warn!(frame, session_time, "Replay frame moved backwards");
            }
            FrameIntegrity::Duplicate => self.anomalies += 1,
            FrameIntegrity::Ok | FrameIntegrity::Unchecked => {}
        }

        if integrity != FrameIntegrity::Duplicate {
            self.last = Some((frame, session_time));
        }
        sample.telemetry.frame_integrity = integrity;
        sample
    }
}
