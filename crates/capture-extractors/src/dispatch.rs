//! Fixed-order dispatch of one sample to every extractor.

use crossbeam::channel::Sender;
use std::time::Duration;

use replay_director_capture_cadence::{CadenceGate, CadenceStats, SampleProcessor};
use replay_director_capture_core::{CamDriver, CaptureConfig, Sample};
use tracing::debug;

use crate::cam_driver::{CaptureCamDriver, LogCamDriver};
use crate::commentary::CommentaryMessages;
use crate::fastest_laps::RecordFastestLaps;
use crate::leaderboard::CaptureLeaderBoard;
use crate::pit_stop::RecordPitStop;
use crate::removal_edits::RemovalEdits;
use crate::session_data::SessionDataCapture;
use crate::shared::SharedOverlay;

/// Every extractor of a full capture, each behind its configured gate.
///
/// Dispatch order is fixed: extractors that other extractors read from run
/// first, so removal edits and pit stop commentary are current when the
/// leaderboard snapshot is taken.
pub struct ExtractorSet {
    session_data: SessionDataCapture,
    removal_edits: RemovalEdits,
    pit_stops: RecordPitStop,
    fastest_laps: RecordFastestLaps,
    leaderboard: CadenceGate<CaptureLeaderBoard>,
    cam_driver: CadenceGate<CaptureCamDriver>,
    cam_driver_log: CadenceGate<LogCamDriver>,
}

impl ExtractorSet {
    pub fn new(
        overlay: &SharedOverlay,
        removal_edits: RemovalEdits,
        cam_drivers: Sender<CamDriver>,
        config: &CaptureConfig,
    ) -> Self {
        let commentary = CommentaryMessages::default();
        Self {
            session_data: SessionDataCapture::new(overlay.clone()),
            pit_stops: RecordPitStop::new(overlay.clone(), commentary.clone()),
            fastest_laps: RecordFastestLaps::new(overlay.clone()),
            leaderboard: CadenceGate::new(
                config.leaderboard_interval(),
                CaptureLeaderBoard::new(overlay.clone(), commentary, removal_edits.clone()),
            ),
            cam_driver: CadenceGate::new(
                config.cam_driver_interval(),
                CaptureCamDriver::new(cam_drivers),
            ),
            cam_driver_log: CadenceGate::new(config.cam_driver_log_interval(), LogCamDriver),
            removal_edits,
        }
    }

    pub fn removal_edits(&self) -> &RemovalEdits {
        &self.removal_edits
    }

    /// Gate statistics: leaderboard, cam driver, cam driver log.
    pub fn gate_stats(&self) -> [CadenceStats; 3] {
        [
            self.leaderboard.stats(),
            self.cam_driver.stats(),
            self.cam_driver_log.stats(),
        ]
    }

    /// Close open removal ranges and log gate statistics.
    pub fn finish(&self) {
        self.removal_edits.stop();
        for (name, stats) in ["leaderboard", "cam_driver", "cam_driver_log"]
            .into_iter()
            .zip(self.gate_stats())
        {
            debug!(
                gate = name,
                processed = stats.processed_count,
                dropped = stats.dropped_count,
                "Cadence gate summary"
            );
        }
    }
}

impl SampleProcessor for ExtractorSet {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        self.session_data.process(sample, elapsed);
        self.removal_edits.process(sample, elapsed);
        self.pit_stops.process(sample, elapsed);
        self.fastest_laps.process(sample, elapsed);
        self.leaderboard.process(sample, elapsed);
        self.cam_driver.process(sample, elapsed);
        self.cam_driver_log.process(sample, elapsed);
    }
}
