//! What happens while the recorder is running.
//!
//! The controller owns activation and finalization; a [`CaptureStrategy`]
//! only drives the replay and the extractors between the two.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use replay_director_camera_director::{CameraDirector, CameraDirectorLoop, ReplayChannel};
use replay_director_capture_cadence::{SampleProcessor, VideoClock};
use replay_director_capture_core::{
    CaptureConfig, CaptureResult, RaceEvent, SampleIter, StrategyKind, VideoBackend,
};
use replay_director_capture_extractors::{
    CamDriverQueue, ExtractorSet, RemovalEdits, SharedOverlay,
};
use replay_director_capture_streams::{ChainConfig, Pacing, SampleStreamExt, capture_chain};
use tracing::{debug, info, warn};

use crate::highlights::{HighlightSelector, PriorityHighlightSelector};
use crate::player::EventPlayer;

/// Cooperative cancellation flag, checked before each sample is consumed.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a strategy may touch while recording.
pub struct RecordingSession<'a> {
    pub config: &'a CaptureConfig,
    pub pacing: Pacing,
    pub samples: SampleIter,
    pub video: &'a mut dyn VideoBackend,
    pub replay: &'a ReplayChannel,
    pub director: CameraDirector,
    pub overlay: &'a SharedOverlay,
    pub removal_edits: &'a RemovalEdits,
    pub cam_drivers: &'a CamDriverQueue,
    pub clock: VideoClock,
    pub cancel: &'a CancelToken,
}

/// Result of the recording phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordingReport {
    pub samples_processed: u64,
    pub events_played: usize,
    pub cancelled: bool,
}

/// A way of filling the recorder between activation and finalization.
pub trait CaptureStrategy: Send {
    fn name(&self) -> &'static str;

    fn record(&mut self, session: RecordingSession<'_>) -> CaptureResult<RecordingReport>;
}

/// The strategy configured in `config`. `highlight_events` are the events a
/// highlight reel may choose from; a full capture ignores them.
pub fn strategy_for(
    config: &CaptureConfig,
    highlight_events: Vec<RaceEvent>,
) -> Box<dyn CaptureStrategy> {
    match config.strategy {
        StrategyKind::Full => Box::new(FullSessionCapture),
        StrategyKind::Highlights => Box::new(HighlightReel::new(
            highlight_events,
            PriorityHighlightSelector,
        )),
    }
}

/// Records the whole race while following the live sample stream.
///
/// Every sample passes the transform chain, then goes to the extractors in
/// their fixed order on this thread and to the camera director on its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct FullSessionCapture;

impl CaptureStrategy for FullSessionCapture {
    fn name(&self) -> &'static str {
        "full"
    }

    fn record(&mut self, session: RecordingSession<'_>) -> CaptureResult<RecordingReport> {
        let RecordingSession {
            config,
            pacing,
            samples,
            replay,
            director,
            overlay,
            removal_edits,
            cam_drivers,
            mut clock,
            cancel,
            ..
        } = session;

        let mut extractors = ExtractorSet::new(
            overlay,
            removal_edits.clone(),
            cam_drivers.sender(),
            config,
        );
        let director_loop = CameraDirectorLoop::spawn(director, cam_drivers.sender())?;

        let speed_replay = replay.clone();
        let mut samples = capture_chain(samples, ChainConfig::from(config)).at_speed(
            pacing.factor(),
            move |factor| {
                if factor > 1
                    && let Err(e) = speed_replay.set_speed(factor)
                {
                    warn!(error = %e, factor, "Could not speed up replay");
                }
            },
        );

        let mut report = RecordingReport::default();
        loop {
            if cancel.is_cancelled() {
                info!("Capture cancelled, finishing early");
                report.cancelled = true;
                break;
            }
            let Some(sample) = samples.next() else {
                break;
            };

            let elapsed = clock.elapsed(&sample);
            debug!(elapsed_secs = elapsed.as_secs_f64(), "Recording at time");
            extractors.process(&sample, elapsed);
            director_loop.offer(&sample, elapsed);
            report.samples_processed += 1;
        }

        extractors.finish();
        director_loop.stop()?;
        info!(samples = report.samples_processed, "Race recording finished");
        Ok(report)
    }
}

/// Records only selected race events, seeking between them.
///
/// The camera is positioned once during alignment and not switched per
/// event.
pub struct HighlightReel<S> {
    events: Vec<RaceEvent>,
    selector: S,
}

impl<S: HighlightSelector> HighlightReel<S> {
    pub fn new(events: Vec<RaceEvent>, selector: S) -> Self {
        Self { events, selector }
    }
}

impl<S: HighlightSelector> CaptureStrategy for HighlightReel<S> {
    fn name(&self) -> &'static str {
        "highlights"
    }

    fn record(&mut self, session: RecordingSession<'_>) -> CaptureResult<RecordingReport> {
        let target = std::time::Duration::try_from_secs_f64(session.config.highlight_target_secs)
            .unwrap_or_default();
        let selected = self.selector.select(&self.events, target);
        info!(events = selected.len(), "Recording highlight reel");

        let player = EventPlayer::new(
            session.replay.clone(),
            session.config.frames_per_second,
            session.config.race_start_frame,
            session.pacing,
        );
        let summary = player.play(&selected, session.video)?;

        session
            .overlay
            .update(|overlay| overlay.race_events = selected);
        Ok(RecordingReport {
            samples_processed: 0,
            events_played: summary.events_played,
            cancelled: false,
        })
    }
}
