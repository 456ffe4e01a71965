//! The capture session controller.

use std::path::PathBuf;

use chrono::Utc;
use replay_director_camera_director::{CameraDirector, Incidents, ReplayChannel};
use replay_director_capture_cadence::VideoClock;
use replay_director_capture_core::{
    CaptureConfig, CaptureError, CaptureResult, CapturedVideoFile, FocusRestorer, Hotkey,
    OverlayData, ProcessControl, REPLAY_SPEED_STOPPED, RaceEvent, Sample, TelemetrySource,
    VideoBackend,
};
use replay_director_capture_extractors::{CamDriverQueue, RemovalEdits, SharedOverlay};
use replay_director_capture_recorder::save_capture;
use replay_director_capture_streams::Pacing;
use tracing::{error, info, warn};

use crate::align::Aligner;
use crate::state::{CaptureState, CaptureStateMachine};
use crate::strategy::{CancelToken, CaptureStrategy, RecordingReport, RecordingSession};

/// A finished capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureOutcome {
    pub overlay_file: PathBuf,
    pub video_files: Vec<CapturedVideoFile>,
    pub state: CaptureState,
    pub report: RecordingReport,
}

/// Drives one capture session through align, record and finalize.
///
/// Any session-fatal error moves the session to [`CaptureState::Failed`] and
/// is returned once; nothing is retried. The simulator is terminated on the
/// way out when configured, whether the session succeeded or not. If that
/// fails after the session already failed, both errors are returned as
/// [`CaptureError::ShutdownFailed`].
pub struct CaptureController {
    config: CaptureConfig,
    video: Box<dyn VideoBackend>,
    replay: ReplayChannel,
    process: Box<dyn ProcessControl>,
    focus: Box<dyn FocusRestorer>,
    known_events: Vec<RaceEvent>,
    state: CaptureStateMachine,
    cancel: CancelToken,
    video_active: bool,
    simulator_closed: bool,
}

impl CaptureController {
    pub fn new(
        config: CaptureConfig,
        video: impl VideoBackend + 'static,
        replay: ReplayChannel,
        process: impl ProcessControl + 'static,
        focus: impl FocusRestorer + 'static,
    ) -> CaptureResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            video: Box::new(video),
            replay,
            process: Box::new(process),
            focus: Box::new(focus),
            known_events: Vec::new(),
            state: CaptureStateMachine::new(),
            cancel: CancelToken::new(),
            video_active: false,
            simulator_closed: false,
        })
    }

    /// Race events from an earlier analysis; incidents among them steer the
    /// camera director.
    #[must_use]
    pub fn with_known_events(mut self, events: Vec<RaceEvent>) -> Self {
        self.known_events = events;
        self
    }

    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    pub fn state(&self) -> CaptureState {
        self.state.state()
    }

    pub fn history(&self) -> &[CaptureState] {
        self.state.history()
    }

    /// Handle that stops the sample loop before its next sample.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Run a complete session.
    pub fn run(
        &mut self,
        source: Box<dyn TelemetrySource>,
        strategy: &mut dyn CaptureStrategy,
    ) -> CaptureResult<CaptureOutcome> {
        self.state.transition(CaptureState::Aligning)?;
        info!(
            strategy = strategy.name(),
            working_folder = %self.config.working_folder.display(),
            "Capture session started"
        );

        match self.run_session(source, strategy) {
            Ok(outcome) => Ok(outcome),
            Err(e) => match self.fail(&e) {
                Some(shutdown) => Err(CaptureError::shutdown_failed(e, shutdown)),
                None => Err(e),
            },
        }
    }

    fn run_session(
        &mut self,
        mut source: Box<dyn TelemetrySource>,
        strategy: &mut dyn CaptureStrategy,
    ) -> CaptureResult<CaptureOutcome> {
        let first = source.first_sample()?;
        let pacing = Pacing::at_speed(self.config.speed_factor());

        let overlay = SharedOverlay::new(self.new_overlay(&first, pacing));
        let removal_edits = RemovalEdits::new(overlay.clone());
        let cam_drivers = CamDriverQueue::new();

        let race_start_session_time =
            f64::from(self.config.race_start_frame) / f64::from(self.config.frames_per_second);
        let mut director =
            CameraDirector::new(&first.session, self.replay.clone(), &self.config.camera)
                .with_removal_edits(removal_edits.clone())
                .with_incidents(Incidents::from_race_events(
                    &self.known_events,
                    race_start_session_time,
                ));

        let aligner = Aligner::new(
            self.replay.clone(),
            self.config.race_start_frame,
            pacing.scale(self.config.alignment_hold()),
        );
        if let Some(decision) = aligner.align(&mut director, &first)?
            && cam_drivers
                .sender()
                .send(decision.into_cam_driver(std::time::Duration::ZERO))
                .is_err()
        {
            warn!("Cam driver queue closed before recording");
        }

        if self.cancel.is_cancelled() {
            return Err(CaptureError::Cancelled);
        }

        self.state.transition(CaptureState::Recording)?;
        self.video.activate(&self.config.working_folder)?;
        self.video_active = true;
        let clock = VideoClock::start(self.config.cadence_clock, pacing.factor());

        let report = strategy.record(RecordingSession {
            config: &self.config,
            pacing,
            samples: source.samples(),
            video: self.video.as_mut(),
            replay: &self.replay,
            director,
            overlay: &overlay,
            removal_edits: &removal_edits,
            cam_drivers: &cam_drivers,
            clock,
            cancel: &self.cancel,
        })?;

        self.state.transition(CaptureState::Finalizing)?;
        let (overlay_file, video_files) =
            self.finalize(&overlay, &removal_edits, &cam_drivers)?;
        self.close_simulator()?;
        self.state.transition(CaptureState::Done)?;

        info!(
            overlay_file = %overlay_file.display(),
            videos = video_files.len(),
            "Capture session complete"
        );
        Ok(CaptureOutcome {
            overlay_file,
            video_files,
            state: self.state.state(),
            report,
        })
    }

    fn new_overlay(&self, first: &Sample, pacing: Pacing) -> OverlayData {
        let mut overlay = OverlayData::new(Utc::now());
        overlay.captured_version = env!("CARGO_PKG_VERSION").to_string();
        overlay.applied_timing_factor = pacing.applied_timing_factor();
        overlay.session_data = Some((*first.session).clone());
        overlay
    }

    fn finalize(
        &mut self,
        overlay: &SharedOverlay,
        removal_edits: &RemovalEdits,
        cam_drivers: &CamDriverQueue,
    ) -> CaptureResult<(PathBuf, Vec<CapturedVideoFile>)> {
        let files = self.video.deactivate()?;
        self.video_active = false;
        removal_edits.stop();

        let mut data = overlay.snapshot();
        data.cam_drivers = cam_drivers.drain_ordered();
        let working_folder = &self.config.working_folder;
        let overlay_file = save_capture(
            &mut data,
            files.clone(),
            self.config.intro_video.as_deref(),
            working_folder,
        )?;

        self.replay.set_speed(REPLAY_SPEED_STOPPED)?;
        if let Err(e) = self.focus.send_hotkey(Hotkey::ALT_TAB) {
            warn!(error = %e, "Could not restore application focus");
        }

        if files.is_empty() {
            return Err(CaptureError::no_video_files(working_folder));
        }
        Ok((overlay_file, files))
    }

    fn close_simulator(&mut self) -> CaptureResult<()> {
        if !self.config.close_sim_after_recording || self.simulator_closed {
            return Ok(());
        }
        self.simulator_closed = true;

        let name = &self.config.sim_process_name;
        match self.process.terminate_by_name(name)? {
            0 => Err(CaptureError::process_not_found(name)),
            terminated => {
                info!(process = %name, terminated, "Simulator terminated");
                Ok(())
            }
        }
    }

    /// Enter the failed state and clean up. Returns the simulator shutdown
    /// error, if terminating it failed as well.
    fn fail(&mut self, cause: &CaptureError) -> Option<CaptureError> {
        error!(error = %cause, state = %self.state.state(), "Capture session failed");
        if let Err(e) = self.state.transition(CaptureState::Failed) {
            warn!(error = %e, "Could not enter failed state");
        }

        if self.video_active {
            self.video_active = false;
            if let Err(e) = self.video.deactivate() {
                warn!(error = %e, "Could not deactivate video capture");
            }
        }
        match self.close_simulator() {
            Ok(()) => None,
            Err(e) => {
                error!(error = %e, "Could not terminate simulator");
                Some(e)
            }
        }
    }
}
