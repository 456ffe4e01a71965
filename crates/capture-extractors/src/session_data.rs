use std::time::Duration;

use replay_director_capture_cadence::SampleProcessor;
use replay_director_capture_core::Sample;
use tracing::debug;

use crate::shared::SharedOverlay;

/// Copies the session metadata into the overlay whenever the simulator's
/// session-info counter changes.
#[derive(Debug, Clone)]
pub struct SessionDataCapture {
    overlay: SharedOverlay,
    last_update: Option<i32>,
}

impl SessionDataCapture {
    pub fn new(overlay: SharedOverlay) -> Self {
        Self {
            overlay,
            last_update: None,
        }
    }
}

impl SampleProcessor for SessionDataCapture {
    fn process(&mut self, sample: &Sample, _elapsed: Duration) {
        let update = sample.session.session_info_update;
        if self.last_update == Some(update) {
            return;
        }

        debug!(session_info_update = update, "Session data changed");
        self.last_update = Some(update);
        let session = (*sample.session).clone();
        self.overlay.update(|overlay| overlay.session_data = Some(session));
    }
}
