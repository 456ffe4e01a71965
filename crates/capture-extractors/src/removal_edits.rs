//! Time ranges to cut from the final video.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

use replay_director_capture_cadence::SampleProcessor;
use replay_director_capture_core::{RemovalEdit, Sample};
use tracing::{debug, info};

use crate::shared::{SampleGuard, SharedOverlay};

const CAUTION_REASON: &str = "Caution";

#[derive(Debug, Default)]
struct RemovalState {
    excluding: bool,
    last_elapsed: f64,
    guard: SampleGuard,
}

/// Opens a removal range when a caution is shown and closes it when the
/// caution clears. Clones share state, so the leaderboard capture and the
/// camera director can ask [`RemovalEdits::is_excluding`].
#[derive(Debug, Clone)]
pub struct RemovalEdits {
    overlay: SharedOverlay,
    state: Arc<Mutex<RemovalState>>,
}

impl RemovalEdits {
    pub fn new(overlay: SharedOverlay) -> Self {
        Self {
            overlay,
            state: Arc::new(Mutex::new(RemovalState::default())),
        }
    }

    /// True while a removal range is open.
    pub fn is_excluding(&self) -> bool {
        self.state.lock().excluding
    }

    /// Close any range still open, at the last processed time.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        let end = state.last_elapsed;
        let closed = self.overlay.update(|overlay| {
            let mut closed = 0usize;
            for edit in overlay.removal_edits.iter_mut().filter(|e| e.is_open()) {
                edit.end_time = Some(end.max(edit.start_time));
                closed += 1;
            }
            closed
        });
        state.excluding = false;
        if closed > 0 {
            info!(closed, end_time = end, "Closed open removal edits at end of session");
        }
    }
}

impl SampleProcessor for RemovalEdits {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        let mut state = self.state.lock();
        if !state.guard.is_new(sample.session_time()) {
            return;
        }

        let now = elapsed.as_secs_f64();
        state.last_elapsed = now;
        let caution = sample.telemetry.session_flags.is_caution();

        if caution && !state.excluding {
            debug!(start_time = now, "Removal edit opened");
            self.overlay.update(|overlay| {
                overlay.removal_edits.push(RemovalEdit {
                    start_time: now,
                    end_time: None,
                    reason: CAUTION_REASON.to_string(),
                });
            });
            state.excluding = true;
        } else if !caution && state.excluding {
            debug!(end_time = now, "Removal edit closed");
            self.overlay.update(|overlay| {
                if let Some(edit) = overlay.removal_edits.iter_mut().rev().find(|e| e.is_open()) {
                    edit.end_time = Some(now);
                }
            });
            state.excluding = false;
        }
    }
}
