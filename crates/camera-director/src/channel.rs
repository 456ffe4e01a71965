//! Serialized access to the simulator replay engine.

use parking_lot::Mutex;
use std::sync::Arc;

use replay_director_capture_core::{CaptureResult, ReplayEngine};
use tracing::trace;

/// Shared replay command channel.
///
/// The alignment step, the highlight player and the background camera
/// director all command the same replay engine. Every command takes the
/// lock for its own duration only, so two contexts never issue commands at
/// the same time.
#[derive(Clone)]
pub struct ReplayChannel {
    engine: Arc<Mutex<dyn ReplayEngine>>,
}

impl ReplayChannel {
    pub fn new<E: ReplayEngine + 'static>(engine: E) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn move_to_frame(&self, frame: i32) -> CaptureResult<()> {
        trace!(frame, "Replay move to frame");
        self.engine.lock().move_to_frame(frame)
    }

    pub fn set_speed(&self, multiplier: i32) -> CaptureResult<()> {
        trace!(multiplier, "Replay set speed");
        self.engine.lock().set_speed(multiplier)
    }

    /// Block until the engine acknowledges the previous command.
    pub fn wait(&self) -> CaptureResult<()> {
        self.engine.lock().wait()
    }

    pub fn camera_on_driver(&self, car_number: &str, cam_group_number: i32) -> CaptureResult<()> {
        trace!(car_number, cam_group_number, "Replay camera on driver");
        self.engine
            .lock()
            .camera_on_driver(car_number, cam_group_number)
    }
}

impl std::fmt::Debug for ReplayChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayChannel").finish_non_exhaustive()
    }
}
