//! Types needed to configure and run a capture session.

pub use crate::controller::{CaptureController, CaptureOutcome};
pub use crate::state::CaptureState;
pub use crate::strategy::{CancelToken, CaptureStrategy, strategy_for};
pub use replay_director_camera_director::ReplayChannel;
pub use replay_director_capture_core::prelude::*;
