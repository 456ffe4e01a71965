//! Commonly used capture types.
//!
//! ```rust
//! use replay_director_capture_core::prelude::*;
//!
//! let config = CaptureConfig::default();
//! assert!(config.validate().is_ok());
//! ```

pub use crate::collaborators::{
    FocusRestorer, Hotkey, ProcessControl, ReplayEngine, TelemetrySource, VideoBackend,
};
pub use crate::config::{CadenceClock, CaptureConfig, StrategyKind};
pub use crate::error::{CaptureError, CaptureResult};
pub use crate::overlay::{CamDriver, CapturedVideoFile, OverlayData, RaceEvent};
pub use crate::sample::{CarTelemetry, Sample, SessionData, Telemetry, TrackLocation};
