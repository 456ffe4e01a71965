//! Core types for race replay capture.
//!
//! This crate holds everything the capture pipeline shares:
//!
//! - [`sample`] - Telemetry samples as delivered by the simulator
//! - [`overlay`] - The overlay metadata artifact and its records
//! - [`collaborators`] - Traits for the telemetry source, video recorder,
//!   replay engine, process control and focus automation
//! - [`config`] - Capture session configuration
//! - [`error`] - Error taxonomy with session severity

#![deny(static_mut_refs)]

pub mod collaborators;
pub mod config;
pub mod error;
pub mod overlay;
pub mod prelude;
pub mod sample;

pub use collaborators::{
    FocusRestorer, Hotkey, IteratorSource, ProcessControl, REPLAY_SPEED_NORMAL,
    REPLAY_SPEED_STOPPED, ReplayEngine, SampleIter, TelemetrySource, VideoBackend, VirtualKey,
};
pub use config::{CadenceClock, CameraConfig, CaptureConfig, CaptureConfigBuilder, StrategyKind};
pub use error::{CaptureError, CaptureResult, ErrorSeverity};
pub use overlay::{
    CamDriver, CamDriverSource, CapturedVideoFile, FastLapRecord, InterestLevel, LeaderBoard,
    LeaderBoardEntry, OverlayData, PitStopRecord, RaceEvent, RemovalEdit,
};
pub use sample::{
    CameraGroup, CarTelemetry, Driver, FastestLap, FrameIntegrity, Sample, SessionData,
    SessionFlags, SessionState, Telemetry, TrackLocation,
};
