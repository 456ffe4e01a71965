//! Capture session orchestration.
//!
//! A [`CaptureController`] runs one session through the
//! [`CaptureState`] phases: it aligns the replay to the race start, activates
//! the recorder, hands over to a [`CaptureStrategy`] and finally saves the
//! overlay artifact next to the produced video.
//!
//! Two strategies exist:
//!
//! - [`FullSessionCapture`] records the whole race from the live sample
//!   stream, feeding the extractors and the background camera director
//! - [`HighlightReel`] seeks to a selection of race events and records only
//!   those

#![deny(static_mut_refs)]

pub mod align;
pub mod controller;
pub mod highlights;
pub mod player;
pub mod prelude;
pub mod state;
pub mod strategy;

pub use align::Aligner;
pub use controller::{CaptureController, CaptureOutcome};
pub use highlights::{HighlightSelector, PriorityHighlightSelector};
pub use player::{EventPlayer, PlaybackSummary};
pub use state::{CaptureState, CaptureStateMachine};
pub use strategy::{
    CancelToken, CaptureStrategy, FullSessionCapture, HighlightReel, RecordingReport,
    RecordingSession, strategy_for,
};
