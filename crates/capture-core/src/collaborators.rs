//! Contracts for the external systems a capture session drives.
//!
//! The telemetry source, video recorder, simulator replay engine, process
//! control and focus automation all live outside this workspace; the capture
//! pipeline only talks to them through these traits.

use std::path::Path;

use crate::error::{CaptureError, CaptureResult};
use crate::overlay::CapturedVideoFile;
use crate::sample::Sample;

/// Blocking, ordered iterator of samples.
pub type SampleIter = Box<dyn Iterator<Item = Sample> + Send>;

/// Replay speed that halts playback.
pub const REPLAY_SPEED_STOPPED: i32 = 0;
/// Replay speed for real-time playback.
pub const REPLAY_SPEED_NORMAL: i32 = 1;

/// Source of live telemetry samples.
pub trait TelemetrySource: Send {
    /// The first sample of the session, without consuming it.
    fn first_sample(&mut self) -> CaptureResult<Sample>;

    /// Consume the source as a blocking ordered sequence, starting with the
    /// sample returned by [`TelemetrySource::first_sample`].
    fn samples(self: Box<Self>) -> SampleIter;
}

/// Telemetry source over any in-memory or generated iterator.
pub struct IteratorSource<I: Iterator<Item = Sample>> {
    first: Option<Sample>,
    rest: I,
}

impl<I: Iterator<Item = Sample>> IteratorSource<I> {
    pub fn new(samples: impl IntoIterator<IntoIter = I>) -> Self {
        Self {
            first: None,
            rest: samples.into_iter(),
        }
    }
}

impl<I> TelemetrySource for IteratorSource<I>
where
    I: Iterator<Item = Sample> + Send + 'static,
{
    fn first_sample(&mut self) -> CaptureResult<Sample> {
        if self.first.is_none() {
            self.first = self.rest.next();
        }
        self.first.clone().ok_or(CaptureError::EmptyStream)
    }

    fn samples(self: Box<Self>) -> SampleIter {
        let this = *self;
        Box::new(this.first.into_iter().chain(this.rest))
    }
}

/// External video recorder.
pub trait VideoBackend: Send {
    /// Start recording into `destination_folder`.
    fn activate(&mut self, destination_folder: &Path) -> CaptureResult<()>;
    fn resume(&mut self) -> CaptureResult<()>;
    fn pause(&mut self) -> CaptureResult<()>;
    fn stop(&mut self) -> CaptureResult<()>;
    /// Stop recording and report the files produced since activation.
    fn deactivate(&mut self) -> CaptureResult<Vec<CapturedVideoFile>>;
}

/// Simulator replay subsystem.
pub trait ReplayEngine: Send {
    fn move_to_frame(&mut self, frame: i32) -> CaptureResult<()>;
    fn set_speed(&mut self, multiplier: i32) -> CaptureResult<()>;
    /// Block until the engine acknowledges it is ready.
    fn wait(&mut self) -> CaptureResult<()>;
    /// Point the replay camera at a car using a camera group.
    fn camera_on_driver(&mut self, car_number: &str, cam_group_number: i32) -> CaptureResult<()>;
}

/// OS process control.
pub trait ProcessControl: Send + Sync {
    /// Terminate every running process with this name, returning how many
    /// were terminated.
    fn terminate_by_name(&self, name: &str) -> CaptureResult<usize>;
}

/// Virtual keys used by focus automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualKey {
    Tab,
    Menu,
    Control,
    Shift,
}

/// A key pressed while a modifier is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    pub key: VirtualKey,
    pub modifier: VirtualKey,
}

impl Hotkey {
    /// Alt+Tab, used to hand focus back to the controlling application.
    pub const ALT_TAB: Hotkey = Hotkey {
        key: VirtualKey::Tab,
        modifier: VirtualKey::Menu,
    };
}

/// Keyboard automation used to restore application focus.
pub trait FocusRestorer: Send + Sync {
    fn send_hotkey(&self, hotkey: Hotkey) -> CaptureResult<()>;
}
