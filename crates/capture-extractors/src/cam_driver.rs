//! Camera assignment history.
//!
//! Both the primary capture loop and the background camera director append
//! camera assignments. They do so through a [`CamDriverQueue`]; the
//! controller drains it once, at the end of the session, into the overlay.

use crossbeam::channel::{Receiver, Sender, unbounded};
use std::time::Duration;

use replay_director_capture_cadence::SampleProcessor;
use replay_director_capture_core::{CamDriver, CamDriverSource, Sample};
use tracing::{info, trace};

use crate::shared::SampleGuard;

/// Multi-producer append queue for [`CamDriver`] entries.
#[derive(Debug, Clone)]
pub struct CamDriverQueue {
    tx: Sender<CamDriver>,
    rx: Receiver<CamDriver>,
}

impl Default for CamDriverQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl CamDriverQueue {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self { tx, rx }
    }

    pub fn sender(&self) -> Sender<CamDriver> {
        self.tx.clone()
    }

    /// Take everything queued so far, ordered by start time (stable, so
    /// entries at the same time keep their arrival order) with consecutive
    /// repeats of the same assignment removed.
    pub fn drain_ordered(&self) -> Vec<CamDriver> {
        let mut entries: Vec<CamDriver> = self.rx.try_iter().collect();
        entries.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        entries.dedup_by(|later, earlier| later.same_assignment(earlier));
        entries
    }
}

/// Build the assignment the sample's camera is showing.
pub fn observed_cam_driver(sample: &Sample, elapsed: Duration) -> CamDriver {
    let car_idx = sample.telemetry.cam_car_idx;
    let driver = sample.driver(car_idx);
    CamDriver {
        start_time: elapsed.as_secs_f64(),
        car_idx,
        car_number: driver.map_or_else(|| car_idx.to_string(), |d| d.car_number.clone()),
        driver_name: driver.map(|d| d.user_name.clone()).unwrap_or_default(),
        cam_group_number: sample.telemetry.cam_group_number,
        source: CamDriverSource::Observed,
    }
}

/// Records the camera assignment visible in the telemetry whenever it
/// changes.
#[derive(Debug, Clone)]
pub struct CaptureCamDriver {
    tx: Sender<CamDriver>,
    last: Option<CamDriver>,
    guard: SampleGuard,
}

impl CaptureCamDriver {
    pub fn new(tx: Sender<CamDriver>) -> Self {
        Self {
            tx,
            last: None,
            guard: SampleGuard::default(),
        }
    }
}

impl SampleProcessor for CaptureCamDriver {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        if !self.guard.is_new(sample.session_time()) {
            return;
        }

        let current = observed_cam_driver(sample, elapsed);
        if self.last.as_ref().is_some_and(|l| l.same_assignment(&current)) {
            return;
        }

        trace!(car_number = %current.car_number, group = current.cam_group_number, "Camera assignment observed");
        if self.tx.send(current.clone()).is_err() {
            trace!("Camera queue closed");
        }
        self.last = Some(current);
    }
}

/// Logs the current camera assignment for diagnostics.
#[derive(Debug, Clone, Default)]
pub struct LogCamDriver;

impl SampleProcessor for LogCamDriver {
    fn process(&mut self, sample: &Sample, elapsed: Duration) {
        let current = observed_cam_driver(sample, elapsed);
        info!(
            elapsed_secs = current.start_time,
            car_number = %current.car_number,
            driver = %current.driver_name,
            cam_group = current.cam_group_number,
            "Camera on driver"
        );
    }
}
