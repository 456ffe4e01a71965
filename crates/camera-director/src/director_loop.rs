//! Background camera director thread.

use crossbeam::channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use replay_director_capture_core::{CamDriver, CaptureError, CaptureResult, Sample};
use tracing::{debug, error, info};

use crate::director::CameraDirector;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs a [`CameraDirector`] on its own thread during a full capture.
///
/// The primary loop offers each sample; the thread only ever sees the most
/// recent one, so camera switching never slows down extractor dispatch.
/// Decisions are appended to the cam-driver queue as directed entries.
pub struct CameraDirectorLoop {
    latest_tx: Sender<(Sample, Duration)>,
    latest_rx: Receiver<(Sample, Duration)>,
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<CameraDirector>>,
}

impl CameraDirectorLoop {
    pub fn spawn(director: CameraDirector, cam_drivers: Sender<CamDriver>) -> CaptureResult<Self> {
        let (latest_tx, latest_rx) = bounded(1);
        let running = Arc::new(AtomicBool::new(true));

        let rx = latest_rx.clone();
        let thread_running = Arc::clone(&running);
        let handle = thread::Builder::new()
            .name("camera-director".to_string())
            .spawn(move || Self::thread_main(director, rx, cam_drivers, thread_running))
            .map_err(|e| CaptureError::replay(format!("Failed to spawn camera director thread: {e}")))?;

        info!("Camera director loop started");
        Ok(Self {
            latest_tx,
            latest_rx,
            running,
            handle: Some(handle),
        })
    }

    /// Hand the thread the newest sample, replacing one it has not taken yet.
    pub fn offer(&self, sample: &Sample, elapsed: Duration) {
        let mut item = (sample.clone(), elapsed);
        loop {
            match self.latest_tx.try_send(item) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(returned)) => {
                    // Discard the stale sample and retry with the new one.
                    if self.latest_rx.try_recv().is_ok() {
                        debug!("Camera director behind, dropping stale sample");
                    }
                    item = returned;
                }
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Signal the thread to finish and join it, returning the director.
    pub fn stop(mut self) -> CaptureResult<CameraDirector> {
        self.running.store(false, Ordering::Release);
        let handle = self
            .handle
            .take()
            .ok_or_else(|| CaptureError::replay("Camera director loop already stopped"))?;

        match handle.join() {
            Ok(director) => {
                info!(
                    commands = director.commands_issued(),
                    "Camera director loop stopped"
                );
                Ok(director)
            }
            Err(_) => {
                error!("Camera director thread panicked");
                Err(CaptureError::replay("Camera director thread panicked"))
            }
        }
    }

    fn thread_main(
        mut director: CameraDirector,
        latest: Receiver<(Sample, Duration)>,
        cam_drivers: Sender<CamDriver>,
        running: Arc<AtomicBool>,
    ) -> CameraDirector {
        debug!("Camera director thread started");

        while running.load(Ordering::Acquire) {
            match latest.recv_timeout(POLL_INTERVAL) {
                Ok((sample, elapsed)) => {
                    Self::direct(&mut director, &sample, elapsed, &cam_drivers);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        // A sample offered just before stop() still gets a decision.
        if let Ok((sample, elapsed)) = latest.try_recv() {
            Self::direct(&mut director, &sample, elapsed, &cam_drivers);
        }

        director
    }

    fn direct(
        director: &mut CameraDirector,
        sample: &Sample,
        elapsed: Duration,
        cam_drivers: &Sender<CamDriver>,
    ) {
        if let Some(decision) = director.process(sample)
            && cam_drivers.send(decision.into_cam_driver(elapsed)).is_err()
        {
            debug!("Cam driver queue closed");
        }
    }
}

impl Drop for CameraDirectorLoop {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            error!("Camera director thread panicked");
        }
    }
}
