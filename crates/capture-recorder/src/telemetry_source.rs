//! Recorded telemetry in JSON-lines form.
//!
//! One [`Sample`] per line. Consecutive samples usually share their session
//! data; identical session data is deduplicated on load so every sample of
//! one session points at the same allocation.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use replay_director_capture_core::{
    CaptureError, CaptureResult, Sample, SampleIter, SessionData, TelemetrySource,
};
use tracing::{debug, info, warn};

/// Write samples as JSON lines.
pub fn write_samples<'a>(
    path: &Path,
    samples: impl IntoIterator<Item = &'a Sample>,
) -> CaptureResult<usize> {
    let file = File::create(path).map_err(|e| CaptureError::persistence(path, e))?;
    let mut writer = BufWriter::new(file);
    let mut count = 0usize;
    for sample in samples {
        serde_json::to_writer(&mut writer, sample)?;
        writer
            .write_all(b"\n")
            .map_err(|e| CaptureError::persistence(path, e))?;
        count += 1;
    }
    writer
        .flush()
        .map_err(|e| CaptureError::persistence(path, e))?;
    debug!(path = %path.display(), count, "Telemetry written");
    Ok(count)
}

/// Reads samples lazily from a JSON-lines file.
///
/// Unparseable lines are logged and skipped. With real-time playback the
/// reader sleeps so samples are delivered at the pace their session times
/// imply, divided by the playback speed.
pub struct RecordedTelemetrySource {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_number: usize,
    peeked: Option<Sample>,
    last_session: Option<Arc<SessionData>>,
    playback: Option<Playback>,
}

#[derive(Debug, Clone, Copy)]
struct Playback {
    speed: f64,
    origin: Option<(Instant, f64)>,
}

impl RecordedTelemetrySource {
    pub fn open(path: impl AsRef<Path>) -> CaptureResult<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::open(&path).map_err(|e| CaptureError::persistence(&path, e))?;
        info!(path = %path.display(), "Opened recorded telemetry");
        Ok(Self {
            path,
            lines: BufReader::new(file).lines(),
            line_number: 0,
            peeked: None,
            last_session: None,
            playback: None,
        })
    }

    /// Deliver samples in real time, scaled by `speed`.
    #[must_use]
    pub fn with_realtime_playback(mut self, speed: f64) -> Self {
        self.playback = Some(Playback {
            speed: if speed > 0.0 { speed } else { 1.0 },
            origin: None,
        });
        self
    }

    fn read_next(&mut self) -> Option<Sample> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    warn!(path = %self.path.display(), error = %e, "Telemetry read failed");
                    return None;
                }
            };
            self.line_number += 1;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<Sample>(&line) {
                Ok(mut sample) => {
                    match &self.last_session {
                        Some(last) if **last == *sample.session => {
                            sample.session = Arc::clone(last);
                        }
                        _ => self.last_session = Some(Arc::clone(&sample.session)),
                    }
                    return Some(sample);
                }
                Err(e) => warn!(line = self.line_number, error = %e, "Skipping malformed sample"),
            }
        }
    }

    fn pace(&mut self, sample: &Sample) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        let now = sample.session_time();
        let (started, origin) = *playback.origin.get_or_insert((Instant::now(), now));
        let due = ((now - origin) / playback.speed).max(0.0);
        let due = Duration::try_from_secs_f64(due).unwrap_or_default();
        if let Some(wait) = due.checked_sub(started.elapsed()) {
            thread::sleep(wait);
        }
    }
}

impl Iterator for RecordedTelemetrySource {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        let sample = match self.peeked.take() {
            Some(sample) => sample,
            None => self.read_next()?,
        };
        self.pace(&sample);
        Some(sample)
    }
}

impl TelemetrySource for RecordedTelemetrySource {
    fn first_sample(&mut self) -> CaptureResult<Sample> {
        if self.peeked.is_none() {
            self.peeked = self.read_next();
        }
        self.peeked.clone().ok_or(CaptureError::EmptyStream)
    }

    fn samples(self: Box<Self>) -> SampleIter {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_director_test_helpers::prelude::*;
    use std::io::Write as _;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn reads_back_written_samples_sharing_session() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("race.jsonl");
        let session = session_with_cars(3);
        let samples = race_stream(&session, 0.0, 2.0, 0.5, |b, _| b);
        assert_eq!(write_samples(&path, &samples)?, 5);

        let mut source = RecordedTelemetrySource::open(&path)?;
        let first = source.first_sample()?;
        assert!(first.session_time().abs() < 1e-9);

        let read: Vec<Sample> = Box::new(source).samples().collect();
        assert_eq!(read.len(), 5);
        let shared = read
            .windows(2)
            .all(|w| matches!(w, [a, b] if Arc::ptr_eq(&a.session, &b.session)));
        assert!(shared);
        Ok(())
    }

    #[test]
    fn malformed_lines_are_skipped() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("race.jsonl");
        let sample = SampleBuilder::new(session_with_cars(1)).at(4.0).build();
        write_samples(&path, [&sample])?;
        let mut file = std::fs::OpenOptions::new().append(true).open(&path)?;
        writeln!(file, "{{not json")?;
        writeln!(file)?;
        drop(file);

        let read: Vec<Sample> = RecordedTelemetrySource::open(&path)?.collect();
        assert_eq!(read.len(), 1);
        Ok(())
    }

    #[test]
    fn empty_file_has_no_first_sample() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("empty.jsonl");
        std::fs::write(&path, "")?;
        let mut source = RecordedTelemetrySource::open(&path)?;
        assert!(matches!(source.first_sample(), Err(CaptureError::EmptyStream)));
        Ok(())
    }
}
