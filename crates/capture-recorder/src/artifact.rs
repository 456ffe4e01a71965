//! `.replayscript` overlay artifact persistence.

use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use replay_director_capture_core::{CaptureError, CaptureResult, CapturedVideoFile, OverlayData};
use tracing::{debug, info};

/// Extension of a saved overlay.
pub const REPLAY_SCRIPT_EXTENSION: &str = "replayscript";

/// Where the overlay of a capture is saved: next to the first produced video
/// with its extension replaced, or a timestamped name in the working folder
/// when nothing was produced.
pub fn overlay_file_path(
    files: &[CapturedVideoFile],
    working_folder: &Path,
    overlay_date_time: DateTime<Utc>,
) -> PathBuf {
    match files.iter().find(|f| !f.is_intro_video) {
        Some(first) => Path::new(&first.file_name).with_extension(REPLAY_SCRIPT_EXTENSION),
        None => working_folder
            .join(format!(
                "unknown_capture-{}",
                overlay_date_time.format("%Y-%m-%d-%H-%M-%S")
            ))
            .with_extension(REPLAY_SCRIPT_EXTENSION),
    }
}

/// Write an overlay as pretty JSON.
pub fn save_overlay(overlay: &OverlayData, path: &Path) -> CaptureResult<()> {
    let file = File::create(path).map_err(|e| CaptureError::persistence(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, overlay)?;
    writer
        .flush()
        .map_err(|e| CaptureError::persistence(path, e))?;
    debug!(path = %path.display(), "Overlay written");
    Ok(())
}

pub fn load_overlay(path: &Path) -> CaptureResult<OverlayData> {
    let file = File::open(path).map_err(|e| CaptureError::persistence(path, e))?;
    let reader = BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Attach the produced files (intro video first) and save the overlay of a
/// finished capture. Returns the artifact path.
pub fn save_capture(
    overlay: &mut OverlayData,
    files: Vec<CapturedVideoFile>,
    intro_video: Option<&str>,
    working_folder: &Path,
) -> CaptureResult<PathBuf> {
    let path = overlay_file_path(&files, working_folder, overlay.overlay_date_time);
    info!(path = %path.display(), files = files.len(), "Saving overlay data");

    overlay.attach_video_files(intro_video, files);
    save_overlay(overlay, &path)?;
    Ok(path)
}

/// Save the overlay produced by a race analysis, before any video exists.
pub fn save_analysis(overlay: &OverlayData, working_folder: &Path) -> CaptureResult<PathBuf> {
    let path = working_folder.join(format!(
        "{}.analysis.{REPLAY_SCRIPT_EXTENSION}",
        overlay.overlay_date_time.format("%Y-%m-%d %H-%M-%S")
    ));
    info!(path = %path.display(), "Saving race analysis");
    save_overlay(overlay, &path)?;
    Ok(path)
}
