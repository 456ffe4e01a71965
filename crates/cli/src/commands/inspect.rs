//! `replayctl inspect`: summarise a saved overlay.

use std::path::Path;

use anyhow::{Context, Result};
use replay_director_capture_recorder::load_overlay;

use super::ensure_exists;
use crate::output::{self, OverlaySummary};

pub async fn execute(file: &Path, json: bool) -> Result<()> {
    ensure_exists(file)?;
    let overlay = load_overlay(file).with_context(|| format!("reading {}", file.display()))?;
    output::print_overlay_summary(&OverlaySummary::from(&overlay), json);
    Ok(())
}
