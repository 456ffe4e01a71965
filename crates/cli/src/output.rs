//! Output formatting for CLI responses

use anyhow::Error;
use colored::*;
use replay_director_capture_core::OverlayData;
use replay_director_capture_orchestrator::CaptureOutcome;
use serde::Serialize;
use serde_json::json;

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "causes": error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>(),
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format error as JSON: {}", e),
    }
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    for cause in error.chain().skip(1) {
        eprintln!("  {} {}", "Caused by:".yellow(), cause);
    }
}

pub fn print_success(message: &str, json: bool) {
    if json {
        print_json(&json!({ "success": true, "message": message }));
    } else {
        println!("{} {}", "✓".green(), message);
    }
}

fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

#[derive(Debug, Serialize)]
struct OutcomeSummary<'a> {
    success: bool,
    state: &'static str,
    overlay_file: String,
    video_files: Vec<&'a str>,
    samples_processed: u64,
    events_played: usize,
    cancelled: bool,
}

pub fn print_outcome(outcome: &CaptureOutcome, json: bool) {
    let summary = OutcomeSummary {
        success: true,
        state: outcome.state.as_str(),
        overlay_file: outcome.overlay_file.display().to_string(),
        video_files: outcome
            .video_files
            .iter()
            .map(|f| f.file_name.as_str())
            .collect(),
        samples_processed: outcome.report.samples_processed,
        events_played: outcome.report.events_played,
        cancelled: outcome.report.cancelled,
    };

    if json {
        print_json(&json!({ "success": true, "data": summary }));
        return;
    }

    let headline = if summary.cancelled {
        "Capture cancelled, partial overlay saved".yellow()
    } else {
        "Capture complete".green()
    };
    println!("{} {}", "✓".green(), headline.bold());
    println!("  {}: {}", "Overlay".bold(), summary.overlay_file);
    println!("  {}: {}", "Samples".bold(), summary.samples_processed);
    if summary.events_played > 0 {
        println!("  {}: {}", "Events played".bold(), summary.events_played);
    }
    println!("  {}:", "Videos".bold());
    for file in &summary.video_files {
        println!("    {}", file);
    }
}

/// Counts describing a saved overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlaySummary {
    pub captured_version: String,
    pub overlay_date_time: String,
    pub has_session_data: bool,
    pub race_events: usize,
    pub cam_drivers: usize,
    pub leader_boards: usize,
    pub pit_stops: usize,
    pub fastest_laps: usize,
    pub removal_edits: usize,
    pub video_files: Vec<String>,
    pub applied_timing_factor: f64,
}

impl From<&OverlayData> for OverlaySummary {
    fn from(overlay: &OverlayData) -> Self {
        Self {
            captured_version: overlay.captured_version.clone(),
            overlay_date_time: overlay.overlay_date_time.to_rfc3339(),
            has_session_data: overlay.session_data.is_some(),
            race_events: overlay.race_events.len(),
            cam_drivers: overlay.cam_drivers.len(),
            leader_boards: overlay.leader_boards.len(),
            pit_stops: overlay.pit_stops.len(),
            fastest_laps: overlay.fastest_laps.len(),
            removal_edits: overlay.removal_edits.len(),
            video_files: overlay
                .video_files
                .iter()
                .map(|f| f.file_name.clone())
                .collect(),
            applied_timing_factor: overlay.applied_timing_factor,
        }
    }
}

pub fn print_overlay_summary(summary: &OverlaySummary, json: bool) {
    if json {
        print_json(&json!({ "success": true, "data": summary }));
        return;
    }

    println!("{}", "Overlay".bold());
    println!("  Captured with: {}", summary.captured_version);
    println!("  Captured at:   {}", summary.overlay_date_time);
    if !summary.has_session_data {
        println!("  {}", "No session data".yellow());
    }
    let rows = [
        ("Race events", summary.race_events),
        ("Camera drivers", summary.cam_drivers),
        ("Leaderboards", summary.leader_boards),
        ("Pit stops", summary.pit_stops),
        ("Fastest laps", summary.fastest_laps),
        ("Removal edits", summary.removal_edits),
    ];
    for (label, count) in rows {
        println!("  {:<15} {}", format!("{label}:"), count);
    }
    if summary.applied_timing_factor < 1.0 {
        println!(
            "  {} {}",
            "Timing factor:".yellow(),
            summary.applied_timing_factor
        );
    }
    println!("  Videos:");
    for file in &summary.video_files {
        println!("    {}", file);
    }
}
