//! Terminating processes by name.

use std::ffi::OsStr;

use replay_director_capture_core::{CaptureError, CaptureResult, ProcessControl};
use sysinfo::{ProcessesToUpdate, System};
use tracing::{debug, info, warn};

/// True if the executable name `candidate` is the process `wanted`.
///
/// Comparison ignores ASCII case and an `.exe` suffix on either side, so
/// `iRacingSim64DX11` matches `iracingsim64dx11.exe`.
pub fn matches_process_name(candidate: &OsStr, wanted: &str) -> bool {
    let Some(candidate) = candidate.to_str() else {
        return false;
    };
    strip_exe(candidate).eq_ignore_ascii_case(strip_exe(wanted.trim()))
}

fn strip_exe(name: &str) -> &str {
    match name.len().checked_sub(4).and_then(|at| name.get(at..)) {
        Some(suffix) if suffix.eq_ignore_ascii_case(".exe") => {
            name.get(..name.len().saturating_sub(4)).unwrap_or(name)
        }
        _ => name,
    }
}

/// [`ProcessControl`] backed by the process table `sysinfo` reports.
#[derive(Debug, Default, Clone, Copy)]
pub struct SysinfoProcessControl;

impl SysinfoProcessControl {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessControl for SysinfoProcessControl {
    fn terminate_by_name(&self, name: &str) -> CaptureResult<usize> {
        let mut system = System::new();
        system.refresh_processes(ProcessesToUpdate::All, true);

        let mut matched = 0usize;
        let mut terminated = 0usize;
        for (pid, process) in system.processes() {
            if !matches_process_name(process.name(), name) {
                continue;
            }
            matched += 1;
            if process.kill() {
                debug!(%pid, "Process killed");
                terminated += 1;
            } else {
                warn!(%pid, process = name, "Kill signal was not delivered");
            }
        }

        match (matched, terminated) {
            (0, _) => Err(CaptureError::process_not_found(name)),
            (_, 0) => Err(CaptureError::process_termination(
                name,
                format!("none of {matched} matching processes could be terminated"),
            )),
            _ => {
                info!(process = name, terminated, "Terminated processes");
                Ok(terminated)
            }
        }
    }
}
