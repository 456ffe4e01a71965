//! Track camera catalog.

use std::fmt;

use replay_director_capture_core::{CameraConfig, SessionData};
use tracing::warn;

/// What a camera is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraRole {
    /// Broadcast-style trackside camera.
    Tv,
    /// Close camera for incidents.
    Incident,
    Chase,
    Pit,
}

impl fmt::Display for CameraRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraRole::Tv => write!(f, "tv"),
            CameraRole::Incident => write!(f, "incident"),
            CameraRole::Chase => write!(f, "chase"),
            CameraRole::Pit => write!(f, "pit"),
        }
    }
}

/// Camera group numbers resolved for each role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraCatalog {
    tv: i32,
    incident: i32,
    chase: i32,
    pit: i32,
}

impl CameraCatalog {
    /// Resolve roles by group name (case-insensitive). A role whose camera
    /// the track does not have falls back to the first group, or group 1
    /// when the session lists none.
    pub fn from_session(session: &SessionData, config: &CameraConfig) -> Self {
        let fallback = session
            .camera_groups
            .first()
            .map_or(1, |g| g.group_number);
        let find = |role: CameraRole, name: &str| {
            session
                .camera_groups
                .iter()
                .find(|g| g.group_name.eq_ignore_ascii_case(name))
                .map(|g| g.group_number)
                .unwrap_or_else(|| {
                    warn!(%role, camera = name, fallback, "Camera not found on this track");
                    fallback
                })
        };

        Self {
            tv: find(CameraRole::Tv, &config.tv_camera),
            incident: find(CameraRole::Incident, &config.incident_camera),
            chase: find(CameraRole::Chase, "Chase"),
            pit: find(CameraRole::Pit, "Pit Lane"),
        }
    }

    pub fn group_for(&self, role: CameraRole) -> i32 {
        match role {
            CameraRole::Tv => self.tv,
            CameraRole::Incident => self.incident,
            CameraRole::Chase => self.chase,
            CameraRole::Pit => self.pit,
        }
    }
}

impl fmt::Display for CameraCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tv={} incident={} chase={} pit={}",
            self.tv, self.incident, self.chase, self.pit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_director_test_helpers::prelude::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn resolves_by_name_with_fallback() -> TestResult {
        let session = session_with_cars(1);
        let catalog = CameraCatalog::from_session(&session, &CameraConfig::default());
        assert_eq!(catalog.group_for(CameraRole::Tv), 9);
        assert_eq!(catalog.group_for(CameraRole::Incident), 12);
        assert_eq!(catalog.group_for(CameraRole::Pit), 1);
        Ok(())
    }

    #[test]
    fn empty_catalog_uses_group_one() -> TestResult {
        let catalog = CameraCatalog::from_session(&SessionData::default(), &CameraConfig::default());
        assert_eq!(catalog.group_for(CameraRole::Tv), 1);
        Ok(())
    }
}
