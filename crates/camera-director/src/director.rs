//! Camera direction rules.

use std::time::Duration;

use replay_director_capture_core::{
    CamDriver, CamDriverSource, CameraConfig, CarTelemetry, Sample, SessionData,
};
use replay_director_capture_extractors::RemovalEdits;
use tracing::{debug, warn};

use crate::catalog::{CameraCatalog, CameraRole};
use crate::channel::ReplayChannel;
use crate::incidents::Incidents;

/// Why the director chose its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionReason {
    Incident,
    FirstLap,
    Battle,
    Leader,
}

/// A camera change the director made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub car_idx: usize,
    pub car_number: String,
    pub driver_name: String,
    pub cam_group_number: i32,
    pub reason: DirectionReason,
}

impl Decision {
    pub fn into_cam_driver(self, elapsed: Duration) -> CamDriver {
        CamDriver {
            start_time: elapsed.as_secs_f64(),
            car_idx: self.car_idx,
            car_number: self.car_number,
            driver_name: self.driver_name,
            cam_group_number: self.cam_group_number,
            source: CamDriverSource::Directed,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Target {
    car_idx: usize,
    group: i32,
    reason: DirectionReason,
}

#[derive(Debug, Clone, Copy)]
struct Assignment {
    target: Target,
    since: f64,
}

/// Decides which car the replay camera follows and commands the change.
///
/// Rules, first match wins:
/// 1. an incident active at the sample's session time, on the incident camera;
/// 2. during the first lap, the leader on the TV camera;
/// 3. the current car is kept until it retires, pits or leaves the world,
///    or the dwell time runs out; then the closest battle on the TV camera,
///    or the leader when there is none or a removal range is open.
#[derive(Debug)]
pub struct CameraDirector {
    catalog: CameraCatalog,
    channel: ReplayChannel,
    incidents: Incidents,
    removal_edits: Option<RemovalEdits>,
    dwell_secs: f64,
    current: Option<Assignment>,
    commands_issued: u64,
}

impl CameraDirector {
    pub fn new(session: &SessionData, channel: ReplayChannel, config: &CameraConfig) -> Self {
        let catalog = CameraCatalog::from_session(session, config);
        debug!(%catalog, "Camera catalog");
        Self {
            catalog,
            channel,
            incidents: Incidents::default(),
            removal_edits: None,
            dwell_secs: config.dwell_secs,
            current: None,
            commands_issued: 0,
        }
    }

    #[must_use]
    pub fn with_incidents(mut self, incidents: Incidents) -> Self {
        self.incidents = incidents;
        self
    }

    #[must_use]
    pub fn with_removal_edits(mut self, removal_edits: RemovalEdits) -> Self {
        self.removal_edits = Some(removal_edits);
        self
    }

    pub fn catalog(&self) -> &CameraCatalog {
        &self.catalog
    }

    /// Car index and camera group currently assigned.
    pub fn current(&self) -> Option<(usize, i32)> {
        self.current.map(|a| (a.target.car_idx, a.target.group))
    }

    /// Camera commands sent to the replay engine so far.
    pub fn commands_issued(&self) -> u64 {
        self.commands_issued
    }

    /// Evaluate the rules against one sample. Returns the decision when the
    /// assignment changed.
    pub fn process(&mut self, sample: &Sample) -> Option<Decision> {
        let now = sample.session_time();
        let target = self.choose(sample)?;

        if let Some(current) = self.current.as_mut() {
            let same = current.target.car_idx == target.car_idx && current.target.group == target.group;
            if same {
                if current.target.reason != target.reason || now - current.since >= self.dwell_secs {
                    current.target.reason = target.reason;
                    current.since = now;
                }
                return None;
            }
        }

        let driver = sample.driver(target.car_idx);
        let car_number = driver.map_or_else(|| target.car_idx.to_string(), |d| d.car_number.clone());
        let showing = sample.telemetry.cam_car_idx == target.car_idx
            && sample.telemetry.cam_group_number == target.group;

        if !showing {
            if let Err(e) = self.channel.camera_on_driver(&car_number, target.group) {
                warn!(error = %e, car_number, "Camera command failed");
                return None;
            }
            self.commands_issued += 1;
        }

        debug!(
            car_number,
            cam_group = target.group,
            reason = ?target.reason,
            session_time = now,
            "Camera switched"
        );
        self.current = Some(Assignment { target, since: now });
        Some(Decision {
            car_idx: target.car_idx,
            car_number,
            driver_name: driver.map(|d| d.user_name.clone()).unwrap_or_default(),
            cam_group_number: target.group,
            reason: target.reason,
        })
    }

    fn choose(&self, sample: &Sample) -> Option<Target> {
        let now = sample.session_time();
        let tv = self.catalog.group_for(CameraRole::Tv);

        if let Some(incident) = self.incidents.active_at(now) {
            let visible = sample
                .telemetry
                .car(incident.car_idx)
                .is_some_and(CarTelemetry::is_in_world);
            if visible {
                return Some(Target {
                    car_idx: incident.car_idx,
                    group: self.catalog.group_for(CameraRole::Incident),
                    reason: DirectionReason::Incident,
                });
            }
        }

        let leader = sample.telemetry.leader().filter(|c| c.is_in_world())?;
        let leader_target = Target {
            car_idx: leader.car_idx,
            group: tv,
            reason: DirectionReason::Leader,
        };
        if leader.lap <= 1 {
            return Some(Target {
                reason: DirectionReason::FirstLap,
                ..leader_target
            });
        }

        if let Some(current) = self.current {
            let followable = matches!(
                current.target.reason,
                DirectionReason::Battle | DirectionReason::Leader
            );
            let car_ok = sample
                .telemetry
                .car(current.target.car_idx)
                .is_some_and(|c| c.is_in_world() && !c.has_retired && !c.is_in_pits());
            if followable && car_ok && now - current.since < self.dwell_secs {
                return Some(current.target);
            }
        }

        let excluding = self
            .removal_edits
            .as_ref()
            .is_some_and(RemovalEdits::is_excluding);
        if excluding {
            return Some(leader_target);
        }

        Some(closest_battle(sample).map_or(leader_target, |car_idx| Target {
            car_idx,
            group: tv,
            reason: DirectionReason::Battle,
        }))
    }
}

/// The chasing car of the classified pair with the smallest distance gap.
pub fn closest_battle(sample: &Sample) -> Option<usize> {
    let running: Vec<&CarTelemetry> = sample
        .telemetry
        .cars_by_position()
        .into_iter()
        .filter(|c| {
            c.position > 0
                && c.is_in_world()
                && !c.has_retired
                && !c.is_in_pits()
                && !sample.driver(c.car_idx).is_some_and(|d| d.is_pace_car)
        })
        .collect();

    running
        .windows(2)
        .filter_map(|pair| match pair {
            [ahead, behind] => Some((ahead.distance - behind.distance, behind.car_idx)),
            _ => None,
        })
        .filter(|(gap, _)| *gap >= 0.0)
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, car_idx)| car_idx)
}
