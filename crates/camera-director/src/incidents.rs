//! Known incidents the camera should cover.

use replay_director_capture_core::{InterestLevel, RaceEvent};

/// An incident window in session time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Incident {
    pub start_time: f64,
    pub end_time: f64,
    pub car_idx: usize,
}

/// Incidents ordered by start time.
#[derive(Debug, Clone, Default)]
pub struct Incidents {
    incidents: Vec<Incident>,
}

impl Incidents {
    pub fn new(mut incidents: Vec<Incident>) -> Self {
        incidents.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        Self { incidents }
    }

    /// Incident events that name a car. Event times are relative to the race
    /// start; `race_start_session_time` converts them to session time.
    pub fn from_race_events(events: &[RaceEvent], race_start_session_time: f64) -> Self {
        Self::new(
            events
                .iter()
                .filter(|e| e.interest == InterestLevel::Incident)
                .filter_map(|e| {
                    Some(Incident {
                        start_time: race_start_session_time + e.start_time,
                        end_time: race_start_session_time + e.end_time,
                        car_idx: e.car_idx?,
                    })
                })
                .collect(),
        )
    }

    /// The earliest-starting incident covering `session_time`.
    pub fn active_at(&self, session_time: f64) -> Option<&Incident> {
        self.incidents
            .iter()
            .take_while(|i| i.start_time <= session_time)
            .find(|i| session_time < i.end_time)
    }

    pub fn len(&self) -> usize {
        self.incidents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    #[test]
    fn only_incidents_with_a_car_are_kept() -> TestResult {
        let events = vec![
            RaceEvent::new(10.0, 5.0, InterestLevel::Incident)?.with_car(3),
            RaceEvent::new(20.0, 5.0, InterestLevel::Incident)?,
            RaceEvent::new(30.0, 5.0, InterestLevel::Battle)?.with_car(2),
        ];
        let incidents = Incidents::from_race_events(&events, 100.0);
        assert_eq!(incidents.len(), 1);
        assert_eq!(incidents.active_at(112.0).map(|i| i.car_idx), Some(3));
        assert!(incidents.active_at(115.0).is_none());
        assert!(incidents.active_at(109.0).is_none());
        Ok(())
    }
}
