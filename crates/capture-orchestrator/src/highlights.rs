//! Choosing which race events make up a highlight reel.

use std::time::Duration;

use replay_director_capture_core::RaceEvent;
use tracing::debug;

/// Picks the events a highlight reel plays, in playback order.
pub trait HighlightSelector: Send {
    /// Select events whose total duration does not exceed `target`. The
    /// result is ordered by start time and contains no overlapping events.
    fn select(&self, events: &[RaceEvent], target: Duration) -> Vec<RaceEvent>;
}

/// Fills the reel with the most interesting events first.
///
/// Events are ranked by interest level, then by earliest start. Each event
/// that still fits the remaining time and does not overlap an event already
/// chosen is taken.
#[derive(Debug, Clone, Copy, Default)]
pub struct PriorityHighlightSelector;

impl HighlightSelector for PriorityHighlightSelector {
    fn select(&self, events: &[RaceEvent], target: Duration) -> Vec<RaceEvent> {
        let budget = target.as_secs_f64();
        let mut ranked: Vec<&RaceEvent> = events.iter().collect();
        ranked.sort_by(|a, b| {
            a.interest
                .cmp(&b.interest)
                .then(a.start_time.total_cmp(&b.start_time))
        });

        let mut total = 0.0;
        let mut chosen: Vec<RaceEvent> = Vec::new();
        for event in ranked {
            if total >= budget {
                break;
            }
            let fits = total + event.duration() <= budget;
            let overlaps = chosen
                .iter()
                .any(|c| event.start_time < c.end_time && c.start_time < event.end_time);
            if fits && !overlaps {
                total += event.duration();
                chosen.push(event.clone());
            }
        }

        chosen.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
        debug!(
            available = events.len(),
            selected = chosen.len(),
            total_secs = total,
            "Highlight events selected"
        );
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replay_director_capture_core::InterestLevel;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn starts(events: &[RaceEvent]) -> Vec<f64> {
        events.iter().map(|e| e.start_time).collect()
    }

    #[test]
    fn higher_interest_wins_and_result_is_chronological() -> TestResult {
        let events = vec![
            RaceEvent::new(100.0, 20.0, InterestLevel::Battle)?,
            RaceEvent::new(50.0, 10.0, InterestLevel::Incident)?,
            RaceEvent::new(0.0, 15.0, InterestLevel::FirstLap)?,
            RaceEvent::new(200.0, 10.0, InterestLevel::Pitting)?,
        ];
        let reel = PriorityHighlightSelector.select(&events, Duration::from_secs(45));
        assert_eq!(starts(&reel), vec![0.0, 50.0, 100.0]);
        Ok(())
    }

    #[test]
    fn smaller_events_fill_the_remaining_time() -> TestResult {
        let events = vec![
            RaceEvent::new(0.0, 30.0, InterestLevel::FirstLap)?,
            RaceEvent::new(60.0, 40.0, InterestLevel::Incident)?,
            RaceEvent::new(120.0, 10.0, InterestLevel::Overtake)?,
        ];
        let reel = PriorityHighlightSelector.select(&events, Duration::from_secs(45));
        assert_eq!(starts(&reel), vec![0.0, 120.0]);
        Ok(())
    }

    #[test]
    fn overlapping_events_are_taken_once() -> TestResult {
        let events = vec![
            RaceEvent::new(10.0, 20.0, InterestLevel::Incident)?,
            RaceEvent::new(15.0, 10.0, InterestLevel::Battle)?,
            RaceEvent::new(30.0, 5.0, InterestLevel::Battle)?,
        ];
        let reel = PriorityHighlightSelector.select(&events, Duration::from_secs(600));
        assert_eq!(starts(&reel), vec![10.0, 30.0]);
        Ok(())
    }
}
