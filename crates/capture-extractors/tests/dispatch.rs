//! Full extractor dispatch over a synthetic race.

use std::time::Duration;

use replay_director_capture_core::{CaptureConfig, OverlayData, Sample};
use replay_director_capture_extractors::{
    CamDriverQueue, ExtractorSet, RemovalEdits, SampleProcessor, SharedOverlay,
};
use replay_director_test_helpers::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn race() -> Vec<Sample> {
    let session = session_with_cars(4);
    race_stream(&session, 0.0, 20.0, 0.25, |b, t| {
        let b = b
            .caution((6.0..9.0).contains(&t))
            .camera(if t < 10.0 { 1 } else { 2 }, 9)
            .car(3, |c| c.on_pit_road = (12.0..15.0).contains(&t));
        if t >= 5.0 {
            b.car(2, |c| c.best_lap_time = Some(91.5))
        } else {
            b
        }
    })
}

fn capture(samples: &[Sample]) -> (OverlayData, Vec<usize>) {
    let overlay = SharedOverlay::default();
    let queue = CamDriverQueue::new();
    let removal = RemovalEdits::new(overlay.clone());
    let mut extractors = ExtractorSet::new(
        &overlay,
        removal,
        queue.sender(),
        &CaptureConfig::default(),
    );

    for sample in samples {
        extractors.process(sample, Duration::from_secs_f64(sample.session_time()));
    }
    extractors.finish();

    let cams = queue.drain_ordered().iter().map(|c| c.car_idx).collect();
    (overlay.snapshot(), cams)
}

#[test]
fn every_region_of_the_overlay_is_filled() -> TestResult {
    let (overlay, cams) = capture(&race());

    assert!(overlay.session_data.is_some());
    assert_eq!(overlay.removal_edits.len(), 1);
    assert_eq!(overlay.open_removal_edits(), 0);
    assert_eq!(overlay.pit_stops.len(), 1);
    assert_eq!(overlay.fastest_laps.len(), 1);
    assert_eq!(cams, vec![1, 2]);

    // One snapshot per half second, none during the caution.
    let during_caution = overlay
        .leader_boards
        .iter()
        .filter(|b| (6.0..9.0).contains(&b.start_time))
        .count();
    assert_eq!(during_caution, 0);
    assert!(overlay.leader_boards.len() >= 30);
    Ok(())
}

#[test]
fn duplicated_samples_change_nothing() -> TestResult {
    let samples = race();
    let doubled: Vec<Sample> = samples
        .iter()
        .flat_map(|s| [s.clone(), s.clone()])
        .collect();

    let (single, single_cams) = capture(&samples);
    let (twice, twice_cams) = capture(&doubled);

    assert_eq!(single.leader_boards, twice.leader_boards);
    assert_eq!(single.pit_stops, twice.pit_stops);
    assert_eq!(single.fastest_laps, twice.fastest_laps);
    assert_eq!(single.removal_edits, twice.removal_edits);
    assert_eq!(single_cams, twice_cams);
    Ok(())
}

#[test]
fn caution_left_open_is_closed_by_finish() -> TestResult {
    let session = session_with_cars(2);
    let samples = race_stream(&session, 0.0, 5.0, 0.5, |b, t| b.caution(t >= 3.0));
    let (overlay, _) = capture(&samples);

    let edit = overlay.removal_edits.first().ok_or("no removal edit")?;
    assert_eq!(edit.end_time, Some(5.0));
    Ok(())
}
