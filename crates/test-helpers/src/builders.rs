//! Builders for synthetic sessions and sample streams.

use std::sync::Arc;

use replay_director_capture_core::{
    CameraGroup, CarTelemetry, Driver, Sample, SessionData, SessionState, Telemetry,
    TrackLocation,
};

/// Replay frames per second used when deriving frame numbers.
pub const TEST_FPS: f64 = 60.0;

/// A session with `count` race cars (car indices `1..=count`) and the
/// standard camera groups.
pub fn session_with_cars(count: usize) -> Arc<SessionData> {
    let drivers = (1..=count)
        .map(|idx| Driver {
            car_idx: idx,
            car_number: format!("{}", idx * 10),
            user_name: format!("Driver {idx}"),
            car_class_id: if idx % 2 == 0 { 2 } else { 1 },
            car_class_name: if idx % 2 == 0 { "GT3" } else { "LMP2" }.to_string(),
            is_pace_car: false,
        })
        .collect();

    Arc::new(SessionData {
        session_info_update: 1,
        track_name: "Test Raceway".to_string(),
        race_laps: 10,
        drivers,
        camera_groups: vec![
            CameraGroup {
                group_number: 1,
                group_name: "Nose".to_string(),
            },
            CameraGroup {
                group_number: 9,
                group_name: "TV1".to_string(),
            },
            CameraGroup {
                group_number: 12,
                group_name: "Chase".to_string(),
            },
        ],
    })
}

/// Builder for a single sample.
#[derive(Debug, Clone)]
pub struct SampleBuilder {
    session: Arc<SessionData>,
    telemetry: Telemetry,
}

impl SampleBuilder {
    /// A racing sample at t=0 with every session car on track, ordered by
    /// car index, and the replay playing at normal speed.
    pub fn new(session: Arc<SessionData>) -> Self {
        let cars = session
            .drivers
            .iter()
            .filter(|d| !d.is_pace_car)
            .enumerate()
            .map(|(i, d)| CarTelemetry {
                car_idx: d.car_idx,
                lap: 1,
                lap_dist_pct: 0.5 - (i as f32) * 0.01,
                position: i as i32 + 1,
                class_position: i as i32 + 1,
                track_surface: TrackLocation::OnTrack,
                ..Default::default()
            })
            .collect();

        Self {
            session,
            telemetry: Telemetry {
                session_state: SessionState::Racing,
                replay_play_speed: 1,
                is_replay_playing: true,
                cam_car_idx: 1,
                cam_group_number: 9,
                cars,
                ..Default::default()
            },
        }
    }

    /// Session time; also derives the replay frame number at 60 fps.
    #[must_use]
    pub fn at(mut self, session_time: f64) -> Self {
        self.telemetry.session_time = session_time;
        self.telemetry.replay_frame_num = (session_time * TEST_FPS).round() as i32;
        self
    }

    #[must_use]
    pub fn frame(mut self, frame: i32) -> Self {
        self.telemetry.replay_frame_num = frame;
        self
    }

    #[must_use]
    pub fn state(mut self, state: SessionState) -> Self {
        self.telemetry.session_state = state;
        self
    }

    #[must_use]
    pub fn paused(mut self) -> Self {
        self.telemetry.replay_play_speed = 0;
        self.telemetry.is_replay_playing = false;
        self
    }

    #[must_use]
    pub fn caution(mut self, caution: bool) -> Self {
        self.telemetry.session_flags.caution = caution;
        self
    }

    #[must_use]
    pub fn camera(mut self, car_idx: usize, group: i32) -> Self {
        self.telemetry.cam_car_idx = car_idx;
        self.telemetry.cam_group_number = group;
        self
    }

    /// Mark the leader finished and every car checkered.
    #[must_use]
    pub fn race_over(mut self) -> Self {
        self.telemetry.leader_has_finished = true;
        for car in &mut self.telemetry.cars {
            car.has_seen_checkered_flag = true;
        }
        self
    }

    /// Mutate one car, if present.
    #[must_use]
    pub fn car(mut self, car_idx: usize, f: impl FnOnce(&mut CarTelemetry)) -> Self {
        if let Some(car) = self.telemetry.cars.iter_mut().find(|c| c.car_idx == car_idx) {
            f(car);
        }
        self
    }

    /// Mutate every car.
    #[must_use]
    pub fn cars(mut self, mut f: impl FnMut(&mut CarTelemetry)) -> Self {
        for car in &mut self.telemetry.cars {
            f(car);
        }
        self
    }

    pub fn build(self) -> Sample {
        Sample::new(self.session, self.telemetry)
    }
}

/// Samples every `step` seconds from `from` through `to` inclusive, each
/// shaped by `shape(builder, t)`.
pub fn race_stream(
    session: &Arc<SessionData>,
    from: f64,
    to: f64,
    step: f64,
    shape: impl Fn(SampleBuilder, f64) -> SampleBuilder,
) -> Vec<Sample> {
    let mut samples = Vec::new();
    let count = ((to - from) / step).round() as usize;
    for i in 0..=count {
        let t = from + step * i as f64;
        let builder = SampleBuilder::new(Arc::clone(session)).at(t);
        samples.push(shape(builder, t).build());
    }
    samples
}
