//! Replay camera direction.
//!
//! The [`CameraDirector`] decides, per sample, which car the replay camera
//! follows and on which camera group, and commands the change through a
//! shared [`ReplayChannel`]. It runs once synchronously to position the
//! camera before recording starts, and on a background thread
//! ([`CameraDirectorLoop`]) for the rest of a full capture.

#![deny(static_mut_refs)]

pub mod catalog;
pub mod channel;
pub mod director;
pub mod director_loop;
pub mod incidents;

pub use catalog::{CameraCatalog, CameraRole};
pub use channel::ReplayChannel;
pub use director::{CameraDirector, Decision, DirectionReason, closest_battle};
pub use director_loop::CameraDirectorLoop;
pub use incidents::{Incident, Incidents};
