//! Cadence gates for race replay capture.
//!
//! Several extractors consume the same sample stream at different rates. Each
//! sits behind its own [`CadenceGate`], which forwards a sample only when the
//! configured interval of video time has passed since the last one it
//! accepted; the rest are dropped for that extractor without side effects.

#![deny(static_mut_refs)]

pub mod clock;
pub mod gate;

pub use clock::VideoClock;
pub use gate::{CadenceGate, CadenceStats, FnProcessor, SampleProcessor, from_fn};
