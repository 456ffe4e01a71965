//! Stream stages and the extension trait.

pub use crate::SampleStreamExt;
pub use crate::chain::{ChainConfig, capture_chain};
pub use crate::pacing::Pacing;
pub use crate::stage::SampleStage;
pub use crate::stop_policy::{CompositeStopPolicy, StopReason};
