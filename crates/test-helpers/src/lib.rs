//! Shared test utilities for the replay director crates.
//!
//! - [`mock`] - Recording mocks for the replay engine, video backend,
//!   process control and focus automation
//! - [`builders`] - Synthetic sessions and sample streams
//!
//! ```rust,ignore
//! use replay_director_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod builders;
pub mod mock;
pub mod prelude;
