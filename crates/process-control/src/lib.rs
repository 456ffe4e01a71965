//! Operating system integration for capture sessions.
//!
//! [`SysinfoProcessControl`] terminates the simulator after capture and
//! [`LoggingFocusRestorer`] stands in for keyboard automation on platforms
//! where none is available.

#![deny(static_mut_refs)]

pub mod focus;
pub mod process;

pub use focus::LoggingFocusRestorer;
pub use process::{SysinfoProcessControl, matches_process_name};
