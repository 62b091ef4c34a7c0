//! Configuration errors.
//!
//! Only tour construction can fail. Everything at runtime degrades
//! gracefully instead: unresolved anchors render nothing, unparsable expiry
//! dates never expire, missing storage keys skip persistence.

use thiserror::Error;

/// Error returned by [`Tour::mount`](crate::pipeline::Tour::mount) for
/// configurations the engine cannot run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TourError {
    /// The step sequence is empty.
    #[error("a tour needs at least one step")]
    EmptySteps,

    /// The configured start step does not address any step.
    #[error("start step {start} is out of range for {len} step(s)")]
    StartStepOutOfRange { start: usize, len: usize },
}
