use thiserror::Error;

use crate::engine::ReplayState;

/// Misuse of the replay engine. Per-entry apply failures are not errors
/// here; they are reported in [`ReplayReport`](crate::ReplayReport).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReplayError {
    #[error("replay engine is {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: ReplayState,
        actual: ReplayState,
    },

    #[error("plan entry at position {0} appears more than once or out of order")]
    DuplicateEntry(usize),
}
