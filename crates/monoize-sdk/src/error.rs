use monoize_descriptor::ParseError;
use monoize_extract::ExtractionError;
use monoize_gateway::{FetchError, InitError};
use monoize_replay::ReplayError;
use monoize_types::ValidationError;
use thiserror::Error;

/// A failure that aborts the whole merge.
///
/// Per-change apply failures are not fatal and never show up here; they are
/// part of the [`MergeReport`](crate::MergeReport).
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("cannot prepare target: {0}")]
    Init(#[from] InitError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("cannot extract changes: {0}")]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("replay failed: {0}")]
    Replay(#[from] ReplayError),

    #[error("source task failed: {0}")]
    Task(String),
}

pub type MergeResult<T> = Result<T, MergeError>;
