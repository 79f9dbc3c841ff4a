use std::io;
use std::path::PathBuf;

use monoize_git::GitError;
use thiserror::Error;

/// Failure to bring a source repository into local storage.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch `{locator}`: {source}")]
    Git {
        locator: String,
        #[source]
        source: GitError,
    },

    #[error("fetching `{0}` was cancelled")]
    Cancelled(String),

    #[error("fetching `{locator}` timed out after {seconds}s")]
    TimedOut { locator: String, seconds: u64 },

    #[error("scratch directory `{}` already exists", .0.display())]
    DestinationExists(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Failure to create or initialize the target repository.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("`{}` already exists", .0.display())]
    TargetExists(PathBuf),

    #[error("failed to initialize target: {0}")]
    Git(#[from] GitError),

    #[error("I/O error on `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// A single change could not be applied to the target.
#[derive(Debug, Error)]
pub enum ApplyError {
    #[error("change `{name}` does not apply: {source}")]
    Rejected {
        name: String,
        #[source]
        source: GitError,
    },

    #[error("target repository is finalized")]
    Finalized,

    #[error("not applied: replay was cancelled")]
    Cancelled,
}

/// Scratch state could not be removed.
#[derive(Debug, Error)]
#[error("failed to remove `{}`: {source}", .path.display())]
pub struct CleanupError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}
