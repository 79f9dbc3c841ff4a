use std::io;
use std::path::PathBuf;

use monoize_git::GitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to export history of `{locator}`: {source}")]
    Git {
        locator: String,
        #[source]
        source: GitError,
    },

    #[error("unexpected file `{}` in export directory", .0.display())]
    UnexpectedFile(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type ExtractionResult<T> = Result<T, ExtractionError>;
