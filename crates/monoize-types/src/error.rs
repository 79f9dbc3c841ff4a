use std::path::PathBuf;

use thiserror::Error;

/// Input validation failures. Always raised before any I/O takes place.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unsupported scheme `{scheme}` in `{locator}`: only `http` and `https` are supported")]
    UnsupportedScheme { locator: String, scheme: String },

    #[error("invalid remote locator `{locator}`: {reason}")]
    InvalidLocator { locator: String, reason: String },

    #[error("cannot derive a repository name from `{0}`; pass one with `>>subdirectory`")]
    MissingRepositoryName(String),

    #[error("invalid subdirectory `{name}`: {reason}")]
    InvalidSubdirectory { name: String, reason: String },

    #[error("sources `{first}` and `{second}` both target subdirectory `{subdirectory}`")]
    DuplicateSubdirectory {
        subdirectory: String,
        first: String,
        second: String,
    },

    #[error("subdirectory `{inner}` of `{inner_source}` lies inside `{outer}` of `{outer_source}`")]
    NestedSubdirectory {
        outer: String,
        outer_source: String,
        inner: String,
        inner_source: String,
    },

    #[error("`{}` already exists", .0.display())]
    TargetExists(PathBuf),

    #[error("at least one source repository is required")]
    NoSources,

    #[error("committer identity needs both a name and an email")]
    IncompleteIdentity,
}
