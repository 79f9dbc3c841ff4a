//! High-level API for monoize.
//!
//! Merges the histories of several remote repositories into one target
//! repository, each source under its own subdirectory, in global
//! chronological order. This is the entry point for embedding monoize; the
//! `monoize` binary is a thin layer over it.
//!
//! ```no_run
//! # async fn demo() -> Result<(), monoize_sdk::MergeError> {
//! use monoize_sdk::{MergeConfig, Monoize, NoOpObserver};
//!
//! let config = MergeConfig::from_args(&[
//!     "https://example.com/org/api.git",
//!     "https://example.com/org/web.git>>frontend",
//!     "mono",
//! ])?;
//! let report = Monoize::from_config(&config)
//!     .run(&config, &mut NoOpObserver)
//!     .await?;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;

pub use config::MergeConfig;
pub use error::{MergeError, MergeResult};
pub use pipeline::Monoize;
pub use report::{EntryReport, EntryStatus, MergeReport};

// Re-export key types
pub use monoize_descriptor::DATE_FORMAT;
pub use monoize_gateway::{Credentials, GitGateway, RepositoryGateway, TargetRepository};
pub use monoize_extract::{ChangeExtractor, FormatPatchExtractor};
pub use monoize_replay::{EntryOutcome, NoOpObserver, ReplayObserver};
pub use monoize_types::{
    ChangeDescriptor, ChangeUnit, Identity, MergePlanEntry, SourceSpec, ValidationError,
};
