//! Foundation types for monoize.
//!
//! Every other monoize crate depends on `monoize-types`. The types here carry
//! no I/O; they describe what is merged and in which order.
//!
//! # Key Types
//!
//! - [`SourceSpec`]: Validated remote locator plus its target subdirectory
//! - [`ChangeUnit`]: One exported historical change of a source
//! - [`ChangeDescriptor`]: Parsed header metadata of a [`ChangeUnit`]
//! - [`MergePlanEntry`]: A descriptor placed in the global chronological order
//! - [`Identity`]: Name and email pair used for committer configuration

pub mod change;
pub mod error;
pub mod identity;
pub mod plan;
pub mod source;

pub use change::{ChangeDescriptor, ChangeUnit};
pub use error::ValidationError;
pub use identity::Identity;
pub use plan::MergePlanEntry;
pub use source::{validate_subdirectory, SourceSpec, SOURCE_SEPARATOR};
