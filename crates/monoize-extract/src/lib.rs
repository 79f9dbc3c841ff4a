//! Change extraction for monoize.
//!
//! Turns a fetched source repository into its full history as an ordered
//! sequence of [`ChangeUnit`](monoize_types::ChangeUnit)s, oldest first.

pub mod error;
pub mod extractor;

pub use error::{ExtractionError, ExtractionResult};
pub use extractor::{ChangeExtractor, FormatPatchExtractor};
