//! Chronological merge planning for monoize.
//!
//! Collects the descriptor sequences of every source and interleaves them
//! into one plan ordered by timestamp. Ties go to the source listed first,
//! then to the earlier change of that source, so equal inputs always give
//! the same plan.

pub mod planner;

pub use planner::{MergePlan, MergePlanner, SourceChanges};
