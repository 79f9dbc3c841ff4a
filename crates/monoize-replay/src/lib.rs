//! Replay engine for monoize.
//!
//! Applies a [`MergePlan`](monoize_plan::MergePlan) to a
//! [`TargetRepository`](monoize_gateway::TargetRepository) one entry at a
//! time. A rejected change is recorded and the next entry is attempted.
//! Cancellation stops replay between entries. Scratch state is removed once
//! the plan is consumed.
//!
//! Lifecycle: `Empty -> Initialized -> Replaying -> Finalized`.

pub mod engine;
pub mod error;
pub mod observer;
pub mod report;

pub use engine::{ReplayEngine, ReplayState};
pub use error::ReplayError;
pub use observer::{NoOpObserver, ReplayObserver};
pub use report::{EntryOutcome, ReplayReport};

pub use monoize_gateway::ApplyError;
