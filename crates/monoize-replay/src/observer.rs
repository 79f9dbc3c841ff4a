use monoize_types::MergePlanEntry;

use crate::report::EntryOutcome;

/// Receives progress while a plan is replayed.
pub trait ReplayObserver: Send {
    fn before_apply(&mut self, _entry: &MergePlanEntry) {}

    fn after_apply(&mut self, _outcome: &EntryOutcome) {}
}

/// Observer that ignores every event.
pub struct NoOpObserver;

impl ReplayObserver for NoOpObserver {}
