use chrono::{DateTime, FixedOffset};
use monoize_gateway::{ApplyError, CleanupError};
use monoize_types::MergePlanEntry;

/// Result of replaying one plan entry.
#[derive(Debug)]
pub struct EntryOutcome {
    pub position: usize,
    pub locator: String,
    pub subdirectory: String,
    pub author: String,
    pub subject: String,
    pub timestamp: DateTime<FixedOffset>,
    pub result: Result<(), ApplyError>,
}

impl EntryOutcome {
    pub fn new(entry: &MergePlanEntry, result: Result<(), ApplyError>) -> Self {
        let descriptor = &entry.descriptor;
        Self {
            position: entry.position,
            locator: descriptor.origin().locator().to_string(),
            subdirectory: entry.subdirectory.clone(),
            author: descriptor.author.clone(),
            subject: descriptor.subject.clone(),
            timestamp: descriptor.timestamp,
            result,
        }
    }

    pub fn is_applied(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns `true` if replay was cancelled before this entry.
    pub fn is_skipped(&self) -> bool {
        matches!(self.result, Err(ApplyError::Cancelled))
    }
}

/// Every entry's outcome, in plan order, plus any cleanup failure.
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub outcomes: Vec<EntryOutcome>,
    pub cleanup_error: Option<CleanupError>,
}

impl ReplayReport {
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn applied(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes.iter().filter(|o| o.is_applied())
    }

    /// Entries that were not applied, skipped ones included.
    pub fn failed(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes.iter().filter(|o| !o.is_applied())
    }

    pub fn skipped(&self) -> impl Iterator<Item = &EntryOutcome> {
        self.outcomes.iter().filter(|o| o.is_skipped())
    }

    /// Returns `true` if every entry applied and cleanup succeeded.
    pub fn is_clean(&self) -> bool {
        self.cleanup_error.is_none() && self.outcomes.iter().all(EntryOutcome::is_applied)
    }
}
