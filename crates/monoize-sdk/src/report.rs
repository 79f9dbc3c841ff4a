use std::path::PathBuf;

use chrono::{DateTime, FixedOffset};
use monoize_plan::MergePlan;
use monoize_replay::{ApplyError, EntryOutcome, ReplayReport};
use monoize_types::MergePlanEntry;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Planned only (dry run).
    Planned,
    Applied,
    Failed,
    /// Not attempted because the run was cancelled.
    Skipped,
}

/// One plan entry and what happened to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryReport {
    pub position: usize,
    pub locator: String,
    pub subdirectory: String,
    pub author: String,
    pub subject: String,
    pub timestamp: DateTime<FixedOffset>,
    pub status: EntryStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl EntryReport {
    fn planned(entry: &MergePlanEntry) -> Self {
        let descriptor = &entry.descriptor;
        Self {
            position: entry.position,
            locator: descriptor.origin().locator().to_string(),
            subdirectory: entry.subdirectory.clone(),
            author: descriptor.author.clone(),
            subject: descriptor.subject.clone(),
            timestamp: descriptor.timestamp,
            status: EntryStatus::Planned,
            error: None,
        }
    }
}

impl From<&EntryOutcome> for EntryReport {
    fn from(outcome: &EntryOutcome) -> Self {
        let (status, error) = match &outcome.result {
            Ok(()) => (EntryStatus::Applied, None),
            Err(ApplyError::Cancelled) => (EntryStatus::Skipped, None),
            Err(e) => (EntryStatus::Failed, Some(e.to_string())),
        };
        Self {
            position: outcome.position,
            locator: outcome.locator.clone(),
            subdirectory: outcome.subdirectory.clone(),
            author: outcome.author.clone(),
            subject: outcome.subject.clone(),
            timestamp: outcome.timestamp,
            status,
            error,
        }
    }
}

/// Final result of a merge, one entry per plan position.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    pub target: PathBuf,
    pub dry_run: bool,
    pub entries: Vec<EntryReport>,
    /// Scratch state that could not be removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleanup_error: Option<String>,
}

impl MergeReport {
    pub fn planned(target: PathBuf, plan: &MergePlan) -> Self {
        Self {
            target,
            dry_run: true,
            entries: plan.iter().map(EntryReport::planned).collect(),
            cleanup_error: None,
        }
    }

    pub fn replayed(target: PathBuf, report: &ReplayReport) -> Self {
        Self {
            target,
            dry_run: false,
            entries: report.outcomes.iter().map(EntryReport::from).collect(),
            cleanup_error: report.cleanup_error.as_ref().map(ToString::to_string),
        }
    }

    pub fn applied(&self) -> usize {
        self.count(EntryStatus::Applied)
    }

    pub fn failed(&self) -> usize {
        self.count(EntryStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(EntryStatus::Skipped)
    }

    /// Returns `true` if no entry failed or was skipped.
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.skipped() == 0
    }

    fn count(&self, status: EntryStatus) -> usize {
        self.entries.iter().filter(|e| e.status == status).count()
    }
}
