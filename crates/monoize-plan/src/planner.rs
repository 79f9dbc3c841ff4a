use std::sync::Arc;

use monoize_types::{ChangeDescriptor, MergePlanEntry, SourceSpec};
use tracing::{debug, warn};

/// One source and its descriptors in extraction order (oldest first).
#[derive(Clone, Debug)]
pub struct SourceChanges {
    pub source: Arc<SourceSpec>,
    pub descriptors: Vec<ChangeDescriptor>,
}

impl SourceChanges {
    pub fn new(source: Arc<SourceSpec>, descriptors: Vec<ChangeDescriptor>) -> Self {
        Self {
            source,
            descriptors,
        }
    }
}

/// The merged, globally ordered plan.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MergePlan {
    pub entries: Vec<MergePlanEntry>,
}

impl MergePlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MergePlanEntry> {
        self.entries.iter()
    }

    /// Returns `true` if timestamps never decrease along the plan.
    pub fn is_chronological(&self) -> bool {
        self.entries
            .windows(2)
            .all(|w| w[0].descriptor.timestamp <= w[1].descriptor.timestamp)
    }
}

impl IntoIterator for MergePlan {
    type Item = MergePlanEntry;
    type IntoIter = std::vec::IntoIter<MergePlanEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Builds a [`MergePlan`] from per-source descriptor sequences.
pub struct MergePlanner;

impl MergePlanner {
    /// Interleave all sources into one plan.
    ///
    /// The sources are concatenated in the order given, each in extraction
    /// order, and the result is stably sorted by timestamp. Equal timestamps
    /// therefore keep source rank first and sequence within the source
    /// second. A source whose own timestamps go backwards is reordered with
    /// everything else so the plan stays chronological.
    pub fn plan(sources: Vec<SourceChanges>) -> MergePlan {
        let source_count = sources.len();
        let mut merged: Vec<ChangeDescriptor> = Vec::new();
        for changes in sources {
            if let Some(at) = first_regression(&changes.descriptors) {
                warn!(
                    source = %changes.source.locator(),
                    sequence = at,
                    "change is dated before its predecessor; replaying it out of source order"
                );
            }
            merged.extend(changes.descriptors);
        }

        // `sort_by_key` is stable.
        merged.sort_by_key(|descriptor| descriptor.timestamp);
        let entries: Vec<MergePlanEntry> = merged
            .into_iter()
            .enumerate()
            .map(|(position, descriptor)| MergePlanEntry::new(position, descriptor))
            .collect();

        debug!(sources = source_count, entries = entries.len(), "merge plan built");
        MergePlan { entries }
    }
}

fn first_regression(descriptors: &[ChangeDescriptor]) -> Option<usize> {
    descriptors
        .windows(2)
        .position(|w| w[1].timestamp < w[0].timestamp)
        .map(|i| descriptors[i + 1].sequence())
}
