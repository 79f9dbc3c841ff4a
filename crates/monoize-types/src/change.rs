use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use crate::source::SourceSpec;

/// One exported historical change of a source repository.
///
/// The payload is opaque to everything except the descriptor parser (which
/// reads its header) and the target repository (which applies it).
#[derive(Clone, PartialEq, Eq)]
pub struct ChangeUnit {
    /// The source this change was exported from.
    pub origin: Arc<SourceSpec>,
    /// Zero-based position in the source's root-to-tip history.
    pub sequence: usize,
    /// Name of the exported unit, for diagnostics.
    pub name: String,
    /// The full exported change, header and diff, as raw bytes. File
    /// contents in the diff need not be UTF-8.
    pub payload: Vec<u8>,
}

impl ChangeUnit {
    pub fn new(
        origin: Arc<SourceSpec>,
        sequence: usize,
        name: impl Into<String>,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            origin,
            sequence,
            name: name.into(),
            payload: payload.into(),
        }
    }
}

impl fmt::Debug for ChangeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeUnit")
            .field("origin", &self.origin.locator())
            .field("sequence", &self.sequence)
            .field("name", &self.name)
            .field("payload_len", &self.payload.len())
            .finish()
    }
}

/// Header metadata of a [`ChangeUnit`], paired with the unit itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeDescriptor {
    pub author: String,
    /// Author timestamp, always carrying its original UTC offset.
    pub timestamp: DateTime<FixedOffset>,
    pub subject: String,
    pub unit: ChangeUnit,
}

impl ChangeDescriptor {
    pub fn origin(&self) -> &SourceSpec {
        &self.unit.origin
    }

    pub fn sequence(&self) -> usize {
        self.unit.sequence
    }
}
