use std::io;
use std::path::{Path, PathBuf};

use monoize_types::SourceSpec;
use tracing::debug;

use crate::error::CleanupError;

/// Per-run scratch storage inside the target directory.
///
/// Layout:
/// ```text
/// <target>/.monoize/
///     sources/<rank>-<name>/   clone of source number <rank>
///     changes/<rank>-<name>/   changes exported from that clone
/// ```
/// Every source gets disjoint directories, so fetches and exports for
/// different sources never touch the same path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScratchArea {
    root: PathBuf,
}

impl ScratchArea {
    /// Directory name of the scratch area below the target root.
    pub const DIR_NAME: &'static str = ".monoize";

    /// Scratch area location for a target, without touching the filesystem.
    pub fn for_target(target: &Path) -> Self {
        Self {
            root: target.join(Self::DIR_NAME),
        }
    }

    /// Create the scratch root (and parents) if missing.
    pub fn create(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn exists(&self) -> bool {
        self.root.exists()
    }

    /// Where source number `rank` is cloned.
    pub fn source_dir(&self, rank: usize, source: &SourceSpec) -> PathBuf {
        self.root.join("sources").join(slot_name(rank, source))
    }

    /// Where the changes of source number `rank` are exported.
    pub fn export_dir(&self, rank: usize, source: &SourceSpec) -> PathBuf {
        self.root.join("changes").join(slot_name(rank, source))
    }

    /// Remove the clone of source number `rank`, keeping its exported changes.
    pub fn remove_source(&self, rank: usize, source: &SourceSpec) -> Result<(), CleanupError> {
        remove_tree(&self.source_dir(rank, source))
    }

    /// Remove all scratch state. Removing an absent area is not an error.
    pub fn remove(&self) -> Result<(), CleanupError> {
        remove_tree(&self.root)
    }
}

fn remove_tree(path: &Path) -> Result<(), CleanupError> {
    match std::fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "scratch removed");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(CleanupError {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn slot_name(rank: usize, source: &SourceSpec) -> String {
    format!("{rank}-{}", source.subdirectory().replace('/', "_"))
}
