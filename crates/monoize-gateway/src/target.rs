use std::path::{Path, PathBuf};

use async_trait::async_trait;
use monoize_git::Git;
use monoize_types::{ChangeUnit, Identity};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{ApplyError, CleanupError, InitError};
use crate::scratch::ScratchArea;

/// The single mutable store that changes are replayed into.
///
/// Only the replay engine holds a target while a merge runs.
#[async_trait]
pub trait TargetRepository: Send + Sync {
    fn root(&self) -> &Path;

    fn scratch(&self) -> &ScratchArea;

    /// Apply one change with every touched path rooted under `subdirectory`.
    ///
    /// A failed apply must leave the repository as it was before the call.
    async fn apply(&mut self, unit: &ChangeUnit, subdirectory: &str) -> Result<(), ApplyError>;

    /// Remove scratch state. After this no further changes are accepted.
    async fn finalize(&mut self) -> Result<(), CleanupError>;
}

/// Target repository driven through `git am`.
#[derive(Debug)]
pub struct GitTarget {
    root: PathBuf,
    git: Git,
    scratch: ScratchArea,
    finalized: bool,
}

/// Committer written into the target when none is given and git has no
/// usable identity of its own.
pub fn fallback_committer() -> Identity {
    Identity::new("monoize", "monoize@localhost")
}

impl GitTarget {
    /// Initialize a repository in the existing, empty directory `root`.
    ///
    /// Without an explicit `committer` the user's git identity is used. If
    /// git cannot determine one, [`fallback_committer`] is configured so
    /// that replay does not fail on every change.
    pub async fn init(root: &Path, committer: Option<&Identity>) -> Result<Self, InitError> {
        Self::init_with(Git::new(root), committer).await
    }

    async fn init_with(git: Git, committer: Option<&Identity>) -> Result<Self, InitError> {
        let root = git.dir().to_path_buf();
        git.run(&["init", "--quiet"]).await?;
        let has_identity =
            committer.is_some() || git.succeeds(&["var", "GIT_COMMITTER_IDENT"]).await?;
        let committer = match committer {
            Some(id) => Some(id.clone()),
            None if has_identity => None,
            None => {
                let id = fallback_committer();
                info!(committer = %id, "no git identity configured; using fallback committer");
                Some(id)
            }
        };
        if let Some(id) = &committer {
            git.run(&["config", "user.name", &id.name]).await?;
            git.run(&["config", "user.email", &id.email]).await?;
        }

        let scratch = ScratchArea::for_target(&root);
        scratch.create().map_err(|source| InitError::Io {
            path: scratch.root().to_path_buf(),
            source,
        })?;
        exclude_scratch(&root).await.map_err(|source| InitError::Io {
            path: root.join(".git/info/exclude"),
            source,
        })?;

        debug!(root = %root.display(), "target initialized");
        Ok(Self {
            root,
            git,
            scratch,
            finalized: false,
        })
    }

    /// Subjects of the target's commits, oldest first.
    pub async fn history(&self) -> Result<Vec<String>, monoize_git::GitError> {
        if !self.git.succeeds(&["rev-parse", "--verify", "--quiet", "HEAD"]).await? {
            return Ok(Vec::new());
        }
        let out = self.git.run(&["log", "--reverse", "--format=%s"]).await?;
        Ok(out.lines().map(str::to_owned).collect())
    }
}

async fn exclude_scratch(root: &Path) -> std::io::Result<()> {
    let info = root.join(".git").join("info");
    tokio::fs::create_dir_all(&info).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(info.join("exclude"))
        .await?;
    file.write_all(format!("/{}/\n", ScratchArea::DIR_NAME).as_bytes())
        .await?;
    file.flush().await
}

#[async_trait]
impl TargetRepository for GitTarget {
    fn root(&self) -> &Path {
        &self.root
    }

    fn scratch(&self) -> &ScratchArea {
        &self.scratch
    }

    async fn apply(&mut self, unit: &ChangeUnit, subdirectory: &str) -> Result<(), ApplyError> {
        if self.finalized {
            return Err(ApplyError::Finalized);
        }
        let directory = format!("--directory={subdirectory}");
        let args = [
            "am",
            "--quiet",
            "--keep",
            "--committer-date-is-author-date",
            directory.as_str(),
        ];
        match self
            .git
            .run_with_input(&args, unit.payload.clone())
            .await
        {
            Ok(_) => Ok(()),
            Err(source) => {
                if let Err(e) = self.git.run(&["am", "--abort"]).await {
                    warn!(change = %unit.name, error = %e, "git am --abort failed");
                }
                Err(ApplyError::Rejected {
                    name: unit.name.clone(),
                    source,
                })
            }
        }
    }

    async fn finalize(&mut self) -> Result<(), CleanupError> {
        self.finalized = true;
        self.scratch.remove()
    }
}
