use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use monoize_git::Git;
use monoize_types::{Identity, SourceSpec};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::credentials::Credentials;
use crate::error::{FetchError, InitError};
use crate::target::{GitTarget, TargetRepository};

/// A source repository that has been fetched into local scratch storage.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalRepository {
    pub source: Arc<SourceSpec>,
    pub path: PathBuf,
}

/// Transport and initialization boundary for versioned storage.
#[async_trait]
pub trait RepositoryGateway: Send + Sync {
    type Target: TargetRepository;

    /// Create and initialize an empty target repository at `path`.
    ///
    /// Fails if `path` exists and `overwrite` is false; otherwise an existing
    /// `path` is removed first.
    async fn prepare_target(&self, path: &Path, overwrite: bool) -> Result<Self::Target, InitError>;

    /// Fetch `source` into `dest`, which must not exist yet.
    async fn fetch(
        &self,
        source: Arc<SourceSpec>,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<LocalRepository, FetchError>;
}

/// Gateway backed by the `git` binary over http(s).
#[derive(Clone, Debug, Default)]
pub struct GitGateway {
    credentials: Credentials,
    committer: Option<Identity>,
}

impl GitGateway {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            committer: None,
        }
    }

    /// Committer identity written into the target repository's config.
    pub fn with_committer(mut self, committer: Option<Identity>) -> Self {
        self.committer = committer;
        self
    }

    fn transport(&self, dir: &Path) -> Git {
        let git = Git::new(dir);
        match self.credentials.authorization() {
            Some(header) => git.with_config("http.extraHeader", &header),
            None => git,
        }
    }
}

#[async_trait]
impl RepositoryGateway for GitGateway {
    type Target = GitTarget;

    async fn prepare_target(&self, path: &Path, overwrite: bool) -> Result<GitTarget, InitError> {
        let io_err = |source: io::Error| InitError::Io {
            path: path.to_path_buf(),
            source,
        };

        match tokio::fs::symlink_metadata(path).await {
            Ok(meta) => {
                if !overwrite {
                    return Err(InitError::TargetExists(path.to_path_buf()));
                }
                info!(target = %path.display(), "removing existing target");
                if meta.is_dir() {
                    tokio::fs::remove_dir_all(path).await.map_err(io_err)?;
                } else {
                    tokio::fs::remove_file(path).await.map_err(io_err)?;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(io_err(e)),
        }

        tokio::fs::create_dir_all(path).await.map_err(io_err)?;
        GitTarget::init(path, self.committer.as_ref()).await
    }

    async fn fetch(
        &self,
        source: Arc<SourceSpec>,
        dest: &Path,
        cancel: &CancellationToken,
    ) -> Result<LocalRepository, FetchError> {
        let dest = std::path::absolute(dest)?;
        if dest.exists() {
            return Err(FetchError::DestinationExists(dest));
        }
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        tokio::fs::create_dir_all(parent).await?;

        info!(source = %source.locator(), dest = %dest.display(), "fetching source");
        let dest_arg = dest.to_string_lossy().into_owned();
        self.transport(parent)
            .run_cancellable(
                &[
                    "clone",
                    "--quiet",
                    "--no-checkout",
                    "--",
                    source.locator(),
                    dest_arg.as_str(),
                ],
                cancel,
            )
            .await
            .map_err(|e| {
                if e.is_cancelled() {
                    FetchError::Cancelled(source.locator().to_string())
                } else {
                    FetchError::Git {
                        locator: source.locator().to_string(),
                        source: e,
                    }
                }
            })?;

        Ok(LocalRepository { source, path: dest })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn prepare_target_refuses_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = GitGateway::default();
        let err = gateway.prepare_target(dir.path(), false).await.unwrap_err();
        assert!(matches!(err, InitError::TargetExists(p) if p == dir.path()));
    }

    #[tokio::test]
    async fn prepare_target_overwrites_when_forced() {
        if !Git::available().await {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mono");
        std::fs::create_dir_all(&target).unwrap();
        std::fs::write(target.join("stale.txt"), "old").unwrap();

        let gateway = GitGateway::default();
        let repo = gateway.prepare_target(&target, true).await.unwrap();
        assert!(!target.join("stale.txt").exists());
        assert!(target.join(".git").is_dir());
        assert!(repo.scratch().exists());
    }

    #[tokio::test]
    async fn prepare_target_writes_committer() {
        if !Git::available().await {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mono");
        let gateway = GitGateway::default()
            .with_committer(Some(Identity::new("Merge Bot", "bot@example.com")));
        gateway.prepare_target(&target, false).await.unwrap();

        let name = Git::new(&target)
            .run(&["config", "user.name"])
            .await
            .unwrap();
        assert_eq!(name.trim(), "Merge Bot");
    }

    #[tokio::test]
    async fn fetch_refuses_existing_destination() {
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(SourceSpec::parse("https://example.invalid/repo.git").unwrap());
        let err = GitGateway::default()
            .fetch(source, dir.path(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::DestinationExists(_)));
    }

    #[tokio::test]
    async fn fetch_honours_cancellation() {
        if !Git::available().await {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let source = Arc::new(SourceSpec::parse("https://example.invalid/repo.git").unwrap());
        let token = CancellationToken::new();
        token.cancel();
        let err = GitGateway::default()
            .fetch(source, &dir.path().join("clone"), &token)
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Cancelled(l) if l == "https://example.invalid/repo.git"));
    }
}
