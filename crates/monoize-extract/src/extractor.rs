use std::path::{Path, PathBuf};

use async_trait::async_trait;
use monoize_gateway::LocalRepository;
use monoize_git::{Git, GitError};
use monoize_types::ChangeUnit;
use tracing::{debug, info};

use crate::error::{ExtractionError, ExtractionResult};

/// Produces the ordered change history of a fetched repository.
#[async_trait]
pub trait ChangeExtractor: Send + Sync {
    /// Export every change of `repo`, root first, using `out_dir` as
    /// private working space.
    ///
    /// A repository without history yields an empty sequence.
    async fn extract(
        &self,
        repo: &LocalRepository,
        out_dir: &Path,
    ) -> ExtractionResult<Vec<ChangeUnit>>;
}

/// Extractor based on `git format-patch --root`.
///
/// Each non-merge commit reachable from `HEAD` becomes one mailbox-formatted
/// change, kept as raw bytes. Subjects are exported verbatim (`--keep-subject`)
/// so no `[PATCH]` tag has to be stripped later. Commits that change nothing
/// are left out.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormatPatchExtractor;

#[async_trait]
impl ChangeExtractor for FormatPatchExtractor {
    async fn extract(
        &self,
        repo: &LocalRepository,
        out_dir: &Path,
    ) -> ExtractionResult<Vec<ChangeUnit>> {
        let locator = repo.source.locator();
        let git_err = |source: GitError| ExtractionError::Git {
            locator: locator.to_string(),
            source,
        };

        let git = Git::new(&repo.path);
        if !git
            .succeeds(&["rev-parse", "--verify", "--quiet", "HEAD"])
            .await
            .map_err(git_err)?
        {
            debug!(source = %locator, "source has no history");
            return Ok(Vec::new());
        }

        let out_dir = std::path::absolute(out_dir)?;
        tokio::fs::create_dir_all(&out_dir).await?;
        let out_arg = out_dir.to_string_lossy().into_owned();
        git.run(&[
            "format-patch",
            "--root",
            "--keep-subject",
            "--numbered-files",
            "--quiet",
            "-o",
            out_arg.as_str(),
            "HEAD",
        ])
        .await
        .map_err(git_err)?;

        let files = numbered_files(&out_dir).await?;
        let mut units = Vec::with_capacity(files.len());
        for (number, path) in files {
            let payload = tokio::fs::read(&path).await?;
            // Commits without a diff are exported as empty files.
            if payload.is_empty() {
                debug!(source = %locator, change = number, "skipping empty change");
                continue;
            }
            let sequence = units.len();
            let name = format!("{}/{number:04}", repo.source.subdirectory());
            units.push(ChangeUnit::new(repo.source.clone(), sequence, name, payload));
        }

        info!(source = %locator, changes = units.len(), "history exported");
        Ok(units)
    }
}

/// List `dir`'s files named by a plain number, in numeric order.
async fn numbered_files(dir: &Path) -> ExtractionResult<Vec<(u32, PathBuf)>> {
    let mut files = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let number = entry
            .file_name()
            .to_str()
            .and_then(|name| name.parse::<u32>().ok())
            .ok_or_else(|| ExtractionError::UnexpectedFile(path.clone()))?;
        files.push((number, path));
    }
    files.sort_by_key(|(number, _)| *number);
    Ok(files)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use monoize_types::SourceSpec;

    use super::*;

    async fn commit(git: &Git, file: &str, subject: &str, date: &str) {
        commit_bytes(git, file, format!("{subject}\n").as_bytes(), subject, date).await;
    }

    async fn commit_bytes(git: &Git, file: &str, content: &[u8], subject: &str, date: &str) {
        std::fs::write(git.dir().join(file), content).unwrap();
        git.run(&["add", file]).await.unwrap();
        author(git, date)
            .run(&["commit", "--quiet", "--no-gpg-sign", "-m", subject])
            .await
            .unwrap();
    }

    fn author(git: &Git, date: &str) -> Git {
        git.clone()
            .with_env("GIT_AUTHOR_NAME", "Ada")
            .with_env("GIT_AUTHOR_EMAIL", "ada@example.com")
            .with_env("GIT_COMMITTER_NAME", "Ada")
            .with_env("GIT_COMMITTER_EMAIL", "ada@example.com")
            .with_env("GIT_AUTHOR_DATE", date)
            .with_env("GIT_COMMITTER_DATE", date)
    }

    fn text(unit: &ChangeUnit) -> String {
        String::from_utf8_lossy(&unit.payload).into_owned()
    }

    fn local(path: &Path) -> LocalRepository {
        LocalRepository {
            source: Arc::new(SourceSpec::parse("https://example.com/widgets.git").unwrap()),
            path: path.to_path_buf(),
        }
    }

    #[tokio::test]
    async fn exports_history_oldest_first() {
        if !Git::available().await {
            return;
        }
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let git = Git::new(repo.path());
        git.run(&["init", "--quiet"]).await.unwrap();
        commit(&git, "a.txt", "First", "2021-01-01T00:00:00Z").await;
        commit(&git, "b.txt", "Second", "2021-01-02T00:00:00Z").await;
        commit(&git, "c.txt", "Third", "2021-01-03T00:00:00Z").await;

        let units = FormatPatchExtractor
            .extract(&local(repo.path()), &out.path().join("changes"))
            .await
            .unwrap();

        assert_eq!(units.len(), 3);
        let sequences: Vec<usize> = units.iter().map(|u| u.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
        assert!(text(&units[0]).contains("Subject: First"));
        assert!(text(&units[1]).contains("Subject: Second"));
        assert!(text(&units[2]).contains("Subject: Third"));
        assert_eq!(units[0].name, "widgets/0001");
        assert_eq!(units[0].origin.subdirectory(), "widgets");
    }

    #[tokio::test]
    async fn non_utf8_content_is_exported_as_is() {
        if !Git::available().await {
            return;
        }
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let git = Git::new(repo.path());
        git.run(&["init", "--quiet"]).await.unwrap();
        commit_bytes(&git, "menu.txt", b"caf\xe9\n", "Latin-1 menu", "2021-01-01T00:00:00Z").await;

        let units = FormatPatchExtractor
            .extract(&local(repo.path()), out.path())
            .await
            .unwrap();
        assert_eq!(units.len(), 1);
        assert!(String::from_utf8(units[0].payload.clone()).is_err());
        assert!(units[0]
            .payload
            .windows(5)
            .any(|w| w == b"caf\xe9\n"));
    }

    #[tokio::test]
    async fn commits_without_changes_are_left_out() {
        if !Git::available().await {
            return;
        }
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let git = Git::new(repo.path());
        git.run(&["init", "--quiet"]).await.unwrap();
        commit(&git, "a.txt", "First", "2021-01-01T00:00:00Z").await;
        author(&git, "2021-01-02T00:00:00Z")
            .run(&["commit", "--quiet", "--no-gpg-sign", "--allow-empty", "-m", "Nothing"])
            .await
            .unwrap();
        commit(&git, "b.txt", "Third", "2021-01-03T00:00:00Z").await;

        let units = FormatPatchExtractor
            .extract(&local(repo.path()), out.path())
            .await
            .unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["widgets/0001", "widgets/0003"]);
        let sequences: Vec<usize> = units.iter().map(|u| u.sequence).collect();
        assert_eq!(sequences, vec![0, 1]);
    }

    #[tokio::test]
    async fn empty_repository_yields_no_changes() {
        if !Git::available().await {
            return;
        }
        let repo = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        Git::new(repo.path()).run(&["init", "--quiet"]).await.unwrap();

        let units = FormatPatchExtractor
            .extract(&local(repo.path()), out.path())
            .await
            .unwrap();
        assert!(units.is_empty());
    }

    #[tokio::test]
    async fn missing_repository_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("gone");
        let err = FormatPatchExtractor
            .extract(&local(&missing), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Git { .. }));
    }

    #[tokio::test]
    async fn stray_files_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("2"), "").unwrap();
        std::fs::write(dir.path().join("1"), "").unwrap();
        let files = numbered_files(dir.path()).await.unwrap();
        let numbers: Vec<u32> = files.iter().map(|(n, _)| *n).collect();
        assert_eq!(numbers, vec![1, 2]);

        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        assert!(matches!(
            numbered_files(dir.path()).await,
            Err(ExtractionError::UnexpectedFile(_))
        ));
    }
}
