use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use monoize_gateway::Credentials;
use monoize_types::{Identity, SourceSpec, ValidationError};
use serde::{Deserialize, Serialize};

/// Everything one merge needs, built once and passed in by value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Sources in command-line order; earlier sources win timestamp ties.
    pub sources: Vec<SourceSpec>,
    /// Directory the target repository is created in.
    pub target: PathBuf,
    #[serde(default)]
    pub credentials: Credentials,
    /// Destructively replace an existing target.
    #[serde(default)]
    pub force: bool,
    /// Per-source fetch deadline.
    #[serde(default)]
    pub fetch_timeout: Option<Duration>,
    /// Identity configured in the target for replayed commits.
    #[serde(default)]
    pub committer: Option<Identity>,
    /// Plan only; nothing is replayed and the target is removed afterwards.
    #[serde(default)]
    pub dry_run: bool,
}

impl MergeConfig {
    /// Build a config from positional arguments: one or more
    /// `locator[>>subdirectory]` sources followed by the target directory.
    ///
    /// Only the syntax is checked here; call [`validate`](Self::validate)
    /// once the options are set.
    pub fn from_args<S: AsRef<str>>(positionals: &[S]) -> Result<Self, ValidationError> {
        let Some((target, sources)) = positionals.split_last() else {
            return Err(ValidationError::NoSources);
        };
        let sources = sources
            .iter()
            .map(|arg| SourceSpec::parse(arg.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        if sources.is_empty() {
            return Err(ValidationError::NoSources);
        }
        Ok(Self {
            sources,
            target: PathBuf::from(target.as_ref()),
            ..Self::default()
        })
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_committer(mut self, committer: Option<Identity>) -> Self {
        self.committer = committer;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check the whole configuration. Performs no writes and no network
    /// access; the only filesystem access is an existence check on the
    /// target.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.sources.is_empty() {
            return Err(ValidationError::NoSources);
        }

        let mut seen: HashMap<&str, &SourceSpec> = HashMap::with_capacity(self.sources.len());
        for source in &self.sources {
            if let Some(first) = seen.insert(source.subdirectory(), source) {
                return Err(ValidationError::DuplicateSubdirectory {
                    subdirectory: source.subdirectory().to_string(),
                    first: first.locator().to_string(),
                    second: source.locator().to_string(),
                });
            }
        }
        check_nesting(&self.sources)?;

        if let Some(id) = &self.committer {
            if id.name.trim().is_empty() || id.email.trim().is_empty() {
                return Err(ValidationError::IncompleteIdentity);
            }
        }

        if !self.force && path_exists(&self.target) {
            return Err(ValidationError::TargetExists(self.target.clone()));
        }
        Ok(())
    }
}

/// No source may be rooted inside another source's subdirectory.
fn check_nesting(sources: &[SourceSpec]) -> Result<(), ValidationError> {
    for outer in sources {
        for inner in sources {
            let (outer_dir, inner_dir) = (outer.subdirectory(), inner.subdirectory());
            if outer_dir != inner_dir && Path::new(inner_dir).starts_with(outer_dir) {
                return Err(ValidationError::NestedSubdirectory {
                    outer: outer_dir.to_string(),
                    outer_source: outer.locator().to_string(),
                    inner: inner_dir.to_string(),
                    inner_source: inner.locator().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Existence check that also sees dangling symlinks.
fn path_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_positional_is_the_target() {
        let config = MergeConfig::from_args(&[
            "https://example.com/org/api.git",
            "https://example.com/org/web>>frontend/web",
            "mono",
        ])
        .unwrap();
        assert_eq!(config.target, PathBuf::from("mono"));
        let dirs: Vec<&str> = config.sources.iter().map(|s| s.subdirectory()).collect();
        assert_eq!(dirs, vec!["api", "frontend/web"]);
        assert!(!config.force);
        assert!(!config.dry_run);
    }

    #[test]
    fn needs_a_source_and_a_target() {
        let none: [&str; 0] = [];
        assert_eq!(MergeConfig::from_args(&none), Err(ValidationError::NoSources));
        assert_eq!(MergeConfig::from_args(&["mono"]), Err(ValidationError::NoSources));
    }

    #[test]
    fn bad_scheme_is_rejected_at_parse_time() {
        let err = MergeConfig::from_args(&["ftp://example.com/repo", "mono"]).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedScheme { scheme, .. } if scheme == "ftp"));
    }

    #[test]
    fn duplicate_subdirectories_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mono");
        let config = MergeConfig::from_args(&[
            "https://example.com/a/api.git",
            "https://example.com/b/api",
            target.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::DuplicateSubdirectory { subdirectory, .. }) if subdirectory == "api"
        ));
    }

    #[test]
    fn nested_subdirectories_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mono");
        let config = MergeConfig::from_args(&[
            "https://example.com/org/web>>libs/web",
            "https://example.com/org/core>>libs",
            target.to_str().unwrap(),
        ])
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::NestedSubdirectory { outer, inner, .. })
                if outer == "libs" && inner == "libs/web"
        ));
    }

    #[test]
    fn shared_name_prefix_is_not_nesting() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("mono");
        let config = MergeConfig::from_args(&[
            "https://example.com/org/core>>libs",
            "https://example.com/org/web>>libs-web",
            "https://example.com/org/ui>>apps/libs",
            target.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn existing_target_needs_force() {
        let dir = tempfile::tempdir().unwrap();
        let config = MergeConfig::from_args(&[
            "https://example.com/org/api.git",
            dir.path().to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(
            config.validate(),
            Err(ValidationError::TargetExists(dir.path().to_path_buf()))
        );
        assert!(config.with_force(true).validate().is_ok());
    }

    #[test]
    fn committer_must_be_complete() {
        let dir = tempfile::tempdir().unwrap();
        let config = MergeConfig::from_args(&[
            "https://example.com/org/api.git",
            dir.path().join("mono").to_str().unwrap(),
        ])
        .unwrap()
        .with_committer(Some(Identity::new("Ada", " ")));
        assert_eq!(config.validate(), Err(ValidationError::IncompleteIdentity));
    }

    #[test]
    fn password_is_not_serialized() {
        let config = MergeConfig::from_args(&["https://example.com/org/api.git", "mono"])
            .unwrap()
            .with_credentials(Credentials::new("ada", "hunter2"))
            .with_fetch_timeout(Some(Duration::from_secs(30)));
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"username\":\"ada\""));
        assert!(!json.contains("hunter2"));

        let back: MergeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.sources, config.sources);
        assert_eq!(back.fetch_timeout, Some(Duration::from_secs(30)));
        assert!(back.credentials.password.is_empty());
    }
}
