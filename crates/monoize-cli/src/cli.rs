use std::time::Duration;

use clap::Parser;
use monoize_sdk::{Credentials, Identity, MergeConfig, ValidationError};

#[derive(Parser)]
#[command(
    name = "monoize",
    about = "Merge several repositories into one, keeping every change in chronological order",
    version,
)]
pub struct Cli {
    /// Source repositories as `url[>>subdirectory]`, followed by the target directory
    #[arg(required = true, num_args = 2.., value_name = "SOURCE... TARGET")]
    pub repositories: Vec<String>,

    /// Username for HTTP basic authentication
    #[arg(short, long, default_value = "")]
    pub username: String,

    /// Password for HTTP basic authentication
    #[arg(short, long, default_value = "")]
    pub password: String,

    /// Remove an existing target directory first
    #[arg(short, long)]
    pub force: bool,

    /// Give up fetching a source after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Committer name for replayed changes
    #[arg(long, requires = "committer_email")]
    pub committer_name: Option<String>,

    /// Committer email for replayed changes
    #[arg(long, requires = "committer_name")]
    pub committer_email: Option<String>,

    /// Print the merged order without replaying anything
    #[arg(long)]
    pub dry_run: bool,

    #[arg(short, long)]
    pub verbose: bool,

    #[arg(long, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl Cli {
    pub fn to_config(&self) -> Result<MergeConfig, ValidationError> {
        let committer = match (&self.committer_name, &self.committer_email) {
            (Some(name), Some(email)) => Some(Identity::new(name.as_str(), email.as_str())),
            (None, None) => None,
            _ => return Err(ValidationError::IncompleteIdentity),
        };
        Ok(MergeConfig::from_args(&self.repositories)?
            .with_credentials(Credentials::new(self.username.as_str(), self.password.as_str()))
            .with_force(self.force)
            .with_fetch_timeout(self.timeout.map(Duration::from_secs))
            .with_committer(committer)
            .with_dry_run(self.dry_run))
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn parse_sources_and_target() {
        let cli = Cli::try_parse_from([
            "monoize",
            "https://example.com/a.git",
            "https://example.com/b.git>>libs/b",
            "mono",
        ])
        .unwrap();
        assert_eq!(cli.repositories.len(), 3);
        let config = cli.to_config().unwrap();
        assert_eq!(config.target, PathBuf::from("mono"));
        assert_eq!(config.sources[1].subdirectory(), "libs/b");
        assert!(config.credentials.is_empty());
        assert!(config.committer.is_none());
    }

    #[test]
    fn parse_needs_two_positionals() {
        assert!(Cli::try_parse_from(["monoize"]).is_err());
        assert!(Cli::try_parse_from(["monoize", "mono"]).is_err());
    }

    #[test]
    fn parse_credentials_and_force() {
        let cli = Cli::try_parse_from([
            "monoize", "-u", "ada", "-p", "secret", "-f", "https://example.com/a", "mono",
        ])
        .unwrap();
        assert!(cli.force);
        let config = cli.to_config().unwrap();
        assert_eq!(config.credentials, Credentials::new("ada", "secret"));
        assert!(config.force);
    }

    #[test]
    fn parse_timeout_and_dry_run() {
        let cli = Cli::try_parse_from([
            "monoize", "--timeout", "30", "--dry-run", "https://example.com/a", "mono",
        ])
        .unwrap();
        let config = cli.to_config().unwrap();
        assert_eq!(config.fetch_timeout, Some(Duration::from_secs(30)));
        assert!(config.dry_run);
    }

    #[test]
    fn parse_committer_needs_both_parts() {
        assert!(Cli::try_parse_from([
            "monoize", "--committer-name", "Ada", "https://example.com/a", "mono",
        ])
        .is_err());

        let cli = Cli::try_parse_from([
            "monoize",
            "--committer-name",
            "Ada",
            "--committer-email",
            "ada@example.com",
            "https://example.com/a",
            "mono",
        ])
        .unwrap();
        let config = cli.to_config().unwrap();
        assert_eq!(config.committer, Some(Identity::new("Ada", "ada@example.com")));
    }

    #[test]
    fn bad_scheme_is_a_validation_error() {
        let cli = Cli::try_parse_from(["monoize", "ftp://example.com/repo", "mono"]).unwrap();
        assert!(matches!(
            cli.to_config(),
            Err(ValidationError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["monoize", "-v", "https://example.com/a", "mono"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from([
            "monoize", "--format", "json", "https://example.com/a", "mono",
        ])
        .unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
