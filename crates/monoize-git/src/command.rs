use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{GitError, GitResult};

/// A git invocation context: working directory, config overrides and extra
/// environment.
///
/// Git never prompts for input; `GIT_TERMINAL_PROMPT` is always `0`. Child
/// processes are killed when the future awaiting them is dropped.
#[derive(Clone, Debug)]
pub struct Git {
    dir: PathBuf,
    configs: Vec<(String, String)>,
    envs: Vec<(String, String)>,
}

impl Git {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            configs: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Add a config override to every invocation.
    ///
    /// Overrides travel in `GIT_CONFIG_COUNT`/`GIT_CONFIG_KEY_<n>`/
    /// `GIT_CONFIG_VALUE_<n>` (git 2.31 or later), never on the command line,
    /// and are never included in error messages. They may carry secrets such
    /// as an `http.extraHeader`.
    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.configs.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run git and return its stdout.
    pub async fn run(&self, args: &[&str]) -> GitResult<String> {
        self.execute(args, None, None).await
    }

    /// Run git with `input` written to its stdin.
    pub async fn run_with_input(&self, args: &[&str], input: Vec<u8>) -> GitResult<String> {
        self.execute(args, Some(input), None).await
    }

    /// Run git, killing it if `token` is cancelled first.
    pub async fn run_cancellable(
        &self,
        args: &[&str],
        token: &CancellationToken,
    ) -> GitResult<String> {
        self.execute(args, None, Some(token)).await
    }

    /// Run git and report only whether it exited successfully.
    pub async fn succeeds(&self, args: &[&str]) -> GitResult<bool> {
        match self.run(args).await {
            Ok(_) => Ok(true),
            Err(GitError::Command { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Returns `true` if a `git` binary can be spawned.
    pub async fn available() -> bool {
        Git::new(".").run(&["--version"]).await.is_ok()
    }

    fn command(&self, args: &[&str], piped_stdin: bool) -> Command {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .current_dir(&self.dir)
            .env("GIT_TERMINAL_PROMPT", "0");
        if !self.configs.is_empty() {
            cmd.env("GIT_CONFIG_COUNT", self.configs.len().to_string());
            for (i, (key, value)) in self.configs.iter().enumerate() {
                cmd.env(format!("GIT_CONFIG_KEY_{i}"), key)
                    .env(format!("GIT_CONFIG_VALUE_{i}"), value);
            }
        }
        cmd.envs(self.envs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(if piped_stdin {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    async fn execute(
        &self,
        args: &[&str],
        input: Option<Vec<u8>>,
        token: Option<&CancellationToken>,
    ) -> GitResult<String> {
        let command = format!("git {}", args.join(" "));
        let mut cmd = self.command(args, input.is_some());

        debug!(dir = %self.dir.display(), %command, "running git");
        let mut child = cmd.spawn().map_err(|source| GitError::Spawn {
            command: command.clone(),
            source,
        })?;

        // Feed stdin from a separate task so a chatty child cannot fill its
        // stdout pipe while we are still writing.
        let writer = match (input, child.stdin.take()) {
            (Some(input), Some(mut stdin)) => Some(tokio::spawn(async move {
                stdin.write_all(&input).await?;
                stdin.shutdown().await
            })),
            _ => None,
        };

        let output = match token {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(%command, "git cancelled");
                    return Err(GitError::Cancelled { command });
                }
                output = child.wait_with_output() => output?,
            },
            None => child.wait_with_output().await?,
        };

        if let Some(writer) = writer {
            match writer.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(%command, error = %e, "failed writing git stdin"),
                Err(e) => warn!(%command, error = %e, "git stdin writer panicked"),
            }
        }

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            Err(GitError::Command {
                command,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                exit_code: output.status.code(),
            })
        }
    }
}
