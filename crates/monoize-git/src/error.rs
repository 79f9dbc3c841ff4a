use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` failed ({}): {stderr}", exit_label(.exit_code))]
    Command {
        command: String,
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("`{command}` was cancelled")]
    Cancelled { command: String },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl GitError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "terminated by signal".into(),
    }
}

pub type GitResult<T> = Result<T, GitError>;
