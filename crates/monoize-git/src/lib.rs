//! Async `git` subprocess runner.
//!
//! All storage I/O in monoize goes through [`Git`], so the gateway,
//! extractor and target repository share one way of spawning git, capturing
//! its output and reporting failures.

pub mod command;
pub mod error;

pub use command::Git;
pub use error::{GitError, GitResult};
