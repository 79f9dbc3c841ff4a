//! Repository gateway for monoize.
//!
//! The I/O boundary between the merge logic and the versioned storage:
//! - [`RepositoryGateway`] fetches remote sources and prepares the target
//! - [`TargetRepository`] is the capability the replay engine applies changes through
//! - [`ScratchArea`] holds per-source clones and exported changes inside the target
//! - [`GitGateway`] / [`GitTarget`] implement both on top of the `git` binary

pub mod credentials;
pub mod error;
pub mod gateway;
pub mod scratch;
pub mod target;

pub use credentials::Credentials;
pub use error::{ApplyError, CleanupError, FetchError, InitError};
pub use gateway::{GitGateway, LocalRepository, RepositoryGateway};
pub use scratch::ScratchArea;
pub use target::{fallback_committer, GitTarget, TargetRepository};
