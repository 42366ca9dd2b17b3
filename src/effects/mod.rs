//! Effects-as-data for GitHub operations.
//!
//! Core logic never talks to GitHub directly. It describes each operation as a
//! [`GitHubEffect`], hands it to a [`GitHubInterpreter`], and reads back a
//! [`GitHubResponse`]. The production interpreter sends GraphQL documents; the
//! tests use an in-memory fake that records every effect it sees.
//!
//! [`GitHubOps`] is the typed facade the rest of the crate calls. It does no
//! deduplication or remote pre-checks of its own; callers that need
//! idempotency check state first.

pub mod github;
pub mod interpreter;
pub mod ops;

pub use github::{DiscussionState, GitHubEffect, GitHubResponse, IssuePage};
pub use interpreter::GitHubInterpreter;
pub use ops::{GitHubOps, PAGE_SIZE};
