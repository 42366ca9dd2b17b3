//! GitHub API client and effect interpreter.
//!
//! Implements the `GitHubInterpreter` trait from the effects module on top of
//! octocrab's GraphQL support, authenticated with the cached installation
//! token.

mod client;
mod error;
mod interpreter;

pub use client::InstallationClient;
pub use error::{GitHubApiError, GitHubErrorKind};
pub use interpreter::interpret_github_effect;
