//! Effect interpreter trait.

use std::future::Future;

use super::github::{GitHubEffect, GitHubResponse};
use crate::github::GitHubApiError;

/// Executes GitHub effects.
///
/// Effects carry their own node ids, so one interpreter serves every
/// repository the installation can see.
///
/// # Example (mock for testing)
///
/// ```ignore
/// struct AlwaysComment;
///
/// impl GitHubInterpreter for AlwaysComment {
///     async fn interpret(&self, effect: GitHubEffect) -> Result<GitHubResponse, GitHubApiError> {
///         match effect {
///             GitHubEffect::AddComment { .. } => Ok(GitHubResponse::CommentAdded {
///                 id: CommentNodeId::from("IC_1"),
///             }),
///             other => Err(GitHubApiError::unexpected(&other)),
///         }
///     }
/// }
/// ```
pub trait GitHubInterpreter: Send + Sync {
    /// Execute a GitHub effect and return its response.
    fn interpret(
        &self,
        effect: GitHubEffect,
    ) -> impl Future<Output = Result<GitHubResponse, GitHubApiError>> + Send;
}
