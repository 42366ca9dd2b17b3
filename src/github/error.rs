//! GitHub API error types.
//!
//! Errors are categorized so callers can tell a credential problem from a
//! rejected request, but nothing in this crate retries automatically: a failed
//! transition is left for the next sync sweep to heal.
//!
//! - **Auth**: the installation token could not be obtained, or GitHub
//!   answered 401.
//! - **Transient**: 5xx, rate limits and network failures. Worth retrying later.
//! - **Permanent**: everything else, including GraphQL `errors` arrays and
//!   responses missing the object that was asked for.

use std::fmt;
use thiserror::Error;

use crate::auth::AuthError;
use crate::effects::GitHubEffect;

/// The kind of GitHub API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubErrorKind {
    /// Credentials could not be minted or were rejected.
    Auth,
    /// Server-side or network trouble that may clear up on its own.
    Transient,
    /// The request was rejected.
    Permanent,
}

/// A GitHub API error.
#[derive(Debug, Error)]
pub struct GitHubApiError {
    pub kind: GitHubErrorKind,

    /// The HTTP status code, if available.
    pub status_code: Option<u16>,

    /// A human-readable description of the error.
    pub message: String,

    /// The underlying octocrab error, if available.
    #[source]
    pub source: Option<octocrab::Error>,
}

impl fmt::Display for GitHubApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status_code {
            Some(code) => write!(f, "GitHub API error (HTTP {}): {}", code, self.message),
            None => write!(f, "GitHub API error: {}", self.message),
        }
    }
}

impl GitHubApiError {
    /// Credential failure while preparing a request.
    pub fn auth(err: AuthError) -> Self {
        Self {
            kind: GitHubErrorKind::Auth,
            status_code: None,
            message: err.to_string(),
            source: None,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Permanent,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self {
            kind: GitHubErrorKind::Transient,
            status_code: None,
            message: message.into(),
            source: None,
        }
    }

    /// The interpreter answered an effect with the wrong response variant.
    pub fn unexpected(effect: &GitHubEffect) -> Self {
        Self::permanent(format!("unexpected response to {}", effect.name()))
    }

    /// GraphQL reported errors alongside (or instead of) data.
    pub fn graphql<S: AsRef<str>>(messages: &[S]) -> Self {
        let joined = messages
            .iter()
            .map(|m| m.as_ref())
            .collect::<Vec<_>>()
            .join("; ");
        Self::permanent(format!("GraphQL errors: {}", joined))
    }

    /// Categorizes an octocrab error.
    pub fn from_octocrab(err: octocrab::Error) -> Self {
        let status_code = status_of(&err);
        let message = err.to_string();

        let kind = match status_code {
            Some(401) => GitHubErrorKind::Auth,
            Some(429) => GitHubErrorKind::Transient,
            Some(403) if is_rate_limit_error(&message) => GitHubErrorKind::Transient,
            Some(code) if (500..600).contains(&code) => GitHubErrorKind::Transient,
            Some(_) => GitHubErrorKind::Permanent,
            None if is_network_error(&message) => GitHubErrorKind::Transient,
            None => GitHubErrorKind::Permanent,
        };

        Self {
            kind,
            status_code,
            message,
            source: Some(err),
        }
    }

    pub fn is_auth(&self) -> bool {
        self.kind == GitHubErrorKind::Auth
    }

    pub fn is_transient(&self) -> bool {
        self.kind == GitHubErrorKind::Transient
    }
}

fn status_of(err: &octocrab::Error) -> Option<u16> {
    match err {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code.as_u16()),
        _ => None,
    }
}

fn is_rate_limit_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("rate limit")
        || message_lower.contains("secondary rate")
        || message_lower.contains("abuse detection")
}

fn is_network_error(message: &str) -> bool {
    let message_lower = message.to_lowercase();
    message_lower.contains("timeout")
        || message_lower.contains("timed out")
        || message_lower.contains("connection")
        || message_lower.contains("dns")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiscussionNodeId;

    #[test]
    fn rate_limit_detection() {
        assert!(is_rate_limit_error("API rate limit exceeded"));
        assert!(is_rate_limit_error("You have exceeded a secondary rate limit"));
        assert!(!is_rate_limit_error("Resource not accessible by integration"));
    }

    #[test]
    fn network_error_detection() {
        assert!(is_network_error("connection reset by peer"));
        assert!(is_network_error("request timed out"));
        assert!(!is_network_error("Could not resolve to a node"));
    }

    #[test]
    fn auth_errors_keep_message() {
        let err = GitHubApiError::auth(AuthError::Exchange("installation not found".into()));
        assert!(err.is_auth());
        assert!(err.to_string().contains("installation not found"));
    }

    #[test]
    fn graphql_errors_are_permanent_and_joined() {
        let err = GitHubApiError::graphql(&["first", "second"]);
        assert_eq!(err.kind, GitHubErrorKind::Permanent);
        assert_eq!(err.to_string(), "GitHub API error: GraphQL errors: first; second");
    }

    #[test]
    fn unexpected_names_the_effect() {
        let effect = GitHubEffect::CloseDiscussion {
            discussion: DiscussionNodeId::from("D_1"),
        };
        assert!(
            GitHubApiError::unexpected(&effect)
                .message
                .contains("close_discussion")
        );
    }
}
