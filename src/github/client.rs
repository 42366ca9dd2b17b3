//! GraphQL client authenticated with the cached installation token.
//!
//! A fresh `Octocrab` is built for every request so that a refreshed token is
//! picked up immediately. Building one is cheap compared with the request.

use std::sync::Arc;

use octocrab::Octocrab;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::auth::TokenSource;

use super::error::GitHubApiError;

/// Envelope of every GraphQL response.
#[derive(Debug, Deserialize)]
struct GraphqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphqlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    message: String,
}

impl<T> GraphqlResponse<T> {
    fn into_result(self) -> Result<T, GitHubApiError> {
        if !self.errors.is_empty() {
            let messages: Vec<_> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(GitHubApiError::graphql(&messages));
        }
        self.data
            .ok_or_else(|| GitHubApiError::permanent("GraphQL response carried no data"))
    }
}

/// A GitHub GraphQL client that authenticates through a [`TokenSource`].
pub struct InstallationClient<T> {
    tokens: Arc<T>,
}

impl<T> Clone for InstallationClient<T> {
    fn clone(&self) -> Self {
        Self {
            tokens: Arc::clone(&self.tokens),
        }
    }
}

impl<T> std::fmt::Debug for InstallationClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationClient").finish_non_exhaustive()
    }
}

impl<T: TokenSource> InstallationClient<T> {
    pub fn new(tokens: Arc<T>) -> Self {
        Self { tokens }
    }

    async fn octocrab(&self) -> Result<Octocrab, GitHubApiError> {
        let token = self
            .tokens
            .installation_token()
            .await
            .map_err(GitHubApiError::auth)?;
        Octocrab::builder()
            .personal_token(token)
            .build()
            .map_err(GitHubApiError::from_octocrab)
    }

    /// Sends a query or mutation and returns its `data`.
    pub async fn graphql<R: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> Result<R, GitHubApiError> {
        let client = self.octocrab().await?;
        let response: GraphqlResponse<R> = client
            .graphql(&serde_json::json!({
                "query": query,
                "variables": variables,
            }))
            .await
            .map_err(GitHubApiError::from_octocrab)?;
        response.into_result()
    }
}
