//! Exchanging an app token for an installation token.

use std::future::Future;

use octocrab::Octocrab;
use octocrab::models::{Installation, InstallationToken};
use tracing::debug;

use super::AuthError;

/// Trades a signed app token for an installation token.
pub trait InstallationTokenExchange: Send + Sync {
    fn exchange(&self, app_token: &str) -> impl Future<Output = Result<String, AuthError>> + Send;
}

/// Exchanges tokens for the app's installation on one organization.
#[derive(Debug, Clone)]
pub struct OctocrabTokenExchange {
    organization: String,
}

impl OctocrabTokenExchange {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }
}

impl InstallationTokenExchange for OctocrabTokenExchange {
    async fn exchange(&self, app_token: &str) -> Result<String, AuthError> {
        let client = Octocrab::builder()
            .personal_token(app_token.to_string())
            .build()
            .map_err(|e| AuthError::Exchange(e.to_string()))?;

        let installation: Installation = client
            .get(
                format!("/orgs/{}/installation", self.organization),
                None::<&()>,
            )
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;
        debug!(
            organization = %self.organization,
            installation = %installation.id,
            "Resolved app installation"
        );

        let token: InstallationToken = client
            .post(
                format!("/app/installations/{}/access_tokens", installation.id),
                None::<&()>,
            )
            .await
            .map_err(|e| AuthError::Exchange(e.to_string()))?;
        Ok(token.token)
    }
}
