//! GitHub App credentials.
//!
//! Two tokens are involved:
//!
//! - an **app token**: a JWT signed with the app's private key, valid for 120s
//! - an **installation token**: exchanged for the app token, valid for an hour
//!
//! [`CredentialCache`] keeps both and refreshes them lazily. Refreshing is
//! single-flight: concurrent callers that find the tokens expired wait for the
//! one in-progress refresh instead of minting their own.

use thiserror::Error;

mod cache;
mod exchange;
mod signer;

pub use cache::{APP_TOKEN_TTL, CredentialCache, INSTALLATION_TOKEN_TTL, TokenSource};
pub use exchange::{InstallationTokenExchange, OctocrabTokenExchange};
pub use signer::{AppTokenSigner, JwtSigner};

/// Failure to mint or exchange credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The private key could not be read or parsed.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// Signing the app JWT failed.
    #[error("failed to sign app token: {0}")]
    Signing(String),

    /// GitHub rejected the installation token exchange.
    #[error("installation token exchange failed: {0}")]
    Exchange(String),
}
