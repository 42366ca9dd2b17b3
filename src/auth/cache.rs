//! Lazily refreshed, single-flight credential cache.

use std::future::Future;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

use super::AuthError;
use super::exchange::InstallationTokenExchange;
use super::signer::AppTokenSigner;

/// Validity of a signed app token.
pub const APP_TOKEN_TTL: Duration = Duration::from_secs(120);

/// Validity of an installation token.
pub const INSTALLATION_TOKEN_TTL: Duration = Duration::from_secs(3600);

/// Anything that can hand out a currently valid installation token.
pub trait TokenSource: Send + Sync {
    fn installation_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send;
}

struct TimedToken {
    value: SecretString,
    minted_at: Instant,
}

impl TimedToken {
    fn new(value: &str, minted_at: Instant) -> Self {
        Self {
            value: SecretString::from(value.to_owned()),
            minted_at,
        }
    }

    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.duration_since(self.minted_at) < ttl
    }
}

#[derive(Default)]
struct Tokens {
    app: Option<TimedToken>,
    installation: Option<TimedToken>,
}

/// Process-wide cache of the app and installation tokens.
///
/// The lock is held for the whole refresh, including the exchange request, so
/// a burst of callers hitting an expired cache produces exactly one mint and
/// one exchange.
pub struct CredentialCache<S, E> {
    signer: S,
    exchange: E,
    tokens: Mutex<Tokens>,
}

impl<S, E> CredentialCache<S, E>
where
    S: AppTokenSigner,
    E: InstallationTokenExchange,
{
    pub fn new(signer: S, exchange: E) -> Self {
        Self {
            signer,
            exchange,
            tokens: Mutex::new(Tokens::default()),
        }
    }

    /// Returns the cached installation token, refreshing it if it has expired.
    ///
    /// The app token is re-minted only when it is missing or older than
    /// [`APP_TOKEN_TTL`]. Failures are returned to the caller without retry.
    pub async fn get_installation_token(&self) -> Result<String, AuthError> {
        let mut tokens = self.tokens.lock().await;
        let now = Instant::now();

        if let Some(token) = &tokens.installation
            && token.is_fresh(INSTALLATION_TOKEN_TTL, now)
        {
            return Ok(token.value.expose_secret().to_owned());
        }

        info!("Refreshing installation token because it is expired or missing");

        let app_token = match tokens
            .app
            .as_ref()
            .filter(|t| t.is_fresh(APP_TOKEN_TTL, now))
        {
            Some(token) => token.value.expose_secret().to_owned(),
            None => {
                info!("Refreshing app token because it is expired or missing");
                let minted = self.signer.sign()?;
                tokens.app = Some(TimedToken::new(&minted, now));
                minted
            }
        };

        let installation = self.exchange.exchange(&app_token).await?;
        tokens.installation = Some(TimedToken::new(&installation, Instant::now()));
        info!("Installation token refreshed");

        Ok(installation)
    }
}

impl<S, E> TokenSource for CredentialCache<S, E>
where
    S: AppTokenSigner,
    E: InstallationTokenExchange,
{
    fn installation_token(&self) -> impl Future<Output = Result<String, AuthError>> + Send {
        self.get_installation_token()
    }
}
