//! `X-Hub-Signature-256` verification.
//!
//! GitHub signs each delivery with HMAC-SHA256 over the raw body, keyed with
//! the webhook secret, and sends `sha256=<hex>`. Deliveries that fail the
//! check never reach the parser.

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Why a delivery's signature was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing X-Hub-Signature-256 header")]
    Missing,

    #[error("malformed signature header")]
    Malformed,

    #[error("signature does not match payload")]
    Mismatch,
}

/// The shared secret configured on the GitHub App's webhook.
#[derive(Clone)]
pub struct WebhookSecret(SecretString);

impl WebhookSecret {
    pub fn new(secret: SecretString) -> Self {
        Self(secret)
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length, so this never takes the error path.
        match HmacSha256::new_from_slice(self.0.expose_secret().as_bytes()) {
            Ok(mac) => mac,
            Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
        }
    }

    /// Checks `header` against the HMAC of `payload` in constant time.
    pub fn verify(&self, payload: &[u8], header: Option<&str>) -> Result<(), SignatureError> {
        let header = header.ok_or(SignatureError::Missing)?;
        let expected = parse_signature_header(header).ok_or(SignatureError::Malformed)?;

        let mut mac = self.mac();
        mac.update(payload);
        mac.verify_slice(&expected)
            .map_err(|_| SignatureError::Mismatch)
    }

    /// Produces the header value GitHub would send for `payload`.
    pub fn sign(&self, payload: &[u8]) -> String {
        let mut mac = self.mac();
        mac.update(payload);
        format!("sha256={}", hex::encode(mac.finalize().into_bytes()))
    }
}

impl std::fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("WebhookSecret(..)")
    }
}

/// Decodes `sha256=<hex>`. Returns `None` for any other shape.
pub fn parse_signature_header(header: &str) -> Option<Vec<u8>> {
    let hex_sig = header.strip_prefix("sha256=")?;
    hex::decode(hex_sig).ok()
}
