//! App token (JWT) minting.

use std::path::Path;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use super::AuthError;
use super::cache::APP_TOKEN_TTL;

/// Mints signed app tokens.
pub trait AppTokenSigner: Send + Sync {
    /// Returns a freshly signed token.
    fn sign(&self) -> Result<String, AuthError>;
}

#[derive(Debug, Serialize)]
struct Claims {
    iat: i64,
    exp: i64,
    iss: String,
}

/// RS256 signer for GitHub App JWTs.
pub struct JwtSigner {
    app_id: u64,
    key: EncodingKey,
}

impl JwtSigner {
    /// Creates a signer from a PEM-encoded RSA private key.
    pub fn from_pem(app_id: u64, pem: &[u8]) -> Result<Self, AuthError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(|e| AuthError::InvalidKey(e.to_string()))?;
        Ok(Self { app_id, key })
    }

    /// Reads the private key from a file.
    pub fn from_pem_file(app_id: u64, path: &Path) -> Result<Self, AuthError> {
        let pem = std::fs::read(path)
            .map_err(|e| AuthError::InvalidKey(format!("{}: {}", path.display(), e)))?;
        Self::from_pem(app_id, &pem)
    }
}

impl std::fmt::Debug for JwtSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSigner")
            .field("app_id", &self.app_id)
            .finish_non_exhaustive()
    }
}

impl AppTokenSigner for JwtSigner {
    fn sign(&self) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iat: now,
            exp: now + APP_TOKEN_TTL.as_secs() as i64,
            iss: self.app_id.to_string(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_key() {
        assert!(matches!(
            JwtSigner::from_pem(1, b"not a key"),
            Err(AuthError::InvalidKey(_))
        ));
    }

    #[test]
    fn missing_key_file_is_invalid_key() {
        let err = JwtSigner::from_pem_file(1, Path::new("/nonexistent/key.pem")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/key.pem"));
    }

    #[test]
    fn claims_serialize_with_github_field_names() {
        let claims = Claims {
            iat: 10,
            exp: 130,
            iss: "998668".to_string(),
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["iss"], "998668");
        assert_eq!(json["exp"].as_i64().unwrap() - json["iat"].as_i64().unwrap(), 120);
    }
}
