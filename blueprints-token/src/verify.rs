use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, Validation};
use tracing::{debug, warn};

use crate::claims::{Claims, VerifiedClaims};
use crate::error::TokenError;
use crate::keys::KeyMaterial;

/// Verifies RS256 tokens against the public key and the expected issuer.
#[derive(Debug, Clone)]
pub struct TokenVerifier {
    keys: Arc<KeyMaterial>,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(keys: Arc<KeyMaterial>, issuer: impl Into<String>) -> Self {
        let issuer: String = issuer.into();
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;
        // Expiry is checked in verify_at, where `now == exp` already counts as expired.
        validation.validate_exp = false;

        Self { keys, validation }
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// - `InvalidToken` if the signature, algorithm or issuer does not match
    /// - `ExpiredToken` if the current time is at or past `exp`
    /// - `MalformedToken` if the token or its claims cannot be decoded
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (unix seconds)
    pub fn verify_at(&self, token: &str, now: i64) -> Result<VerifiedClaims, TokenError> {
        let data = decode::<Claims>(token, self.keys.decoding_key(), &self.validation).map_err(
            |e| {
                let error = TokenError::from(e);
                debug!(%error, "token rejected");
                error
            },
        )?;

        let claims = data.claims;
        if now >= claims.expires_at {
            warn!(subject = %claims.subject, expires_at = claims.expires_at, "expired token presented");
            return Err(TokenError::ExpiredToken);
        }

        Ok(claims.into())
    }
}
