use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, Header};
use tracing::info;

use crate::claims::{Claims, ScopeSet};
use crate::error::TokenError;
use crate::keys::KeyMaterial;

/// Token lifetime used when none is configured
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;

/// TokenTimeConfig allows control over token creation times and durations
#[derive(Debug, Clone, Copy)]
pub struct TokenTimeConfig {
    /// Optional custom start time (now time override)
    pub start_time: Option<i64>,
    /// Duration in seconds (default: 3600 seconds = 1 hour)
    pub duration: i64,
}

impl Default for TokenTimeConfig {
    fn default() -> Self {
        Self {
            start_time: None,
            duration: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }
}

/// A freshly signed token together with its validity window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl IssuedToken {
    /// Seconds between issue and expiry
    pub fn expires_in(&self) -> i64 {
        self.expires_at - self.issued_at
    }
}

/// Signs RS256 tokens for already-authenticated subjects.
///
/// Issuing is pure computation: nothing is recorded, a token is a
/// self-contained bearer capability until it expires.
#[derive(Debug, Clone)]
pub struct TokenIssuer {
    keys: Arc<KeyMaterial>,
    issuer: String,
    ttl: i64,
}

impl TokenIssuer {
    pub fn new(keys: Arc<KeyMaterial>, issuer: impl Into<String>) -> Self {
        Self {
            keys,
            issuer: issuer.into(),
            ttl: DEFAULT_TOKEN_TTL_SECONDS,
        }
    }

    /// Override the token lifetime.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTtl` unless `ttl_seconds` is positive.
    pub fn with_ttl(mut self, ttl_seconds: i64) -> Result<Self, TokenError> {
        if ttl_seconds <= 0 {
            return Err(TokenError::InvalidTtl(ttl_seconds));
        }
        self.ttl = ttl_seconds;
        Ok(self)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl
    }

    /// Issue a token for `subject` carrying `scopes`, valid for the configured ttl from now
    pub fn issue(&self, subject: &str, scopes: &ScopeSet) -> Result<IssuedToken, TokenError> {
        self.issue_with_time(
            subject,
            scopes,
            TokenTimeConfig {
                start_time: None,
                duration: self.ttl,
            },
        )
    }

    pub fn issue_with_time(
        &self,
        subject: &str,
        scopes: &ScopeSet,
        time_config: TokenTimeConfig,
    ) -> Result<IssuedToken, TokenError> {
        let issued_at = time_config
            .start_time
            .unwrap_or_else(|| Utc::now().timestamp());
        if time_config.duration <= 0 {
            return Err(TokenError::InvalidTtl(time_config.duration));
        }
        let expires_at = issued_at
            .checked_add(time_config.duration)
            .ok_or(TokenError::InvalidTtl(time_config.duration))?;

        let claims = Claims {
            issuer: self.issuer.clone(),
            issued_at,
            expires_at,
            subject: subject.to_string(),
            scope: scopes.to_claim(),
        };
        let token = create_token(&claims, &self.keys)?;

        info!(subject, scope = %claims.scope, expires_at, "token issued");

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }
}

/// Sign arbitrary claims with the private key
pub fn create_token(claims: &Claims, keys: &KeyMaterial) -> Result<String, TokenError> {
    encode(&Header::new(Algorithm::RS256), claims, keys.encoding_key())
        .map_err(|e| TokenError::signing(e.to_string()))
}
