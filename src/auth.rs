use std::sync::Arc;

use blueprints_config::{ScopePolicy, DEFAULT_SCOPES};
use blueprints_token::{ScopeSet, TokenError, TokenIssuer};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::credentials::CredentialStore;

/// Body of a successful login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The signed RS256 token
    pub access_token: String,
    /// Always `Bearer`
    pub token_type: String,
    /// Seconds until the token expires
    pub expires_in: i64,
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error("invalid_credentials")]
    InvalidCredentials,

    /// The credentials were fine but the token could not be signed
    #[error("token signing failed: {0}")]
    Token(#[from] TokenError),
}

/// Checks credentials and issues tokens
#[derive(Clone)]
pub struct Authenticator {
    credentials: Arc<dyn CredentialStore>,
    issuer: TokenIssuer,
    policy: ScopePolicy,
}

impl Authenticator {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        issuer: TokenIssuer,
        policy: ScopePolicy,
    ) -> Self {
        Self {
            credentials,
            issuer,
            policy,
        }
    }

    pub fn policy(&self) -> ScopePolicy {
        self.policy
    }

    /// Authenticate a user and issue a token with the scopes the policy grants.
    pub fn login(&self, username: &str, password: &str) -> Result<LoginResponse, LoginError> {
        if !self.credentials.validate(username, password) {
            warn!(username, "Rejected login");
            return Err(LoginError::InvalidCredentials);
        }

        let scopes: ScopeSet = match self.policy {
            ScopePolicy::GrantAll => DEFAULT_SCOPES.into_iter().collect(),
            ScopePolicy::PerUser => self.credentials.scopes(username).unwrap_or_default(),
        };

        let issued = self.issuer.issue(username, &scopes)?;
        Ok(LoginResponse {
            expires_in: issued.expires_in(),
            access_token: issued.token,
            token_type: "Bearer".to_string(),
        })
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("issuer", &self.issuer)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
