use blueprints_token::{bearer_token, TokenError, TokenVerifier, VerifiedClaims};
use thiserror::Error;
use tracing::warn;

use crate::operation::{Operation, Scope};

#[derive(Error, Debug)]
pub enum AuthzError {
    /// No usable bearer token was presented
    #[error("missing bearer token")]
    MissingToken,

    #[error("unauthorized: {0}")]
    Unauthorized(TokenError),

    /// Verification failed for a reason unrelated to the caller's token
    #[error("token verification failed: {0}")]
    Internal(TokenError),

    /// The token is valid but lacks the scope the operation needs
    #[error("forbidden: missing scope {required}")]
    Forbidden { subject: String, required: Scope },
}

impl AuthzError {
    /// True for the failures answered with 401
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AuthzError::MissingToken | AuthzError::Unauthorized(_))
    }
}

impl From<TokenError> for AuthzError {
    fn from(error: TokenError) -> Self {
        if error.is_authentication_failure() {
            AuthzError::Unauthorized(error)
        } else {
            AuthzError::Internal(error)
        }
    }
}

/// Grant `required` only if it is one of the token's scopes.
///
/// The subject plays no part in the decision.
pub fn authorize(claims: &VerifiedClaims, required: Scope) -> Result<(), AuthzError> {
    if claims.scopes.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden {
            subject: claims.subject.clone(),
            required,
        })
    }
}

/// Verifies the caller's token and checks it against an operation's scope
#[derive(Debug, Clone)]
pub struct AuthorizationGuard {
    verifier: TokenVerifier,
}

impl AuthorizationGuard {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self { verifier }
    }

    /// Check the raw `Authorization` header value against `operation`
    pub fn check(
        &self,
        authorization: Option<&str>,
        operation: &Operation,
    ) -> Result<VerifiedClaims, AuthzError> {
        let token = authorization
            .and_then(bearer_token)
            .ok_or(AuthzError::MissingToken)?;

        let claims = self.verifier.verify(token).map_err(|e| {
            warn!(operation = operation.name(), error = %e, "Token rejected");
            e
        })?;

        authorize(&claims, operation.required_scope()).map_err(|e| {
            warn!(
                operation = operation.name(),
                subject = %claims.subject,
                "Insufficient scope"
            );
            e
        })?;

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::shared_keys;
    use blueprints_token::{ScopeSet, TokenIssuer, TokenTimeConfig};

    const ISSUER: &str = "https://decsis-eci/blueprints";

    fn claims(scope: &str) -> VerifiedClaims {
        VerifiedClaims {
            subject: "student".to_string(),
            scopes: ScopeSet::parse(scope),
            issued_at: 0,
            expires_at: 3600,
        }
    }

    fn guard() -> AuthorizationGuard {
        AuthorizationGuard::new(TokenVerifier::new(shared_keys(), ISSUER))
    }

    fn bearer(scope: &str) -> String {
        let issued = TokenIssuer::new(shared_keys(), ISSUER)
            .issue("student", &ScopeSet::parse(scope))
            .unwrap();
        format!("Bearer {}", issued.token)
    }

    #[test]
    fn test_authorize_is_membership() {
        assert!(authorize(&claims("blueprints.read"), Scope::Read).is_ok());
        assert!(matches!(
            authorize(&claims("blueprints.read"), Scope::Write),
            Err(AuthzError::Forbidden {
                required: Scope::Write,
                ..
            })
        ));
        assert!(authorize(&claims(""), Scope::Read).is_err());
        assert!(authorize(&claims("blueprints.readwrite"), Scope::Read).is_err());
    }

    #[test]
    fn test_check_missing_or_garbled_header() {
        let guard = guard();
        assert!(matches!(
            guard.check(None, &Operation::ListAll),
            Err(AuthzError::MissingToken)
        ));
        assert!(matches!(
            guard.check(Some("Basic abc"), &Operation::ListAll),
            Err(AuthzError::MissingToken)
        ));
        assert!(matches!(
            guard.check(Some("Bearer not-a-jwt"), &Operation::ListAll),
            Err(AuthzError::Unauthorized(TokenError::MalformedToken(_)))
        ));
    }

    #[test]
    fn test_check_distinguishes_401_from_403() {
        let guard = guard();
        let read_only = bearer("blueprints.read");

        let claims = guard.check(Some(&read_only), &Operation::ListAll).unwrap();
        assert_eq!(claims.subject, "student");

        let op = Operation::AddPoint {
            author: "a".into(),
            name: "b".into(),
            point: crate::response::AddPointRequest { x: 1, y: 1 },
        };
        let err = guard.check(Some(&read_only), &op).unwrap_err();
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_check_expired_token() {
        let issued = TokenIssuer::new(shared_keys(), ISSUER)
            .issue_with_time(
                "student",
                &ScopeSet::parse("blueprints.read"),
                TokenTimeConfig {
                    start_time: Some(1_000),
                    duration: 60,
                },
            )
            .unwrap();
        let header = format!("bearer {}", issued.token);

        let err = guard().check(Some(&header), &Operation::ListAll).unwrap_err();
        assert!(err.is_unauthorized());
        assert!(matches!(
            err,
            AuthzError::Unauthorized(TokenError::ExpiredToken)
        ));
    }

    #[test]
    fn test_local_failures_are_not_unauthorized() {
        for error in [
            TokenError::invalid_key("bad modulus"),
            TokenError::Signing("rng failure".to_string()),
            TokenError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk")),
        ] {
            let err = AuthzError::from(error);
            assert!(matches!(err, AuthzError::Internal(_)));
            assert!(!err.is_unauthorized());
        }

        let err = AuthzError::from(TokenError::malformed("bad header"));
        assert!(matches!(err, AuthzError::Unauthorized(_)));
        assert!(err.is_unauthorized());
    }
}
