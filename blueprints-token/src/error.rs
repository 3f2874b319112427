use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use thiserror::Error;

/// Errors raised while loading keys, minting or verifying tokens.
#[derive(Error, Debug)]
pub enum TokenError {
    /// Signature, algorithm or issuer does not match what this verifier trusts
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The token was valid once but its `exp` has passed
    #[error("Token has expired")]
    ExpiredToken,

    /// The token or its claims could not be decoded
    #[error("Malformed token: {0}")]
    MalformedToken(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Token lifetime is not positive or pushes `exp` past the representable range
    #[error("Invalid token lifetime: {0} seconds")]
    InvalidTtl(i64),

    /// Signing failed. Never expected with a well-formed key pair.
    #[error("Failed to sign token: {0}")]
    Signing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TokenError {
    pub fn invalid_token(msg: impl Into<String>) -> Self {
        TokenError::InvalidToken(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        TokenError::MalformedToken(msg.into())
    }

    pub fn invalid_key(msg: impl Into<String>) -> Self {
        TokenError::InvalidKey(msg.into())
    }

    pub fn signing(msg: impl Into<String>) -> Self {
        TokenError::Signing(msg.into())
    }

    /// Whether the error came from the presented token rather than from local key material.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(
            self,
            TokenError::InvalidToken(_) | TokenError::ExpiredToken | TokenError::MalformedToken(_)
        )
    }
}

impl From<JwtError> for TokenError {
    fn from(error: JwtError) -> Self {
        match error.kind() {
            ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidIssuer
            | ErrorKind::ImmatureSignature => TokenError::InvalidToken(error.to_string()),
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_)
            | ErrorKind::MissingRequiredClaim(_)
            | ErrorKind::InvalidAlgorithmName => TokenError::MalformedToken(error.to_string()),
            ErrorKind::InvalidRsaKey(_) | ErrorKind::InvalidKeyFormat => {
                TokenError::InvalidKey(error.to_string())
            }
            ErrorKind::RsaFailedSigning => TokenError::Signing(error.to_string()),
            _ => TokenError::InvalidToken(error.to_string()),
        }
    }
}
