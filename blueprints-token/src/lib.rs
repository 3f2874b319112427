//! # Blueprints Token
//!
//! Issuance and verification of the bearer tokens used by the Blueprints API.
//!
//! Tokens are RS256-signed JWTs carrying the registered `iss`, `iat`, `exp` and
//! `sub` claims plus a space-separated `scope` claim. They are stateless: nothing
//! is stored when a token is issued and there is no revocation before expiry.
//!
//! ## Features
//!
//! - Key material: load an RSA key pair from PEM or generate an ephemeral one
//! - Token issuance: sign claims for an authenticated subject with a fixed ttl
//! - Token verification: check signature, issuer and expiry and extract the scopes
//!
//! ## Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use blueprints_token::{KeyMaterial, ScopeSet, TokenIssuer, TokenVerifier};
//!
//! fn main() -> Result<(), blueprints_token::TokenError> {
//!     let keys = Arc::new(KeyMaterial::from_pem_files("private.pem", "public.pem")?);
//!     let issuer = TokenIssuer::new(keys.clone(), "https://decsis-eci/blueprints");
//!     let verifier = TokenVerifier::new(keys, "https://decsis-eci/blueprints");
//!
//!     let issued = issuer.issue("student", &ScopeSet::parse("blueprints.read"))?;
//!     let claims = verifier.verify(&issued.token)?;
//!     assert!(claims.scopes.contains("blueprints.read"));
//!     Ok(())
//! }
//! ```

mod claims;
mod error;
mod keys;
mod mint;
mod utils;
mod verify;

pub use claims::{Claims, ScopeSet, VerifiedClaims};
pub use error::TokenError;
pub use keys::{generate_pem_pair, KeyMaterial, DEFAULT_KEY_BITS};
pub use mint::{
    create_token, IssuedToken, TokenIssuer, TokenTimeConfig, DEFAULT_TOKEN_TTL_SECONDS,
};
pub use utils::{bearer_token, read_pem_file};
pub use verify::TokenVerifier;
