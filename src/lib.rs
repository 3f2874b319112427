//! # Blueprints
//!
//! Core of the Blueprints API: named, author-owned collections of 2D points kept
//! behind RS256 JWT authentication and scope-based authorization.
//!
//! ## Features
//!
//! - **Login**: check a username and password against a static credential table
//!   and issue a bearer token carrying the user's scopes
//! - **Authorization**: every operation declares the scope it needs; the
//!   [`AuthorizationGuard`] verifies the token and grants or denies before dispatch
//! - **Blueprint service**: create, read and extend blueprints with the
//!   (author, name) pair as identity
//! - **Flexible configuration**: load configuration from code, JSON or TOML files,
//!   or environment variables
//!
//! ## Feature Flags
//!
//! - `toml`: Enables configuration loading from TOML files (on by default)
//!
//! ## Basic Usage
//!
//! ```rust
//! use blueprints::{BlueprintsApi, BlueprintsConfig, LoginRequest, Operation};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // No key pair configured: an ephemeral RSA pair is generated
//! let api = BlueprintsApi::from_config(&BlueprintsConfig::default())?;
//!
//! let login = api.login(&LoginRequest {
//!     username: "student".into(),
//!     password: "student123".into(),
//! });
//! let header = format!("Bearer {}", login.body["access_token"].as_str().unwrap());
//!
//! let reply = api.dispatch(Some(&header), Operation::ListAll).await;
//! assert_eq!(reply.status, 200);
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! When using `from_env()` or `from_env_or_file()`, the following variables are read:
//!
//! - `{PREFIX}_ISSUER`: The `iss` claim written into and expected from tokens
//! - `{PREFIX}_TOKEN_TTL_SECONDS`: Token lifetime (optional, defaults to 3600)
//! - `{PREFIX}_PRIVATE_KEY` or `{PREFIX}_PRIVATE_KEY_FILE`: RSA private key (optional)
//! - `{PREFIX}_PUBLIC_KEY` or `{PREFIX}_PUBLIC_KEY_FILE`: RSA public key (optional)
//! - `{PREFIX}_SCOPE_POLICY`: `per_user` or `grant_all` (optional)
//! - `{PREFIX}_FILTER`: `identity`, `redundancy` or `undersampling` (optional)
//! - `{PREFIX}_STORE_TIMEOUT_MS`: Bound on each storage call (optional)
//! - `{PREFIX}_USERS` or `{PREFIX}_USERS_FILE`: JSON credential table (optional)

mod api;
mod auth;
mod credentials;
mod error;
mod guard;
mod operation;
mod response;

pub use api::{BlueprintsApi, Reply};
pub use auth::{Authenticator, LoginError, LoginResponse};
pub use credentials::{CredentialStore, InMemoryCredentialStore};
pub use error::{ApiError, Result};
pub use guard::{authorize, AuthorizationGuard, AuthzError};
pub use operation::{Operation, Scope};
pub use response::{
    AddPointRequest, ApiResponse, BlueprintResponse, LoginRequest, MessageResponse,
    NewBlueprintRequest, PointDto,
};

pub use blueprints_config::{
    get_default_config, set_default_config, try_load_default_config, BlueprintsConfig,
    BlueprintsConfigBuilder, ConfigError, FilterKind, ScopePolicy, UserCredential,
};
pub use blueprints_store::{
    Blueprint, BlueprintId, BlueprintKey, BlueprintService, BlueprintStore, BlueprintsFilter,
    InMemoryBlueprintStore, Point, ServiceError, StoreError,
};
pub use blueprints_token::{
    generate_pem_pair, KeyMaterial, ScopeSet, TokenError, TokenIssuer, TokenTimeConfig,
    TokenVerifier, VerifiedClaims, DEFAULT_KEY_BITS,
};
