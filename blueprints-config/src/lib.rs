//! # Blueprints Config
//!
//! Configuration for the Blueprints API core: token issuer and lifetime, the RSA
//! key pair, the credential table, the scope policy applied at login, the read
//! filter and the storage timeout.
//!
//! A configuration can be built in code, loaded from JSON or TOML files, or read
//! from environment variables.

use serde::{Deserialize, Serialize};
use std::env;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

/// Issuer written into every token when none is configured
pub const DEFAULT_ISSUER: &str = "https://decsis-eci/blueprints";

/// Token lifetime when `token_ttl_seconds` is unset
pub const DEFAULT_TOKEN_TTL_SECONDS: u64 = 3600;

/// Longest token lifetime a configuration may ask for (one year)
pub const MAX_TOKEN_TTL_SECONDS: u64 = 365 * 24 * 3600;

/// Scopes granted to the built-in users and by [`ScopePolicy::GrantAll`]
pub const DEFAULT_SCOPES: [&str; 2] = ["blueprints.read", "blueprints.write"];

/// How the login flow decides which scopes go into a token
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScopePolicy {
    /// Grant exactly the scopes recorded for the user
    #[default]
    PerUser,
    /// Grant read and write to every authenticated user
    GrantAll,
}

impl FromStr for ScopePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per_user" | "per-user" => Ok(ScopePolicy::PerUser),
            "grant_all" | "grant-all" => Ok(ScopePolicy::GrantAll),
            _ => Err(ConfigError::ParseError(format!("Invalid scope policy: {}", s))),
        }
    }
}

/// Which filter is applied to blueprints on the way out of read operations
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    #[default]
    Identity,
    /// Drop consecutive duplicate points
    Redundancy,
    /// Keep every other point
    Undersampling,
}

impl FromStr for FilterKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "identity" => Ok(FilterKind::Identity),
            "redundancy" => Ok(FilterKind::Redundancy),
            "undersampling" => Ok(FilterKind::Undersampling),
            _ => Err(ConfigError::ParseError(format!("Invalid filter: {}", s))),
        }
    }
}

/// One entry of the static credential table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCredential {
    pub username: String,
    pub password: String,
    pub scopes: Vec<String>,
}

impl UserCredential {
    pub fn new<S: Into<String>>(
        username: impl Into<String>,
        password: impl Into<String>,
        scopes: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }
}

/// The two accounts the service ships with
pub fn default_users() -> Vec<UserCredential> {
    vec![
        UserCredential::new("student", "student123", DEFAULT_SCOPES),
        UserCredential::new("assistant", "assistant123", DEFAULT_SCOPES),
    ]
}

fn default_issuer() -> String {
    DEFAULT_ISSUER.to_string()
}

/// Configuration for the Blueprints API core
///
/// # Examples
///
/// ## Building a configuration
///
/// ```
/// use blueprints_config::{BlueprintsConfig, FilterKind, ScopePolicy};
///
/// let config = BlueprintsConfig::builder()
///     .issuer("https://decsis-eci/blueprints")
///     .token_ttl_seconds(300)
///     .scope_policy(ScopePolicy::GrantAll)
///     .filter(FilterKind::Redundancy)
///     .build()
///     .expect("valid configuration");
///
/// assert_eq!(config.ttl_seconds(), 300);
/// ```
///
/// ## Loading from a JSON file
///
/// ```no_run
/// use blueprints_config::BlueprintsConfig;
///
/// let config = BlueprintsConfig::from_file("./blueprints.json")
///     .expect("Failed to load configuration");
/// ```
///
/// ## Loading from environment variables
///
/// ```no_run
/// use blueprints_config::BlueprintsConfig;
///
/// // BLUEPRINTS_ISSUER=https://decsis-eci/blueprints
/// // BLUEPRINTS_TOKEN_TTL_SECONDS=3600
/// // BLUEPRINTS_PRIVATE_KEY_FILE=/etc/blueprints/private.pem
/// // BLUEPRINTS_PUBLIC_KEY_FILE=/etc/blueprints/public.pem
/// let config = BlueprintsConfig::from_env_or_file("BLUEPRINTS")
///     .expect("Failed to load configuration from environment");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlueprintsConfig {
    /// Value of the `iss` claim, checked again on verification
    #[serde(default = "default_issuer")]
    pub issuer: String,
    /// Token lifetime in seconds; 3600 when unset
    #[serde(default)]
    pub token_ttl_seconds: Option<u64>,
    /// RSA private key in PEM format
    ///
    /// When neither key is configured an ephemeral pair is generated at start-up.
    #[serde(default)]
    pub private_key: Option<String>,
    /// RSA public key in PEM format
    #[serde(default)]
    pub public_key: Option<String>,
    #[serde(default)]
    pub scope_policy: ScopePolicy,
    #[serde(default)]
    pub filter: FilterKind,
    /// Upper bound on every storage call, in milliseconds
    #[serde(default)]
    pub store_timeout_ms: Option<u64>,
    #[serde(default = "default_users")]
    pub users: Vec<UserCredential>,
}

impl Default for BlueprintsConfig {
    fn default() -> Self {
        Self {
            issuer: default_issuer(),
            token_ttl_seconds: None,
            private_key: None,
            public_key: None,
            scope_policy: ScopePolicy::default(),
            filter: FilterKind::default(),
            store_timeout_ms: None,
            users: default_users(),
        }
    }
}

/// Builder for BlueprintsConfig
#[derive(Default, Debug)]
pub struct BlueprintsConfigBuilder {
    issuer: Option<String>,
    token_ttl_seconds: Option<u64>,
    private_key: Option<String>,
    public_key: Option<String>,
    scope_policy: Option<ScopePolicy>,
    filter: Option<FilterKind>,
    store_timeout_ms: Option<u64>,
    users: Option<Vec<UserCredential>>,
}

impl BlueprintsConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn from_config(config: &BlueprintsConfig) -> Self {
        Self {
            issuer: Some(config.issuer.clone()),
            token_ttl_seconds: config.token_ttl_seconds,
            private_key: config.private_key.clone(),
            public_key: config.public_key.clone(),
            scope_policy: Some(config.scope_policy),
            filter: Some(config.filter),
            store_timeout_ms: config.store_timeout_ms,
            users: Some(config.users.clone()),
        }
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn token_ttl_seconds(mut self, ttl: u64) -> Self {
        self.token_ttl_seconds = Some(ttl);
        self
    }

    /// Set both halves of the signing key pair, PEM encoded
    pub fn key_pair(mut self, private_key: impl Into<String>, public_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self.public_key = Some(public_key.into());
        self
    }

    pub fn scope_policy(mut self, policy: ScopePolicy) -> Self {
        self.scope_policy = Some(policy);
        self
    }

    pub fn filter(mut self, filter: FilterKind) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn store_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.store_timeout_ms = Some(timeout_ms);
        self
    }

    /// Add a user. On a fresh builder the first call replaces the built-in users.
    pub fn user(mut self, user: UserCredential) -> Self {
        self.users.get_or_insert_with(Vec::new).push(user);
        self
    }

    /// Replace the credential table
    pub fn users(mut self, users: Vec<UserCredential>) -> Self {
        self.users = Some(users);
        self
    }

    /// Build the BlueprintsConfig
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting configuration does not pass [`BlueprintsConfig::validate`]
    pub fn build(self) -> Result<BlueprintsConfig, ConfigError> {
        let config = BlueprintsConfig {
            issuer: self.issuer.unwrap_or_else(default_issuer),
            token_ttl_seconds: self.token_ttl_seconds,
            private_key: self.private_key,
            public_key: self.public_key,
            scope_policy: self.scope_policy.unwrap_or_default(),
            filter: self.filter.unwrap_or_default(),
            store_timeout_ms: self.store_timeout_ms,
            users: self.users.unwrap_or_else(default_users),
        };

        config.validate()?;

        Ok(config)
    }
}

/// Errors that can occur when working with Blueprints configuration
#[derive(Debug)]
pub enum ConfigError {
    MissingIssuer,
    InvalidTtl,
    InvalidTimeout,
    MissingKey(String),
    InvalidKey(String),
    InvalidUser(String),
    IOError(String),
    ParseError(String),
    AlreadyInitialized,
    EnvVarError(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingIssuer => {
                write!(f, "Token issuer is required but was empty. Please specify the issuer written into the `iss` claim.")
            }
            ConfigError::InvalidTtl => {
                write!(f, "Invalid token lifetime. The ttl must be between 1 and {} seconds.", MAX_TOKEN_TTL_SECONDS)
            }
            ConfigError::InvalidTimeout => {
                write!(f, "Invalid store timeout. The timeout must be a positive number of milliseconds.")
            }
            ConfigError::MissingKey(which) => {
                write!(f, "The {} key is missing. Configure both halves of the key pair or neither.", which)
            }
            ConfigError::InvalidKey(e) => {
                write!(f, "Invalid key format: {}. Please ensure the key is properly PEM-encoded.", e)
            }
            ConfigError::InvalidUser(e) => {
                write!(f, "Invalid user entry: {}.", e)
            }
            ConfigError::IOError(e) => {
                write!(f, "Could not read blueprints configuration: {}", e)
            }
            ConfigError::ParseError(e) => {
                write!(f, "Could not parse blueprints configuration: {}", e)
            }
            ConfigError::AlreadyInitialized => {
                write!(f, "A default blueprints configuration is already set; use get_default_config() to read it.")
            }
            ConfigError::EnvVarError(e) => {
                write!(f, "Environment variable error: {}", e)
            }
        }
    }
}

impl Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(error: std::io::Error) -> Self {
        ConfigError::IOError(error.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(error: serde_json::Error) -> Self {
        ConfigError::ParseError(error.to_string())
    }
}

#[cfg(feature = "toml")]
impl From<toml::de::Error> for ConfigError {
    fn from(error: toml::de::Error) -> Self {
        ConfigError::ParseError(error.to_string())
    }
}

impl From<std::env::VarError> for ConfigError {
    fn from(error: std::env::VarError) -> Self {
        ConfigError::EnvVarError(error.to_string())
    }
}

/// Read `name`, treating an unset variable as `None`
fn optional_var(name: &str) -> Result<Option<String>, ConfigError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Read `{name}_FILE` as a path to load, falling back to `name` itself
fn optional_var_or_file(name: &str) -> Result<Option<String>, ConfigError> {
    match optional_var(&format!("{}_FILE", name))? {
        Some(path) => fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| ConfigError::IOError(format!("Failed to read {}: {}", path, e))),
        None => optional_var(name),
    }
}

fn parse_number(name: &str, value: Option<String>) -> Result<Option<u64>, ConfigError> {
    value
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::ParseError(format!("{} must be a number, got {}", name, v)))
        })
        .transpose()
}

impl BlueprintsConfig {
    pub fn builder() -> BlueprintsConfigBuilder {
        BlueprintsConfigBuilder::new()
    }

    /// Builder seeded with this configuration
    pub fn to_builder(&self) -> BlueprintsConfigBuilder {
        BlueprintsConfigBuilder::from_config(self)
    }

    /// Effective token lifetime in seconds
    pub fn ttl_seconds(&self) -> u64 {
        self.token_ttl_seconds.unwrap_or(DEFAULT_TOKEN_TTL_SECONDS)
    }

    pub fn store_timeout(&self) -> Option<Duration> {
        self.store_timeout_ms.map(Duration::from_millis)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_content = fs::read_to_string(path)?;
        let config: BlueprintsConfig = serde_json::from_str(&file_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML configuration file
    #[cfg(feature = "toml")]
    pub fn from_toml(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file_content = fs::read_to_string(path)?;
        let config: BlueprintsConfig = toml::from_str(&file_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Create a configuration from environment variables
    ///
    /// The environment variables should be named with the given prefix followed by:
    /// - ISSUER: The token issuer (required)
    /// - TOKEN_TTL_SECONDS: Token lifetime (optional, defaults to 3600)
    /// - PRIVATE_KEY / PUBLIC_KEY: PEM contents of the key pair (optional)
    /// - SCOPE_POLICY: "per_user" or "grant_all" (optional)
    /// - FILTER: "identity", "redundancy" or "undersampling" (optional)
    /// - STORE_TIMEOUT_MS: Storage call timeout (optional)
    /// - USERS: JSON array of `{username, password, scopes}` (optional)
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if ISSUER is missing or any variable is invalid.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        Self::load_env(prefix, optional_var)
    }

    /// Create a configuration from environment variables or files
    ///
    /// Like `from_env`, but PRIVATE_KEY, PUBLIC_KEY and USERS may instead be given
    /// as `_FILE` variables holding a path whose contents are loaded.
    pub fn from_env_or_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::load_env(prefix, optional_var_or_file)
    }

    fn load_env(
        prefix: &str,
        read_secret: fn(&str) -> Result<Option<String>, ConfigError>,
    ) -> Result<Self, ConfigError> {
        let issuer = env::var(format!("{}_ISSUER", prefix))?;

        let ttl_name = format!("{}_TOKEN_TTL_SECONDS", prefix);
        let token_ttl_seconds = parse_number(&ttl_name, optional_var(&ttl_name)?)?;

        let timeout_name = format!("{}_STORE_TIMEOUT_MS", prefix);
        let store_timeout_ms = parse_number(&timeout_name, optional_var(&timeout_name)?)?;

        let private_key = read_secret(&format!("{}_PRIVATE_KEY", prefix))?;
        let public_key = read_secret(&format!("{}_PUBLIC_KEY", prefix))?;

        let scope_policy = match optional_var(&format!("{}_SCOPE_POLICY", prefix))? {
            Some(value) => value.parse::<ScopePolicy>()?,
            None => ScopePolicy::default(),
        };

        let filter = match optional_var(&format!("{}_FILTER", prefix))? {
            Some(value) => value.parse::<FilterKind>()?,
            None => FilterKind::default(),
        };

        let users = match read_secret(&format!("{}_USERS", prefix))? {
            Some(json) => serde_json::from_str::<Vec<UserCredential>>(&json)?,
            None => default_users(),
        };

        let config = BlueprintsConfig {
            issuer,
            token_ttl_seconds,
            private_key,
            public_key,
            scope_policy,
            filter,
            store_timeout_ms,
            users,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the invariants every loader enforces before returning a configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.issuer.trim().is_empty() {
            return Err(ConfigError::MissingIssuer);
        }

        if let Some(ttl) = self.token_ttl_seconds {
            if ttl == 0 || ttl > MAX_TOKEN_TTL_SECONDS {
                return Err(ConfigError::InvalidTtl);
            }
        }

        if self.store_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidTimeout);
        }

        match (&self.private_key, &self.public_key) {
            (None, None) => {}
            (Some(_), None) => return Err(ConfigError::MissingKey("public".to_string())),
            (None, Some(_)) => return Err(ConfigError::MissingKey("private".to_string())),
            (Some(private_key), Some(public_key)) => {
                if !private_key.contains("BEGIN") || !private_key.contains("PRIVATE KEY") {
                    return Err(ConfigError::InvalidKey(
                        "Private key does not contain proper PEM markers".to_string(),
                    ));
                }
                if !public_key.contains("BEGIN") || !public_key.contains("PUBLIC KEY") {
                    return Err(ConfigError::InvalidKey(
                        "Public key does not contain proper PEM markers".to_string(),
                    ));
                }
            }
        }

        let mut seen = std::collections::HashSet::new();
        for user in &self.users {
            if user.username.trim().is_empty() {
                return Err(ConfigError::InvalidUser("username is empty".to_string()));
            }
            if user.scopes.iter().all(|s| s.trim().is_empty()) {
                return Err(ConfigError::InvalidUser(format!(
                    "{} has no scopes",
                    user.username
                )));
            }
            if !seen.insert(user.username.as_str()) {
                return Err(ConfigError::InvalidUser(format!(
                    "{} is listed more than once",
                    user.username
                )));
            }
        }

        Ok(())
    }
}

static DEFAULT_CONFIG: OnceLock<BlueprintsConfig> = OnceLock::new();

/// Install the process-wide configuration
///
/// Returns an error if a default configuration is already set.
pub fn set_default_config(config: BlueprintsConfig) -> Result<(), ConfigError> {
    config.validate()?;
    DEFAULT_CONFIG
        .set(config)
        .map_err(|_| ConfigError::AlreadyInitialized)
}

/// The process-wide configuration, if one was installed
pub fn get_default_config() -> Option<&'static BlueprintsConfig> {
    DEFAULT_CONFIG.get()
}

fn expand_home(path: &str) -> Option<std::path::PathBuf> {
    match path.strip_prefix("~/") {
        Some(stripped) => dirs::home_dir().map(|home| home.join(stripped)),
        None => Some(Path::new(path).to_path_buf()),
    }
}

/// Try to load a configuration from standard locations
///
/// This function attempts to load a configuration from:
/// 1. Environment variables with the prefix "BLUEPRINTS"
/// 2. A file at ./blueprints.json
/// 3. A file at ~/.blueprints/config.json
/// 4. A file at /etc/blueprints/config.json
/// 5. If the "toml" feature is enabled, TOML files at the same paths
///
/// Returns None if no configuration could be found.
pub fn try_load_default_config() -> Option<BlueprintsConfig> {
    if let Ok(config) = BlueprintsConfig::from_env_or_file("BLUEPRINTS") {
        return Some(config);
    }

    let paths = [
        "./blueprints.json",
        "~/.blueprints/config.json",
        "/etc/blueprints/config.json",
    ];

    for path in paths.iter().filter_map(|p| expand_home(p)) {
        if path.exists() {
            if let Ok(config) = BlueprintsConfig::from_file(&path) {
                return Some(config);
            }
        }
    }

    #[cfg(feature = "toml")]
    {
        let toml_paths = [
            "./blueprints.toml",
            "~/.blueprints/config.toml",
            "/etc/blueprints/config.toml",
        ];

        for path in toml_paths.iter().filter_map(|p| expand_home(p)) {
            if path.exists() {
                if let Ok(config) = BlueprintsConfig::from_toml(&path) {
                    return Some(config);
                }
            }
        }
    }

    None
}
