use thiserror::Error;

/// Errors raised while assembling a [`crate::BlueprintsApi`]
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Config(#[from] blueprints_config::ConfigError),

    #[error("Token error: {0}")]
    Token(#[from] blueprints_token::TokenError),
}

pub type Result<T> = std::result::Result<T, ApiError>;
