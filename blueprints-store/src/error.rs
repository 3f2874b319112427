use thiserror::Error;

use crate::model::BlueprintKey;

/// Failures reported by a [`BlueprintStore`](crate::BlueprintStore) backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The (author, name) pair is already taken by another record
    #[error("blueprint already exists: {0}")]
    Conflict(BlueprintKey),

    /// Connectivity, timeout or any other backend-side failure
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(msg.into())
    }
}

/// Errors returned by [`BlueprintService`](crate::BlueprintService) operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    /// The blueprint could not be created because its key is taken
    #[error("{0}")]
    PersistenceConflict(String),

    #[error("{0}")]
    Persistence(String),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict(_) => {
                ServiceError::PersistenceConflict(format!("Error saving blueprint: {}", error))
            }
            StoreError::Backend(_) => ServiceError::Persistence(error.to_string()),
        }
    }
}
