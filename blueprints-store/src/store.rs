use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Blueprint, BlueprintKey, Point};

/// Persistence contract consumed by the blueprint service.
///
/// Implementations must make `save` an atomic check-and-insert on the
/// (author, name) key and `append_point` an atomic read-modify-write, so that
/// concurrent creates of one key yield exactly one success and concurrent
/// appends never lose a point.
#[async_trait]
pub trait BlueprintStore: Send + Sync {
    /// Persist a blueprint and return it as stored (with its id).
    ///
    /// A blueprint without an id is inserted and fails with
    /// [`StoreError::Conflict`] if its key is taken. A blueprint carrying the id
    /// already stored under its key replaces that record, point sequence included.
    /// Any other id, including one whose key is no longer stored, is a conflict.
    async fn save(&self, blueprint: Blueprint) -> Result<Blueprint, StoreError>;

    async fn find_by_author_and_name(
        &self,
        key: &BlueprintKey,
    ) -> Result<Option<Blueprint>, StoreError>;

    /// All blueprints of one author. Empty when there are none; that is not an error here.
    async fn find_by_author(&self, author: &str) -> Result<Vec<Blueprint>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Blueprint>, StoreError>;

    /// Append `point` to the blueprint under `key` and return the updated record.
    ///
    /// Returns `Ok(None)` and changes nothing when no such blueprint exists.
    async fn append_point(
        &self,
        key: &BlueprintKey,
        point: Point,
    ) -> Result<Option<Blueprint>, StoreError>;
}
