use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{ServiceError, StoreError};
use crate::filter::BlueprintsFilter;
use crate::model::{Blueprint, BlueprintKey, Point};
use crate::store::BlueprintStore;

/// Domain operations over a [`BlueprintStore`].
///
/// Cloning is cheap and clones share the same backend.
#[derive(Clone)]
pub struct BlueprintService {
    store: Arc<dyn BlueprintStore>,
    filter: BlueprintsFilter,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for BlueprintService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlueprintService")
            .field("filter", &self.filter)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl BlueprintService {
    pub fn new(store: Arc<dyn BlueprintStore>) -> Self {
        Self {
            store,
            filter: BlueprintsFilter::default(),
            timeout: None,
        }
    }

    /// Filter applied to every blueprint returned by a read
    pub fn with_filter(mut self, filter: BlueprintsFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Bound each store call; an elapsed call fails with [`ServiceError::Persistence`]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn filter(&self) -> BlueprintsFilter {
        self.filter
    }

    async fn call<T, F>(&self, fut: F) -> Result<T, ServiceError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                StoreError::backend(format!("store call timed out after {:?}", limit))
            })?,
            None => fut.await,
        };
        Ok(result?)
    }

    pub async fn list_all(&self) -> Result<HashSet<Blueprint>, ServiceError> {
        let blueprints = self.call(self.store.find_all()).await?;
        debug!(count = blueprints.len(), "Listed all blueprints");
        Ok(blueprints
            .into_iter()
            .map(|bp| self.filter.apply(bp))
            .collect())
    }

    /// Blueprints of one author. An author with no blueprints is reported as not found.
    pub async fn list_by_author(&self, author: &str) -> Result<HashSet<Blueprint>, ServiceError> {
        let blueprints = self.call(self.store.find_by_author(author)).await?;
        if blueprints.is_empty() {
            debug!(author, "No blueprints for author");
            return Err(ServiceError::NotFound(format!(
                "No blueprints found for author: {}",
                author
            )));
        }
        debug!(author, count = blueprints.len(), "Listed blueprints by author");
        Ok(blueprints
            .into_iter()
            .map(|bp| self.filter.apply(bp))
            .collect())
    }

    pub async fn get_one(&self, author: &str, name: &str) -> Result<Blueprint, ServiceError> {
        let key = BlueprintKey::new(author, name);
        let found = self.call(self.store.find_by_author_and_name(&key)).await?;
        debug!(%key, found = found.is_some(), "Looked up blueprint");
        found
            .map(|bp| self.filter.apply(bp))
            .ok_or_else(|| not_found(&key))
    }

    /// Create a blueprint. Fails with [`ServiceError::PersistenceConflict`] when
    /// the (author, name) pair is already taken; the existing record is untouched.
    pub async fn create(
        &self,
        author: &str,
        name: &str,
        points: Vec<Point>,
    ) -> Result<Blueprint, ServiceError> {
        let blueprint = Blueprint::new(author, name, points);
        match self.call(self.store.save(blueprint)).await {
            Ok(stored) => {
                info!(
                    key = %stored.key(),
                    points = stored.points_count(),
                    "Created blueprint"
                );
                Ok(stored)
            }
            Err(e) => {
                warn!(author, name, error = %e, "Failed to create blueprint");
                Err(e)
            }
        }
    }

    /// Append one point at the end of an existing blueprint
    pub async fn add_point(
        &self,
        author: &str,
        name: &str,
        x: i32,
        y: i32,
    ) -> Result<Blueprint, ServiceError> {
        let key = BlueprintKey::new(author, name);
        let updated = self
            .call(self.store.append_point(&key, Point::new(x, y)))
            .await?
            .ok_or_else(|| not_found(&key))?;
        debug!(%key, x, y, points = updated.points_count(), "Added point");
        Ok(updated)
    }
}

fn not_found(key: &BlueprintKey) -> ServiceError {
    ServiceError::NotFound(format!("Blueprint not found: {}", key))
}
