use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::model::{Blueprint, BlueprintId, BlueprintKey, Point};
use crate::store::BlueprintStore;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    blueprints: HashMap<BlueprintKey, Blueprint>,
}

/// In-memory storage backend implementing BlueprintStore.
///
/// Every mutation holds the write lock for its whole check-and-write, which is
/// what makes `save` and `append_point` atomic.
#[derive(Debug, Default)]
pub struct InMemoryBlueprintStore {
    state: RwLock<State>,
}

impl InMemoryBlueprintStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blueprints
    pub async fn count(&self) -> usize {
        self.state.read().await.blueprints.len()
    }
}

fn sorted_by_id(mut blueprints: Vec<Blueprint>) -> Vec<Blueprint> {
    blueprints.sort_by_key(|bp| bp.id());
    blueprints
}

#[async_trait]
impl BlueprintStore for InMemoryBlueprintStore {
    async fn save(&self, blueprint: Blueprint) -> Result<Blueprint, StoreError> {
        let mut state = self.state.write().await;

        if let Some(existing) = state.blueprints.get_mut(blueprint.key()) {
            if blueprint.id().is_some() && blueprint.id() == existing.id() {
                *existing = blueprint.clone();
                return Ok(blueprint);
            }
            return Err(StoreError::Conflict(blueprint.key().clone()));
        }

        if blueprint.id().is_some() {
            return Err(StoreError::Conflict(blueprint.key().clone()));
        }

        state.next_id += 1;
        let stored = blueprint.with_id(BlueprintId(state.next_id));
        state
            .blueprints
            .insert(stored.key().clone(), stored.clone());
        Ok(stored)
    }

    async fn find_by_author_and_name(
        &self,
        key: &BlueprintKey,
    ) -> Result<Option<Blueprint>, StoreError> {
        Ok(self.state.read().await.blueprints.get(key).cloned())
    }

    async fn find_by_author(&self, author: &str) -> Result<Vec<Blueprint>, StoreError> {
        let state = self.state.read().await;
        let found = state
            .blueprints
            .values()
            .filter(|bp| bp.author() == author)
            .cloned()
            .collect();
        Ok(sorted_by_id(found))
    }

    async fn find_all(&self) -> Result<Vec<Blueprint>, StoreError> {
        let state = self.state.read().await;
        Ok(sorted_by_id(state.blueprints.values().cloned().collect()))
    }

    async fn append_point(
        &self,
        key: &BlueprintKey,
        point: Point,
    ) -> Result<Option<Blueprint>, StoreError> {
        let mut state = self.state.write().await;
        Ok(state.blueprints.get_mut(key).map(|bp| {
            bp.add_point(point);
            bp.clone()
        }))
    }
}
