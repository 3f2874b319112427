//! # Blueprints Store
//!
//! The blueprint domain: the [`Blueprint`] model keyed by (author, name), the
//! [`BlueprintStore`] persistence contract with an in-memory backend, the read
//! filters and the [`BlueprintService`] that enforces identity and mutation rules
//! on top of a store.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use blueprints_store::{BlueprintService, InMemoryBlueprintStore, Point};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), blueprints_store::ServiceError> {
//! let service = BlueprintService::new(Arc::new(InMemoryBlueprintStore::new()));
//!
//! service.create("ana", "house", vec![Point::new(1, 2)]).await?;
//! let house = service.add_point("ana", "house", 3, 4).await?;
//! assert_eq!(house.points_count(), 2);
//! # Ok(())
//! # }
//! ```

mod error;
mod filter;
mod memory;
mod model;
mod service;
mod store;

pub use error::{ServiceError, StoreError};
pub use filter::BlueprintsFilter;
pub use memory::InMemoryBlueprintStore;
pub use model::{Blueprint, BlueprintId, BlueprintKey, Point};
pub use service::BlueprintService;
pub use store::BlueprintStore;
