//! # Instance Loader
//!
//! The single chokepoint through which preload actions obtain their target entity, so a
//! failed identifier-to-entity resolution is reported the same way for every action.

use crate::entity::{Entity, EntityId};
use crate::error::FrameworkError;
use crate::store::EntityStore;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct InstanceLoader {
    store: Arc<dyn EntityStore>,
}

impl InstanceLoader {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Resolves `id` to a live entity.
    ///
    /// # Errors
    ///
    /// `NotFound` when `id` is absent or matches no stored entity; store faults pass through.
    pub async fn load(&self, id: Option<&EntityId>) -> Result<Entity, FrameworkError> {
        let id = id.ok_or_else(|| FrameworkError::NotFound("no identifier given".to_string()))?;
        let found = self.store.find_by_id(id).await?;
        debug!(%id, found = found.is_some(), "Load");
        found.ok_or_else(|| FrameworkError::NotFound(id.to_string()))
    }
}
