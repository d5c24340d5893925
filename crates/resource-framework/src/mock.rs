//! # In-Memory Store & Testing Guide
//!
//! [`MemoryStore`] implements [`EntityStore`] entirely in memory. It behaves like a
//! small single-table database: identifiers are generated from a counter (`"1"`, `"2"`,
//! ...), writes are atomic per row, and lifecycle hooks fire after each write commits.
//!
//! ## When to use MemoryStore vs a real store
//!
//! | Feature | MemoryStore | Real store |
//! |---------|-------------|------------|
//! | **Speed** | Instant | Network / disk bound |
//! | **Determinism** | Sequential ids, no I/O | Depends on the engine |
//! | **Error Injection** | Easy ([`MemoryStore::fail_next`]) | Hard |
//! | **Use Case** | Dispatcher, binding and client tests | Production |
//!
//! ## Simulating failures
//!
//! ```rust
//! use resource_framework::mock::MemoryStore;
//! use resource_framework::{Draft, EntityStore, StoreError};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = MemoryStore::new();
//!     store.fail_next(StoreError::Unavailable("disk full".into()));
//!
//!     let result = store.save(Draft::default()).await;
//!     assert!(matches!(result, Err(StoreError::Unavailable(_))));
//!     assert!(store.is_empty());
//!
//!     // The fault is consumed; the next call succeeds.
//!     let saved = store.save(Draft::default()).await.unwrap();
//!     assert_eq!(saved.id().as_str(), "1");
//! }
//! ```

use crate::entity::{Draft, Entity, EntityId};
use crate::store::{EntityStore, HookId, HookSet, StoreError, StoreEvent, StoreHook};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, PoisonError};
use tracing::debug;

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<Table>,
    faults: Mutex<VecDeque<StoreError>>,
    hooks: HookSet,
}

#[derive(Default)]
struct Table {
    rows: BTreeMap<EntityId, Map<String, Value>>,
    next_id: u32,
}

impl Table {
    fn generate_id(&mut self) -> EntityId {
        loop {
            self.next_id += 1;
            let id = EntityId::from(self.next_id);
            if !self.rows.contains_key(&id) {
                return id;
            }
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a fault returned by the next store operation (lookups included).
    pub fn fail_next(&self, error: StoreError) {
        self.faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(error);
    }

    pub fn len(&self) -> usize {
        self.table().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads a row without going through the async API or the fault queue.
    pub fn snapshot(&self, id: &EntityId) -> Option<Entity> {
        self.table()
            .rows
            .get(id)
            .map(|attributes| Entity::new(id.clone(), attributes.clone()))
    }

    /// Number of registered lifecycle hooks.
    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    fn table(&self) -> std::sync::MutexGuard<'_, Table> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn take_fault(&self) -> Result<(), StoreError> {
        match self
            .faults
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Entity>, StoreError> {
        self.take_fault()?;
        Ok(self.snapshot(id))
    }

    async fn save(&self, draft: Draft) -> Result<Entity, StoreError> {
        self.take_fault()?;
        let entity = {
            let mut table = self.table();
            let id = match draft.id {
                Some(id) => id,
                None => table.generate_id(),
            };
            let entity = Entity::new(id, draft.attributes);
            table
                .rows
                .insert(entity.id().clone(), entity.attributes().clone());
            entity
        };
        debug!(id = %entity.id(), "Row saved");
        self.hooks.fire(&StoreEvent::Committed(entity.clone()));
        Ok(entity)
    }

    async fn update(
        &self,
        id: &EntityId,
        patch: Map<String, Value>,
    ) -> Result<Option<Entity>, StoreError> {
        self.take_fault()?;
        let updated = {
            let mut table = self.table();
            let Some(attributes) = table.rows.get_mut(id) else {
                return Ok(None);
            };
            let mut entity = Entity::new(id.clone(), std::mem::take(attributes));
            entity.merge(patch);
            *attributes = entity.attributes().clone();
            entity
        };
        debug!(%id, "Row updated");
        self.hooks.fire(&StoreEvent::Committed(updated.clone()));
        Ok(Some(updated))
    }

    async fn destroy(&self, id: &EntityId) -> Result<u64, StoreError> {
        self.take_fault()?;
        let removed = self
            .table()
            .rows
            .remove(id)
            .map(|attributes| Entity::new(id.clone(), attributes));
        match removed {
            Some(entity) => {
                debug!(%id, "Row removed");
                self.hooks.fire(&StoreEvent::Deleted(entity));
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn on_after_commit(&self, hook: StoreHook) -> HookId {
        self.hooks.add_commit(hook)
    }

    fn on_after_delete(&self, hook: StoreHook) -> HookId {
        self.hooks.add_delete(hook)
    }

    fn remove_hook(&self, id: HookId) -> bool {
        self.hooks.remove(id)
    }
}
