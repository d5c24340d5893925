//! # Store Collaborator
//!
//! The storage engine is external. [`EntityStore`] is the slice of it the dispatcher
//! relies on: lookup by identifier, create-or-save, partial update, delete by identifier,
//! and lifecycle hook registration.
//!
//! One `EntityStore` value is one collection (one entity type). Hooks registered on it
//! fire for every instance of that type, and only after the write has committed.
//! Concurrency control for the same row is the store's responsibility: `update` must be
//! an atomic read-modify-write.

use crate::entity::{Draft, Entity, EntityId};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Errors raised by a store implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("constraint violated: {0}")]
    Constraint(String),
}

/// Callback invoked with the committed (or deleted) entity.
pub type StoreHook = Arc<dyn Fn(&Entity) + Send + Sync>;

/// Handle returned by hook registration, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HookId(u64);

/// A change observed through the store's lifecycle hooks.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Committed(Entity),
    Deleted(Entity),
}

#[async_trait]
pub trait EntityStore: Send + Sync + 'static {
    async fn find_by_id(&self, id: &EntityId) -> Result<Option<Entity>, StoreError>;

    /// Create-or-save. Generates an identifier when the draft carries none; otherwise
    /// creates the row or fully overwrites the existing one.
    async fn save(&self, draft: Draft) -> Result<Entity, StoreError>;

    /// Shallow-merges `patch` into the row. Returns `None` if the row does not exist.
    async fn update(
        &self,
        id: &EntityId,
        patch: Map<String, Value>,
    ) -> Result<Option<Entity>, StoreError>;

    /// Deletes by identifier filter and returns the number of removed rows.
    async fn destroy(&self, id: &EntityId) -> Result<u64, StoreError>;

    fn on_after_commit(&self, hook: StoreHook) -> HookId;

    fn on_after_delete(&self, hook: StoreHook) -> HookId;

    /// Returns `false` if the hook was not registered.
    fn remove_hook(&self, id: HookId) -> bool;
}

/// Registration table for store hooks, usable by any [`EntityStore`] implementation.
///
/// Hooks are invoked outside the table's lock, so a hook may register or remove hooks.
#[derive(Default)]
pub struct HookSet {
    inner: Mutex<HookTable>,
}

#[derive(Default)]
struct HookTable {
    next_id: u64,
    commit: BTreeMap<HookId, StoreHook>,
    delete: BTreeMap<HookId, StoreHook>,
}

impl HookSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_commit(&self, hook: StoreHook) -> HookId {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = table.allocate();
        table.commit.insert(id, hook);
        id
    }

    pub fn add_delete(&self, hook: StoreHook) -> HookId {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = table.allocate();
        table.delete.insert(id, hook);
        id
    }

    pub fn remove(&self, id: HookId) -> bool {
        let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        table.commit.remove(&id).is_some() || table.delete.remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        let table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        table.commit.len() + table.delete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn fire(&self, event: &StoreEvent) {
        let (hooks, entity): (Vec<StoreHook>, &Entity) = {
            let table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            match event {
                StoreEvent::Committed(entity) => (table.commit.values().cloned().collect(), entity),
                StoreEvent::Deleted(entity) => (table.delete.values().cloned().collect(), entity),
            }
        };
        for hook in hooks {
            hook(entity);
        }
    }
}

impl HookTable {
    fn allocate(&mut self) -> HookId {
        self.next_id += 1;
        HookId(self.next_id)
    }
}
