//! # Event Emitter
//!
//! Publishes change events for one resource. The binding feeds it from the store's
//! lifecycle hooks, so every event is issued only after the triggering write committed.
//! Emission order across concurrently committing entities is not guaranteed.
//!
//! - after commit: the serialized entity (exactly what fetch returns) on topic `<resource>`
//! - after delete: `{"id": <identifier>}` on topic `<resource>.deleted`

use crate::bus::MessageBus;
use crate::entity::{Entity, EntityId, ID_FIELD};
use crate::error::FrameworkError;
use crate::store::StoreEvent;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const DELETED_SUFFIX: &str = ".deleted";

#[derive(Clone)]
pub struct EventEmitter {
    bus: Arc<dyn MessageBus>,
    topic: String,
}

impl EventEmitter {
    pub fn new(bus: Arc<dyn MessageBus>, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn deleted_topic(&self) -> String {
        format!("{}{DELETED_SUFFIX}", self.topic)
    }

    pub async fn emit(&self, entity: &Entity) -> Result<(), FrameworkError> {
        self.bus.publish(&self.topic, entity.to_json()).await?;
        debug!(topic = %self.topic, id = %entity.id(), "Change event");
        Ok(())
    }

    pub async fn emit_deleted(&self, id: &EntityId) -> Result<(), FrameworkError> {
        let topic = self.deleted_topic();
        self.bus.publish(&topic, json!({ ID_FIELD: id })).await?;
        debug!(%topic, %id, "Delete event");
        Ok(())
    }

    /// Forwards store events to the bus until every sender is dropped.
    ///
    /// Publish failures are logged and do not stop the loop; the write they describe has
    /// already committed.
    pub fn spawn(
        self,
        mut events: mpsc::UnboundedReceiver<StoreEvent>,
        publish_deletes: bool,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let result = match &event {
                    StoreEvent::Committed(entity) => self.emit(entity).await,
                    StoreEvent::Deleted(entity) if publish_deletes => {
                        self.emit_deleted(entity.id()).await
                    }
                    StoreEvent::Deleted(_) => Ok(()),
                };
                if let Err(e) = result {
                    warn!(topic = %self.topic, error = %e, "Emit failed");
                }
            }
            debug!(topic = %self.topic, "Emitter drained");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::LocalBus;
    use serde_json::Map;

    #[tokio::test]
    async fn forwards_commits_and_deletes_to_their_topics() {
        let bus = Arc::new(LocalBus::new());
        let mut changes = bus.subscribe("widget");
        let mut deletions = bus.subscribe("widget.deleted");
        let (tx, rx) = mpsc::unbounded_channel();
        let task = EventEmitter::new(bus.clone(), "widget").spawn(rx, true);

        let entity = Entity::new(EntityId::from(1), Map::new());
        tx.send(StoreEvent::Committed(entity.clone())).unwrap();
        tx.send(StoreEvent::Deleted(entity)).unwrap();
        drop(tx);
        task.await.unwrap();

        assert_eq!(changes.recv().await.unwrap(), json!({"id": "1"}));
        assert_eq!(deletions.recv().await.unwrap(), json!({"id": "1"}));
    }

    #[tokio::test]
    async fn deletes_are_dropped_when_disabled() {
        let bus = Arc::new(LocalBus::new());
        let mut deletions = bus.subscribe("widget.deleted");
        let (tx, rx) = mpsc::unbounded_channel();
        let task = EventEmitter::new(bus.clone(), "widget").spawn(rx, false);

        tx.send(StoreEvent::Deleted(Entity::new(EntityId::from(1), Map::new())))
            .unwrap();
        drop(tx);
        task.await.unwrap();
        assert!(deletions.try_recv().is_err());
    }
}
