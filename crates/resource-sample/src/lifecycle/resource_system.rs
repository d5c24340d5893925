use crate::clients::WidgetClient;
use crate::model::{audit_log_model, widget_model, WIDGET_MODEL};
use resource_framework::mock::MemoryStore;
use resource_framework::{
    expose, ExposedModel, FrameworkConfig, FrameworkError, LocalBus, MessageBus, ResourceBinding,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::info;

/// The running sample system.
pub struct ResourceSystem {
    pub bus: Arc<LocalBus>,
    pub widget_client: WidgetClient,
    pub widget_store: Arc<MemoryStore>,
    bindings: Vec<ResourceBinding>,
}

impl ResourceSystem {
    pub async fn start(config: &FrameworkConfig) -> Result<Self, FrameworkError> {
        let bus = Arc::new(LocalBus::new());
        let widget_store = Arc::new(MemoryStore::new());
        let audit_store = Arc::new(MemoryStore::new());

        let models = vec![
            ExposedModel::new(widget_model()?, widget_store.clone()),
            ExposedModel::new(audit_log_model(), audit_store),
        ];
        let bindings = expose(models, bus.clone(), config).await?;

        let widget_resource = bindings
            .iter()
            .find(|b| b.model() == WIDGET_MODEL)
            .map(|b| b.name().to_string())
            .ok_or_else(|| FrameworkError::Configuration("widget resource not exposed".into()))?;
        let widget_client = WidgetClient::new(bus.clone() as Arc<dyn MessageBus>, widget_resource);

        info!(resources = bindings.len(), "Resource system started");
        Ok(Self {
            bus,
            widget_client,
            widget_store,
            bindings,
        })
    }

    /// Names of the resources currently served.
    pub fn resources(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.name()).collect()
    }

    /// Change events for widgets; deletions arrive on the `.deleted` topic.
    pub fn widget_events(&self) -> broadcast::Receiver<Value> {
        self.bus.subscribe(self.widget_client.resource())
    }

    pub fn widget_deletions(&self) -> broadcast::Receiver<Value> {
        self.bus
            .subscribe(&format!("{}.deleted", self.widget_client.resource()))
    }

    pub async fn shutdown(self) {
        info!("Shutting down resource system");
        for binding in &self.bindings {
            binding.stop().await;
        }
        info!("Resource system stopped");
    }
}
