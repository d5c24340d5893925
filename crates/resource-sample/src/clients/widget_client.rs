//! # Widget Client
//!
//! Wraps a [`ResourceClient`] bound to the `widget` subject and exposes domain methods
//! that speak [`Widget`] instead of raw JSON.
use crate::model::{Widget, WidgetCreate, WidgetUpdate, EXISTS, PAINT};
use resource_framework::{FaultKind, FrameworkError, MessageBus, ResourceClient};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Error, Debug)]
pub enum WidgetError {
    #[error("Widget not found: {0}")]
    NotFound(String),

    #[error("Widget rejected: {0}")]
    Rejected(String),

    #[error("Widget service error: {0}")]
    Remote(FrameworkError),

    #[error("Malformed widget payload: {0}")]
    Decode(#[from] serde_json::Error),
}

impl From<FrameworkError> for WidgetError {
    fn from(e: FrameworkError) -> Self {
        match e.kind() {
            FaultKind::NotFound => WidgetError::NotFound(e.detail()),
            FaultKind::ValidationError | FaultKind::MethodNotAllowed => {
                WidgetError::Rejected(e.detail())
            }
            FaultKind::ServerError => WidgetError::Remote(e),
        }
    }
}

/// Client for the widget resource.
#[derive(Clone)]
pub struct WidgetClient {
    inner: ResourceClient,
}

impl WidgetClient {
    pub fn new(bus: Arc<dyn MessageBus>, resource: impl Into<String>) -> Self {
        Self {
            inner: ResourceClient::new(bus, resource),
        }
    }

    pub fn resource(&self) -> &str {
        self.inner.resource()
    }

    #[instrument(skip(self))]
    pub async fn create(&self, params: WidgetCreate) -> Result<Widget, WidgetError> {
        debug!("Sending request");
        let value = self.inner.put(None, serde_json::to_value(params)?).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Creates the widget under `id`, or overwrites it wholesale.
    #[instrument(skip(self))]
    pub async fn replace(&self, id: &str, params: WidgetCreate) -> Result<Widget, WidgetError> {
        debug!("Sending request");
        let value = self.inner.put(Some(id), serde_json::to_value(params)?).await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Widget, WidgetError> {
        debug!("Sending request");
        Ok(serde_json::from_value(self.inner.get(id).await?)?)
    }

    #[instrument(skip(self))]
    pub async fn update(&self, id: &str, update: WidgetUpdate) -> Result<Widget, WidgetError> {
        debug!("Sending request");
        let value = self.inner.patch(Some(id), serde_json::to_value(update)?).await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), WidgetError> {
        debug!("Sending request");
        self.inner.delete(Some(id)).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn paint(&self, id: &str, color: &str) -> Result<Widget, WidgetError> {
        debug!("Sending request");
        let value = self
            .inner
            .call(PAINT, Some(id), Some(json!({ "color": color })))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: &str) -> Result<bool, WidgetError> {
        let value = self.inner.call(EXISTS, Some(id), None).await?;
        let reply: ExistsReply = serde_json::from_value(value)?;
        Ok(reply.exists)
    }
}

#[derive(Deserialize)]
struct ExistsReply {
    exists: bool,
}
