//! # Resource Client
//!
//! A typed client for calling one resource over a [`MessageBus`]. It builds the request
//! envelope, sends it and turns a fault response back into a [`FrameworkError`] of the
//! matching kind.

use crate::bus::MessageBus;
use crate::error::FrameworkError;
use crate::handlers::{DELETE, FETCH, REPLACE, UPDATE};
use crate::message::RequestEnvelope;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Cloneable handle for one resource subject.
#[derive(Clone)]
pub struct ResourceClient {
    bus: Arc<dyn MessageBus>,
    resource: String,
}

impl ResourceClient {
    pub fn new(bus: Arc<dyn MessageBus>, resource: impl Into<String>) -> Self {
        Self {
            bus,
            resource: resource.into(),
        }
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub async fn get(&self, id: &str) -> Result<Value, FrameworkError> {
        self.call(FETCH, Some(id), None).await
    }

    /// Create (no identifier) or overwrite (identifier given).
    pub async fn put(&self, id: Option<&str>, body: Value) -> Result<Value, FrameworkError> {
        self.call(REPLACE, id, Some(body)).await
    }

    pub async fn patch(&self, id: Option<&str>, body: Value) -> Result<Value, FrameworkError> {
        self.call(UPDATE, id, Some(body)).await
    }

    pub async fn delete(&self, id: Option<&str>) -> Result<Value, FrameworkError> {
        self.call(DELETE, id, None).await
    }

    /// Invokes any action, default or custom.
    pub async fn call(
        &self,
        action: &str,
        id: Option<&str>,
        body: Option<Value>,
    ) -> Result<Value, FrameworkError> {
        let envelope = RequestEnvelope {
            action_name: action.to_string(),
            identifier: id.map(str::to_string),
            body,
        };
        debug!(resource = %self.resource, action, ?id, "Sending request");
        self.bus
            .request(&self.resource, envelope)
            .await?
            .into_result()
    }
}
