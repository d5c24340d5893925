//! # Envelopes
//!
//! Wire shapes exchanged with the messaging collaborator. The transport encoding is the
//! bus's business; these types only fix the fields.
//!
//! ```json
//! {"actionName": "PATCH", "identifier": "7", "body": {"color": "blue"}}
//! {"status": "success", "value": {"id": "7", "color": "blue"}}
//! {"status": "fault", "kind": "NotFound", "detail": "7"}
//! ```

use crate::entity::EntityId;
use crate::error::{FaultKind, FrameworkError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::oneshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEnvelope {
    pub action_name: String,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
}

impl RequestEnvelope {
    pub fn new(action_name: impl Into<String>) -> Self {
        Self {
            action_name: action_name.into(),
            identifier: None,
            body: None,
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The normalised identifier; empty counts as absent.
    pub fn entity_id(&self) -> Option<EntityId> {
        EntityId::from_wire(self.identifier.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResponseEnvelope {
    Success { value: Value },
    Fault { kind: FaultKind, detail: String },
}

impl ResponseEnvelope {
    pub fn success(value: Value) -> Self {
        ResponseEnvelope::Success { value }
    }

    pub fn fault(kind: FaultKind, detail: impl Into<String>) -> Self {
        ResponseEnvelope::Fault {
            kind,
            detail: detail.into(),
        }
    }

    pub fn from_error(error: &FrameworkError) -> Self {
        Self::fault(error.kind(), error.detail())
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ResponseEnvelope::Success { .. })
    }

    pub fn fault_kind(&self) -> Option<FaultKind> {
        match self {
            ResponseEnvelope::Success { .. } => None,
            ResponseEnvelope::Fault { kind, .. } => Some(*kind),
        }
    }

    pub fn into_result(self) -> Result<Value, FrameworkError> {
        match self {
            ResponseEnvelope::Success { value } => Ok(value),
            ResponseEnvelope::Fault { kind, detail } => Err(FrameworkError::from_fault(kind, detail)),
        }
    }
}

/// One request taken off the bus, paired with the channel its response goes back on.
#[derive(Debug)]
pub struct InboundRequest {
    pub envelope: RequestEnvelope,
    pub respond_to: oneshot::Sender<ResponseEnvelope>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_envelope_accepts_null_fields() {
        let envelope: RequestEnvelope =
            serde_json::from_value(json!({"actionName": "PUT", "identifier": null, "body": null}))
                .unwrap();
        assert_eq!(envelope, RequestEnvelope::new("PUT"));
        let envelope: RequestEnvelope =
            serde_json::from_value(json!({"actionName": "GET", "identifier": ""})).unwrap();
        assert_eq!(envelope.entity_id(), None);
    }

    #[test]
    fn fault_envelope_wire_shape() {
        let envelope = ResponseEnvelope::from_error(&FrameworkError::MethodNotAllowed("no id".into()));
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"status": "fault", "kind": "MethodNotAllowed", "detail": "no id"})
        );
        assert!(matches!(
            envelope.into_result(),
            Err(FrameworkError::MethodNotAllowed(_))
        ));
    }
}
