//! # Entities
//!
//! The store collaborator owns entity state; the dispatcher only ever sees snapshots.
//! An [`Entity`] is one persisted row (an identifier plus its top-level attributes) and a
//! [`Draft`] is what the replace action hands to the store to create or overwrite a row.
//!
//! Entities are never cached across requests. Every request that needs one reloads it
//! through the [`InstanceLoader`](crate::loader::InstanceLoader).

use crate::error::FrameworkError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;

/// Name of the attribute that carries the identifier in serialized entities.
pub const ID_FIELD: &str = "id";

/// Opaque identifier of a stored entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Normalises an identifier taken off the wire.
    ///
    /// An empty or whitespace-only identifier is treated exactly like an absent one.
    pub fn from_wire(raw: Option<&str>) -> Option<Self> {
        raw.map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Self::new)
    }

    /// Reads an identifier out of a JSON value. Strings and integers are accepted.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Self::from_wire(Some(s)),
            Value::Number(n) if n.is_u64() || n.is_i64() => Some(Self(n.to_string())),
            _ => None,
        }
    }
}

impl From<u32> for EntityId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A persisted entity snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    id: EntityId,
    attributes: Map<String, Value>,
}

impl Entity {
    /// Builds an entity. An `id` key inside `attributes` is dropped; the identifier
    /// always comes from `id`.
    pub fn new(id: EntityId, mut attributes: Map<String, Value>) -> Self {
        attributes.remove(ID_FIELD);
        Self { id, attributes }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        if field == ID_FIELD {
            return None;
        }
        self.attributes.get(field)
    }

    /// Shallow merge of top-level fields. The identifier cannot be patched.
    pub fn merge(&mut self, patch: Map<String, Value>) {
        for (key, value) in patch {
            if key != ID_FIELD {
                self.attributes.insert(key, value);
            }
        }
    }

    /// The serialized form: every attribute plus `"id"`.
    ///
    /// This is the value returned by fetch and the payload of change events.
    pub fn to_json(&self) -> Value {
        let mut object = self.attributes.clone();
        object.insert(ID_FIELD.to_string(), Value::String(self.id.0.clone()));
        Value::Object(object)
    }
}

/// Attributes to be written by a create-or-save.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Draft {
    pub id: Option<EntityId>,
    pub attributes: Map<String, Value>,
}

impl Draft {
    /// Builds a draft from a deep copy of a request body.
    ///
    /// A present `id` wins over any `"id"` key in the body. A null or absent body yields
    /// an empty draft; any other non-object body is rejected.
    pub fn from_body(id: Option<EntityId>, body: Option<&Value>) -> Result<Self, FrameworkError> {
        let mut attributes = body_object(body)?;
        let body_id = attributes.remove(ID_FIELD).and_then(|v| EntityId::from_value(&v));
        Ok(Self {
            id: id.or(body_id),
            attributes,
        })
    }
}

/// Copies a request body into an attribute map.
pub(crate) fn body_object(body: Option<&Value>) -> Result<Map<String, Value>, FrameworkError> {
    match body {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(FrameworkError::Validation(format!(
            "request body must be a JSON object, got {}",
            json_type_name(other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
