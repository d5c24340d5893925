//! # Widget
//!
//! The exported model. Widgets are validated strictly: every write must satisfy
//! [`widget_schema`], and the custom `paint` action carries its own schema.
//!
//! Custom actions:
//! - `paint` (instance): sets `color` and counts coats of paint
//! - `exists` (identifier, read-only): reports whether an identifier is taken
use resource_framework::{
    ActionContext, ActionDescriptor, ActionResult, BodySchema, Entity, EntityId, FrameworkError,
    ModelDescriptor, ValidationMode,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::info;

pub const WIDGET_MODEL: &str = "Widget";
pub const WIDGET_RESOURCE: &str = "widget";
pub const PAINT: &str = "paint";
pub const EXISTS: &str = "exists";

/// A widget as returned by the resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    pub id: String,
    pub color: String,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub coats: u32,
}

/// Body for creating or overwriting a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetCreate {
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl WidgetCreate {
    pub fn new(color: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            size: None,
            label: None,
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = Some(size);
        self
    }
}

// DTO for widget updates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

pub fn widget_schema() -> Value {
    json!({
        "type": "object",
        "required": ["color"],
        "properties": {
            "color": {"type": "string", "minLength": 1},
            "size": {"type": "integer", "minimum": 0},
            "label": {"type": "string"},
            "coats": {"type": "integer", "minimum": 0}
        }
    })
}

fn paint_schema() -> Value {
    json!({
        "type": "object",
        "required": ["color"],
        "properties": {"color": {"type": "string", "minLength": 1}},
        "additionalProperties": false
    })
}

/// The Widget export contract.
pub fn widget_model() -> Result<ModelDescriptor, FrameworkError> {
    let paint = ActionDescriptor::instance(PAINT, paint)
        .with_body_schema(BodySchema::compile(paint_schema())?);
    let exists = ActionDescriptor::identifier(EXISTS, exists).read_only();

    Ok(ModelDescriptor::new(WIDGET_MODEL)
        .exported()
        .with_display_name(WIDGET_RESOURCE)
        .with_body_schema(widget_schema())
        .with_validation_mode(ValidationMode::Strict)
        .with_action(paint)
        .with_action(exists))
}

async fn paint(ctx: ActionContext, widget: Entity, body: Option<Value>) -> ActionResult {
    let color = body
        .as_ref()
        .and_then(|b| b.get("color"))
        .cloned()
        .ok_or_else(|| FrameworkError::Validation("paint needs a color".to_string()))?;
    let coats = widget.get("coats").and_then(Value::as_u64).unwrap_or(0) + 1;

    let mut patch = Map::new();
    patch.insert("color".to_string(), color);
    patch.insert("coats".to_string(), coats.into());

    let painted = ctx
        .store()
        .update(widget.id(), patch)
        .await?
        .ok_or_else(|| FrameworkError::NotFound(widget.id().to_string()))?;
    info!(id = %painted.id(), coats, "Painted");
    Ok(painted.to_json())
}

async fn exists(ctx: ActionContext, id: Option<EntityId>, _body: Option<Value>) -> ActionResult {
    let exists = match id {
        Some(id) => ctx.store().find_by_id(&id).await?.is_some(),
        None => false,
    };
    Ok(json!({ "exists": exists }))
}
