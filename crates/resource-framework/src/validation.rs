//! # Validation Policy
//!
//! Decides whether a request body may reach an action handler.
//!
//! - [`ValidationMode::Permissive`]: every payload passes.
//! - [`ValidationMode::Strict`]: every mutating, body-carrying action must have a
//!   [`BodySchema`] when the registry is built (checked by
//!   [`ValidationPolicy::check_registration`]), and at request time its body must conform.
//!
//! Read-only actions (fetch, and custom actions declared read-only) are never validated.

use crate::action::ActionDescriptor;
use crate::error::FrameworkError;
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    #[default]
    Permissive,
    Strict,
}

/// A JSON Schema document compiled once at bind time.
#[derive(Clone)]
pub struct BodySchema {
    raw: Arc<Value>,
    compiled: Arc<JSONSchema>,
}

impl BodySchema {
    /// Compiles a schema document. A document that does not compile is a configuration error.
    pub fn compile(raw: Value) -> Result<Self, FrameworkError> {
        let compiled = JSONSchema::compile(&raw)
            .map_err(|e| FrameworkError::Configuration(format!("invalid body schema: {e}")))?;
        Ok(Self {
            raw: Arc::new(raw),
            compiled: Arc::new(compiled),
        })
    }

    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The same schema with its top-level `required` list removed.
    ///
    /// Used for partial updates: field constraints still apply, but no field is mandatory.
    pub fn partial(&self) -> Result<Self, FrameworkError> {
        let mut raw = (*self.raw).clone();
        if let Value::Object(map) = &mut raw {
            map.remove("required");
        }
        Self::compile(raw)
    }

    /// Checks `body`, reporting the first violation as `"<path>: <message>"`.
    pub fn check(&self, body: &Value) -> Result<(), String> {
        match self.compiled.validate(body) {
            Ok(()) => Ok(()),
            Err(mut errors) => Err(errors
                .next()
                .map(|error| {
                    let path = error.instance_path.to_string();
                    let path = if path.is_empty() { "body".to_string() } else { path };
                    format!("{path}: {error}")
                })
                .unwrap_or_else(|| "body does not match schema".to_string())),
        }
    }
}

impl Debug for BodySchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BodySchema").field(&self.raw).finish()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationPolicy {
    mode: ValidationMode,
}

impl ValidationPolicy {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Construction-time check, run against every entry of the merged registry.
    pub fn check_registration(&self, action: &ActionDescriptor) -> Result<(), FrameworkError> {
        if self.mode == ValidationMode::Strict
            && action.is_mutating()
            && action.takes_body()
            && action.body_schema().is_none()
        {
            return Err(FrameworkError::Configuration(format!(
                "strict validation requires a body schema for action `{}`",
                action.name()
            )));
        }
        Ok(())
    }

    /// Request-time check.
    pub fn validate(
        &self,
        action: &ActionDescriptor,
        body: Option<&Value>,
    ) -> Result<(), FrameworkError> {
        if self.mode == ValidationMode::Permissive || !action.is_mutating() || !action.takes_body()
        {
            return Ok(());
        }
        let Some(schema) = action.body_schema() else {
            return Ok(());
        };
        schema
            .check(body.unwrap_or(&Value::Null))
            .map_err(FrameworkError::Validation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionDescriptor;
    use serde_json::json;

    fn widget_schema() -> BodySchema {
        BodySchema::compile(json!({
            "type": "object",
            "required": ["color"],
            "properties": {
                "color": {"type": "string"},
                "size": {"type": "integer", "minimum": 0}
            }
        }))
        .unwrap()
    }

    fn echo(name: &str) -> ActionDescriptor {
        ActionDescriptor::identifier(name, |_ctx, _id, body| async move {
            Ok(body.unwrap_or(Value::Null))
        })
    }

    #[test]
    fn invalid_schema_is_a_configuration_error() {
        let err = BodySchema::compile(json!({"type": 12})).unwrap_err();
        assert!(matches!(err, FrameworkError::Configuration(_)));
    }

    #[test]
    fn check_reports_first_violation_with_path() {
        let schema = widget_schema();
        assert!(schema.check(&json!({"color": "red"})).is_ok());
        let detail = schema.check(&json!({"color": 5})).unwrap_err();
        assert!(detail.starts_with("/color"), "{detail}");
        let detail = schema.check(&json!({})).unwrap_err();
        assert!(detail.starts_with("body"), "{detail}");
    }

    #[test]
    fn partial_schema_drops_required_but_keeps_types() {
        let partial = widget_schema().partial().unwrap();
        assert!(partial.check(&json!({"size": 2})).is_ok());
        assert!(partial.check(&json!({"size": -1})).is_err());
    }

    #[test]
    fn strict_registration_needs_schema_on_mutating_body_actions() {
        let strict = ValidationPolicy::new(ValidationMode::Strict);
        assert!(strict.check_registration(&echo("touch")).is_err());
        assert!(strict.check_registration(&echo("peek").read_only()).is_ok());
        assert!(strict.check_registration(&echo("poke").without_body()).is_ok());
        assert!(strict
            .check_registration(&echo("touch").with_body_schema(widget_schema()))
            .is_ok());
        let permissive = ValidationPolicy::new(ValidationMode::Permissive);
        assert!(permissive.check_registration(&echo("touch")).is_ok());
    }

    #[test]
    fn permissive_mode_accepts_every_payload() {
        let action = echo("touch").with_body_schema(widget_schema());
        let permissive = ValidationPolicy::new(ValidationMode::Permissive);
        assert!(permissive.validate(&action, Some(&json!(42))).is_ok());

        let strict = ValidationPolicy::new(ValidationMode::Strict);
        let err = strict.validate(&action, Some(&json!(42))).unwrap_err();
        assert!(matches!(err, FrameworkError::Validation(_)));
        assert!(strict.validate(&action.read_only(), Some(&json!(42))).is_ok());
    }

    #[test]
    fn mode_deserializes_from_lowercase() {
        let mode: ValidationMode = serde_json::from_value(json!("strict")).unwrap();
        assert_eq!(mode, ValidationMode::Strict);
    }
}
