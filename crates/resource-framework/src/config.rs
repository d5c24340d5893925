//! # Configuration
//!
//! Binding options are plain serde structs, so they can come from code or from a JSON
//! document:
//!
//! ```json
//! {
//!   "defaults": { "publishDeletes": false },
//!   "resources": {
//!     "Widget": { "name": "widget", "requestBuffer": 64 }
//!   }
//! }
//! ```
//!
//! A per-model entry only overrides the fields it sets; everything else comes from
//! `defaults`. Names are per model, so `defaults.name` is rejected at load time.

use crate::error::FrameworkError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_REQUEST_BUFFER: usize = 32;

/// Options for binding one model.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct BindOptions {
    /// Public resource name; overrides the model's display name.
    pub name: Option<String>,
    /// Register the built-in GET/PUT/PATCH/DELETE actions.
    pub default_actions: bool,
    /// Publish `<resource>.deleted` events after deletes.
    pub publish_deletes: bool,
    /// Capacity of the endpoint's inbound request queue.
    pub request_buffer: usize,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            name: None,
            default_actions: true,
            publish_deletes: true,
            request_buffer: DEFAULT_REQUEST_BUFFER,
        }
    }
}

impl BindOptions {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Fields a per-model entry may override.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ResourceOverrides {
    pub name: Option<String>,
    pub default_actions: Option<bool>,
    pub publish_deletes: Option<bool>,
    pub request_buffer: Option<usize>,
}

impl ResourceOverrides {
    pub fn apply(&self, base: BindOptions) -> BindOptions {
        BindOptions {
            name: self.name.clone().or(base.name),
            default_actions: self.default_actions.unwrap_or(base.default_actions),
            publish_deletes: self.publish_deletes.unwrap_or(base.publish_deletes),
            request_buffer: self.request_buffer.unwrap_or(base.request_buffer),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FrameworkConfig {
    pub defaults: BindOptions,
    /// Keyed by model name.
    pub resources: HashMap<String, ResourceOverrides>,
}

impl FrameworkConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, FrameworkError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| FrameworkError::Configuration(format!("invalid framework config: {e}")))?;
        if let Some(name) = &config.defaults.name {
            return Err(FrameworkError::Configuration(format!(
                "`defaults.name` ({name}) would give every resource the same subject"
            )));
        }
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, FrameworkError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            FrameworkError::Configuration(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    pub fn options_for(&self, model: &str) -> BindOptions {
        match self.resources.get(model) {
            Some(overrides) => overrides.apply(self.defaults.clone()),
            None => self.defaults.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_contract() {
        let options = BindOptions::default();
        assert_eq!(options.name, None);
        assert!(options.default_actions);
        assert!(options.publish_deletes);
        assert_eq!(options.request_buffer, 32);
    }

    #[test]
    fn per_model_entry_merges_over_defaults() {
        let config = FrameworkConfig::from_json_str(
            r#"{
                "defaults": {"publishDeletes": false, "requestBuffer": 8},
                "resources": {"Widget": {"name": "widget", "requestBuffer": 64}}
            }"#,
        )
        .unwrap();
        let widget = config.options_for("Widget");
        assert_eq!(widget.name.as_deref(), Some("widget"));
        assert_eq!(widget.request_buffer, 64);
        assert!(!widget.publish_deletes);
        assert!(widget.default_actions);

        let gadget = config.options_for("Gadget");
        assert_eq!(gadget.name, None);
        assert_eq!(gadget.request_buffer, 8);
        assert!(!gadget.publish_deletes);
    }

    #[test]
    fn shared_default_name_is_rejected() {
        let err = FrameworkConfig::from_json_str(r#"{"defaults": {"name": "widget"}}"#).unwrap_err();
        assert!(matches!(err, FrameworkError::Configuration(detail) if detail.contains("defaults.name")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = FrameworkConfig::from_json_str(r#"{"defaults": {"nmae": "x"}}"#).unwrap_err();
        assert!(matches!(err, FrameworkError::Configuration(_)));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = FrameworkConfig::load("/nonexistent/resource-framework.json").unwrap_err();
        assert!(matches!(err, FrameworkError::Configuration(_)));
    }
}
