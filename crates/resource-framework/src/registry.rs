//! # Action Registry
//!
//! Maps action names to [`ActionDescriptor`]s for one resource.
//!
//! The registry is built from two ordered sources, the built-in defaults and then the
//! model's custom actions, by set union where later entries replace earlier ones of the
//! same name. The merged table is validated against the [`ValidationPolicy`] before it is
//! handed out, and is read-only afterwards, so it is shared across concurrent requests
//! without locking.

use crate::action::ActionDescriptor;
use crate::error::FrameworkError;
use crate::handlers;
use crate::validation::{BodySchema, ValidationPolicy};
use std::collections::BTreeMap;
use tracing::debug;

#[derive(Debug)]
pub struct ActionRegistry {
    actions: BTreeMap<String, ActionDescriptor>,
    policy: ValidationPolicy,
}

impl ActionRegistry {
    /// Merges defaults (when enabled) with `custom` and checks the result.
    ///
    /// # Errors
    ///
    /// `Configuration` if a custom action has an empty name, if the default schema cannot
    /// be turned into its partial form, or if the policy rejects any merged entry.
    pub fn register(
        default_actions: bool,
        default_schema: Option<&BodySchema>,
        policy: ValidationPolicy,
        custom: Vec<ActionDescriptor>,
    ) -> Result<Self, FrameworkError> {
        let mut actions = BTreeMap::new();

        if default_actions {
            for action in handlers::default_actions(default_schema)? {
                actions.insert(action.name().to_string(), action);
            }
        }

        for action in custom {
            if action.name().trim().is_empty() {
                return Err(FrameworkError::Configuration(
                    "custom action name must not be empty".to_string(),
                ));
            }
            if let Some(replaced) = actions.insert(action.name().to_string(), action) {
                debug!(action = replaced.name(), default = replaced.is_default(), "Overridden");
            }
        }

        for action in actions.values() {
            policy.check_registration(action)?;
        }

        Ok(Self { actions, policy })
    }

    /// Looks up an action. An unknown name is a request-time `NotFound`.
    pub fn resolve(&self, name: &str) -> Result<&ActionDescriptor, FrameworkError> {
        self.actions
            .get(name)
            .ok_or_else(|| FrameworkError::NotFound(format!("unknown action `{name}`")))
    }

    /// Action names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn policy(&self) -> &ValidationPolicy {
        &self.policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::{DELETE, FETCH, REPLACE, UPDATE};
    use crate::validation::ValidationMode;
    use serde_json::{json, Value};

    fn noop(name: &str) -> ActionDescriptor {
        ActionDescriptor::identifier(name, |_ctx, _id, _body| async { Ok(Value::Null) })
    }

    fn permissive() -> ValidationPolicy {
        ValidationPolicy::new(ValidationMode::Permissive)
    }

    #[test]
    fn defaults_and_customs_merge_without_loss_or_duplicates() {
        let registry =
            ActionRegistry::register(true, None, permissive(), vec![noop("archive"), noop("PUT")])
                .unwrap();
        let names: Vec<_> = registry.names().collect();
        assert_eq!(names, vec![DELETE, FETCH, UPDATE, REPLACE, "archive"]);
        assert!(!registry.resolve(REPLACE).unwrap().is_default());
        assert!(registry.resolve(FETCH).unwrap().is_default());
    }

    #[test]
    fn later_custom_entry_wins() {
        let registry = ActionRegistry::register(
            false,
            None,
            permissive(),
            vec![noop("archive"), noop("archive").read_only()],
        )
        .unwrap();
        assert_eq!(registry.len(), 1);
        assert!(!registry.resolve("archive").unwrap().is_mutating());
    }

    #[test]
    fn disabled_defaults_leave_only_customs() {
        let registry = ActionRegistry::register(false, None, permissive(), vec![]).unwrap();
        assert!(registry.is_empty());
        let err = registry.resolve(FETCH).unwrap_err();
        assert!(matches!(err, FrameworkError::NotFound(_)));
    }

    #[test]
    fn strict_mode_without_default_schema_fails_construction() {
        let strict = ValidationPolicy::new(ValidationMode::Strict);
        let err = ActionRegistry::register(true, None, strict, vec![]).unwrap_err();
        assert!(matches!(err, FrameworkError::Configuration(_)));

        let schema = BodySchema::compile(json!({"type": "object"})).unwrap();
        let registry = ActionRegistry::register(true, Some(&schema), strict, vec![]).unwrap();
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn empty_custom_name_is_rejected() {
        let err = ActionRegistry::register(false, None, permissive(), vec![noop(" ")]).unwrap_err();
        assert!(matches!(err, FrameworkError::Configuration(_)));
    }
}
