//! # Default Actions
//!
//! The four built-in verbs every exported resource gets unless default actions are
//! disabled:
//!
//! | Verb     | Handler shape | Outcome |
//! |----------|---------------|---------|
//! | `GET`    | instance      | the entity's serialized form |
//! | `PUT`    | identifier    | create-or-overwrite from a deep copy of the body |
//! | `PATCH`  | instance      | shallow merge of the body into the stored row |
//! | `DELETE` | identifier    | idempotent delete, fixed acknowledgement |
//!
//! `PATCH` and `DELETE` reject an absent identifier with `MethodNotAllowed`. "Not found"
//! is reserved for a well-formed identifier that matches nothing.

use crate::action::{ActionContext, ActionDescriptor, ActionHandler, ActionResult};
use crate::action::{IdentifierAction, InstanceAction};
use crate::entity::{body_object, Draft, Entity, EntityId};
use crate::error::FrameworkError;
use crate::validation::BodySchema;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

pub const FETCH: &str = "GET";
pub const REPLACE: &str = "PUT";
pub const UPDATE: &str = "PATCH";
pub const DELETE: &str = "DELETE";

/// Value returned by a successful delete, whether or not a row was removed.
pub const DELETE_ACK: Value = Value::Null;

/// Builds the four default descriptors.
///
/// `PUT` validates against `schema`; `PATCH` against its partial form.
pub fn default_actions(schema: Option<&BodySchema>) -> Result<Vec<ActionDescriptor>, FrameworkError> {
    let mut replace = ActionDescriptor::with_handler(REPLACE, ActionHandler::Identifier(Arc::new(Replace)));
    let mut update = ActionDescriptor::with_handler(UPDATE, ActionHandler::Instance(Arc::new(Update)))
        .require_identifier();
    if let Some(schema) = schema {
        replace = replace.with_body_schema(schema.clone());
        update = update.with_body_schema(schema.partial()?);
    }

    Ok(vec![
        ActionDescriptor::with_handler(FETCH, ActionHandler::Instance(Arc::new(Fetch)))
            .read_only()
            .without_body()
            .as_default(),
        replace.as_default(),
        update.as_default(),
        ActionDescriptor::with_handler(DELETE, ActionHandler::Identifier(Arc::new(Delete)))
            .without_body()
            .require_identifier()
            .as_default(),
    ])
}

struct Fetch;

#[async_trait]
impl InstanceAction for Fetch {
    async fn call(&self, _ctx: &ActionContext, entity: Entity, _body: Option<Value>) -> ActionResult {
        Ok(entity.to_json())
    }
}

struct Replace;

#[async_trait]
impl IdentifierAction for Replace {
    async fn call(
        &self,
        ctx: &ActionContext,
        id: Option<EntityId>,
        body: Option<Value>,
    ) -> ActionResult {
        let draft = Draft::from_body(id, body.as_ref())?;
        let saved = ctx.store().save(draft).await?;
        info!(resource = ctx.resource(), id = %saved.id(), "Saved");
        Ok(saved.to_json())
    }
}

struct Update;

#[async_trait]
impl InstanceAction for Update {
    async fn call(&self, ctx: &ActionContext, entity: Entity, body: Option<Value>) -> ActionResult {
        let patch = body_object(body.as_ref())?;
        debug!(resource = ctx.resource(), id = %entity.id(), fields = patch.len(), "Patch");
        match ctx.store().update(entity.id(), patch).await? {
            Some(updated) => {
                info!(resource = ctx.resource(), id = %updated.id(), "Updated");
                Ok(updated.to_json())
            }
            // Removed between preload and write.
            None => Err(FrameworkError::NotFound(entity.id().to_string())),
        }
    }
}

struct Delete;

#[async_trait]
impl IdentifierAction for Delete {
    async fn call(
        &self,
        ctx: &ActionContext,
        id: Option<EntityId>,
        _body: Option<Value>,
    ) -> ActionResult {
        let id = id.ok_or_else(|| {
            FrameworkError::MethodNotAllowed(format!("{DELETE} requires an identifier"))
        })?;
        let removed = ctx.store().destroy(&id).await?;
        info!(resource = ctx.resource(), %id, removed, "Deleted");
        Ok(DELETE_ACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn defaults_carry_the_documented_flags() {
        let schema = BodySchema::compile(json!({"type": "object", "required": ["color"]})).unwrap();
        let actions = default_actions(Some(&schema)).unwrap();
        let flags: Vec<_> = actions
            .iter()
            .map(|a| (a.name(), a.requires_preload(), a.is_mutating(), a.requires_identifier()))
            .collect();
        assert_eq!(
            flags,
            vec![
                (FETCH, true, false, false),
                (REPLACE, false, true, false),
                (UPDATE, true, true, true),
                (DELETE, false, true, true),
            ]
        );
        assert!(actions.iter().all(ActionDescriptor::is_default));
        assert_eq!(actions[1].body_schema().unwrap().raw(), schema.raw());
        assert!(actions[2].body_schema().unwrap().raw().get("required").is_none());
    }

    #[test]
    fn defaults_without_schema_have_none() {
        let actions = default_actions(None).unwrap();
        assert!(actions.iter().all(|a| a.body_schema().is_none()));
    }
}
