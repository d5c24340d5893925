//! # Action Descriptors
//!
//! An [`ActionDescriptor`] is the immutable description of one callable operation on a
//! resource: its name, its handler, whether it mutates, whether it takes a body, and the
//! schema that body must satisfy.
//!
//! ## Handler shapes
//!
//! Whether the dispatcher preloads the target entity is decided by the handler variant,
//! never by a separate flag a handler could disagree with:
//!
//! - [`ActionHandler::Instance`] handlers receive the loaded [`Entity`]. The dispatcher
//!   resolves the identifier through the
//!   [`InstanceLoader`](crate::loader::InstanceLoader) first.
//! - [`ActionHandler::Identifier`] handlers receive the raw (possibly absent) identifier.
//!   Collection-level actions are written this way.
//!
//! ```rust
//! use resource_framework::{ActionDescriptor, FrameworkError};
//! use serde_json::json;
//!
//! let touch = ActionDescriptor::instance("touch", |ctx, entity, _body| async move {
//!     let patch = json!({"touched": true}).as_object().cloned().unwrap_or_default();
//!     let updated = ctx
//!         .store()
//!         .update(entity.id(), patch)
//!         .await?
//!         .ok_or_else(|| FrameworkError::NotFound(entity.id().to_string()))?;
//!     Ok(updated.to_json())
//! })
//! .without_body();
//! assert!(touch.requires_preload());
//! ```

use crate::entity::{Entity, EntityId};
use crate::error::FrameworkError;
use crate::store::EntityStore;
use crate::validation::BodySchema;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;

/// Result type of every action handler.
pub type ActionResult = Result<Value, FrameworkError>;

/// Dependencies handed to every handler invocation.
#[derive(Clone)]
pub struct ActionContext {
    resource: Arc<str>,
    store: Arc<dyn EntityStore>,
}

impl ActionContext {
    pub fn new(resource: impl Into<Arc<str>>, store: Arc<dyn EntityStore>) -> Self {
        Self {
            resource: resource.into(),
            store,
        }
    }

    /// Public name of the resource the action runs against.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn store(&self) -> &dyn EntityStore {
        self.store.as_ref()
    }
}

/// Handler invoked with the raw identifier.
#[async_trait]
pub trait IdentifierAction: Send + Sync {
    async fn call(&self, ctx: &ActionContext, id: Option<EntityId>, body: Option<Value>)
        -> ActionResult;
}

/// Handler invoked with the preloaded entity.
#[async_trait]
pub trait InstanceAction: Send + Sync {
    async fn call(&self, ctx: &ActionContext, entity: Entity, body: Option<Value>) -> ActionResult;
}

struct IdentifierFn<F>(F);

#[async_trait]
impl<F, Fut> IdentifierAction for IdentifierFn<F>
where
    F: Fn(ActionContext, Option<EntityId>, Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = ActionResult> + Send,
{
    async fn call(
        &self,
        ctx: &ActionContext,
        id: Option<EntityId>,
        body: Option<Value>,
    ) -> ActionResult {
        (self.0)(ctx.clone(), id, body).await
    }
}

struct InstanceFn<F>(F);

#[async_trait]
impl<F, Fut> InstanceAction for InstanceFn<F>
where
    F: Fn(ActionContext, Entity, Option<Value>) -> Fut + Send + Sync,
    Fut: Future<Output = ActionResult> + Send,
{
    async fn call(&self, ctx: &ActionContext, entity: Entity, body: Option<Value>) -> ActionResult {
        (self.0)(ctx.clone(), entity, body).await
    }
}

#[derive(Clone)]
pub enum ActionHandler {
    Identifier(Arc<dyn IdentifierAction>),
    Instance(Arc<dyn InstanceAction>),
}

impl ActionHandler {
    pub fn requires_preload(&self) -> bool {
        matches!(self, ActionHandler::Instance(_))
    }
}

impl Debug for ActionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionHandler::Identifier(_) => f.write_str("Identifier(..)"),
            ActionHandler::Instance(_) => f.write_str("Instance(..)"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ActionDescriptor {
    name: String,
    handler: ActionHandler,
    body_schema: Option<BodySchema>,
    mutating: bool,
    takes_body: bool,
    requires_identifier: bool,
    default_action: bool,
}

impl ActionDescriptor {
    /// A custom action whose handler receives the preloaded entity.
    pub fn instance<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ActionContext, Entity, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::with_handler(name, ActionHandler::Instance(Arc::new(InstanceFn(handler))))
    }

    /// A custom action whose handler receives the identifier as sent, without preload.
    pub fn identifier<F, Fut>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(ActionContext, Option<EntityId>, Option<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ActionResult> + Send + 'static,
    {
        Self::with_handler(name, ActionHandler::Identifier(Arc::new(IdentifierFn(handler))))
    }

    /// Custom actions are mutating and body-carrying until declared otherwise.
    pub fn with_handler(name: impl Into<String>, handler: ActionHandler) -> Self {
        Self {
            name: name.into(),
            handler,
            body_schema: None,
            mutating: true,
            takes_body: true,
            requires_identifier: false,
            default_action: false,
        }
    }

    pub fn with_body_schema(mut self, schema: BodySchema) -> Self {
        self.body_schema = Some(schema);
        self
    }

    /// Marks the action as non-mutating; its body is never validated.
    pub fn read_only(mut self) -> Self {
        self.mutating = false;
        self
    }

    /// Marks the action as ignoring its body; no schema is needed even in strict mode.
    pub fn without_body(mut self) -> Self {
        self.takes_body = false;
        self
    }

    /// An absent identifier is rejected with `MethodNotAllowed` before anything else runs.
    pub fn require_identifier(mut self) -> Self {
        self.requires_identifier = true;
        self
    }

    pub(crate) fn as_default(mut self) -> Self {
        self.default_action = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> &ActionHandler {
        &self.handler
    }

    pub fn body_schema(&self) -> Option<&BodySchema> {
        self.body_schema.as_ref()
    }

    pub fn requires_preload(&self) -> bool {
        self.handler.requires_preload()
    }

    pub fn is_mutating(&self) -> bool {
        self.mutating
    }

    pub fn takes_body(&self) -> bool {
        self.takes_body
    }

    pub fn requires_identifier(&self) -> bool {
        self.requires_identifier
    }

    /// True for the built-in GET/PUT/PATCH/DELETE entries.
    pub fn is_default(&self) -> bool {
        self.default_action
    }
}
