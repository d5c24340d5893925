//! # Resource Binding
//!
//! A [`ResourceBinding`] exposes one model as a resource on the bus. It owns exactly one
//! [`ActionRegistry`], one [`InstanceLoader`] over the model's store collection and one
//! [`EventEmitter`] for the resource topic.
//!
//! ## Lifecycle
//!
//! 1. **Bind**: [`ResourceBinding::bind`] reads the [`ModelDescriptor`], merges the actions
//!    and compiles every schema. Configuration errors surface here, before anything runs.
//! 2. **Start**: [`ResourceBinding::start`] opens the dispatch endpoint and subscribes the
//!    emitter to the store's after-commit and after-delete hooks. Called once.
//! 3. **Stop**: [`ResourceBinding::stop`] removes the hooks, closes the endpoint and drains
//!    pending events. Idempotent; a stopped binding cannot be restarted.
//!
//! ## Composition
//!
//! There is no ambient model discovery. [`expose`] takes an explicit list of models and
//! returns the started bindings for those that opted in.

use crate::action::{ActionContext, ActionDescriptor};
use crate::bus::MessageBus;
use crate::config::{BindOptions, FrameworkConfig};
use crate::dispatch::{DispatchEndpoint, Dispatcher};
use crate::emitter::EventEmitter;
use crate::entity::Entity;
use crate::error::FrameworkError;
use crate::loader::InstanceLoader;
use crate::registry::ActionRegistry;
use crate::store::{EntityStore, HookId, StoreEvent, StoreHook};
use crate::validation::{BodySchema, ValidationMode, ValidationPolicy};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// The export contract a model offers to the framework.
#[derive(Clone, Debug)]
pub struct ModelDescriptor {
    name: String,
    export_resource: bool,
    display_name: Option<String>,
    custom_actions: Vec<ActionDescriptor>,
    body_schema: Option<Value>,
    validation_mode: ValidationMode,
}

impl ModelDescriptor {
    /// A model that is not exported until [`exported`](Self::exported) is called.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            export_resource: false,
            display_name: None,
            custom_actions: Vec::new(),
            body_schema: None,
            validation_mode: ValidationMode::default(),
        }
    }

    pub fn exported(mut self) -> Self {
        self.export_resource = true;
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_action(mut self, action: ActionDescriptor) -> Self {
        self.custom_actions.push(action);
        self
    }

    /// Schema for the default actions' bodies. Compiled at bind time.
    pub fn with_body_schema(mut self, schema: Value) -> Self {
        self.body_schema = Some(schema);
        self
    }

    pub fn with_validation_mode(mut self, mode: ValidationMode) -> Self {
        self.validation_mode = mode;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_exported(&self) -> bool {
        self.export_resource
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn custom_actions(&self) -> &[ActionDescriptor] {
        &self.custom_actions
    }

    pub fn body_schema(&self) -> Option<&Value> {
        self.body_schema.as_ref()
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }
}

enum BindingState {
    Bound,
    Running(Running),
    Stopped,
}

struct Running {
    endpoint: DispatchEndpoint,
    hooks: Vec<HookId>,
    emitter: JoinHandle<()>,
}

pub struct ResourceBinding {
    name: String,
    model: String,
    registry: Arc<ActionRegistry>,
    loader: InstanceLoader,
    context: ActionContext,
    store: Arc<dyn EntityStore>,
    bus: Arc<dyn MessageBus>,
    emitter: EventEmitter,
    options: BindOptions,
    state: Mutex<BindingState>,
}

impl ResourceBinding {
    /// Builds a binding without starting it.
    ///
    /// # Errors
    ///
    /// `Configuration` if the model is not exported, its schema does not compile, or the
    /// merged registry violates the model's validation mode.
    pub fn bind(
        model: &ModelDescriptor,
        store: Arc<dyn EntityStore>,
        bus: Arc<dyn MessageBus>,
        options: BindOptions,
    ) -> Result<Self, FrameworkError> {
        if !model.is_exported() {
            return Err(FrameworkError::Configuration(format!(
                "model `{}` is not exported",
                model.name()
            )));
        }

        let name = options
            .name
            .clone()
            .or_else(|| model.display_name().map(str::to_string))
            .unwrap_or_else(|| model.name().to_string());

        let schema = model.body_schema().cloned().map(BodySchema::compile).transpose()?;
        let policy = ValidationPolicy::new(model.validation_mode());
        let registry = ActionRegistry::register(
            options.default_actions,
            schema.as_ref(),
            policy,
            model.custom_actions().to_vec(),
        )
        .map_err(|e| match e {
            FrameworkError::Configuration(detail) => {
                FrameworkError::Configuration(format!("{name}: {detail}"))
            }
            other => other,
        })?;

        info!(
            resource = %name,
            model = model.name(),
            mode = ?policy.mode(),
            actions = registry.len(),
            "Bound"
        );

        Ok(Self {
            context: ActionContext::new(name.as_str(), store.clone()),
            loader: InstanceLoader::new(store.clone()),
            emitter: EventEmitter::new(bus.clone(), name.as_str()),
            registry: Arc::new(registry),
            model: model.name().to_string(),
            name,
            store,
            bus,
            options,
            state: Mutex::new(BindingState::Bound),
        })
    }

    /// Public resource name; also the subject served and the change-event topic.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn topic(&self) -> &str {
        self.emitter.topic()
    }

    pub async fn is_running(&self) -> bool {
        matches!(*self.state.lock().await, BindingState::Running(_))
    }

    /// Opens the endpoint and wires the store hooks to the emitter.
    pub async fn start(&self) -> Result<(), FrameworkError> {
        let mut state = self.state.lock().await;
        if !matches!(*state, BindingState::Bound) {
            return Err(FrameworkError::AlreadyStarted(self.name.clone()));
        }

        let dispatcher = Arc::new(Dispatcher::new(
            self.registry.clone(),
            self.loader.clone(),
            self.context.clone(),
        ));
        let endpoint = DispatchEndpoint::open(
            self.bus.as_ref(),
            &self.name,
            dispatcher,
            self.options.request_buffer,
        )
        .await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let hooks = vec![
            self.store.on_after_commit(forward(tx.clone(), StoreEvent::Committed)),
            self.store.on_after_delete(forward(tx, StoreEvent::Deleted)),
        ];
        let emitter = self.emitter.clone().spawn(rx, self.options.publish_deletes);

        *state = BindingState::Running(Running {
            endpoint,
            hooks,
            emitter,
        });
        info!(resource = %self.name, "Started");
        Ok(())
    }

    /// Closes the endpoint, waits for in-flight requests, then unsubscribes the hooks and
    /// waits for pending events to publish.
    ///
    /// Every write answered with a success before `stop` returns has had its event published.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        let previous = std::mem::replace(&mut *state, BindingState::Stopped);
        let BindingState::Running(running) = previous else {
            return;
        };

        running.endpoint.close(self.bus.as_ref()).await;
        for hook in running.hooks {
            if !self.store.remove_hook(hook) {
                warn!(resource = %self.name, ?hook, "Hook already removed");
            }
        }
        // Hook senders are gone, so the emitter ends once the queue is drained.
        if let Err(e) = running.emitter.await {
            warn!(resource = %self.name, error = %e, "Emitter task failed");
        }
        info!(resource = %self.name, "Stopped");
    }
}

fn forward(tx: mpsc::UnboundedSender<StoreEvent>, wrap: fn(Entity) -> StoreEvent) -> StoreHook {
    Arc::new(move |entity: &Entity| {
        // Closed only after stop(), when late events are intentionally discarded.
        let _ = tx.send(wrap(entity.clone()));
    })
}

/// One model and the store collection that holds its entities.
#[derive(Clone)]
pub struct ExposedModel {
    pub descriptor: ModelDescriptor,
    pub store: Arc<dyn EntityStore>,
}

impl ExposedModel {
    pub fn new(descriptor: ModelDescriptor, store: Arc<dyn EntityStore>) -> Self {
        Self { descriptor, store }
    }
}

/// Binds and starts one resource per exported model.
///
/// Models that did not opt in are skipped. All-or-nothing: if any model fails to bind or
/// start, the bindings already started are stopped and the error is returned.
pub async fn expose(
    models: Vec<ExposedModel>,
    bus: Arc<dyn MessageBus>,
    config: &FrameworkConfig,
) -> Result<Vec<ResourceBinding>, FrameworkError> {
    let mut started: Vec<ResourceBinding> = Vec::new();

    for model in models {
        if !model.descriptor.is_exported() {
            info!(model = model.descriptor.name(), "Skipped, not exported");
            continue;
        }
        let options = config.options_for(model.descriptor.name());
        let result = match ResourceBinding::bind(&model.descriptor, model.store, bus.clone(), options) {
            Ok(binding) => binding.start().await.map(|()| binding),
            Err(e) => Err(e),
        };
        match result {
            Ok(binding) => started.push(binding),
            Err(e) => {
                warn!(model = model.descriptor.name(), error = %e, "Expose failed, rolling back");
                for binding in &started {
                    binding.stop().await;
                }
                return Err(e);
            }
        }
    }

    Ok(started)
}
