//! # Resource Framework
//!
//! This crate exposes persistent models as remotely callable resources over an
//! asynchronous message bus. It implements a **Resource-Oriented Architecture (ROA)**:
//! every resource answers the same small vocabulary of verbs, plus whatever named custom
//! actions its model declares.
//!
//! | Verb     | Meaning |
//! |----------|---------|
//! | `GET`    | fetch one entity |
//! | `PUT`    | create, or overwrite by identifier |
//! | `PATCH`  | partial update |
//! | `DELETE` | idempotent delete |
//!
//! After every committed write, the serialized entity is published on a topic named
//! after the resource.
//!
//! ## Architecture Overview
//!
//! 1. **Model Layer** ([`ModelDescriptor`], [`ActionDescriptor`]) - what a model exports
//! 2. **Dispatch Layer** ([`ActionRegistry`], [`ValidationPolicy`], [`InstanceLoader`],
//!    [`Dispatcher`]) - how a request becomes a handler call
//! 3. **Binding Layer** ([`ResourceBinding`], [`EventEmitter`], [`expose`]) - wiring to the
//!    store hooks and the bus
//!
//! The storage engine ([`EntityStore`]) and the transport ([`MessageBus`]) are
//! collaborators behind traits. [`mock::MemoryStore`] and [`LocalBus`] implement them in
//! process.
//!
//! ## Example
//!
//! ```rust
//! use resource_framework::mock::MemoryStore;
//! use resource_framework::{
//!     BindOptions, LocalBus, ModelDescriptor, ResourceBinding, ResourceClient,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let bus = Arc::new(LocalBus::new());
//!     let store = Arc::new(MemoryStore::new());
//!     let model = ModelDescriptor::new("Widget").exported();
//!
//!     let binding =
//!         ResourceBinding::bind(&model, store, bus.clone(), BindOptions::named("widget")).unwrap();
//!     binding.start().await.unwrap();
//!
//!     let client = ResourceClient::new(bus.clone(), "widget");
//!     let created = client.put(None, json!({"color": "red"})).await.unwrap();
//!     assert_eq!(created, json!({"id": "1", "color": "red"}));
//!
//!     binding.stop().await;
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Each request is its own Tokio task; requests are neither ordered nor serialized
//! - The registry is immutable after bind and shared without locks
//! - Entities are reloaded for every request, never cached
//! - Change events are published strictly after the write commits

pub mod action;
pub mod binding;
pub mod bus;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod emitter;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod loader;
pub mod message;
pub mod mock;
pub mod registry;
pub mod store;
pub mod tracing;
pub mod validation;

// Re-export core types for convenience
pub use action::{ActionContext, ActionDescriptor, ActionHandler, ActionResult};
pub use action::{IdentifierAction, InstanceAction};
pub use binding::{expose, ExposedModel, ModelDescriptor, ResourceBinding};
pub use bus::{BusError, LocalBus, MessageBus};
pub use client::ResourceClient;
pub use config::{BindOptions, FrameworkConfig, ResourceOverrides};
pub use dispatch::{DispatchEndpoint, Dispatcher};
pub use emitter::EventEmitter;
pub use entity::{Draft, Entity, EntityId};
pub use error::{FaultKind, FrameworkError};
pub use loader::InstanceLoader;
pub use message::{InboundRequest, RequestEnvelope, ResponseEnvelope};
pub use registry::ActionRegistry;
pub use store::{EntityStore, HookId, HookSet, StoreError, StoreEvent, StoreHook};
pub use validation::{BodySchema, ValidationMode, ValidationPolicy};
