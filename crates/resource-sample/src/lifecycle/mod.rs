//! # System Lifecycle
//!
//! Builds the sample system: one in-process bus, one store per model, and the resources
//! exposed on top of them. [`ResourceSystem::start`] is the composition root and
//! [`ResourceSystem::shutdown`] stops every resource before returning.
//!
//! Per-resource settings come from a [`FrameworkConfig`](resource_framework::FrameworkConfig),
//! for example:
//!
//! ```json
//! {
//!   "defaults": { "requestBuffer": 64 },
//!   "resources": { "Widget": { "name": "gizmo" } }
//! }
//! ```
//!
//! Logging is set up separately through [`setup_tracing`](resource_framework::tracing::setup_tracing).

pub mod resource_system;

pub use resource_system::*;
