#![doc(html_logo_url = "https://www.rust-lang.org/logos/rust-logo-128x128.png")]
#![doc(html_favicon_url = "https://www.rust-lang.org/favicon.ico")]
//! # Resource Recipe
//!
//! > **A Recipe for Resource-oriented Action Dispatch in Rust.**
//!
//! Persisted models are exposed as network resources: every exported model gets a named
//! request endpoint on a message bus, the default actions `GET`, `PUT`, `PATCH` and `DELETE`
//! next to its own custom actions, JSON Schema validation of incoming bodies, and a
//! change-event topic that mirrors every committed write.
//!
//! ## Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! Action descriptors, the registry, validation, the dispatcher, the bus abstraction and
//! [`ResourceBinding`](framework::ResourceBinding), which ties them to one model.
//!
//! ### 2. The Sample ([`sample`])
//! A `Widget` model with custom actions, a typed client and the
//! [`ResourceSystem`](sample::lifecycle::ResourceSystem) composition root.
//!
//! ## Quick Start
//!
//! ```rust
//! use resource_recipe::framework::FrameworkConfig;
//! use resource_recipe::sample::lifecycle::ResourceSystem;
//! use resource_recipe::sample::model::WidgetCreate;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let system = ResourceSystem::start(&FrameworkConfig::default()).await?;
//! let widget = system.widget_client.create(WidgetCreate::new("red")).await?;
//! assert_eq!(system.widget_client.get(&widget.id).await?.color, "red");
//! system.shutdown().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Observability
//!
//! Everything logs through `tracing`. Call
//! [`setup_tracing`](framework::tracing::setup_tracing) once at startup and pick the level
//! with `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run -p resource-sample
//! RUST_LOG=resource_framework=debug cargo run -p resource-sample
//! ```

pub use resource_framework as framework;
pub use resource_sample as sample;
