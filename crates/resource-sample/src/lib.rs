//! # Resource Sample Library
//!
//! A small domain built on `resource_framework`, exposed for integration testing.
//!
//! - [`model`]: model descriptors ([`Widget`](model::Widget) is exported, the audit log is not)
//! - [`clients`]: [`WidgetClient`](clients::WidgetClient), a typed wrapper over the bus
//! - [`lifecycle`]: [`ResourceSystem`](lifecycle::ResourceSystem), the composition root

pub mod clients;
pub mod lifecycle;
pub mod model;
