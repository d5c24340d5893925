//! Typed clients that hide the request envelopes behind domain methods.

pub mod widget_client;

pub use widget_client::*;
