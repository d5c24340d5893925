//! Model descriptors for the sample domain.

pub mod audit_log;
pub mod widget;

pub use audit_log::*;
pub use widget::*;
