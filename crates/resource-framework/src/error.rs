//! # Framework Errors
//!
//! This module defines the error taxonomy shared by the dispatcher, its collaborators and
//! the clients. Every request-time error maps onto one wire-level [`FaultKind`], so a
//! caller can tell "nothing to retry" apart from "transient, retry may help".

use crate::bus::BusError;
use crate::store::StoreError;
use serde::{Deserialize, Serialize};

/// Machine-readable fault class carried in a fault response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FaultKind {
    NotFound,
    MethodNotAllowed,
    ValidationError,
    ServerError,
}

impl FaultKind {
    /// Only server errors may succeed when retried unchanged.
    pub fn is_retryable(self) -> bool {
        matches!(self, FaultKind::ServerError)
    }
}

/// Errors that can occur within the resource framework.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
    #[error("Bus error: {0}")]
    Bus(#[from] BusError),
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Server error: {0}")]
    Server(String),
    #[error("Resource already started: {0}")]
    AlreadyStarted(String),
}

impl FrameworkError {
    /// The fault kind reported to remote callers.
    pub fn kind(&self) -> FaultKind {
        match self {
            FrameworkError::NotFound(_) => FaultKind::NotFound,
            FrameworkError::MethodNotAllowed(_) => FaultKind::MethodNotAllowed,
            FrameworkError::Validation(_) => FaultKind::ValidationError,
            _ => FaultKind::ServerError,
        }
    }

    /// Rebuilds an error from a fault received over the bus.
    pub fn from_fault(kind: FaultKind, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        match kind {
            FaultKind::NotFound => FrameworkError::NotFound(detail),
            FaultKind::MethodNotAllowed => FrameworkError::MethodNotAllowed(detail),
            FaultKind::ValidationError => FrameworkError::Validation(detail),
            FaultKind::ServerError => FrameworkError::Server(detail),
        }
    }

    /// The human-readable part of a fault, without the kind prefix.
    pub fn detail(&self) -> String {
        match self {
            FrameworkError::NotFound(detail)
            | FrameworkError::MethodNotAllowed(detail)
            | FrameworkError::Validation(detail)
            | FrameworkError::Server(detail) => detail.clone(),
            other => other.to_string(),
        }
    }

    /// Wraps an arbitrary error raised by a custom action handler.
    pub fn entity(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        FrameworkError::EntityError(Box::new(error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_server_errors_are_retryable() {
        let cases = [
            (FrameworkError::NotFound("x".into()), false),
            (FrameworkError::MethodNotAllowed("x".into()), false),
            (FrameworkError::Validation("x".into()), false),
            (FrameworkError::Configuration("x".into()), true),
            (StoreError::Unavailable("down".into()).into(), true),
        ];
        for (error, retryable) in cases {
            assert_eq!(error.kind().is_retryable(), retryable, "{error}");
        }
    }

    #[test]
    fn fault_round_trips_to_the_same_kind() {
        for kind in [
            FaultKind::NotFound,
            FaultKind::MethodNotAllowed,
            FaultKind::ValidationError,
            FaultKind::ServerError,
        ] {
            assert_eq!(FrameworkError::from_fault(kind, "detail").kind(), kind);
        }
    }
}
