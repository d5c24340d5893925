//! # Message Bus Collaborator
//!
//! The transport is external. [`MessageBus`] is what the framework needs from it:
//! serving a request/response subject, sending a request, and publishing to a topic.
//!
//! [`LocalBus`] is an in-process implementation built from Tokio channels: `mpsc` for
//! the request queue of each subject, `oneshot` for each reply and `broadcast` for topics.

use crate::message::{InboundRequest, RequestEnvelope, ResponseEnvelope};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::debug;

/// Buffered messages per topic before slow subscribers start lagging.
const TOPIC_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("subject already served: {0}")]
    SubjectTaken(String),
    #[error("no endpoint serves subject: {0}")]
    NoResponder(String),
    #[error("endpoint for {0} closed")]
    Closed(String),
    #[error("endpoint for {0} dropped the reply")]
    NoReply(String),
    #[error("publish to {topic} failed: {reason}")]
    Publish { topic: String, reason: String },
}

#[async_trait]
pub trait MessageBus: Send + Sync + 'static {
    /// Starts receiving requests addressed to `subject`.
    async fn serve(
        &self,
        subject: &str,
        buffer: usize,
    ) -> Result<mpsc::Receiver<InboundRequest>, BusError>;

    /// Stops routing requests to `subject`. Unknown subjects are ignored.
    async fn unserve(&self, subject: &str);

    async fn request(
        &self,
        subject: &str,
        envelope: RequestEnvelope,
    ) -> Result<ResponseEnvelope, BusError>;

    /// Fire-and-forget publish; having no subscribers is not an error.
    async fn publish(&self, topic: &str, payload: Value) -> Result<(), BusError>;
}

#[derive(Default)]
pub struct LocalBus {
    state: Mutex<LocalBusState>,
}

#[derive(Default)]
struct LocalBusState {
    endpoints: HashMap<String, mpsc::Sender<InboundRequest>>,
    topics: HashMap<String, broadcast::Sender<Value>>,
}

impl LocalBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, topic: &str) -> broadcast::Receiver<Value> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state
            .topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CAPACITY).0)
            .subscribe()
    }

    pub fn is_served(&self, subject: &str) -> bool {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.endpoints.get(subject).is_some_and(|s| !s.is_closed())
    }
}

#[async_trait]
impl MessageBus for LocalBus {
    async fn serve(
        &self,
        subject: &str,
        buffer: usize,
    ) -> Result<mpsc::Receiver<InboundRequest>, BusError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.endpoints.get(subject).is_some_and(|s| !s.is_closed()) {
            return Err(BusError::SubjectTaken(subject.to_string()));
        }
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        state.endpoints.insert(subject.to_string(), sender);
        debug!(subject, "Serving");
        Ok(receiver)
    }

    async fn unserve(&self, subject: &str) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.endpoints.remove(subject).is_some() {
            debug!(subject, "Unserved");
        }
    }

    async fn request(
        &self,
        subject: &str,
        envelope: RequestEnvelope,
    ) -> Result<ResponseEnvelope, BusError> {
        let sender = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.endpoints.get(subject).cloned()
        }
        .ok_or_else(|| BusError::NoResponder(subject.to_string()))?;

        let (respond_to, response) = oneshot::channel();
        sender
            .send(InboundRequest {
                envelope,
                respond_to,
            })
            .await
            .map_err(|_| BusError::Closed(subject.to_string()))?;
        response
            .await
            .map_err(|_| BusError::NoReply(subject.to_string()))
    }

    async fn publish(&self, topic: &str, payload: Value) -> Result<(), BusError> {
        let sender = {
            let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.topics.get(topic).cloned()
        };
        if let Some(sender) = sender {
            // Err only means there are no live subscribers right now.
            let delivered = sender.send(payload).unwrap_or(0);
            debug!(topic, delivered, "Published");
        }
        Ok(())
    }
}
