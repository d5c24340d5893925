//! # Dispatch
//!
//! [`Dispatcher`] runs the request algorithm for one resource:
//!
//! 1. Resolve the action in the [`ActionRegistry`]; unknown names are `NotFound`.
//! 2. Reject an absent identifier with `MethodNotAllowed` if the action needs one.
//! 3. Validate the body against the [`ValidationPolicy`](crate::validation::ValidationPolicy).
//! 4. For instance actions, load the target through the [`InstanceLoader`].
//! 5. Invoke the handler and map its outcome to a [`ResponseEnvelope`].
//!
//! A failing step stops the request; the handler never runs after a validation or load
//! failure, so malformed payloads never reach the store.
//!
//! [`DispatchEndpoint`] is the serving loop. Every inbound request is handled in its own
//! Tokio task with no ordering or mutual exclusion between requests; same-row concurrency
//! is the store's concern. A panicking handler only fails its own request, with a
//! `ServerError` fault.

use crate::action::{ActionContext, ActionHandler, ActionResult};
use crate::bus::MessageBus;
use crate::error::{FaultKind, FrameworkError};
use crate::loader::InstanceLoader;
use crate::message::{InboundRequest, RequestEnvelope, ResponseEnvelope};
use crate::registry::ActionRegistry;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, info_span, warn, Instrument};

pub struct Dispatcher {
    registry: Arc<ActionRegistry>,
    loader: InstanceLoader,
    context: ActionContext,
}

impl Dispatcher {
    pub fn new(registry: Arc<ActionRegistry>, loader: InstanceLoader, context: ActionContext) -> Self {
        Self {
            registry,
            loader,
            context,
        }
    }

    pub fn resource(&self) -> &str {
        self.context.resource()
    }

    /// Runs one request and returns the handler's value or the first failure.
    pub async fn execute(&self, request: RequestEnvelope) -> ActionResult {
        let action = self.registry.resolve(&request.action_name)?;
        let id = request.entity_id();

        if action.requires_identifier() && id.is_none() {
            return Err(FrameworkError::MethodNotAllowed(format!(
                "{} requires an identifier",
                action.name()
            )));
        }

        self.registry
            .policy()
            .validate(action, request.body.as_ref())?;

        match action.handler() {
            ActionHandler::Instance(handler) => {
                let entity = self.loader.load(id.as_ref()).await?;
                handler.call(&self.context, entity, request.body).await
            }
            ActionHandler::Identifier(handler) => {
                handler.call(&self.context, id, request.body).await
            }
        }
    }

    /// Runs one request and maps the outcome to a response envelope.
    pub async fn dispatch(&self, request: RequestEnvelope) -> ResponseEnvelope {
        let action = request.action_name.clone();
        match self.execute(request).await {
            Ok(value) => {
                debug!(resource = self.resource(), %action, "Dispatch ok");
                ResponseEnvelope::success(value)
            }
            Err(e) => {
                warn!(resource = self.resource(), %action, kind = ?e.kind(), error = %e, "Dispatch failed");
                ResponseEnvelope::from_error(&e)
            }
        }
    }
}

/// A running serving loop for one subject.
pub struct DispatchEndpoint {
    subject: String,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl DispatchEndpoint {
    /// Starts serving `subject` on `bus`.
    pub async fn open(
        bus: &dyn MessageBus,
        subject: &str,
        dispatcher: Arc<Dispatcher>,
        buffer: usize,
    ) -> Result<Self, FrameworkError> {
        let requests = bus.serve(subject, buffer).await?;
        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(serve(requests, shutdown_rx, dispatcher));
        info!(subject, "Endpoint open");
        Ok(Self {
            subject: subject.to_string(),
            shutdown,
            handle,
        })
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Stops accepting requests and waits until every request already taken off the queue
    /// has been answered.
    pub async fn close(self, bus: &dyn MessageBus) {
        bus.unserve(&self.subject).await;
        let _ = self.shutdown.send(());
        if let Err(e) = self.handle.await {
            error!(subject = %self.subject, error = %e, "Endpoint task failed");
        }
        info!(subject = %self.subject, "Endpoint closed");
    }
}

async fn serve(
    mut requests: mpsc::Receiver<InboundRequest>,
    mut shutdown: oneshot::Receiver<()>,
    dispatcher: Arc<Dispatcher>,
) {
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            next = requests.recv() => match next {
                Some(request) => {
                    in_flight.spawn(respond(dispatcher.clone(), request));
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    if !in_flight.is_empty() {
        debug!(resource = dispatcher.resource(), pending = in_flight.len(), "Draining requests");
    }
    while in_flight.join_next().await.is_some() {}
}

async fn respond(dispatcher: Arc<Dispatcher>, request: InboundRequest) {
    let InboundRequest {
        envelope,
        respond_to,
    } = request;
    let span = info_span!("dispatch", resource = dispatcher.resource(), action = %envelope.action_name);

    // Run in a nested task so a panicking handler is reported instead of dropping the reply.
    let worker = {
        let dispatcher = dispatcher.clone();
        tokio::spawn(async move { dispatcher.dispatch(envelope).await }.instrument(span))
    };
    let response = match worker.await {
        Ok(response) => response,
        Err(e) => {
            error!(resource = dispatcher.resource(), error = %e, "Handler aborted");
            ResponseEnvelope::fault(FaultKind::ServerError, format!("handler aborted: {e}"))
        }
    };
    if respond_to.send(response).is_err() {
        debug!(resource = dispatcher.resource(), "Requester went away");
    }
}
