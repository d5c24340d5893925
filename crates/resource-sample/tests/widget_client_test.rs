//! WidgetClient against a scripted responder, without any binding or store.
use resource_framework::{
    FaultKind, FrameworkError, InboundRequest, LocalBus, MessageBus, ResponseEnvelope,
};
use resource_sample::clients::{WidgetClient, WidgetError};
use resource_sample::model::{WidgetCreate, WidgetUpdate};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;

async fn scripted() -> (WidgetClient, mpsc::Receiver<InboundRequest>, Arc<LocalBus>) {
    let bus = Arc::new(LocalBus::new());
    let requests = bus.serve("widget", 4).await.unwrap();
    let client = WidgetClient::new(bus.clone(), "widget");
    (client, requests, bus)
}

#[tokio::test]
async fn create_sends_put_without_identifier() {
    let (client, mut requests, _bus) = scripted().await;

    let responder = tokio::spawn(async move {
        let request = requests.recv().await.unwrap();
        assert_eq!(request.envelope.action_name, "PUT");
        assert_eq!(request.envelope.identifier, None);
        assert_eq!(request.envelope.body, Some(json!({"color": "red", "size": 2})));
        let _ = request.respond_to.send(ResponseEnvelope::success(
            json!({"id": "1", "color": "red", "size": 2}),
        ));
    });

    let widget = client
        .create(WidgetCreate::new("red").with_size(2))
        .await
        .unwrap();
    assert_eq!(widget.id, "1");
    assert_eq!(widget.coats, 0);
    responder.await.unwrap();
}

#[tokio::test]
async fn update_sends_only_set_fields() {
    let (client, mut requests, _bus) = scripted().await;

    let responder = tokio::spawn(async move {
        let request = requests.recv().await.unwrap();
        assert_eq!(request.envelope.action_name, "PATCH");
        assert_eq!(request.envelope.identifier.as_deref(), Some("9"));
        assert_eq!(request.envelope.body, Some(json!({"label": "x"})));
        let _ = request.respond_to.send(ResponseEnvelope::success(
            json!({"id": "9", "color": "red", "label": "x"}),
        ));
    });

    let update = WidgetUpdate {
        label: Some("x".to_string()),
        ..Default::default()
    };
    let widget = client.update("9", update).await.unwrap();
    assert_eq!(widget.label.as_deref(), Some("x"));
    responder.await.unwrap();
}

#[tokio::test]
async fn faults_map_to_widget_errors() {
    let (client, mut requests, _bus) = scripted().await;

    tokio::spawn(async move {
        let replies = [
            ResponseEnvelope::fault(FaultKind::NotFound, "3"),
            ResponseEnvelope::fault(FaultKind::ValidationError, "color: required"),
            ResponseEnvelope::fault(FaultKind::ServerError, "disk on fire"),
        ];
        for reply in replies {
            let request = requests.recv().await.unwrap();
            let _ = request.respond_to.send(reply);
        }
    });

    assert!(matches!(client.get("3").await, Err(WidgetError::NotFound(id)) if id == "3"));
    assert!(matches!(
        client.create(WidgetCreate::new("red")).await,
        Err(WidgetError::Rejected(detail)) if detail == "color: required"
    ));
    assert!(matches!(
        client.delete("3").await,
        Err(WidgetError::Remote(FrameworkError::Server(detail))) if detail == "disk on fire"
    ));
}

#[tokio::test]
async fn malformed_payload_is_a_decode_error() {
    let (client, mut requests, _bus) = scripted().await;

    tokio::spawn(async move {
        let request = requests.recv().await.unwrap();
        let _ = request
            .respond_to
            .send(ResponseEnvelope::success(json!({"id": "1"})));
    });

    assert!(matches!(client.get("1").await, Err(WidgetError::Decode(_))));
}

#[tokio::test]
async fn malformed_exists_reply_is_a_decode_error() {
    let (client, mut requests, _bus) = scripted().await;

    tokio::spawn(async move {
        let replies = [json!({"exists": true}), json!({"found": true}), json!({"exists": "yes"})];
        for reply in replies {
            let request = requests.recv().await.unwrap();
            assert_eq!(request.envelope.action_name, "exists");
            let _ = request.respond_to.send(ResponseEnvelope::success(reply));
        }
    });

    assert!(client.exists("1").await.unwrap());
    assert!(matches!(client.exists("1").await, Err(WidgetError::Decode(_))));
    assert!(matches!(client.exists("1").await, Err(WidgetError::Decode(_))));
}

#[tokio::test]
async fn no_responder_surfaces_as_remote_error() {
    let bus = Arc::new(LocalBus::new());
    let client = WidgetClient::new(bus, "widget");

    assert!(matches!(
        client.exists("1").await,
        Err(WidgetError::Remote(FrameworkError::Bus(_)))
    ));
}
