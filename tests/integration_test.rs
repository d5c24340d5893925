//! End-to-end behavior of a `widget` resource bound over the in-process bus.
use resource_recipe::framework::mock::MemoryStore;
use resource_recipe::framework::{
    ActionDescriptor, BindOptions, BodySchema, EntityId, FaultKind, FrameworkError, LocalBus,
    MessageBus, ModelDescriptor, RequestEnvelope, ResourceBinding, ResourceClient, ValidationMode,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

struct Harness {
    binding: ResourceBinding,
    bus: Arc<LocalBus>,
    store: Arc<MemoryStore>,
    client: ResourceClient,
}

fn widget_model(mode: ValidationMode) -> ModelDescriptor {
    ModelDescriptor::new("Widget")
        .exported()
        .with_display_name("widget")
        .with_validation_mode(mode)
        .with_body_schema(json!({
            "type": "object",
            "required": ["color"],
            "properties": {
                "color": {"type": "string"},
                "size": {"type": "integer", "minimum": 0}
            }
        }))
}

async fn start(model: ModelDescriptor) -> Harness {
    let bus = Arc::new(LocalBus::new());
    let store = Arc::new(MemoryStore::new());
    let binding =
        ResourceBinding::bind(&model, store.clone(), bus.clone(), BindOptions::default()).unwrap();
    binding.start().await.unwrap();
    let client = ResourceClient::new(bus.clone(), binding.name());
    Harness {
        binding,
        bus,
        store,
        client,
    }
}

fn kind(result: Result<Value, FrameworkError>) -> Option<FaultKind> {
    result.err().map(|e| e.kind())
}

#[tokio::test]
async fn create_without_identifier_publishes_change_event() {
    let h = start(widget_model(ValidationMode::Strict)).await;
    let mut events = h.bus.subscribe("widget");

    let created = h.client.put(None, json!({"color": "red"})).await.unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(created["color"], json!("red"));

    let event = timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, created);

    h.binding.stop().await;
}

#[tokio::test]
async fn update_keeps_untouched_fields() {
    let h = start(widget_model(ValidationMode::Strict)).await;

    h.client
        .put(Some("7"), json!({"color": "red", "size": 4}))
        .await
        .unwrap();
    let updated = h
        .client
        .patch(Some("7"), json!({"color": "blue"}))
        .await
        .unwrap();

    assert_eq!(updated, json!({"id": "7", "color": "blue", "size": 4}));
    let stored = h.store.snapshot(&EntityId::from("7")).unwrap();
    assert_eq!(stored.to_json(), updated);

    h.binding.stop().await;
}

#[tokio::test]
async fn fetch_returns_serialized_entity() {
    let h = start(widget_model(ValidationMode::Strict)).await;

    assert_eq!(kind(h.client.get("1").await), Some(FaultKind::NotFound));

    let created = h.client.put(None, json!({"color": "red"})).await.unwrap();
    let id = created["id"].as_str().unwrap();
    assert_eq!(h.client.get(id).await.unwrap(), created);

    h.binding.stop().await;
}

#[tokio::test]
async fn update_faults() {
    let h = start(widget_model(ValidationMode::Strict)).await;

    assert_eq!(
        kind(h.client.patch(None, json!({"color": "blue"})).await),
        Some(FaultKind::MethodNotAllowed)
    );
    assert_eq!(
        kind(h.client.patch(Some("99"), json!({"color": "blue"})).await),
        Some(FaultKind::NotFound)
    );

    h.binding.stop().await;
}

#[tokio::test]
async fn delete_is_idempotent() {
    let h = start(widget_model(ValidationMode::Strict)).await;
    h.client.put(Some("3"), json!({"color": "red"})).await.unwrap();

    assert_eq!(kind(h.client.delete(None).await), Some(FaultKind::MethodNotAllowed));
    let first = h.client.delete(Some("3")).await.unwrap();
    let second = h.client.delete(Some("3")).await.unwrap();
    assert_eq!(first, second);
    assert!(h.store.is_empty());

    h.binding.stop().await;
}

#[tokio::test]
async fn strict_replace_rejects_invalid_body_without_writing() {
    let h = start(widget_model(ValidationMode::Strict)).await;
    h.client.put(Some("1"), json!({"color": "red"})).await.unwrap();

    assert_eq!(
        kind(h.client.put(Some("1"), json!({"size": 2})).await),
        Some(FaultKind::ValidationError)
    );
    assert_eq!(
        kind(h.client.put(None, json!({"color": 5})).await),
        Some(FaultKind::ValidationError)
    );

    assert_eq!(h.store.len(), 1);
    assert_eq!(
        h.store.snapshot(&EntityId::from("1")).unwrap().to_json(),
        json!({"id": "1", "color": "red"})
    );

    h.binding.stop().await;
}

#[tokio::test]
async fn permissive_mode_accepts_any_body() {
    let h = start(widget_model(ValidationMode::Permissive)).await;

    let created = h.client.put(None, json!({"size": "huge"})).await.unwrap();
    assert_eq!(created["size"], json!("huge"));

    h.binding.stop().await;
}

#[tokio::test]
async fn strict_mode_without_schema_never_serves() {
    let bus = Arc::new(LocalBus::new());
    let model = ModelDescriptor::new("Widget")
        .exported()
        .with_display_name("widget")
        .with_validation_mode(ValidationMode::Strict);

    let result = ResourceBinding::bind(
        &model,
        Arc::new(MemoryStore::new()),
        bus.clone(),
        BindOptions::default(),
    );

    assert!(matches!(result, Err(FrameworkError::Configuration(_))));
    assert!(!bus.is_served("widget"));
}

#[tokio::test]
async fn custom_action_overrides_default_of_same_name() {
    let schema = BodySchema::compile(json!({"type": "object"})).unwrap();
    let model = widget_model(ValidationMode::Strict).with_action(
        ActionDescriptor::identifier("GET", |_ctx, id, _body| async move {
            Ok(json!({ "shadowed": id.map(|id| id.to_string()) }))
        })
        .read_only()
        .with_body_schema(schema),
    );
    let h = start(model).await;

    let names: Vec<&str> = h.binding.registry().names().collect();
    assert_eq!(names, vec!["DELETE", "GET", "PATCH", "PUT"]);
    assert_eq!(h.client.get("5").await.unwrap(), json!({"shadowed": "5"}));

    h.binding.stop().await;
}

#[tokio::test]
async fn stop_releases_subject() {
    let h = start(widget_model(ValidationMode::Strict)).await;
    h.binding.stop().await;

    assert!(!h.bus.is_served("widget"));
    assert!(h
        .bus
        .request("widget", RequestEnvelope::new("GET"))
        .await
        .is_err());
    assert_eq!(h.store.hook_count(), 0);
}
