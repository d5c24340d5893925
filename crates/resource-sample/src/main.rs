//! # Resource Recipe Demo
//!
//! Starts the sample [`ResourceSystem`], drives the widget resource through its default
//! and custom actions, then shuts down.
//!
//! ```bash
//! RUST_LOG=info cargo run -p resource-sample
//! RUST_LOG=debug cargo run -p resource-sample -- config.json
//! ```

use resource_framework::tracing::setup_tracing;
use resource_framework::FrameworkConfig;
use resource_sample::lifecycle::ResourceSystem;
use resource_sample::model::{WidgetCreate, WidgetUpdate};
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = match std::env::args().nth(1) {
        Some(path) => FrameworkConfig::load(path).map_err(|e| e.to_string())?,
        None => FrameworkConfig::default(),
    };

    let system = ResourceSystem::start(&config)
        .await
        .map_err(|e| e.to_string())?;
    info!(resources = ?system.resources(), "Serving");

    let mut events = system.widget_events();
    let widgets = system.widget_client.clone();

    let widget = async {
        let created = widgets
            .create(WidgetCreate::new("red").with_size(3))
            .await
            .map_err(|e| e.to_string())?;
        info!(id = %created.id, "Widget created");

        let update = WidgetUpdate {
            label: Some("demo".to_string()),
            ..Default::default()
        };
        widgets
            .update(&created.id, update)
            .await
            .map_err(|e| e.to_string())?;
        widgets
            .paint(&created.id, "blue")
            .await
            .map_err(|e| e.to_string())
    }
    .instrument(tracing::info_span!("widget_demo"))
    .await?;
    info!(id = %widget.id, color = %widget.color, coats = widget.coats, "Widget painted");

    match widgets.create(WidgetCreate::new("")).await {
        Ok(_) => return Err("empty color was accepted".to_string()),
        Err(e) => info!(error = %e, "Invalid widget rejected"),
    }

    while let Ok(event) = events.try_recv() {
        info!(%event, "Change event");
    }

    widgets.delete(&widget.id).await.map_err(|e| e.to_string())?;
    let still_there = widgets.exists(&widget.id).await.map_err(|e| e.to_string())?;
    info!(still_there, "Widget deleted");

    system.shutdown().await;
    Ok(())
}
