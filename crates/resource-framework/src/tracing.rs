//! # Observability & Tracing
//!
//! Structured logging for the dispatcher, built on `tracing`.
//!
//! ## What Gets Traced
//!
//! - **Binding lifecycle**: `Bound`, `Started`, `Stopped`, endpoint open/close
//! - **Requests**: every dispatch runs in a `dispatch{resource, action}` span; faults are
//!   logged at `warn` with their kind
//! - **Writes**: `Saved`, `Updated`, `Deleted` with the entity id
//! - **Events**: change and delete events at `debug`, failed emissions at `warn`
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run -p resource-sample
//! RUST_LOG=debug cargo run -p resource-sample     # per-request detail
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are ignored.
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // resource/action fields identify the source
        .compact()
        .try_init();
}
