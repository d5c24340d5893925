/// The audit log lives in the same store but is never exposed on the bus.
use resource_framework::ModelDescriptor;

pub const AUDIT_LOG_MODEL: &str = "AuditLog";

pub fn audit_log_model() -> ModelDescriptor {
    ModelDescriptor::new(AUDIT_LOG_MODEL)
}
