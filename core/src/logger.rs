//! Log sink used for success breadcrumbs and normalized vendor errors.
//!
//! The sink takes a message (usually a breadcrumb) plus a structured JSON
//! payload. `TracingLogger` forwards both to `tracing`; hosts with their own
//! log pipeline implement `Logger` directly.

use serde_json::Value;

pub trait Logger: Send + Sync {
    fn info(&self, message: &str, data: &Value);
    fn error(&self, message: &str, data: &Value);
}

/// Emits one `tracing` event per call under the `brevo` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn info(&self, message: &str, data: &Value) {
        tracing::info!(target: "brevo", data = %data, "{message}");
    }

    fn error(&self, message: &str, data: &Value) {
        tracing::error!(target: "brevo", data = %data, "{message}");
    }
}
