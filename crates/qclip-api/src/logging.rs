//! Structured request logging utilities.

use tracing::{error, info, warn, Span};

/// Logger that tags pipeline events with the request they belong to.
#[derive(Debug, Clone)]
pub struct RequestLogger {
    request_id: String,
    operation: String,
}

impl RequestLogger {
    /// Create a new logger for a specific request and operation.
    pub fn new(request_id: &str, operation: &str) -> Self {
        Self {
            request_id: request_id.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Pipeline started: {}", message
        );
    }

    /// Log completion of one stage.
    pub fn log_stage(&self, stage: &str, elapsed_ms: u128, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            stage,
            elapsed_ms = %elapsed_ms,
            "Stage complete: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Pipeline warning: {}", message
        );
    }

    pub fn log_error(&self, kind: &str, message: &str) {
        error!(
            request_id = %self.request_id,
            operation = %self.operation,
            kind,
            "Pipeline failed: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            request_id = %self.request_id,
            operation = %self.operation,
            "Pipeline completed: {}", message
        );
    }

    /// Span carrying the request context, for instrumenting futures.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "pipeline",
            request_id = %self.request_id,
            operation = %self.operation
        )
    }
}
