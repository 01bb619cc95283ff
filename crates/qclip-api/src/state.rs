//! Application state.

use std::sync::Arc;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::pipeline::QuotePipeline;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub pipeline: Arc<QuotePipeline>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: ApiConfig) -> ApiResult<Self> {
        let pipeline = QuotePipeline::new(&config)
            .map_err(|e| ApiError::internal(format!("Failed to build HTTP clients: {}", e)))?;

        Ok(Self {
            config,
            pipeline: Arc::new(pipeline),
        })
    }
}
