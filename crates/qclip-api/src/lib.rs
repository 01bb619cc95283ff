//! Axum HTTP API server for quote video generation.
//!
//! This crate provides:
//! - `POST /generate`, returning a narrated MP4 of a quote over a stock photo
//! - Status, health and readiness probes
//! - Request ids, security headers and Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, PipelineError, PipelineResult};
pub use pipeline::{GeneratedClip, QuotePipeline};
pub use routes::create_router;
pub use state::AppState;
