//! Status, health and readiness handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use qclip_media::{resolve_binary, ScratchWorkspace};
use serde::Serialize;

use crate::state::AppState;

/// Service name reported by `GET /`.
pub const SERVICE_NAME: &str = "Quote Video Generator API";

/// Status response.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub endpoints: Vec<&'static str>,
}

/// Service status and endpoint listing.
pub async fn root() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        service: SERVICE_NAME,
        endpoints: vec!["/generate"],
    })
}

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub ffmpeg: CheckStatus,
    pub fonts: CheckStatus,
    pub scratch: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CheckStatus {
    fn ok(detail: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            detail: Some(detail.into()),
            error: None,
        }
    }

    fn degraded(detail: impl Into<String>) -> Self {
        Self {
            status: "degraded".to_string(),
            detail: Some(detail.into()),
            error: None,
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            detail: None,
            error: Some(msg.into()),
        }
    }
}

/// Readiness check endpoint.
///
/// Fails when the encoder cannot be found or no workspace can be created.
/// A font fallback is reported but does not fail readiness.
pub async fn ready(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let ffmpeg_check = match resolve_binary(&state.config.ffmpeg_path) {
        Ok(path) => CheckStatus::ok(path.display().to_string()),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let fonts_check = if state.pipeline.font_fallback() {
        CheckStatus::degraded("built-in bitmap font")
    } else {
        CheckStatus::ok("truetype")
    };

    let scratch_root = state.pipeline.scratch_root().to_path_buf();
    let scratch_check = match tokio::task::spawn_blocking(move || ScratchWorkspace::create(&scratch_root)).await {
        Ok(Ok(workspace)) => {
            workspace.close();
            CheckStatus::ok(state.pipeline.scratch_root().display().to_string())
        }
        Ok(Err(e)) => CheckStatus::error(e.to_string()),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let all_ok = ffmpeg_check.status == "ok" && scratch_check.status == "ok";

    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "unavailable" }.to_string(),
        checks: ReadinessChecks {
            ffmpeg: ffmpeg_check,
            fonts: fonts_check,
            scratch: scratch_check,
        },
    };

    if all_ok {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
