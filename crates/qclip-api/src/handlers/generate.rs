//! Quote video generation handler.

use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::{self, HeaderName};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use qclip_models::encoding::{OUTPUT_FILENAME, OUTPUT_MIME_TYPE};
use qclip_models::QuoteRequest;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::middleware::{RequestId, FONT_FALLBACK_HEADER};
use crate::state::AppState;

/// Generate a narrated quote video and return it as an attachment.
pub async fn generate(
    State(state): State<AppState>,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Response> {
    let production = state.config.is_production();
    respond(state, request_id, body)
        .await
        .map_err(|e| e.redact(production))
}

async fn respond(
    state: AppState,
    request_id: Option<Extension<RequestId>>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Response> {
    let request_id = request_id
        .map(|Extension(id)| id.0)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let request = QuoteRequest::parse_body(&body?)?;
    let clip = state.pipeline.run(&request, &request_id).await?;

    info!(
        request_id = %request_id,
        bytes = clip.bytes.len(),
        lines = clip.line_count,
        font_fallback = clip.font_fallback,
        "Sending quote video"
    );

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", OUTPUT_FILENAME))
        .map_err(|e| ApiError::internal(e.to_string()))?;
    let fallback = if clip.font_fallback { "true" } else { "false" };

    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(OUTPUT_MIME_TYPE)),
        (header::CONTENT_DISPOSITION, disposition),
        (header::CONTENT_LENGTH, HeaderValue::from(clip.bytes.len())),
        (HeaderName::from_static(FONT_FALLBACK_HEADER), HeaderValue::from_static(fallback)),
    ];

    Ok((StatusCode::OK, headers, clip.bytes).into_response())
}
