//! API error types.

use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use qclip_media::MediaError;
use qclip_models::RequestError;
use qclip_upstream::UpstreamError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Failure of one stage of quote video generation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Photo search or download failed.
    #[error("{0}")]
    Upstream(String),

    /// The overlay could not be decoded, drawn or saved.
    #[error("Failed to render quote image: {0}")]
    Render(String),

    /// Narration could not be synthesized.
    #[error("Failed to synthesize narration: {0}")]
    Synthesis(String),

    #[error("Video encoding failed: {0}")]
    Encoding(String),

    #[error("Video encoding timed out after {0} seconds")]
    EncodingTimeout(u64),

    /// The encoder exited cleanly but left no usable output.
    #[error("Output video not found: {0}")]
    NotFound(String),

    #[error("Scratch workspace error: {0}")]
    Workspace(String),
}

impl PipelineError {
    pub fn upstream(err: UpstreamError) -> Self {
        Self::Upstream(err.to_string())
    }

    pub fn render(err: MediaError) -> Self {
        Self::Render(err.to_string())
    }

    pub fn synthesis(err: UpstreamError) -> Self {
        Self::Synthesis(err.to_string())
    }

    pub fn encoding(err: MediaError) -> Self {
        match err {
            MediaError::Timeout(secs) => Self::EncodingTimeout(secs),
            other => Self::Encoding(other.to_string()),
        }
    }

    /// Map a failure reading the encoded file.
    pub fn output(err: MediaError) -> Self {
        match err {
            MediaError::FileNotFound(path) => Self::NotFound(path.display().to_string()),
            other => Self::Workspace(other.to_string()),
        }
    }

    pub fn workspace(err: MediaError) -> Self {
        Self::Workspace(err.to_string())
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::Upstream(_) => "upstream",
            PipelineError::Render(_) => "render",
            PipelineError::Synthesis(_) => "synthesis",
            PipelineError::Encoding(_) => "encoding",
            PipelineError::EncodingTimeout(_) => "encoding_timeout",
            PipelineError::NotFound(_) => "not_found",
            PipelineError::Workspace(_) => "workspace",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::EncodingTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The body could not be read, e.g. it is over the size limit.
    #[error("{message}")]
    Rejected { status: StatusCode, message: String },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Hide internal details when running in production.
    pub fn redact(self, production: bool) -> Self {
        match self {
            ApiError::Internal(_) if production => {
                ApiError::Internal("An internal error occurred".to_string())
            }
            other => other,
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Rejected { status, .. } => *status,
            ApiError::Pipeline(e) => e.status_code(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        Self::Rejected {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl From<RequestError> for ApiError {
    fn from(err: RequestError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error = self.to_string();

        (status, Json(ErrorResponse { error })).into_response()
    }
}
