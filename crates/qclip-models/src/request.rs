//! Quote generation request.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Quote used when the request omits one.
pub const DEFAULT_QUOTE: &str = "No quote provided";
/// Author used when the request omits one.
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Errors raised while interpreting a request body.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Request body must be a JSON object")]
    NotAnObject,
}

/// Body of `POST /generate` after defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub quote: String,
    pub author: String,
}

impl Default for QuoteRequest {
    fn default() -> Self {
        Self {
            quote: DEFAULT_QUOTE.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

impl QuoteRequest {
    pub fn new(quote: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            quote: quote.into(),
            author: author.into(),
        }
    }

    /// Parse a raw request body.
    ///
    /// An empty body is treated as `{}`. Field values that are not strings
    /// are kept as their compact JSON text rather than rejected.
    pub fn parse_body(body: &[u8]) -> Result<Self, RequestError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        let value: Value = serde_json::from_slice(body)?;
        Self::from_json(&value)
    }

    /// Build a request from an already decoded JSON value.
    pub fn from_json(value: &Value) -> Result<Self, RequestError> {
        let object = value.as_object().ok_or(RequestError::NotAnObject)?;

        Ok(Self {
            quote: field_text(object.get("quote")).unwrap_or_else(|| DEFAULT_QUOTE.to_string()),
            author: field_text(object.get("author")).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        })
    }

    /// Attribution line drawn under the quote.
    pub fn attribution(&self) -> String {
        format!("- {}", self.author)
    }

    /// Text handed to the speech synthesizer.
    pub fn narration(&self) -> String {
        format!("{}. By {}", self.quote, self.author)
    }
}

fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
