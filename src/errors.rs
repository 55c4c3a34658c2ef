use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use tracing::{error, warn};

/// Status used for every error body. Callers inspect the body shape, not the status.
pub const ERROR_STATUS: StatusCode = StatusCode::OK;

/// Failures that can occur between receiving a prompt and handing back a typed result
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request to LLM endpoint failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("LLM endpoint returned status {status}")]
    Upstream { status: u16, body: String },

    #[error("Malformed LLM response envelope: {message}")]
    Protocol { message: String, raw: Option<String> },

    #[error("LLM response was not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("LLM response did not match the expected shape: {source}")]
    Schema {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}

/// Machine-readable discriminant carried in every error body
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Upstream,
    Protocol,
    Parse,
    Schema,
}

/// Which key the raw model text is reported under. The overview/quiz/review
/// routes have always used `raw_output`, the subtopic and MCQ routes `raw_response`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawField {
    Output,
    Response,
}

/// Uniform error payload returned with [`ERROR_STATUS`]
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: ErrorKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

/// Error context for structured logging
#[derive(Debug)]
pub struct ErrorContext {
    pub operation: String,
    pub resource_type: String,
    pub topic: Option<String>,
    pub raw_field: RawField,
}

impl ErrorContext {
    pub fn new(operation: &str, resource_type: &str) -> Self {
        Self {
            operation: operation.to_string(),
            resource_type: resource_type.to_string(),
            topic: None,
            raw_field: RawField::Output,
        }
    }

    pub fn with_topic(mut self, topic: &str) -> Self {
        self.topic = Some(topic.to_string());
        self
    }

    pub fn with_raw_field(mut self, raw_field: RawField) -> Self {
        self.raw_field = raw_field;
        self
    }
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Upstream { .. } => ErrorKind::Upstream,
            ApiError::Protocol { .. } => ErrorKind::Protocol,
            ApiError::Parse { .. } => ErrorKind::Parse,
            ApiError::Schema { .. } => ErrorKind::Schema,
        }
    }

    /// Text received from upstream, when there was any
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Upstream { body, .. } => Some(body),
            ApiError::Protocol { raw, .. } => raw.as_deref(),
            ApiError::Parse { raw, .. } | ApiError::Schema { raw, .. } => Some(raw),
        }
    }

    fn details(&self) -> Option<String> {
        match self {
            ApiError::Transport(source) => Some(source.to_string()),
            ApiError::Upstream { status, .. } => Some(format!("upstream status {}", status)),
            ApiError::Protocol { message, .. } => Some(message.clone()),
            ApiError::Parse { source, .. } | ApiError::Schema { source, .. } => {
                Some(source.to_string())
            }
        }
    }

    /// Build the error payload without logging
    pub fn to_body(&self, raw_field: RawField) -> ErrorBody {
        let raw = self.raw_text().map(str::to_string);
        let (raw_output, raw_response) = match raw_field {
            RawField::Output => (raw, None),
            RawField::Response => (None, raw),
        };

        ErrorBody {
            error: self.to_string(),
            kind: self.kind(),
            details: self.details(),
            raw_output,
            raw_response,
        }
    }

    /// Log the failure and convert it into the fail-soft HTTP response
    pub fn to_response_with_context(self, context: ErrorContext) -> (StatusCode, Json<ErrorBody>) {
        match &self {
            ApiError::Transport(_) | ApiError::Upstream { .. } | ApiError::Protocol { .. } => {
                error!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    topic = ?context.topic,
                    kind = ?self.kind(),
                    error = %self,
                    "LLM endpoint failure"
                );
            }
            ApiError::Parse { .. } | ApiError::Schema { .. } => {
                warn!(
                    operation = %context.operation,
                    resource_type = %context.resource_type,
                    topic = ?context.topic,
                    kind = ?self.kind(),
                    error = %self,
                    "Unusable LLM output"
                );
            }
        }

        (ERROR_STATUS, Json(self.to_body(context.raw_field)))
    }
}
