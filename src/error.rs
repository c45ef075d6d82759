//! Error types for taskplane.

use uuid::Uuid;

/// Submission-time errors, surfaced synchronously to the submitter.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Unknown task: {name}")]
    UnknownTask { name: String },
}

/// Job store errors.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Job {id} not found")]
    NotFound { id: Uuid },

    #[error("Job {id} is {state}, cannot transition to {target}")]
    InvalidTransition {
        id: Uuid,
        state: String,
        target: String,
    },
}

/// Task executor failures. The scheduler flattens these to a string on the
/// job record; the raw error never crosses the execution boundary.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Invalid payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("Task failed: {reason}")]
    Failed { reason: String },

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// LLM provider errors.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Completion request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("Completion endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Invalid response from completion endpoint: {reason}")]
    InvalidResponse { reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from outbound HTTP integrations (GitHub, Microsoft Graph).
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{service} request failed: {reason}")]
    RequestFailed { service: String, reason: String },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    #[error("{service} response missing field: {field}")]
    MissingField { service: String, field: String },
}

impl RemoteError {
    /// Wrap a reqwest transport error for a named service.
    pub fn request(service: &str, err: reqwest::Error) -> Self {
        Self::RequestFailed {
            service: service.to_string(),
            reason: err.to_string(),
        }
    }
}
