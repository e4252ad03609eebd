//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    /// Normalization produced no usable query; the workflow is never called.
    #[error("message has no usable content")]
    EmptyContent,

    /// Upload, transcription or workflow call failed (transport error, timeout or non-2xx).
    #[error("{endpoint} call failed{}: {body}", status_suffix(.status))]
    RemoteCallFailed {
        endpoint: String,
        status: Option<u16>,
        body: String,
    },

    #[error("Attachment store error: {0}")]
    Attachment(String),

    #[error("Messenger error: {0}")]
    Messenger(String),

    #[error("Message log error: {0}")]
    MessageLog(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" with status {s}")).unwrap_or_default()
}

impl DomainError {
    pub fn remote(endpoint: &str, status: Option<u16>, body: impl Into<String>) -> Self {
        DomainError::RemoteCallFailed {
            endpoint: endpoint.to_string(),
            status,
            body: body.into(),
        }
    }
}

/// Discriminant of an extraction failure, independent of its detail text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NoTerminalEvent,
    WorkflowFailed,
    MalformedOutput,
}

/// Why the event stream did not yield a [`WorkflowResult`](super::WorkflowResult).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("no workflow_finished event in stream")]
    NoTerminalEvent,

    #[error("{status}")]
    WorkflowFailed { status: String },

    #[error("malformed workflow output: {detail}")]
    MalformedOutput { detail: String },
}

impl ExtractionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ExtractionError::NoTerminalEvent => FailureKind::NoTerminalEvent,
            ExtractionError::WorkflowFailed { .. } => FailureKind::WorkflowFailed,
            ExtractionError::MalformedOutput { .. } => FailureKind::MalformedOutput,
        }
    }

    /// Human-readable detail appended to the failure reply.
    pub fn detail(&self) -> String {
        self.to_string()
    }
}
