//! Reply texts sent back to the user.

use crate::domain::event_stream::ExtractionOutcome;
use crate::domain::{DomainError, WorkflowResult};
use serde::Serialize;

/// Prefix of every reply that reports a failed cycle.
pub const FAILURE_PREFIX: &str = "Processing failed: ";

/// Reply when the message carried nothing the workflow could use.
pub const EMPTY_CONTENT_REPLY: &str = "No usable content was recognized.";

/// Reply for errors the bridge did not anticipate.
pub const APOLOGY_REPLY: &str =
    "Sorry, something went wrong while handling your message. Please try again later.";

#[derive(Serialize)]
struct PackageReply<'a> {
    package_output: &'a WorkflowResult,
}

/// Serialize a successful result as `{"package_output":{"Package":..,"Reason":..,"Language":..}}`.
pub fn format_result(result: &WorkflowResult) -> String {
    serde_json::to_string(&PackageReply {
        package_output: result,
    })
    // A struct of three strings always serializes.
    .unwrap_or_else(|_| format!("{FAILURE_PREFIX}could not serialize result"))
}

/// Reply text for any extraction outcome. Never empty.
pub fn format_outcome(outcome: &ExtractionOutcome) -> String {
    match outcome {
        Ok(result) => format_result(result),
        Err(e) => format!("{FAILURE_PREFIX}{}", e.detail()),
    }
}

/// Reply text for a cycle that failed before extraction.
pub fn format_error(error: &DomainError) -> String {
    match error {
        DomainError::EmptyContent => EMPTY_CONTENT_REPLY.to_string(),
        DomainError::RemoteCallFailed { .. } => format!("{FAILURE_PREFIX}{error}"),
        _ => APOLOGY_REPLY.to_string(),
    }
}
