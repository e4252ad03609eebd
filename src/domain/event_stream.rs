//! Event stream extraction. Turns the raw streamed workflow response into one result.
//!
//! Pure and deterministic: no I/O, no state between calls. The stream is a sequence of
//! `data: <json>` frames; only the last `workflow_finished` frame decides the outcome.

use crate::domain::{ExtractionError, WorkflowEvent, WorkflowResult};
use serde_json::Value;

/// Prefix of every event frame line.
pub const EVENT_PREFIX: &str = "data: ";

/// Event type of the frame that carries the final run status and outputs.
pub const TERMINAL_EVENT: &str = "workflow_finished";

/// Status value of a successful run.
pub const SUCCESS_STATUS: &str = "succeeded";

/// Failure detail when the terminal event carries no status.
pub const STATUS_MISSING: &str = "status missing";

/// Failure detail when the status is not a string.
pub const STATUS_INVALID: &str = "status not a string";

/// Output object (inside `data.outputs`) holding the package fields.
pub const OUTPUT_OBJECT: &str = "package_output";

/// Outcome of one extraction.
pub type ExtractionOutcome = Result<WorkflowResult, ExtractionError>;

/// Parse one line into an event. Returns None for anything that is not a well-formed frame
/// (other SSE fields, heartbeats, partial JSON).
fn parse_event_line(line: &str) -> Option<WorkflowEvent> {
    let payload = line.trim().strip_prefix(EVENT_PREFIX)?;
    serde_json::from_str(payload).ok()
}

/// Single forward pass over the stream, keeping only the most recent terminal event's data.
fn last_terminal_event(raw: &str) -> Option<Value> {
    raw.lines()
        .filter_map(parse_event_line)
        .filter(|event| event.event_type == TERMINAL_EVENT)
        .fold(None, |_, event| Some(event.data))
}

/// Extract the workflow result from the full raw stream text.
///
/// Lines end in `\n` or `\r\n`; a lone `\r` is not a line break.
pub fn extract_result(raw: &str) -> ExtractionOutcome {
    let data = last_terminal_event(raw).ok_or(ExtractionError::NoTerminalEvent)?;

    let status = match data.get("status") {
        Some(Value::String(s)) => s.as_str(),
        Some(Value::Null) | None => STATUS_MISSING,
        Some(_) => STATUS_INVALID,
    };
    if status != SUCCESS_STATUS {
        return Err(ExtractionError::WorkflowFailed {
            status: status.to_string(),
        });
    }

    let output = data
        .get("outputs")
        .and_then(|o| o.get(OUTPUT_OBJECT))
        .filter(|o| o.is_object())
        .ok_or_else(|| ExtractionError::MalformedOutput {
            detail: format!("outputs.{OUTPUT_OBJECT} is missing"),
        })?;

    Ok(WorkflowResult {
        package: required_field(output, "Package")?,
        reason: required_field(output, "Reason")?,
        language: required_field(output, "Language")?,
    })
}

fn required_field(output: &Value, name: &str) -> Result<String, ExtractionError> {
    match output.get(name) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Null) | None => Err(ExtractionError::MalformedOutput {
            detail: format!("field {name} is missing"),
        }),
        Some(_) => Err(ExtractionError::MalformedOutput {
            detail: format!("field {name} is not a string"),
        }),
    }
}
