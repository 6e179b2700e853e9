//! Rendering panel responses for tool output.
//!
//! The inner `result` of a [`ScriptResponse`] is one of:
//!
//! - a Task Protocol report (`{ok, stats, timing, ...}`),
//! - the freeform envelope (`{success, result?, error?, line?}`),
//! - or arbitrary script output.
//!
//! All three are accepted; JSON-string results get one level of
//! re-parsing before inspection.

use easel_types::{ScriptOutcome, ScriptResponse, TaskReport};
use serde_json::Value;

/// Extracts a Task Protocol report from a response, if that is what
/// the script produced.
#[must_use]
pub fn parse_task_report(response: &ScriptResponse) -> Option<TaskReport> {
    let value = response.parsed_result();
    // The report envelope is the only shape carrying a top-level `ok`.
    if value.get("ok").is_none() {
        return None;
    }
    serde_json::from_value(value).ok()
}

/// Renders a response as human-readable tool output.
#[must_use]
pub fn render_response(response: &ScriptResponse) -> String {
    if let Some(error) = &response.error {
        return format!("Error: {error}");
    }

    let value = response.parsed_result();

    // Freeform envelope: unwrap success/error explicitly.
    if value.get("success").is_some() {
        if let Ok(outcome) = serde_json::from_value::<ScriptOutcome>(value.clone()) {
            return render_outcome(&outcome);
        }
    }

    match value {
        Value::String(text) => text,
        Value::Null => "(no result)".to_string(),
        other => serde_json::to_string_pretty(&other).unwrap_or_else(|_| other.to_string()),
    }
}

fn render_outcome(outcome: &ScriptOutcome) -> String {
    if outcome.success {
        match &outcome.result {
            Some(Value::String(text)) => text.clone(),
            Some(other) => {
                serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string())
            }
            None => "OK".to_string(),
        }
    } else {
        let message = outcome.error.as_deref().unwrap_or("unknown script error");
        match outcome.line {
            Some(line) => format!("Error: {message} (line {line})"),
            None => format!("Error: {message}"),
        }
    }
}
