//! Wire envelopes exchanged with the panel over the WebSocket.
//!
//! Outbound: [`ScriptRequest`] `{id, script, command?, trace_id?}`.
//! Inbound: [`ScriptResponse`] `{id, result, command?, duration?}`.
//!
//! The inner `result` is whatever the executed script produced. Scripts
//! conventionally return a JSON string, so [`ScriptResponse::parsed_result`]
//! performs exactly one level of re-parsing before the value is handed
//! back to the caller. Freeform scripts wrap their outcome in
//! [`ScriptOutcome`] (`{success, result?, error?, line?}`); Task Protocol
//! scripts return a full TaskReport instead; callers must accept both.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Human-facing command metadata attached to outbound requests.
///
/// Shown in the panel's log; never interpreted by the executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandMetadata {
    /// Short command label, e.g. `"task:arrange_grid"`.
    #[serde(rename = "type")]
    pub command_type: String,
    /// Originating tool name.
    pub tool: String,
    /// Tool parameters, for panel-side debugging.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

impl CommandMetadata {
    /// Creates metadata with just a command label.
    #[must_use]
    pub fn new(command_type: impl Into<String>, tool: impl Into<String>) -> Self {
        Self {
            command_type: command_type.into(),
            tool: tool.into(),
            params: Value::Null,
            trace_id: None,
        }
    }
}

/// Outbound frame: one script to execute, correlated by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRequest {
    /// Correlation id; monotonically increasing per process.
    pub id: u64,
    pub script: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
}

/// Inbound frame: the panel's answer, echoing the correlation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptResponse {
    pub id: u64,
    /// Script output; a string here is often itself serialized JSON.
    #[serde(default)]
    pub result: Value,
    /// Panel-side error text, when the script could not run at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Value>,
    /// Panel-measured execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl ScriptResponse {
    /// Returns the result with one level of string re-parsing applied.
    ///
    /// When `result` is a JSON string that itself parses as JSON, the
    /// parsed value is returned; otherwise the value is passed through
    /// untouched. Exactly one level; a doubly-encoded payload stays
    /// encoded once.
    #[must_use]
    pub fn parsed_result(&self) -> Value {
        match &self.result {
            Value::String(s) => serde_json::from_str(s).unwrap_or_else(|_| self.result.clone()),
            other => other.clone(),
        }
    }
}

/// Envelope produced by freeform (non-Task-Protocol) scripts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 1-indexed script line where the failure occurred, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_omits_absent_optionals() {
        let req = ScriptRequest {
            id: 7,
            script: "app.activeDocument".into(),
            command: None,
            trace_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, json!({"id": 7, "script": "app.activeDocument"}));
    }

    #[test]
    fn command_metadata_uses_type_wire_name() {
        let meta = CommandMetadata::new("task:ping", "execute_task");
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["type"], "task:ping");
        assert_eq!(json["tool"], "execute_task");
    }

    #[test]
    fn parsed_result_unwraps_one_string_level() {
        let resp = ScriptResponse {
            id: 1,
            result: Value::String(r#"{"ok": true}"#.into()),
            error: None,
            command: None,
            duration: None,
        };
        assert_eq!(resp.parsed_result(), json!({"ok": true}));
    }

    #[test]
    fn parsed_result_is_single_level_only() {
        let inner = r#"{"ok": true}"#;
        let doubly = serde_json::to_string(inner).unwrap();
        let resp = ScriptResponse {
            id: 1,
            result: Value::String(doubly),
            error: None,
            command: None,
            duration: None,
        };
        // One unwrap leaves a plain string, not the object.
        assert_eq!(resp.parsed_result(), Value::String(inner.into()));
    }

    #[test]
    fn parsed_result_passes_non_json_strings_through() {
        let resp = ScriptResponse {
            id: 1,
            result: Value::String("plain text".into()),
            error: None,
            command: None,
            duration: None,
        };
        assert_eq!(resp.parsed_result(), Value::String("plain text".into()));
    }

    #[test]
    fn outcome_accepts_minimal_failure_shape() {
        let outcome: ScriptOutcome =
            serde_json::from_str(r#"{"success": false, "error": "boom", "line": 12}"#).unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.line, Some(12));
    }
}
