//! Task reports: the sole return envelope of an executor invocation.

use crate::error::ErrorCode;
use crate::options::Idempotency;
use crate::refs::ItemRef;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Pipeline stage names, used in warnings and errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Validate,
    Collect,
    Compute,
    Apply,
    Export,
}

impl Stage {
    /// Wire name of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Collect => "collect",
            Self::Compute => "compute",
            Self::Apply => "apply",
            Self::Export => "export",
        }
    }
}

/// Item counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskStats {
    pub items_processed: usize,
    pub items_modified: usize,
    pub items_skipped: usize,
}

/// Per-stage elapsed milliseconds.
///
/// Stages that did not run report zero. `total_ms` covers the whole
/// invocation and is never less than the largest stage time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingInfo {
    pub collect_ms: f64,
    pub compute_ms: f64,
    pub apply_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_ms: Option<f64>,
    pub total_ms: f64,
}

/// Non-fatal observation recorded during a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskWarning {
    pub stage: Stage,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_ref: Option<ItemRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl TaskWarning {
    /// Creates a warning with no item reference.
    #[must_use]
    pub fn new(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            message: message.into(),
            item_ref: None,
            suggestion: None,
        }
    }
}

/// Fatal or per-item error with full context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskError {
    pub stage: Stage,
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_ref: Option<ItemRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<BTreeMap<String, Value>>,
}

impl TaskError {
    /// Creates an error with no item reference or details.
    #[must_use]
    pub fn new(stage: Stage, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            stage,
            code,
            message: message.into(),
            item_ref: None,
            details: None,
        }
    }

    /// Attaches the offending item's reference.
    #[must_use]
    pub fn with_item(mut self, item_ref: ItemRef) -> Self {
        self.item_ref = Some(item_ref);
        self
    }
}

/// Details of a retried execution, present only when retry ran.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryInfo {
    /// Total pipeline invocations, including the first.
    pub attempts: u32,
    pub succeeded: bool,
    /// Stage names that were re-run at least once.
    #[serde(default)]
    pub retried_stages: Vec<String>,
    #[serde(default)]
    pub idempotency: Idempotency,
}

/// The report returned exactly once per payload.
///
/// Invariant: `ok == true` implies `errors` is empty, and any error
/// forces `ok == false`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskReport {
    pub ok: bool,
    #[serde(default)]
    pub stats: TaskStats,
    #[serde(default)]
    pub timing: TimingInfo,
    #[serde(default)]
    pub warnings: Vec<TaskWarning>,
    #[serde(default)]
    pub errors: Vec<TaskError>,
    /// Task artifacts, e.g. `{"exportedPath": "/tmp/out.svg"}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<BTreeMap<String, Value>>,
    /// Execution trace, only populated when `options.trace` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_info: Option<RetryInfo>,
}

impl TaskReport {
    /// A successful report with everything zeroed.
    #[must_use]
    pub fn success() -> Self {
        Self {
            ok: true,
            ..Self::default()
        }
    }

    /// Records an error and flips `ok` to false.
    pub fn push_error(&mut self, error: TaskError) {
        self.ok = false;
        self.errors.push(error);
    }

    /// Records a warning without affecting `ok`.
    pub fn push_warning(&mut self, warning: TaskWarning) {
        self.warnings.push(warning);
    }

    /// Appends a trace line when tracing is active.
    pub fn push_trace(&mut self, line: impl Into<String>) {
        if let Some(trace) = &mut self.trace {
            trace.push(line.into());
        }
    }
}
