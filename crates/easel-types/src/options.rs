//! Task execution options: dry-run, tracing, ID policy, timeouts, retry.

use serde::{Deserialize, Serialize};

/// Policy for assigning stable identities to collected items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdPolicy {
    /// Never write (default).
    #[default]
    None,
    /// Assign only where no id exists yet.
    OptIn,
    /// Always assign; flag a conflict when an id already existed.
    Always,
    /// Report existing ids, never write.
    Preserve,
}

/// Caller-declared idempotency of the operation.
///
/// Affects retry: the apply stage may only be retried when the caller
/// asserts `Safe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Idempotency {
    /// Safe to re-run (queries, dry runs).
    Safe,
    /// Not proven either way (default).
    #[default]
    Unknown,
    /// Definitely not idempotent (creates, deletes).
    Unsafe,
}

/// Stages a retry policy may re-run.
///
/// `apply` is deliberately not a variant: re-running a stage that
/// mutates the document requires the caller to assert idempotency, and
/// even then the retry wrapper gates it separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryableStage {
    Collect,
    Compute,
    /// Only honored when `idempotency == Safe`.
    Apply,
}

impl RetryableStage {
    /// Wire name of the stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collect => "collect",
            Self::Compute => "compute",
            Self::Apply => "apply",
        }
    }
}

/// Stage-aware retry configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Upper bound on pipeline invocations, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Stages eligible for retry (default: collect only).
    #[serde(default = "default_retryable_stages")]
    pub retryable_stages: Vec<RetryableStage>,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retryable_stages() -> Vec<RetryableStage> {
    vec![RetryableStage::Collect]
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retryable_stages: default_retryable_stages(),
        }
    }
}

/// Options accompanying every [`TaskPayload`](crate::TaskPayload).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaskOptions {
    /// Compute actions but skip apply.
    pub dry_run: bool,
    /// Record an execution trace in the report.
    pub trace: bool,
    /// Identity assignment policy.
    pub id_policy: IdPolicy,
    /// Per-call timeout in seconds.
    pub timeout: u32,
    /// Retry policy; `None` disables retry entirely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetryPolicy>,
    /// Caller-declared idempotency.
    pub idempotency: Idempotency,
}

impl Default for TaskOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            trace: false,
            id_policy: IdPolicy::None,
            timeout: 30,
            retry: None,
            idempotency: Idempotency::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_default_from_empty_object() {
        let opts: TaskOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(opts, TaskOptions::default());
        assert_eq!(opts.timeout, 30);
        assert_eq!(opts.id_policy, IdPolicy::None);
    }

    #[test]
    fn retry_policy_defaults_to_collect_only() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.retryable_stages, vec![RetryableStage::Collect]);
    }

    #[test]
    fn id_policy_uses_snake_case_wire_names() {
        assert_eq!(serde_json::to_string(&IdPolicy::OptIn).unwrap(), "\"opt_in\"");
        let back: IdPolicy = serde_json::from_str("\"preserve\"").unwrap();
        assert_eq!(back, IdPolicy::Preserve);
    }

    #[test]
    fn retry_policy_fills_missing_fields() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"maxAttempts": 5}"#).unwrap();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.retryable_stages, vec![RetryableStage::Collect]);
    }
}
