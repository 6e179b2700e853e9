//! Standardized Task Protocol error codes.
//!
//! Codes are split into three categories:
//!
//! | Category | Prefix | Raised | Retried |
//! |----------|--------|--------|---------|
//! | Validation | `V` | before any stage runs | never |
//! | Runtime | `R` | during collect/compute/apply | `R001`/`R002`/`R005` |
//! | System | `S` | host or I/O failure | never |

use serde::{Deserialize, Serialize};

/// Category of a Task Protocol error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Payload or document-binding problem; the pipeline never started.
    Validation,
    /// Failure during collect, compute, apply, or a single-item operation.
    Runtime,
    /// Host application or I/O failure, surfaced verbatim.
    System,
}

/// Standardized error code carried by every [`TaskError`](crate::TaskError).
///
/// The serialized form is the short code (`"V001"`, `"R003"`, ...), which
/// is what the panel-side executor emits and what callers match on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    /// No active document.
    #[serde(rename = "V001")]
    NoDocument,
    /// Target was `selection` but nothing is selected.
    #[serde(rename = "V002")]
    NoSelection,
    /// Payload shape is invalid (e.g. empty task name).
    #[serde(rename = "V003")]
    InvalidPayload,
    /// Target selector is structurally invalid.
    #[serde(rename = "V004")]
    InvalidTargets,
    /// Target type is not one of the recognized variants.
    #[serde(rename = "V005")]
    UnknownTargetType,
    /// A type-specific required field is missing.
    #[serde(rename = "V006")]
    MissingRequiredParam,
    /// A parameter has the wrong type.
    #[serde(rename = "V007")]
    InvalidParamType,
    /// Protocol version mismatch (major version must be 2).
    #[serde(rename = "V008")]
    SchemaMismatch,

    /// Target collection failed.
    #[serde(rename = "R001")]
    CollectFailed,
    /// Compute stage raised.
    #[serde(rename = "R002")]
    ComputeFailed,
    /// Apply stage raised.
    #[serde(rename = "R003")]
    ApplyFailed,
    /// A single-item operation failed; the stage continued.
    #[serde(rename = "R004")]
    ItemOperationFailed,
    /// Stage ran past its deadline.
    #[serde(rename = "R005")]
    Timeout,
    /// Computed geometry fell outside the artboard or host limits.
    #[serde(rename = "R006")]
    OutOfBounds,

    /// Host application error.
    #[serde(rename = "S001")]
    AppError,
    /// Script-level failure in the host interpreter.
    #[serde(rename = "S002")]
    ScriptError,
    /// File or stream I/O failure.
    #[serde(rename = "S003")]
    IoError,
    /// Host ran out of memory.
    #[serde(rename = "S004")]
    MemoryError,
}

impl ErrorCode {
    /// Returns the short wire code (`"V001"`, `"R003"`, ...).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoDocument => "V001",
            Self::NoSelection => "V002",
            Self::InvalidPayload => "V003",
            Self::InvalidTargets => "V004",
            Self::UnknownTargetType => "V005",
            Self::MissingRequiredParam => "V006",
            Self::InvalidParamType => "V007",
            Self::SchemaMismatch => "V008",
            Self::CollectFailed => "R001",
            Self::ComputeFailed => "R002",
            Self::ApplyFailed => "R003",
            Self::ItemOperationFailed => "R004",
            Self::Timeout => "R005",
            Self::OutOfBounds => "R006",
            Self::AppError => "S001",
            Self::ScriptError => "S002",
            Self::IoError => "S003",
            Self::MemoryError => "S004",
        }
    }

    /// Returns the category this code belongs to.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self.as_str().as_bytes()[0] {
            b'V' => ErrorCategory::Validation,
            b'R' => ErrorCategory::Runtime,
            _ => ErrorCategory::System,
        }
    }

    /// Returns `true` if a retry policy may act on this code.
    ///
    /// Only collect/compute failures and stage timeouts are retryable;
    /// apply failures and everything validation/system never are.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::CollectFailed | Self::ComputeFailed | Self::Timeout)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_serialize_as_short_form() {
        let json = serde_json::to_string(&ErrorCode::NoDocument).unwrap();
        assert_eq!(json, "\"V001\"");
        let back: ErrorCode = serde_json::from_str("\"R003\"").unwrap();
        assert_eq!(back, ErrorCode::ApplyFailed);
    }

    #[test]
    fn categories_follow_prefix() {
        assert_eq!(ErrorCode::SchemaMismatch.category(), ErrorCategory::Validation);
        assert_eq!(ErrorCode::ItemOperationFailed.category(), ErrorCategory::Runtime);
        assert_eq!(ErrorCode::IoError.category(), ErrorCategory::System);
    }

    #[test]
    fn apply_failed_is_never_retryable() {
        assert!(!ErrorCode::ApplyFailed.is_retryable());
        assert!(ErrorCode::CollectFailed.is_retryable());
        assert!(ErrorCode::ComputeFailed.is_retryable());
        assert!(ErrorCode::Timeout.is_retryable());
    }
}
