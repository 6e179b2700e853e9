//! Failures raised by stage callables.

use easel_doc::ItemId;
use easel_types::ErrorCode;

/// What a stage callable returns on failure.
///
/// The executor maps this to the stage's default error code (`R001`,
/// `R002`, `R003`) unless the failure carries its own, and attaches the
/// offending item's reference when one is named.
#[derive(Debug, Clone)]
pub struct StageFailure {
    pub message: String,
    /// Overrides the stage's default code (e.g. `R005` for a stage
    /// timeout, `R006` for out-of-bounds geometry).
    pub code: Option<ErrorCode>,
    /// Offending item, when the failure is attributable.
    pub item: Option<ItemId>,
}

impl StageFailure {
    /// A plain failure with the stage's default code.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            item: None,
        }
    }

    /// Overrides the error code.
    #[must_use]
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        self
    }

    /// Names the offending item.
    #[must_use]
    pub fn with_item(mut self, item: ItemId) -> Self {
        self.item = Some(item);
        self
    }
}

impl From<String> for StageFailure {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

impl From<&str> for StageFailure {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl std::fmt::Display for StageFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}
