//! Task payloads and selector normalization.

use crate::options::TaskOptions;
use crate::target::{Target, TargetSelector};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protocol version emitted by this implementation.
pub const PROTOCOL_VERSION: &str = "2.3.1";

/// Targets as they arrive on the wire.
///
/// Older callers send a bare target dict (`{"type": "layer", ...}`);
/// current callers send the full [`TargetSelector`] wrapper. Both are
/// accepted on entry and normalized to the wrapper via
/// [`TargetsSpec::into_selector`]; only the wrapper exists internally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TargetsSpec {
    Selector(TargetSelector),
    Legacy(Target),
}

impl TargetsSpec {
    /// Normalizes either form to the selector wrapper.
    #[must_use]
    pub fn into_selector(self) -> TargetSelector {
        match self {
            Self::Selector(selector) => selector,
            Self::Legacy(target) => TargetSelector::new(target),
        }
    }

    /// Borrowing accessor for the inner target.
    #[must_use]
    pub fn target(&self) -> &Target {
        match self {
            Self::Selector(selector) => &selector.target,
            Self::Legacy(target) => target,
        }
    }
}

/// The declarative payload consumed once per executor invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPayload {
    /// Task name, e.g. `"apply_styles"` or `"query_items"`.
    pub task: String,
    /// Protocol version; when present, the major version must be 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Target selector (wrapper or legacy bare target).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub targets: Option<TargetsSpec>,
    /// Free-form task parameters; extension fields pass through.
    #[serde(default)]
    pub params: Map<String, Value>,
    #[serde(default)]
    pub options: TaskOptions,
}

impl TaskPayload {
    /// Creates a payload with defaults for everything but the name.
    #[must_use]
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            version: Some(PROTOCOL_VERSION.to_string()),
            targets: None,
            params: Map::new(),
            options: TaskOptions::default(),
        }
    }

    /// Sets the target selector.
    #[must_use]
    pub fn with_targets(mut self, selector: impl Into<TargetSelector>) -> Self {
        self.targets = Some(TargetsSpec::Selector(selector.into()));
        self
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options(mut self, options: TaskOptions) -> Self {
        self.options = options;
        self
    }

    /// Inserts one parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Normalized selector, if targets were given.
    #[must_use]
    pub fn selector(&self) -> Option<TargetSelector> {
        self.targets.clone().map(TargetsSpec::into_selector)
    }

    /// Checks the version gate: absent is accepted, present requires
    /// major version 2.
    #[must_use]
    pub fn version_supported(&self) -> bool {
        match &self.version {
            None => true,
            Some(v) => v.split('.').next() == Some("2"),
        }
    }
}
