//! Target selectors: which document items a task operates on.
//!
//! A [`TargetSelector`] wraps one [`Target`] together with a result
//! ordering and a global exclusion filter. Targets are a discriminated
//! union on `type`; the `compound` variant unions several sub-targets
//! and may carry its own local exclusion filter.
//!
//! # Example
//!
//! ```
//! use easel_types::{Target, TargetSelector, OrderBy};
//!
//! let json = r#"{
//!     "target": {"type": "layer", "layer": "Panels", "recursive": true},
//!     "orderBy": "reading"
//! }"#;
//! let sel: TargetSelector = serde_json::from_str(json).unwrap();
//! assert_eq!(sel.order_by, OrderBy::Reading);
//! assert!(matches!(sel.target, Target::Layer { .. }));
//! ```

use serde::{Deserialize, Serialize};

/// Deterministic ordering applied to collected items.
///
/// All modes are stable with respect to the input sequence, so two runs
/// over the same document snapshot yield identical orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderBy {
    /// Host stacking order, back to front (default).
    #[default]
    ZOrder,
    /// Front to back.
    ZOrderReverse,
    /// Row-major: top edge descending in 10-unit rows, then left edge.
    Reading,
    /// Column-major: left edge ascending in 10-unit columns, then top edge.
    Column,
    /// Lexicographic by item name; unnamed items sort first.
    Name,
    /// Left edge ascending.
    PositionX,
    /// Top edge descending (visual top first; host Y grows upward).
    PositionY,
    /// `width * height` ascending.
    Area,
}

/// Exclusion filter; each set flag removes matching items.
///
/// Flags are ORed: an item is dropped when *any* enabled predicate
/// matches. `clipped` matches items with an ancestor clipping group,
/// not just the mask path itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExcludeFilter {
    pub locked: bool,
    pub hidden: bool,
    pub guides: bool,
    pub clipped: bool,
}

impl ExcludeFilter {
    /// Returns `true` if no flag is set (the filter is a no-op).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !(self.locked || self.hidden || self.guides || self.clipped)
    }
}

/// One target variant, discriminated on `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Target {
    /// Snapshot of the current selection.
    Selection,
    /// Every layer's items; `recursive` descends into groups.
    All {
        #[serde(default)]
        recursive: bool,
    },
    /// Items of a named layer; error if the layer is absent.
    Layer {
        layer: String,
        #[serde(default)]
        recursive: bool,
    },
    /// Items matching a filter set. At least one filter is required.
    Query {
        /// Exact host typename (`PathItem`, `TextFrame`, ...).
        #[serde(rename = "itemType", skip_serializing_if = "Option::is_none")]
        item_type: Option<String>,
        /// Name pattern; `*` matches any run, `?` a single character,
        /// anchored at both ends.
        #[serde(skip_serializing_if = "Option::is_none")]
        pattern: Option<String>,
        /// Restrict the walk to one layer.
        #[serde(skip_serializing_if = "Option::is_none")]
        layer: Option<String>,
        #[serde(default)]
        recursive: bool,
    },
    /// Union of sub-targets in declaration order, then the local
    /// `exclude` filter. The selector-level exclude/order still apply
    /// afterwards.
    Compound {
        #[serde(rename = "anyOf")]
        any_of: Vec<Target>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exclude: Option<ExcludeFilter>,
    },
}

impl Target {
    /// Wire name of the variant.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::All { .. } => "all",
            Self::Layer { .. } => "layer",
            Self::Query { .. } => "query",
            Self::Compound { .. } => "compound",
        }
    }
}

/// Complete selector: one target plus ordering and global exclusion.
///
/// The global `exclude` and `order_by` are applied exactly once, after
/// the target (including any compound sub-targets) has been resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSelector {
    pub target: Target,
    #[serde(default)]
    pub order_by: OrderBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<ExcludeFilter>,
}

impl TargetSelector {
    /// Wraps a bare target with default ordering and no exclusion.
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            order_by: OrderBy::default(),
            exclude: None,
        }
    }
}

impl From<Target> for TargetSelector {
    fn from(target: Target) -> Self {
        Self::new(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_round_trips_through_type_tag() {
        let t = Target::Layer {
            layer: "L1".into(),
            recursive: true,
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["type"], "layer");
        assert_eq!(json["layer"], "L1");
        let back: Target = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn compound_parses_nested_targets() {
        let json = r#"{
            "type": "compound",
            "anyOf": [
                {"type": "layer", "layer": "Panels"},
                {"type": "selection"}
            ],
            "exclude": {"locked": true}
        }"#;
        let t: Target = serde_json::from_str(json).unwrap();
        let Target::Compound { any_of, exclude } = t else {
            panic!("expected compound");
        };
        assert_eq!(any_of.len(), 2);
        assert!(exclude.unwrap().locked);
    }

    #[test]
    fn order_by_uses_camel_case_names() {
        assert_eq!(
            serde_json::to_string(&OrderBy::ZOrderReverse).unwrap(),
            "\"zOrderReverse\""
        );
        assert_eq!(
            serde_json::to_string(&OrderBy::PositionX).unwrap(),
            "\"positionX\""
        );
        let back: OrderBy = serde_json::from_str("\"reading\"").unwrap();
        assert_eq!(back, OrderBy::Reading);
    }

    #[test]
    fn empty_exclude_filter_is_noop() {
        assert!(ExcludeFilter::default().is_empty());
        assert!(!ExcludeFilter {
            hidden: true,
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn query_target_keeps_item_type_wire_name() {
        let t = Target::Query {
            item_type: Some("PathItem".into()),
            pattern: Some("axis_*".into()),
            layer: None,
            recursive: false,
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["itemType"], "PathItem");
        assert!(json.get("layer").is_none());
    }
}
