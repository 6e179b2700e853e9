//! Stable item references: locator / identity / tags, kept separate.
//!
//! - [`ItemLocator`] is positional and volatile: it stops being valid
//!   the moment the document structure changes.
//! - [`ItemIdentity`] is a stable marker written into the item's note
//!   field, assigned only under an explicit ID policy.
//! - [`ItemTags`] are user-controlled `@mcp:key=value` annotations
//!   parsed from the name and note.

use crate::tags::TagMap;
use serde::{Deserialize, Serialize};

/// Where an item's stable identity was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdSource {
    /// No identity assigned.
    #[default]
    None,
    /// Marker stored in the item's note field.
    Note,
    /// Identity derived from the item name.
    Name,
}

/// Positional locator: layer path plus index path.
///
/// Volatile by construction; use for one-shot operations where the item
/// does not need to be re-found later.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemLocator {
    /// `/`-joined container chain, e.g. `"Layer 1/Group A"`.
    pub layer_path: String,
    /// Positional index at each container level, e.g. `[0, 2, 5]`.
    #[serde(default)]
    pub index_path: Vec<usize>,
}

/// Stable identity, present only when the item carries an id marker.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemIdentity {
    /// Unique id, e.g. `"mcp_1705834200123_0042"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    /// Where the id was read from.
    #[serde(default)]
    pub id_source: IdSource,
}

/// User-controlled semantic tags parsed from name and note.
///
/// Note tokens override name tokens for the same key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ItemTags {
    #[serde(default)]
    pub tags: TagMap,
}

/// Complete reference to one document item.
///
/// The locator is always computable; identity is present iff the item
/// carries an id marker; tags may be empty. `item_type` and `item_name`
/// are debugging metadata, never used for re-finding.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRef {
    pub locator: ItemLocator,
    #[serde(default)]
    pub identity: ItemIdentity,
    #[serde(default)]
    pub tags: ItemTags,
    /// Host typename (`PathItem`, `TextFrame`, ...).
    pub item_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
}

impl ItemRef {
    /// Short human-readable location, e.g. `"Layer 1/Group A[0,2]"`.
    #[must_use]
    pub fn location(&self) -> String {
        let idx: Vec<String> = self.locator.index_path.iter().map(usize::to_string).collect();
        format!("{}[{}]", self.locator.layer_path, idx.join(","))
    }
}
