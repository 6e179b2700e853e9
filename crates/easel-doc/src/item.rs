//! Item nodes and their kinds.

use serde::{Deserialize, Serialize};

/// Handle to one item in a [`Document`](crate::Document) arena.
///
/// Valid only for the document that issued it, and only for the
/// duration of one invocation; the host may restructure the tree
/// between calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub(crate) usize);

impl ItemId {
    /// Raw arena index, for diagnostics only.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "item:{}", self.0)
    }
}

/// What an item is, mirroring the host's typenames.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// Vector path. `stroke_width` is zero for unstroked paths.
    Path { stroke_width: f64 },
    /// Text frame.
    Text,
    /// Container. When `clipped`, the first child is the mask and the
    /// visible content is the intersection of the mask and the rest.
    Group { clipped: bool },
    /// Linked artwork.
    Placed,
    /// Embedded raster image.
    Raster,
}

impl ItemKind {
    /// Host typename (`PathItem`, `TextFrame`, ...).
    #[must_use]
    pub fn typename(&self) -> &'static str {
        match self {
            Self::Path { .. } => "PathItem",
            Self::Text => "TextFrame",
            Self::Group { .. } => "GroupItem",
            Self::Placed => "PlacedItem",
            Self::Raster => "RasterItem",
        }
    }

    /// Returns `true` for container kinds.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group { .. })
    }
}

/// Where an item hangs in the tree.
///
/// The layer variant is the typed root sentinel: every parent chain
/// ends here, so upward walks terminate by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parent {
    /// Direct child of a layer.
    Layer(crate::document::LayerId),
    /// Child of a group item.
    Item(ItemId),
}
