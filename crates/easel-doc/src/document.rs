//! The document: layers, an item arena, and a selection.

use crate::bounds::Bounds;
use crate::item::{ItemId, ItemKind, Parent};
use thiserror::Error;

/// Errors from document operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocError {
    /// Named layer does not exist.
    #[error("layer not found: {0}")]
    LayerNotFound(String),

    /// Tried to add a child to a non-container item.
    #[error("item {0} is not a group")]
    NotAGroup(ItemId),

    /// Write rejected because the item is locked.
    #[error("item {0} is locked")]
    ItemLocked(ItemId),
}

/// Handle to one layer of a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LayerId(pub(crate) usize);

/// A document layer. `items` holds direct children in stacking order,
/// index 0 being backmost.
#[derive(Debug)]
pub struct Layer {
    name: String,
    pub visible: bool,
    pub locked: bool,
    items: Vec<ItemId>,
}

impl Layer {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct children in stacking order.
    #[must_use]
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }
}

#[derive(Debug)]
struct ItemNode {
    kind: ItemKind,
    name: String,
    note: String,
    locked: bool,
    hidden: bool,
    guide: bool,
    /// Leaf geometry; containers derive theirs from children.
    bounds: Bounds,
    parent: Parent,
    children: Vec<ItemId>,
}

/// An in-memory document tree.
///
/// Mirrors the host's model: layers contain items, groups contain
/// items, a clipping group's first child is its mask. All handles are
/// issued by this document and remain valid for its lifetime (items are
/// never removed from the arena mid-invocation).
#[derive(Debug)]
pub struct Document {
    name: String,
    artboard: Bounds,
    layers: Vec<Layer>,
    nodes: Vec<ItemNode>,
    selection: Vec<ItemId>,
}

impl Document {
    /// Creates an empty document with a US-letter artboard.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            artboard: Bounds::new(0.0, 792.0, 612.0, 0.0),
            layers: Vec::new(),
            nodes: Vec::new(),
            selection: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn artboard(&self) -> Bounds {
        self.artboard
    }

    pub fn set_artboard(&mut self, artboard: Bounds) {
        self.artboard = artboard;
    }

    // === Layers ===

    /// Appends a layer (frontmost) and returns its handle.
    pub fn add_layer(&mut self, name: impl Into<String>) -> LayerId {
        self.layers.push(Layer {
            name: name.into(),
            visible: true,
            locked: false,
            items: Vec::new(),
        });
        LayerId(self.layers.len() - 1)
    }

    #[must_use]
    pub fn layer(&self, id: LayerId) -> &Layer {
        &self.layers[id.0]
    }

    /// Finds a layer by exact name.
    #[must_use]
    pub fn layer_by_name(&self, name: &str) -> Option<LayerId> {
        self.layers
            .iter()
            .position(|l| l.name == name)
            .map(LayerId)
    }

    /// All layers in stacking order.
    pub fn layers(&self) -> impl Iterator<Item = LayerId> + '_ {
        (0..self.layers.len()).map(LayerId)
    }

    // === Item construction ===

    /// Adds a top-level item to a layer.
    pub fn add_item(
        &mut self,
        layer: LayerId,
        kind: ItemKind,
        name: impl Into<String>,
        bounds: Bounds,
    ) -> ItemId {
        let id = self.push_node(kind, name.into(), bounds, Parent::Layer(layer));
        self.layers[layer.0].items.push(id);
        id
    }

    /// Adds a child to a group item.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::NotAGroup`] when `group` is not a container.
    pub fn add_child(
        &mut self,
        group: ItemId,
        kind: ItemKind,
        name: impl Into<String>,
        bounds: Bounds,
    ) -> Result<ItemId, DocError> {
        if !self.nodes[group.0].kind.is_group() {
            return Err(DocError::NotAGroup(group));
        }
        let id = self.push_node(kind, name.into(), bounds, Parent::Item(group));
        self.nodes[group.0].children.push(id);
        Ok(id)
    }

    fn push_node(&mut self, kind: ItemKind, name: String, bounds: Bounds, parent: Parent) -> ItemId {
        self.nodes.push(ItemNode {
            kind,
            name,
            note: String::new(),
            locked: false,
            hidden: false,
            guide: false,
            bounds,
            parent,
            children: Vec::new(),
        });
        ItemId(self.nodes.len() - 1)
    }

    // === Item accessors ===

    #[must_use]
    pub fn kind(&self, id: ItemId) -> &ItemKind {
        &self.nodes[id.0].kind
    }

    #[must_use]
    pub fn typename(&self, id: ItemId) -> &'static str {
        self.nodes[id.0].kind.typename()
    }

    #[must_use]
    pub fn item_name(&self, id: ItemId) -> &str {
        &self.nodes[id.0].name
    }

    #[must_use]
    pub fn note(&self, id: ItemId) -> &str {
        &self.nodes[id.0].note
    }

    #[must_use]
    pub fn is_locked(&self, id: ItemId) -> bool {
        self.nodes[id.0].locked
    }

    #[must_use]
    pub fn is_hidden(&self, id: ItemId) -> bool {
        self.nodes[id.0].hidden
    }

    #[must_use]
    pub fn is_guide(&self, id: ItemId) -> bool {
        self.nodes[id.0].guide
    }

    #[must_use]
    pub fn parent(&self, id: ItemId) -> Parent {
        self.nodes[id.0].parent
    }

    /// Direct children, empty for non-containers.
    #[must_use]
    pub fn children(&self, id: ItemId) -> &[ItemId] {
        &self.nodes[id.0].children
    }

    /// Geometric bounds: stored for leaves, derived (union of children)
    /// for containers.
    #[must_use]
    pub fn geometric_bounds(&self, id: ItemId) -> Bounds {
        let node = &self.nodes[id.0];
        if node.kind.is_group() && !node.children.is_empty() {
            let mut acc = self.geometric_bounds(node.children[0]);
            for &child in &node.children[1..] {
                acc = acc.union(&self.geometric_bounds(child));
            }
            acc
        } else {
            node.bounds
        }
    }

    // === Item mutation ===

    pub fn set_item_name(&mut self, id: ItemId, name: impl Into<String>) {
        self.nodes[id.0].name = name.into();
    }

    /// Writes the note field.
    ///
    /// # Errors
    ///
    /// Returns [`DocError::ItemLocked`] when the item is locked, like
    /// the host does.
    pub fn set_note(&mut self, id: ItemId, note: impl Into<String>) -> Result<(), DocError> {
        if self.nodes[id.0].locked {
            return Err(DocError::ItemLocked(id));
        }
        self.nodes[id.0].note = note.into();
        Ok(())
    }

    pub fn set_locked(&mut self, id: ItemId, locked: bool) {
        self.nodes[id.0].locked = locked;
    }

    pub fn set_hidden(&mut self, id: ItemId, hidden: bool) {
        self.nodes[id.0].hidden = hidden;
    }

    pub fn set_guide(&mut self, id: ItemId, guide: bool) {
        self.nodes[id.0].guide = guide;
    }

    /// Replaces a leaf item's geometric bounds.
    pub fn set_bounds(&mut self, id: ItemId, bounds: Bounds) {
        self.nodes[id.0].bounds = bounds;
    }

    /// Translates an item (recursively for containers).
    pub fn translate(&mut self, id: ItemId, dx: f64, dy: f64) {
        let children = self.nodes[id.0].children.clone();
        if children.is_empty() {
            let b = self.nodes[id.0].bounds;
            self.nodes[id.0].bounds = b.translated(dx, dy);
        } else {
            for child in children {
                self.translate(child, dx, dy);
            }
        }
    }

    /// Scales an item about `(ox, oy)` (recursively for containers).
    ///
    /// Stroke widths scale by the mean factor, matching the host's
    /// scale-strokes behavior, so visible bounds scale with geometry.
    pub fn scale(&mut self, id: ItemId, sx: f64, sy: f64, ox: f64, oy: f64) {
        let children = self.nodes[id.0].children.clone();
        if children.is_empty() {
            let node = &mut self.nodes[id.0];
            let b = node.bounds;
            node.bounds = Bounds {
                left: ox + (b.left - ox) * sx,
                right: ox + (b.right - ox) * sx,
                top: oy + (b.top - oy) * sy,
                bottom: oy + (b.bottom - oy) * sy,
            };
            if let ItemKind::Path { stroke_width } = &mut node.kind {
                *stroke_width *= (sx.abs() + sy.abs()) / 2.0;
            }
        } else {
            for child in children {
                self.scale(child, sx, sy, ox, oy);
            }
        }
    }

    // === Selection ===

    /// Replaces the selection; order is preserved.
    pub fn select(&mut self, items: &[ItemId]) {
        self.selection = items.to_vec();
    }

    /// Current selection snapshot, in selection order.
    #[must_use]
    pub fn selection(&self) -> &[ItemId] {
        &self.selection
    }

    // === Traversal ===

    /// Items of one layer in stacking order.
    ///
    /// Non-recursive returns direct children only. Recursive flattens
    /// depth-first: each group is followed immediately by its contents.
    #[must_use]
    pub fn layer_items(&self, layer: LayerId, recursive: bool) -> Vec<ItemId> {
        let mut out = Vec::new();
        for &id in &self.layers[layer.0].items {
            self.collect_subtree(id, recursive, &mut out);
        }
        out
    }

    /// Items of every layer, in layer stacking order.
    #[must_use]
    pub fn all_items(&self, recursive: bool) -> Vec<ItemId> {
        let mut out = Vec::new();
        for layer in self.layers() {
            out.extend(self.layer_items(layer, recursive));
        }
        out
    }

    fn collect_subtree(&self, id: ItemId, recursive: bool, out: &mut Vec<ItemId>) {
        out.push(id);
        if recursive {
            for &child in &self.nodes[id.0].children {
                self.collect_subtree(child, recursive, out);
            }
        }
    }

    /// The layer an item ultimately belongs to.
    #[must_use]
    pub fn layer_of(&self, id: ItemId) -> LayerId {
        let mut current = id;
        loop {
            match self.nodes[current.0].parent {
                Parent::Layer(layer) => return layer,
                Parent::Item(parent) => current = parent,
            }
        }
    }

    /// Returns `true` if any ancestor is a clipping group.
    ///
    /// The mask path itself counts: it lives inside the clipping group.
    #[must_use]
    pub fn has_clipped_ancestor(&self, id: ItemId) -> bool {
        let mut current = id;
        while let Parent::Item(parent) = self.nodes[current.0].parent {
            if matches!(self.nodes[parent.0].kind, ItemKind::Group { clipped: true }) {
                return true;
            }
            current = parent;
        }
        false
    }

    /// Returns `true` if `id` is the mask (first child) of a clipping group.
    #[must_use]
    pub fn is_clipping_mask(&self, id: ItemId) -> bool {
        match self.nodes[id.0].parent {
            Parent::Item(parent) => {
                matches!(self.nodes[parent.0].kind, ItemKind::Group { clipped: true })
                    && self.nodes[parent.0].children.first() == Some(&id)
            }
            Parent::Layer(_) => false,
        }
    }

    // === Locators ===

    /// `/`-joined container chain, outermost first.
    ///
    /// The layer name leads; named ancestor groups follow (typename for
    /// unnamed groups), e.g. `"Layer 1/Group A"`.
    #[must_use]
    pub fn layer_path(&self, id: ItemId) -> String {
        let mut segments = Vec::new();
        let mut current = id;
        loop {
            match self.nodes[current.0].parent {
                Parent::Layer(layer) => {
                    segments.push(self.layers[layer.0].name.clone());
                    break;
                }
                Parent::Item(parent) => {
                    let node = &self.nodes[parent.0];
                    let segment = if node.name.is_empty() {
                        node.kind.typename().to_string()
                    } else {
                        node.name.clone()
                    };
                    segments.push(segment);
                    current = parent;
                }
            }
        }
        segments.reverse();
        segments.join("/")
    }

    /// Positional index at each container level, outermost first.
    ///
    /// Each step is found by linear scan of the parent's collection.
    #[must_use]
    pub fn index_path(&self, id: ItemId) -> Vec<usize> {
        let mut path = Vec::new();
        let mut current = id;
        loop {
            match self.nodes[current.0].parent {
                Parent::Layer(layer) => {
                    let idx = self.layers[layer.0]
                        .items
                        .iter()
                        .position(|&i| i == current)
                        .unwrap_or(0);
                    path.push(idx);
                    break;
                }
                Parent::Item(parent) => {
                    let idx = self.nodes[parent.0]
                        .children
                        .iter()
                        .position(|&i| i == current)
                        .unwrap_or(0);
                    path.push(idx);
                    current = parent;
                }
            }
        }
        path.reverse();
        path
    }
}
