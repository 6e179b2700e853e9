//! Visible bounds and unit conversion.
//!
//! Geometric bounds describe the path outline; visible bounds add the
//! painted extent (half the stroke width per side). For clipping groups
//! the host's native `visibleBounds` reports the *content* bounds, not
//! the clipped extent; [`GeometryPolicy`] decides which answer callers
//! get.

use crate::bounds::Bounds;
use crate::document::Document;
use crate::item::{ItemId, ItemKind};

/// Points per millimetre, exact.
pub const POINTS_PER_MM: f64 = 2.834_645_67;

/// Converts millimetres to points.
#[must_use]
pub fn mm_to_points(mm: f64) -> f64 {
    mm * POINTS_PER_MM
}

/// Converts points to millimetres.
#[must_use]
pub fn points_to_mm(points: f64) -> f64 {
    points / POINTS_PER_MM
}

/// Policy switches for bounds computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryPolicy {
    /// When `true` (default), a clipping group reports its mask's
    /// geometric bounds, the visually correct extent. When `false`,
    /// it reports the union of its content, matching the host's native
    /// `visibleBounds`.
    pub use_mask_bounds_for_clipped_groups: bool,
}

impl Default for GeometryPolicy {
    fn default() -> Self {
        Self {
            use_mask_bounds_for_clipped_groups: true,
        }
    }
}

impl Document {
    /// Painted extent of an item.
    ///
    /// - Stroked paths: geometric bounds expanded by half the stroke
    ///   width on every side.
    /// - Clipping groups: per [`GeometryPolicy`].
    /// - Plain groups: union of the children's visible bounds.
    /// - Everything else: geometric bounds.
    #[must_use]
    pub fn visible_bounds(&self, id: ItemId, policy: &GeometryPolicy) -> Bounds {
        match self.kind(id) {
            ItemKind::Path { stroke_width } if *stroke_width > 0.0 => {
                self.geometric_bounds(id).expand(stroke_width / 2.0)
            }
            ItemKind::Group { clipped } => {
                let children = self.children(id);
                if *clipped && policy.use_mask_bounds_for_clipped_groups {
                    match children.first() {
                        Some(&mask) => self.geometric_bounds(mask),
                        None => self.geometric_bounds(id),
                    }
                } else if children.is_empty() {
                    self.geometric_bounds(id)
                } else {
                    let mut acc = self.visible_bounds(children[0], policy);
                    for &child in &children[1..] {
                        acc = acc.union(&self.visible_bounds(child, policy));
                    }
                    acc
                }
            }
            _ => self.geometric_bounds(id),
        }
    }
}
