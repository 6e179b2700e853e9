//! Grid placement by visible-bounds deltas.
//!
//! Items are positioned by where they *paint*, not by their anchor:
//! translation deltas come from visible bounds, so stroked shapes and
//! clipping groups land at the expected visual position.

use easel_doc::{Document, GeometryPolicy, ItemId};

/// Options for [`arrange_grid`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    /// Items per row; a new row starts after this many.
    pub columns: usize,
    /// Horizontal gap between visible bounds, points.
    pub gap_x: f64,
    /// Vertical gap between rows, points.
    pub gap_y: f64,
    /// Top-left corner of the grid `(x, y)` in host coordinates.
    pub origin: (f64, f64),
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            columns: 3,
            gap_x: 10.0,
            gap_y: 10.0,
            origin: (0.0, 0.0),
        }
    }
}

/// Lays items out row-then-column from the origin.
///
/// Each row's height is the tallest visible bounds in it; the next row
/// starts below by that height plus `gap_y`. Returns the number of
/// items moved.
pub fn arrange_grid(
    doc: &mut Document,
    items: &[ItemId],
    opts: &GridOptions,
    policy: &GeometryPolicy,
) -> usize {
    let columns = opts.columns.max(1);
    let (origin_x, origin_y) = opts.origin;
    let mut cursor_x = origin_x;
    let mut cursor_y = origin_y;
    let mut row_height = 0.0f64;
    let mut moved = 0;

    for (i, &item) in items.iter().enumerate() {
        if i > 0 && i % columns == 0 {
            cursor_x = origin_x;
            cursor_y -= row_height + opts.gap_y;
            row_height = 0.0;
        }
        let vb = doc.visible_bounds(item, policy);
        doc.translate(item, cursor_x - vb.left, cursor_y - vb.top);
        cursor_x += vb.width() + opts.gap_x;
        row_height = row_height.max(vb.height());
        moved += 1;
    }
    moved
}
