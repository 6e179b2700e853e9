//! Placed/raster asset analysis.

use easel_doc::{Document, GeometryPolicy, ItemId};

/// Orientation classification with a ±5% dead zone around square.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Landscape,
    Portrait,
    Square,
}

/// Dead zone half-width around an aspect ratio of 1.0.
const SQUARE_DEAD_ZONE: f64 = 0.05;

/// Analysis of one asset's visible extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssetInfo {
    pub width: f64,
    pub height: f64,
    /// `width / height`.
    pub aspect_ratio: f64,
    pub orientation: Orientation,
}

/// Classifies an aspect ratio.
#[must_use]
pub fn classify(aspect_ratio: f64) -> Orientation {
    if (aspect_ratio - 1.0).abs() <= SQUARE_DEAD_ZONE {
        Orientation::Square
    } else if aspect_ratio > 1.0 {
        Orientation::Landscape
    } else {
        Orientation::Portrait
    }
}

/// Measures an item's visible bounds and classifies its orientation.
#[must_use]
pub fn analyze(doc: &Document, item: ItemId, policy: &GeometryPolicy) -> AssetInfo {
    let vb = doc.visible_bounds(item, policy);
    let width = vb.width();
    let height = vb.height();
    let aspect_ratio = if height > 0.0 { width / height } else { 0.0 };
    AssetInfo {
        width,
        height,
        aspect_ratio,
        orientation: classify(aspect_ratio),
    }
}
