//! Named grid presets and idempotent slot fitting.

use easel_doc::{Bounds, Document, GeometryPolicy, ItemId};
use thiserror::Error;

/// A named grid: columns × rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GridPreset {
    TwoByTwo,
    ThreeByOne,
    OneByThree,
    TwoByThree,
    ThreeByTwo,
    OneByTwo,
    TwoByOne,
}

/// Unknown preset name.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown grid preset: {0}")]
pub struct UnknownPreset(pub String);

impl GridPreset {
    /// All presets, for listings.
    pub const ALL: [GridPreset; 7] = [
        Self::TwoByTwo,
        Self::ThreeByOne,
        Self::OneByThree,
        Self::TwoByThree,
        Self::ThreeByTwo,
        Self::OneByTwo,
        Self::TwoByOne,
    ];

    /// `(columns, rows)` of the grid.
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        match self {
            Self::TwoByTwo => (2, 2),
            Self::ThreeByOne => (3, 1),
            Self::OneByThree => (1, 3),
            Self::TwoByThree => (2, 3),
            Self::ThreeByTwo => (3, 2),
            Self::OneByTwo => (1, 2),
            Self::TwoByOne => (2, 1),
        }
    }

    /// Canonical name, `"<columns>x<rows>"`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TwoByTwo => "2x2",
            Self::ThreeByOne => "3x1",
            Self::OneByThree => "1x3",
            Self::TwoByThree => "2x3",
            Self::ThreeByTwo => "3x2",
            Self::OneByTwo => "1x2",
            Self::TwoByOne => "2x1",
        }
    }

    /// Outer margin of the preset, points.
    #[must_use]
    pub fn margin(&self) -> f64 {
        36.0
    }

    /// Gutter between slots, points.
    #[must_use]
    pub fn gutter(&self) -> f64 {
        12.0
    }
}

impl std::str::FromStr for GridPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|p| p.name() == s)
            .copied()
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

impl std::fmt::Display for GridPreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// How an item is scaled into a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FitMode {
    /// Uniform scale, fully inside the slot (default).
    #[default]
    Contain,
    /// Uniform scale, fully covering the slot.
    Cover,
    /// Independent axis scales, exactly filling the slot.
    Stretch,
}

/// Absolute slot rectangles for a preset on an artboard.
///
/// Slots are returned row-major, top row first, in host coordinates
/// (Y up: every slot has `top > bottom`).
#[must_use]
pub fn slot_geometry(preset: GridPreset, artboard: Bounds) -> Vec<Bounds> {
    let (columns, rows) = preset.shape();
    let margin = preset.margin();
    let gutter = preset.gutter();

    let inner_w = artboard.width() - 2.0 * margin;
    let inner_h = artboard.height() - 2.0 * margin;
    let slot_w = (inner_w - gutter * (columns as f64 - 1.0)) / columns as f64;
    let slot_h = (inner_h - gutter * (rows as f64 - 1.0)) / rows as f64;

    let mut slots = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for col in 0..columns {
            let left = artboard.left + margin + col as f64 * (slot_w + gutter);
            let top = artboard.top - margin - row as f64 * (slot_h + gutter);
            slots.push(Bounds::from_origin(left, top, slot_w, slot_h));
        }
    }
    slots
}

/// Scales and centers an item into a slot.
///
/// The final anchor position is derived from the item's *post-scale*
/// visible bounds, so applying the same fit twice produces no drift.
pub fn fit_to_slot(
    doc: &mut Document,
    item: ItemId,
    slot: Bounds,
    mode: FitMode,
    policy: &GeometryPolicy,
) {
    let vb = doc.visible_bounds(item, policy);
    if vb.width() <= 0.0 || vb.height() <= 0.0 {
        return;
    }

    let sx = slot.width() / vb.width();
    let sy = slot.height() / vb.height();
    let (sx, sy) = match mode {
        FitMode::Contain => {
            let s = sx.min(sy);
            (s, s)
        }
        FitMode::Cover => {
            let s = sx.max(sy);
            (s, s)
        }
        FitMode::Stretch => (sx, sy),
    };

    let (cx, cy) = vb.center();
    doc.scale(item, sx, sy, cx, cy);

    let scaled = doc.visible_bounds(item, policy);
    let (slot_cx, slot_cy) = slot.center();
    let (scaled_cx, scaled_cy) = scaled.center();
    doc.translate(item, slot_cx - scaled_cx, slot_cy - scaled_cy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_doc::ItemKind;

    fn artboard() -> Bounds {
        Bounds::new(0.0, 792.0, 612.0, 0.0)
    }

    #[test]
    fn preset_names_round_trip() {
        for preset in GridPreset::ALL {
            let parsed: GridPreset = preset.name().parse().unwrap();
            assert_eq!(parsed, preset);
        }
        assert!("4x4".parse::<GridPreset>().is_err());
    }

    #[test]
    fn slot_count_matches_shape() {
        for preset in GridPreset::ALL {
            let (columns, rows) = preset.shape();
            assert_eq!(slot_geometry(preset, artboard()).len(), columns * rows);
        }
    }

    #[test]
    fn slots_are_y_up_and_inside_margins() {
        for slot in slot_geometry(GridPreset::TwoByThree, artboard()) {
            assert!(slot.top > slot.bottom, "host coordinates are Y-up");
            assert!(slot.left >= 36.0);
            assert!(slot.right <= 612.0 - 36.0);
            assert!(slot.top <= 792.0 - 36.0);
            assert!(slot.bottom >= 36.0);
        }
    }

    #[test]
    fn adjacent_slots_are_separated_by_the_gutter() {
        let slots = slot_geometry(GridPreset::TwoByTwo, artboard());
        assert!((slots[1].left - slots[0].right - 12.0).abs() < 1e-9);
        assert!((slots[0].bottom - slots[2].top - 12.0).abs() < 1e-9);
    }

    #[test]
    fn slots_do_not_overlap() {
        let slots = slot_geometry(GridPreset::ThreeByTwo, artboard());
        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                assert!(!a.intersects(b));
            }
        }
    }

    #[test]
    fn fit_contain_is_idempotent() {
        let mut doc = Document::new("t");
        let layer = doc.add_layer("L1");
        let item = doc.add_item(
            layer,
            ItemKind::Path { stroke_width: 0.0 },
            "art",
            Bounds::from_origin(10.0, 700.0, 300.0, 120.0),
        );
        let policy = GeometryPolicy::default();
        let slot = slot_geometry(GridPreset::TwoByTwo, artboard())[0];

        fit_to_slot(&mut doc, item, slot, FitMode::Contain, &policy);
        let first = doc.visible_bounds(item, &policy);
        fit_to_slot(&mut doc, item, slot, FitMode::Contain, &policy);
        let second = doc.visible_bounds(item, &policy);

        assert!(first.approx_eq(&second, 1e-9));
        // Contained: fits inside the slot with preserved aspect.
        assert!(first.width() <= slot.width() + 1e-9);
        assert!(first.height() <= slot.height() + 1e-9);
        let aspect_before = 300.0 / 120.0;
        let aspect_after = first.width() / first.height();
        assert!((aspect_before - aspect_after).abs() < 1e-9);
    }

    #[test]
    fn fit_is_idempotent_for_stroked_items() {
        let mut doc = Document::new("t");
        let layer = doc.add_layer("L1");
        let item = doc.add_item(
            layer,
            ItemKind::Path { stroke_width: 6.0 },
            "stroked",
            Bounds::from_origin(0.0, 500.0, 100.0, 100.0),
        );
        let policy = GeometryPolicy::default();
        let slot = Bounds::from_origin(50.0, 400.0, 200.0, 150.0);

        fit_to_slot(&mut doc, item, slot, FitMode::Contain, &policy);
        let first = doc.visible_bounds(item, &policy);
        fit_to_slot(&mut doc, item, slot, FitMode::Contain, &policy);
        let second = doc.visible_bounds(item, &policy);
        assert!(first.approx_eq(&second, 1e-9));
    }

    #[test]
    fn stretch_fills_the_slot_exactly() {
        let mut doc = Document::new("t");
        let layer = doc.add_layer("L1");
        let item = doc.add_item(
            layer,
            ItemKind::Path { stroke_width: 0.0 },
            "art",
            Bounds::from_origin(0.0, 300.0, 80.0, 20.0),
        );
        let policy = GeometryPolicy::default();
        let slot = Bounds::from_origin(100.0, 200.0, 150.0, 90.0);

        fit_to_slot(&mut doc, item, slot, FitMode::Stretch, &policy);
        assert!(doc.visible_bounds(item, &policy).approx_eq(&slot, 1e-9));
    }

    #[test]
    fn cover_spans_the_slot_on_both_axes() {
        let mut doc = Document::new("t");
        let layer = doc.add_layer("L1");
        let item = doc.add_item(
            layer,
            ItemKind::Path { stroke_width: 0.0 },
            "art",
            Bounds::from_origin(0.0, 300.0, 100.0, 50.0),
        );
        let policy = GeometryPolicy::default();
        let slot = Bounds::from_origin(0.0, 200.0, 100.0, 100.0);

        fit_to_slot(&mut doc, item, slot, FitMode::Cover, &policy);
        let vb = doc.visible_bounds(item, &policy);
        assert!(vb.width() >= slot.width() - 1e-9);
        assert!(vb.height() >= slot.height() - 1e-9);
    }
}
