//! Exclusion filtering and deterministic result ordering.
//!
//! Both are applied exactly once per run, by the executor, after the
//! target has fully resolved (including compound sub-targets).

use easel_doc::{Document, GeometryPolicy, ItemId};
use easel_types::{ExcludeFilter, OrderBy};
use std::cmp::Ordering;

/// Row/column bucket size for `reading` and `column` ordering.
const ORDER_BUCKET: f64 = 10.0;

/// Drops items matching any enabled exclusion predicate.
///
/// `clipped` excludes items that live inside a clipping group (mask
/// and content alike), not items that merely *are* masks.
#[must_use]
pub fn apply_exclude(doc: &Document, items: &[ItemId], filter: &ExcludeFilter) -> Vec<ItemId> {
    if filter.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .copied()
        .filter(|&id| {
            !((filter.locked && doc.is_locked(id))
                || (filter.hidden && doc.is_hidden(id))
                || (filter.guides && doc.is_guide(id))
                || (filter.clipped && doc.has_clipped_ancestor(id)))
        })
        .collect()
}

/// Orders items per [`OrderBy`]; every mode is a stable sort over the
/// input sequence, so equal keys keep their host order.
#[must_use]
pub fn sort_items(
    doc: &Document,
    items: &[ItemId],
    order: OrderBy,
    policy: &GeometryPolicy,
) -> Vec<ItemId> {
    let mut out = items.to_vec();
    match order {
        OrderBy::ZOrder => {}
        OrderBy::ZOrderReverse => out.reverse(),
        OrderBy::Reading => out.sort_by(|&a, &b| {
            let (ba, bb) = (doc.visible_bounds(a, policy), doc.visible_bounds(b, policy));
            bucket(bb.top)
                .cmp(&bucket(ba.top))
                .then_with(|| total_cmp(ba.left, bb.left))
        }),
        OrderBy::Column => out.sort_by(|&a, &b| {
            let (ba, bb) = (doc.visible_bounds(a, policy), doc.visible_bounds(b, policy));
            bucket(ba.left)
                .cmp(&bucket(bb.left))
                .then_with(|| total_cmp(bb.top, ba.top))
        }),
        OrderBy::Name => out.sort_by(|&a, &b| doc.item_name(a).cmp(doc.item_name(b))),
        OrderBy::PositionX => out.sort_by(|&a, &b| {
            total_cmp(
                doc.visible_bounds(a, policy).left,
                doc.visible_bounds(b, policy).left,
            )
        }),
        OrderBy::PositionY => out.sort_by(|&a, &b| {
            // Visual top first: host Y grows upward, so descending top.
            total_cmp(
                doc.visible_bounds(b, policy).top,
                doc.visible_bounds(a, policy).top,
            )
        }),
        OrderBy::Area => out.sort_by(|&a, &b| {
            total_cmp(
                doc.visible_bounds(a, policy).area(),
                doc.visible_bounds(b, policy).area(),
            )
        }),
    }
    out
}

fn bucket(value: f64) -> i64 {
    (value / ORDER_BUCKET).floor() as i64
}

fn total_cmp(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}
