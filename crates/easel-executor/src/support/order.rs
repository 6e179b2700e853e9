//! Spatial ordering for selections.
//!
//! Unlike the executor's 10-unit `orderBy` buckets, interactive
//! selection ordering clusters with a 5-unit tolerance: rows (or
//! columns) grow greedily while items stay within tolerance of the
//! cluster's reference edge, which stops nominal same-row items from
//! jittering across runs.

use easel_doc::{Document, GeometryPolicy, ItemId};

/// Cluster tolerance in points.
pub const SPATIAL_TOLERANCE: f64 = 5.0;

/// Row-major: visual top row first, left-to-right within a row.
#[must_use]
pub fn sort_row_major(doc: &Document, items: &[ItemId], policy: &GeometryPolicy) -> Vec<ItemId> {
    sort_clustered(
        doc,
        items,
        policy,
        |b| -b.top,
        |b| b.left,
    )
}

/// Column-major: leftmost column first, top-to-bottom within a column.
#[must_use]
pub fn sort_column_major(doc: &Document, items: &[ItemId], policy: &GeometryPolicy) -> Vec<ItemId> {
    sort_clustered(
        doc,
        items,
        policy,
        |b| b.left,
        |b| -b.top,
    )
}

fn sort_clustered(
    doc: &Document,
    items: &[ItemId],
    policy: &GeometryPolicy,
    primary: impl Fn(&easel_doc::Bounds) -> f64,
    secondary: impl Fn(&easel_doc::Bounds) -> f64,
) -> Vec<ItemId> {
    let mut keyed: Vec<(ItemId, f64, f64)> = items
        .iter()
        .map(|&id| {
            let b = doc.visible_bounds(id, policy);
            (id, primary(&b), secondary(&b))
        })
        .collect();

    // Cluster on the primary axis with the tolerance window.
    keyed.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
    let mut cluster = 0usize;
    let mut reference = f64::NEG_INFINITY;
    let mut clustered: Vec<(ItemId, usize, f64)> = Vec::with_capacity(keyed.len());
    for (id, p, s) in keyed {
        if p - reference > SPATIAL_TOLERANCE {
            cluster += 1;
            reference = p;
        }
        clustered.push((id, cluster, s));
    }

    clustered.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
    });
    clustered.into_iter().map(|(id, _, _)| id).collect()
}
