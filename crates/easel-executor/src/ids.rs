//! Stable identity assignment under an [`IdPolicy`].

use easel_doc::{Document, ItemId};
use easel_types::tags;
use easel_types::IdPolicy;
use rand::Rng;

/// Outcome of one item's identity pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAssignment {
    pub item: ItemId,
    /// The id now associated with the item, old or new.
    pub item_id: Option<String>,
    /// `true` when this pass wrote a new marker.
    pub assigned: bool,
    /// `true` when `Always` replaced an id that already existed.
    pub conflict: bool,
}

/// Mints a fresh id: `mcp_<ms-timestamp>_<4-digit-random>`.
#[must_use]
pub fn mint_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u16 = rand::thread_rng().gen_range(0..10_000);
    format!("mcp_{millis}_{suffix:04}")
}

/// Applies the id policy to a collected item sequence.
///
/// Marker writes go through the note field and use only the namespaced
/// `@mcp:id=` form, stripping prior markers of either form. A write
/// rejected by the host (locked item) degrades to `assigned: false`
/// without aborting the pass.
#[must_use]
pub fn assign_ids(doc: &mut Document, items: &[ItemId], policy: IdPolicy) -> Vec<IdAssignment> {
    if policy == IdPolicy::None {
        return Vec::new();
    }

    items
        .iter()
        .map(|&item| {
            let existing = tags::read_id_marker(doc.note(item));
            match policy {
                IdPolicy::None => unreachable!("handled above"),
                IdPolicy::Preserve => IdAssignment {
                    item,
                    item_id: existing,
                    assigned: false,
                    conflict: false,
                },
                IdPolicy::OptIn => {
                    if existing.is_some() {
                        IdAssignment {
                            item,
                            item_id: existing,
                            assigned: false,
                            conflict: false,
                        }
                    } else {
                        write_marker(doc, item, existing, false)
                    }
                }
                IdPolicy::Always => {
                    let conflict = existing.is_some();
                    write_marker(doc, item, existing, conflict)
                }
            }
        })
        .collect()
}

fn write_marker(
    doc: &mut Document,
    item: ItemId,
    existing: Option<String>,
    conflict: bool,
) -> IdAssignment {
    let fresh = mint_id();
    let note = tags::write_id_marker(doc.note(item), &fresh);
    match doc.set_note(item, note) {
        Ok(()) => IdAssignment {
            item,
            item_id: Some(fresh),
            assigned: true,
            conflict,
        },
        Err(err) => {
            tracing::debug!(%item, error = %err, "id write degraded");
            IdAssignment {
                item,
                item_id: existing,
                assigned: false,
                conflict,
            }
        }
    }
}
