//! Building [`ItemRef`]s from live document items.

use easel_doc::{Document, ItemId};
use easel_types::tags;
use easel_types::{IdSource, ItemIdentity, ItemLocator, ItemRef, ItemTags};

/// Builds the complete reference for one item.
///
/// The locator is always computable (layer path plus positional index
/// path). Identity is present iff the note carries an id marker: the
/// namespaced `@mcp:id=` tag or the legacy `mcp-id:` form. Tags come
/// from name and note (note wins); the `id` key is reported through
/// identity, not as a tag.
#[must_use]
pub fn item_ref(doc: &Document, id: ItemId) -> ItemRef {
    let name = doc.item_name(id);
    let note = doc.note(id);

    let item_id = tags::read_id_marker(note);
    let id_source = if item_id.is_some() {
        IdSource::Note
    } else {
        IdSource::None
    };

    let mut tag_map = tags::parse_tags(name, note);
    tag_map.remove("id");

    ItemRef {
        locator: ItemLocator {
            layer_path: doc.layer_path(id),
            index_path: doc.index_path(id),
        },
        identity: ItemIdentity {
            item_id,
            id_source,
        },
        tags: ItemTags { tags: tag_map },
        item_type: doc.typename(id).to_string(),
        item_name: (!name.is_empty()).then(|| name.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use easel_doc::{Bounds, ItemKind};

    #[test]
    fn locator_is_always_computable() {
        let mut doc = Document::new("t");
        let layer = doc.add_layer("Layer 1");
        let item = doc.add_item(
            layer,
            ItemKind::Path { stroke_width: 0.0 },
            "",
            Bounds::default(),
        );
        let r = item_ref(&doc, item);
        assert_eq!(r.locator.layer_path, "Layer 1");
        assert_eq!(r.locator.index_path, vec![0]);
        assert_eq!(r.identity.id_source, IdSource::None);
        assert!(r.item_name.is_none());
    }

    #[test]
    fn identity_present_iff_marker_exists() {
        let mut doc = Document::new("t");
        let layer = doc.add_layer("L1");
        let item = doc.add_item(
            layer,
            ItemKind::Text,
            "label",
            Bounds::default(),
        );
        doc.set_note(item, "mcp-id:test_id_001").unwrap();

        let r = item_ref(&doc, item);
        assert_eq!(r.identity.item_id.as_deref(), Some("test_id_001"));
        assert_eq!(r.identity.id_source, IdSource::Note);
    }

    #[test]
    fn tags_merge_name_and_note_without_id() {
        let mut doc = Document::new("t");
        let layer = doc.add_layer("L1");
        let item = doc.add_item(
            layer,
            ItemKind::Path { stroke_width: 0.0 },
            "Panel @mcp:role=header",
            Bounds::default(),
        );
        doc.set_note(item, "@mcp:id=x1 @mcp:role=footer").unwrap();

        let r = item_ref(&doc, item);
        assert_eq!(r.tags.tags.get("role").unwrap(), "footer");
        assert!(!r.tags.tags.contains_key("id"));
        assert_eq!(r.identity.item_id.as_deref(), Some("x1"));
    }
}
