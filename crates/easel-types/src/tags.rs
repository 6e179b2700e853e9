//! The `@mcp:key=value` tag grammar.
//!
//! Tags annotate items through their name and note fields:
//!
//! ```text
//! item.name = "Panel A @mcp:role=header @mcp:order=1"
//! ```
//!
//! Tokens are terminated by whitespace or the next `@`. Parsing is
//! order-independent and idempotent: parsing the emitted form yields
//! the same map.
//!
//! Stable identity markers are a special case of the grammar: the
//! current form is `@mcp:id=<token>`; the legacy form `mcp-id:<token>`
//! is still read but never written.

use std::collections::BTreeMap;

/// Parsed tag set. A `BTreeMap` so emission is deterministic.
pub type TagMap = BTreeMap<String, String>;

const TAG_PREFIX: &str = "@mcp:";
const LEGACY_ID_PREFIX: &str = "mcp-id:";
const ID_KEY: &str = "id";

/// Parses every `@mcp:key=value` token in `text`.
///
/// Malformed tokens (missing `=`, empty key or value) are skipped.
#[must_use]
pub fn parse_tokens(text: &str) -> TagMap {
    let mut tags = TagMap::new();
    let mut rest = text;
    while let Some(start) = rest.find(TAG_PREFIX) {
        let body = &rest[start + TAG_PREFIX.len()..];
        let end = body
            .find(|c: char| c.is_whitespace() || c == '@')
            .unwrap_or(body.len());
        let token = &body[..end];
        if let Some((key, value)) = token.split_once('=') {
            if !key.is_empty() && !value.is_empty() {
                tags.insert(key.to_string(), value.to_string());
            }
        }
        rest = &body[end..];
    }
    tags
}

/// Parses tags from an item's name and note; note tokens win.
#[must_use]
pub fn parse_tags(name: &str, note: &str) -> TagMap {
    let mut tags = parse_tokens(name);
    tags.extend(parse_tokens(note));
    tags
}

/// Emits a tag map back into token form, keys sorted.
#[must_use]
pub fn emit_tokens(tags: &TagMap) -> String {
    tags.iter()
        .map(|(k, v)| format!("{TAG_PREFIX}{k}={v}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reads a stable id marker from a note field.
///
/// Accepts both the namespaced tag (`@mcp:id=<token>`) and the legacy
/// `mcp-id:<token>` form; the namespaced form wins when both exist.
#[must_use]
pub fn read_id_marker(note: &str) -> Option<String> {
    if let Some(id) = parse_tokens(note).remove(ID_KEY) {
        return Some(id);
    }
    let start = note.find(LEGACY_ID_PREFIX)?;
    let body = &note[start + LEGACY_ID_PREFIX.len()..];
    let end = body
        .find(|c: char| c.is_whitespace() || c == '@')
        .unwrap_or(body.len());
    let token = &body[..end];
    (!token.is_empty()).then(|| token.to_string())
}

/// Removes every id marker (both forms) from a note, preserving the
/// remaining text.
#[must_use]
pub fn strip_id_markers(note: &str) -> String {
    let mut out = String::with_capacity(note.len());
    let mut rest = note;
    loop {
        let tag_pos = rest.find(&format!("{TAG_PREFIX}{ID_KEY}="));
        let legacy_pos = rest.find(LEGACY_ID_PREFIX);
        let (pos, prefix_len) = match (tag_pos, legacy_pos) {
            (Some(t), Some(l)) if t <= l => (t, TAG_PREFIX.len() + ID_KEY.len() + 1),
            (_, Some(l)) => (l, LEGACY_ID_PREFIX.len()),
            (Some(t), None) => (t, TAG_PREFIX.len() + ID_KEY.len() + 1),
            (None, None) => break,
        };
        out.push_str(&rest[..pos]);
        let body = &rest[pos + prefix_len..];
        let end = body
            .find(|c: char| c.is_whitespace() || c == '@')
            .unwrap_or(body.len());
        // Swallow one trailing space so markers vanish without leaving gaps.
        let mut tail = &body[end..];
        if let Some(stripped) = tail.strip_prefix(' ') {
            tail = stripped;
        }
        rest = tail;
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Writes `id` into a note, stripping any prior marker of either form
/// and prepending the namespaced tag.
#[must_use]
pub fn write_id_marker(note: &str, id: &str) -> String {
    let remainder = strip_id_markers(note);
    if remainder.is_empty() {
        format!("{TAG_PREFIX}{ID_KEY}={id}")
    } else {
        format!("{TAG_PREFIX}{ID_KEY}={id} {remainder}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tokens_terminated_by_whitespace_or_at() {
        let tags = parse_tokens("Panel A @mcp:role=header@mcp:order=1 tail");
        assert_eq!(tags.get("role").unwrap(), "header");
        assert_eq!(tags.get("order").unwrap(), "1");
        assert_eq!(tags.len(), 2);
    }

    #[test]
    fn note_tokens_override_name_tokens() {
        let tags = parse_tags("@mcp:role=header", "@mcp:role=footer @mcp:x=1");
        assert_eq!(tags.get("role").unwrap(), "footer");
        assert_eq!(tags.get("x").unwrap(), "1");
    }

    #[test]
    fn malformed_tokens_are_skipped() {
        let tags = parse_tokens("@mcp:novalue= @mcp:=x @mcp:plain @mcp:ok=1");
        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("ok").unwrap(), "1");
    }

    #[test]
    fn emit_then_parse_round_trips() {
        let mut tags = TagMap::new();
        tags.insert("role".into(), "header".into());
        tags.insert("order".into(), "2".into());
        let emitted = emit_tokens(&tags);
        assert_eq!(parse_tokens(&emitted), tags);
    }

    #[test]
    fn parse_is_idempotent_on_repeated_application() {
        let text = "@mcp:a=1 @mcp:b=2";
        let once = parse_tokens(text);
        let twice = parse_tokens(&emit_tokens(&once));
        assert_eq!(once, twice);
    }

    #[test]
    fn reads_both_id_marker_forms() {
        assert_eq!(read_id_marker("mcp-id:legacy_1 rest").unwrap(), "legacy_1");
        assert_eq!(read_id_marker("@mcp:id=new_1 rest").unwrap(), "new_1");
        // Namespaced form wins.
        assert_eq!(
            read_id_marker("mcp-id:old @mcp:id=new").unwrap(),
            "new"
        );
        assert!(read_id_marker("no markers here").is_none());
    }

    #[test]
    fn write_strips_prior_markers_of_either_form() {
        let note = "mcp-id:old_1 keep this @mcp:id=old_2";
        let written = write_id_marker(note, "fresh");
        assert_eq!(written, "@mcp:id=fresh keep this");
        assert_eq!(read_id_marker(&written).unwrap(), "fresh");
    }

    #[test]
    fn writing_twice_is_observationally_single_write() {
        let once = write_id_marker("some note", "mcp_1_0001");
        let twice = write_id_marker(&once, "mcp_1_0001");
        assert_eq!(once, twice);
    }

    #[test]
    fn non_id_tags_survive_id_rewrite() {
        let note = "@mcp:role=header @mcp:id=old";
        let written = write_id_marker(note, "new");
        let tags = parse_tokens(&written);
        assert_eq!(tags.get("role").unwrap(), "header");
        assert_eq!(tags.get("id").unwrap(), "new");
    }
}
