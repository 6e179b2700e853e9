//! Standard target resolution.
//!
//! Resolution is recursive and purely structural: each variant maps to
//! a read-only walk of the document, and `compound` concatenates its
//! sub-targets in declaration order. The selector-level exclusion and
//! ordering are *not* applied here; the executor applies them exactly
//! once, after resolution.

use crate::failure::StageFailure;
use easel_doc::{Document, ItemId};
use easel_types::Target;

/// Resolves one target to its candidate items, in host order.
///
/// This is the standard `collect` callable for
/// [`Executor::execute_task`](crate::Executor::execute_task).
///
/// # Errors
///
/// Fails when a named layer does not exist or a compound sub-target
/// fails; the executor records the failure as `R001`.
pub fn collect_targets(doc: &Document, target: &Target) -> Result<Vec<ItemId>, StageFailure> {
    match target {
        Target::Selection => Ok(doc.selection().to_vec()),
        Target::All { recursive } => Ok(doc.all_items(*recursive)),
        Target::Layer { layer, recursive } => {
            let id = doc
                .layer_by_name(layer)
                .ok_or_else(|| StageFailure::new(format!("layer not found: {layer}")))?;
            Ok(doc.layer_items(id, *recursive))
        }
        Target::Query {
            item_type,
            pattern,
            layer,
            recursive,
        } => {
            let layers: Vec<_> = match layer {
                Some(name) => {
                    let id = doc
                        .layer_by_name(name)
                        .ok_or_else(|| StageFailure::new(format!("layer not found: {name}")))?;
                    vec![id]
                }
                None => doc.layers().collect(),
            };
            let mut out = Vec::new();
            for layer_id in layers {
                for item in doc.layer_items(layer_id, *recursive) {
                    if let Some(wanted) = item_type {
                        if doc.typename(item) != wanted {
                            continue;
                        }
                    }
                    if let Some(pat) = pattern {
                        if !wildcard_match(pat, doc.item_name(item)) {
                            continue;
                        }
                    }
                    out.push(item);
                }
            }
            Ok(out)
        }
        Target::Compound { any_of, exclude } => {
            let mut out = Vec::new();
            for sub in any_of {
                out.extend(collect_targets(doc, sub)?);
            }
            // Union semantics: first occurrence wins.
            let mut seen = std::collections::HashSet::new();
            out.retain(|&id| seen.insert(id));
            if let Some(filter) = exclude {
                out = crate::ordering::apply_exclude(doc, &out, filter);
            }
            Ok(out)
        }
    }
}

/// Anchored wildcard match: `*` matches any run, `?` one character.
#[must_use]
pub fn wildcard_match(pattern: &str, text: &str) -> bool {
    fn matches(p: &[char], t: &[char]) -> bool {
        match p.split_first() {
            None => t.is_empty(),
            Some(('*', rest)) => {
                (0..=t.len()).any(|skip| matches(rest, &t[skip..]))
            }
            Some(('?', rest)) => match t.split_first() {
                Some((_, t_rest)) => matches(rest, t_rest),
                None => false,
            },
            Some((c, rest)) => match t.split_first() {
                Some((tc, t_rest)) => tc == c && matches(rest, t_rest),
                None => false,
            },
        }
    }
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    matches(&p, &t)
}

/// Validates a target's type-specific required fields.
///
/// Returns a human message naming the defect; the executor maps it to
/// `V006`/`V004` during payload validation.
pub(crate) fn validate_target(target: &Target) -> Result<(), String> {
    match target {
        Target::Selection | Target::All { .. } => Ok(()),
        Target::Layer { layer, .. } => {
            if layer.is_empty() {
                Err("layer target requires a non-empty layer name".into())
            } else {
                Ok(())
            }
        }
        Target::Query {
            item_type,
            pattern,
            layer,
            ..
        } => {
            if item_type.is_none() && pattern.is_none() && layer.is_none() {
                Err("query target requires at least one filter (itemType, pattern, or layer)".into())
            } else {
                Ok(())
            }
        }
        Target::Compound { any_of, .. } => {
            if any_of.is_empty() {
                return Err("compound target requires a non-empty anyOf".into());
            }
            for sub in any_of {
                if matches!(sub, Target::Compound { .. }) {
                    return Err("compound targets cannot nest compound sub-targets".into());
                }
                validate_target(sub)?;
            }
            Ok(())
        }
    }
}
