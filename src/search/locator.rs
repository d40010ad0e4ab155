//! Locator: find pattern occurrences across the text leaves of a tree.
//!
//! Leaves are snapshotted in document order before any matching happens, then
//! each leaf's text is scanned left to right. Sequence indices fall out of
//! discovery order, which is document order.

use super::pattern::CompiledPattern;
use crate::document_model::{DocumentTree, Match, NodeId};
use crate::error::Result;

/// Element tags whose text is never searched.
pub const EXCLUDED_TAGS: &[&str] = &["script", "style", "noscript", "iframe", "object", "embed"];

/// Compile `pattern` with `flags` and locate it under `root`.
///
/// A malformed pattern fails before the tree is touched.
pub fn locate(
    tree: &DocumentTree,
    root: NodeId,
    pattern: &str,
    flags: &str,
    max_matches: usize,
) -> Result<Vec<Match>> {
    let compiled = CompiledPattern::new(pattern, flags)?;
    Ok(locate_compiled(tree, root, &compiled, max_matches))
}

pub fn locate_compiled(
    tree: &DocumentTree,
    root: NodeId,
    pattern: &CompiledPattern,
    max_matches: usize,
) -> Vec<Match> {
    let leaves = searchable_leaves(tree, root);
    let mut matches = Vec::new();

    for leaf in leaves {
        if matches.len() >= max_matches {
            break;
        }
        let Some(text) = tree.text(leaf) else {
            continue;
        };
        scan_leaf(pattern, leaf, text, max_matches, &mut matches);
    }

    log::debug!(
        "located {} matches for /{}/{} (cap {})",
        matches.len(),
        pattern.as_str(),
        pattern.flags(),
        max_matches
    );
    matches
}

/// Text leaves under `root` that are eligible for matching, in document order.
pub fn searchable_leaves(tree: &DocumentTree, root: NodeId) -> Vec<NodeId> {
    tree.descendants(root)
        .into_iter()
        .filter(|&id| is_searchable_leaf(tree, id))
        .collect()
}

fn is_searchable_leaf(tree: &DocumentTree, id: NodeId) -> bool {
    let Some(text) = tree.text(id) else {
        return false;
    };
    if text.trim().is_empty() {
        return false;
    }
    if tree
        .nearest_element_tag(id)
        .is_some_and(|tag| EXCLUDED_TAGS.contains(&tag))
    {
        return false;
    }
    !tree.is_inside_marker(id)
}

fn scan_leaf(
    pattern: &CompiledPattern,
    node: NodeId,
    text: &str,
    max_matches: usize,
    out: &mut Vec<Match>,
) {
    let regex = pattern.regex();
    let mut cursor = 0;

    while cursor <= text.len() && out.len() < max_matches {
        let Some(found) = regex.find_at(text, cursor) else {
            break;
        };

        if found.start() == found.end() {
            // Empty match: step over one whole code point so the scan terminates
            cursor = next_char_boundary(text, found.end());
            continue;
        }

        out.push(Match {
            text: found.as_str().to_string(),
            start_offset: found.start(),
            length: found.len(),
            node,
            sequence_index: out.len(),
        });

        if !pattern.is_global() {
            break;
        }
        cursor = found.end();
    }
}

/// Byte offset just past the code point starting at `pos`, or past the end.
fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| pos + c.len_utf8())
}
