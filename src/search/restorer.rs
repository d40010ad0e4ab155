//! Restorer: undo the highlighter's mutation and reset the session.
//!
//! Every leaf the highlighter cut up is put back in front of its pieces with
//! their combined text, then the pieces are released. Text nodes that were
//! already separate before the search stay separate.

use crate::document_model::{DocumentTree, LeafSplit, SearchSession};

/// Undo every recorded split and any stray marker, then reset `session` to
/// idle. Returns how many markers were removed.
///
/// Never fails. Calling it with nothing highlighted is a no-op.
pub fn restore(tree: &mut DocumentTree, session: &mut SearchSession) -> usize {
    let missing = session
        .markers
        .iter()
        .filter(|p| !tree.is_attached(p.marker))
        .count();
    if missing > 0 {
        log::warn!("{missing} markers were removed by someone else; skipped");
    }

    let mut removed = 0;
    for split in std::mem::take(&mut session.splits) {
        removed += rejoin(tree, split);
    }
    removed += unwrap_markers(tree);
    *session = SearchSession::new();
    removed
}

/// Put `split.leaf` back where its pieces are, holding the pieces' current
/// text with markers read as their original text.
fn rejoin(tree: &mut DocumentTree, split: LeafSplit) -> usize {
    let parent = split
        .fragments
        .iter()
        .find(|&&f| tree.is_attached(f))
        .and_then(|&f| tree.parent(f));

    let mut text = String::new();
    let mut anchor = None;
    let mut markers = 0;
    for &fragment in &split.fragments {
        if parent.is_none() || tree.parent(fragment) != parent {
            continue;
        }
        match tree.marker_original(fragment) {
            Some(original) => {
                text.push_str(original);
                markers += 1;
            }
            None => text.push_str(tree.text(fragment).unwrap_or_default()),
        }
        if anchor.is_none() {
            anchor = Some(fragment);
        } else {
            tree.detach(fragment);
        }
    }

    match anchor {
        Some(anchor) => {
            tree.set_text(split.leaf, text);
            tree.replace_with(anchor, &[split.leaf]);
        }
        None => {
            tree.release(split.leaf);
        }
    }
    for fragment in split.fragments {
        tree.release(fragment);
    }
    markers
}

/// Replace any marker still in the tree with plain text, returning how many
/// were unwrapped.
pub fn unwrap_markers(tree: &mut DocumentTree) -> usize {
    let mut removed = 0;
    for marker in tree.markers() {
        let original = tree.marker_original(marker).unwrap_or_default().to_string();
        let text = tree.create_text(original);
        if tree.replace_with(marker, &[text]) {
            tree.release(marker);
            removed += 1;
        }
    }
    if removed > 0 {
        log::debug!("unwrapped {removed} markers outside any recorded split");
    }
    removed
}
