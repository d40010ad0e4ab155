//! Highlighter: wrap every located match in a marker node.
//!
//! Matches are grouped by leaf. Each leaf is rebuilt from its end toward its
//! start (highest offset first) into an ordered run of text and marker
//! fragments, then swapped in for the original leaf in a single replacement.
//! Offsets are only ever read against the untouched leaf text. The detached
//! leaf is kept so the restorer can put it back.

use crate::document_model::{DocumentTree, LeafSplit, Match, MarkerPlacement, NodeId};
use crate::error::{Error, Result};

/// What one highlighting pass did to the tree.
#[derive(Debug, Default)]
pub struct Highlight {
    /// Ordered by sequence index
    pub placements: Vec<MarkerPlacement>,
    pub splits: Vec<LeafSplit>,
}

/// Place a marker around each match.
///
/// Every leaf is checked against its matches before the first mutation, so a
/// stale match set fails with no markers inserted.
pub fn highlight(tree: &mut DocumentTree, matches: &[Match]) -> Result<Highlight> {
    let groups = group_by_leaf(matches);
    for (leaf, leaf_matches) in &groups {
        validate_leaf(tree, *leaf, leaf_matches)?;
    }

    let mut placements = Vec::with_capacity(matches.len());
    let mut splits = Vec::with_capacity(groups.len());
    for (leaf, mut leaf_matches) in groups {
        leaf_matches.sort_by(|a, b| b.start_offset.cmp(&a.start_offset));
        let full_text = tree.text(leaf).unwrap_or_default().to_string();

        let mut fragments: Vec<NodeId> = Vec::new();
        let mut tail_start = full_text.len();
        for m in leaf_matches {
            let after = &full_text[m.end_offset()..tail_start];
            if !after.is_empty() {
                fragments.push(tree.create_text(after));
            }
            let marker = tree.create_marker(m.sequence_index, &m.text);
            fragments.push(marker);
            placements.push(MarkerPlacement {
                sequence_index: m.sequence_index,
                marker,
            });
            tail_start = m.start_offset;
        }
        let before = &full_text[..tail_start];
        if !before.is_empty() {
            fragments.push(tree.create_text(before));
        }

        fragments.reverse();
        tree.replace_with(leaf, &fragments);
        splits.push(LeafSplit { leaf, fragments });
    }

    placements.sort_by_key(|p| p.sequence_index);
    log::debug!("placed {} markers in {} leaves", placements.len(), splits.len());
    Ok(Highlight { placements, splits })
}

/// Group matches by leaf, keeping leaves in first-seen order.
fn group_by_leaf(matches: &[Match]) -> Vec<(NodeId, Vec<&Match>)> {
    let mut groups: Vec<(NodeId, Vec<&Match>)> = Vec::new();
    for m in matches {
        match groups.iter_mut().rev().find(|(leaf, _)| *leaf == m.node) {
            Some((_, bucket)) => bucket.push(m),
            None => groups.push((m.node, vec![m])),
        }
    }
    groups
}

fn validate_leaf(tree: &DocumentTree, leaf: NodeId, matches: &[&Match]) -> Result<()> {
    if !tree.is_attached(leaf) {
        return Err(Error::DocumentChanged(leaf));
    }
    let text = tree.text(leaf).ok_or(Error::DocumentChanged(leaf))?;

    let mut sorted: Vec<&&Match> = matches.iter().collect();
    sorted.sort_by_key(|m| m.start_offset);
    let mut last_end = 0;
    for m in sorted {
        let in_place = text
            .get(m.start_offset..m.end_offset())
            .is_some_and(|slice| slice == m.text);
        if !in_place || m.length == 0 || m.start_offset < last_end {
            return Err(Error::DocumentChanged(leaf));
        }
        last_end = m.end_offset();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_model::markup;
    use crate::search::locator::locate;

    fn highlighted(source: &str, pattern: &str, flags: &str) -> (DocumentTree, Vec<MarkerPlacement>) {
        let mut tree = markup::parse(source);
        let matches = locate(&tree, tree.root(), pattern, flags, 1000).unwrap();
        let placements = highlight(&mut tree, &matches).unwrap().placements;
        (tree, placements)
    }

    #[test]
    fn test_wraps_each_occurrence() {
        let (tree, placements) = highlighted("<p>foo bar foo</p>", "foo", "g");
        assert_eq!(placements.len(), 2);
        assert_eq!(
            markup::serialize(&tree),
            "<p><mark data-index=\"0\">foo</mark> bar <mark data-index=\"1\">foo</mark></p>"
        );
    }

    #[test]
    fn test_adjacent_matches() {
        let (tree, placements) = highlighted("<p>aaa</p>", "a", "g");
        assert_eq!(placements.len(), 3);
        assert_eq!(
            markup::serialize(&tree),
            "<p><mark data-index=\"0\">a</mark><mark data-index=\"1\">a</mark>\
             <mark data-index=\"2\">a</mark></p>"
        );
    }

    #[test]
    fn test_placements_sorted_and_addressable() {
        let (tree, placements) = highlighted("<p>x1 x2</p><p>x3</p>", r"x\d", "g");
        let indices: Vec<usize> = placements.iter().map(|p| p.sequence_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        for p in &placements {
            assert_eq!(tree.marker_index(p.marker), Some(p.sequence_index));
        }
        assert_eq!(tree.marker_original(placements[2].marker), Some("x3"));
    }

    #[test]
    fn test_text_content_unchanged() {
        let source = "<div><p>The cat sat on the mat.</p><p>Another cat.</p></div>";
        let before = markup::parse(source).text_content(0);
        let (tree, _) = highlighted(source, "cat|mat", "g");
        assert_eq!(tree.text_content(tree.root()), before);
    }

    #[test]
    fn test_stale_match_rejected_without_mutation() {
        let mut tree = markup::parse("<p>hello world</p>");
        let mut matches = locate(&tree, tree.root(), "world", "g", 10).unwrap();
        let leaf = matches[0].node;
        tree.set_text(leaf, "hello there");
        let snapshot = markup::serialize(&tree);

        let err = highlight(&mut tree, &matches).unwrap_err();
        assert!(matches!(err, Error::DocumentChanged(_)));
        assert_eq!(markup::serialize(&tree), snapshot);

        matches.clear();
        assert!(highlight(&mut tree, &matches).unwrap().placements.is_empty());
    }

    #[test]
    fn test_splits_record_pieces_per_leaf() {
        let mut tree = markup::parse("<p>a<!--c-->b a</p>");
        let matches = locate(&tree, tree.root(), "a", "g", 10).unwrap();
        let highlighted = highlight(&mut tree, &matches).unwrap();

        let splits = &highlighted.splits;
        assert_eq!(splits.len(), 2);
        assert_eq!(splits[0].leaf, matches[0].node);
        assert_eq!(splits[0].fragments, vec![highlighted.placements[0].marker]);
        assert_eq!(splits[1].fragments.len(), 2);
        assert_eq!(tree.text(splits[1].fragments[0]), Some("b "));
        assert!(!tree.is_attached(splits[1].leaf));
        assert_eq!(tree.text(splits[1].leaf), Some("b a"));
    }
}
