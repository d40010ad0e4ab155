//! Arena-backed document tree.
//!
//! Nodes live in a flat `Vec` and refer to each other through `NodeId`
//! indices. Mutations relink nodes; a detached node stays in the arena but is
//! no longer reachable from the root, so every traversal starts at the root
//! and only ever sees attached nodes. Detached nodes nobody needs any more are
//! handed back with [`DocumentTree::release`] and their slots are reused.

/// Compact node identifier (index into the arena)
pub type NodeId = u32;

/// Payload carried by a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element with a lower-cased tag name
    Element { tag: String },
    /// Text run
    Text { content: String },
    /// Highlight wrapper around the text of one match.
    ///
    /// Always owns a single text child; `original` keeps the matched text
    /// verbatim so removal does not depend on the child surviving intact.
    Marker {
        index: usize,
        original: String,
        current: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    vacant: bool,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Node {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            vacant: false,
        }
    }

    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text { .. })
    }

    #[inline]
    pub fn is_marker(&self) -> bool {
        matches!(self.kind, NodeKind::Marker { .. })
    }
}

#[derive(Debug, Clone)]
pub struct DocumentTree {
    nodes: Vec<Node>,
    root: NodeId,
    // Released slots, reused by `push`
    free: Vec<NodeId>,
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document)],
            root: 0,
            free: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        if let Some(id) = self.free.pop() {
            if let Some(slot) = self.node_mut(id) {
                *slot = Node::new(kind);
                return id;
            }
        }
        let id = self.nodes.len() as NodeId;
        self.nodes.push(Node::new(kind));
        id
    }

    /// Free a detached node and its whole subtree for reuse.
    ///
    /// Refused (returns false) for the root, for attached nodes and for
    /// nodes already released. The ids must not be used afterwards.
    pub fn release(&mut self, id: NodeId) -> bool {
        let releasable = self
            .node(id)
            .is_some_and(|n| !n.vacant && n.parent.is_none() && id != self.root);
        if !releasable {
            return false;
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend(self.children(current));
            if let Some(slot) = self.node_mut(current) {
                *slot = Node::new(NodeKind::Text {
                    content: String::new(),
                });
                slot.vacant = true;
            }
            self.free.push(current);
        }
        true
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element {
            tag: tag.to_ascii_lowercase(),
        })
    }

    pub fn create_text(&mut self, content: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text {
            content: content.into(),
        })
    }

    /// Create a marker holding `text` as its only child.
    pub fn create_marker(&mut self, index: usize, text: &str) -> NodeId {
        let marker = self.push(NodeKind::Marker {
            index,
            original: text.to_string(),
            current: false,
        });
        let child = self.create_text(text);
        self.append_child(marker, child);
        marker
    }

    /// Append `child` as the last child of `parent`, detaching it first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        let last = self.node(parent).and_then(|p| p.last_child);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = last;
            node.next_sibling = None;
        }
        match last {
            Some(last) => {
                if let Some(node) = self.node_mut(last) {
                    node.next_sibling = Some(child);
                }
            }
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.first_child = Some(child);
                }
            }
        }
        if let Some(node) = self.node_mut(parent) {
            node.last_child = Some(child);
        }
    }

    /// Insert `child` immediately before `reference`, which must be attached.
    pub fn insert_before(&mut self, reference: NodeId, child: NodeId) -> bool {
        if reference == child {
            return false;
        }
        let Some(parent) = self.node(reference).and_then(|n| n.parent) else {
            return false;
        };
        self.detach(child);
        let prev = self.node(reference).and_then(|n| n.prev_sibling);
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
            node.prev_sibling = prev;
            node.next_sibling = Some(reference);
        }
        if let Some(node) = self.node_mut(reference) {
            node.prev_sibling = Some(child);
        }
        match prev {
            Some(prev) => {
                if let Some(node) = self.node_mut(prev) {
                    node.next_sibling = Some(child);
                }
            }
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.first_child = Some(child);
                }
            }
        }
        true
    }

    /// Unlink a node from its parent and siblings. Its own subtree is kept.
    pub fn detach(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let (parent, prev, next) = (node.parent, node.prev_sibling, node.next_sibling);
        let Some(parent) = parent else {
            return;
        };

        match prev {
            Some(prev) => {
                if let Some(node) = self.node_mut(prev) {
                    node.next_sibling = next;
                }
            }
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.first_child = next;
                }
            }
        }
        match next {
            Some(next) => {
                if let Some(node) = self.node_mut(next) {
                    node.prev_sibling = prev;
                }
            }
            None => {
                if let Some(node) = self.node_mut(parent) {
                    node.last_child = prev;
                }
            }
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = None;
            node.prev_sibling = None;
            node.next_sibling = None;
        }
    }

    /// Replace `id` in place with `replacements`, in order.
    ///
    /// Returns false (and changes nothing) when `id` has no parent.
    pub fn replace_with(&mut self, id: NodeId, replacements: &[NodeId]) -> bool {
        if self.parent(id).is_none() {
            return false;
        }
        for &new_node in replacements {
            self.insert_before(id, new_node);
        }
        self.detach(id);
        true
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.node(id).and_then(|n| n.first_child);
        while let Some(child) = cursor {
            out.push(child);
            cursor = self.node(child).and_then(|n| n.next_sibling);
        }
        out
    }

    /// All attached descendants of `id` in pre-order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// True when `id` can be reached from the root.
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub fn text(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Text { content } => Some(content),
            _ => None,
        }
    }

    pub fn set_text(&mut self, id: NodeId, value: impl Into<String>) {
        if let Some(Node {
            kind: NodeKind::Text { content },
            ..
        }) = self.node_mut(id)
        {
            *content = value.into();
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Element { tag } => Some(tag),
            _ => None,
        }
    }

    /// Tag of the closest element ancestor, looking through markers.
    pub fn nearest_element_tag(&self, id: NodeId) -> Option<&str> {
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if let Some(tag) = self.tag(current) {
                return Some(tag);
            }
            cursor = self.parent(current);
        }
        None
    }

    pub fn is_inside_marker(&self, id: NodeId) -> bool {
        let mut cursor = self.parent(id);
        while let Some(current) = cursor {
            if self.node(current).is_some_and(Node::is_marker) {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Concatenated text of every text node under `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id)
            .into_iter()
            .filter_map(|d| self.text(d))
            .collect()
    }

    /// Attached markers in document order.
    pub fn markers(&self) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&id| self.node(id).is_some_and(Node::is_marker))
            .collect()
    }

    pub fn marker_index(&self, id: NodeId) -> Option<usize> {
        match self.node(id)?.kind {
            NodeKind::Marker { index, .. } => Some(index),
            _ => None,
        }
    }

    pub fn marker_original(&self, id: NodeId) -> Option<&str> {
        match &self.node(id)?.kind {
            NodeKind::Marker { original, .. } => Some(original),
            _ => None,
        }
    }

    pub fn is_current_marker(&self, id: NodeId) -> bool {
        matches!(
            self.node(id).map(|n| &n.kind),
            Some(NodeKind::Marker { current: true, .. })
        )
    }

    /// Set or clear the "current" flag. Returns false when `id` is not a marker.
    pub fn set_marker_current(&mut self, id: NodeId, value: bool) -> bool {
        match self.node_mut(id) {
            Some(Node {
                kind: NodeKind::Marker { current, .. },
                ..
            }) => {
                *current = value;
                true
            }
            _ => false,
        }
    }

    /// Number of slots in the arena, in use or free.
    pub fn arena_len(&self) -> usize {
        self.nodes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(tree: &mut DocumentTree, text: &str) -> (NodeId, NodeId) {
        let p = tree.create_element("P");
        let t = tree.create_text(text);
        tree.append_child(tree.root(), p);
        tree.append_child(p, t);
        (p, t)
    }

    #[test]
    fn test_append_and_children_order() {
        let mut tree = DocumentTree::new();
        let (p, _) = paragraph(&mut tree, "one");
        let b = tree.create_element("b");
        tree.append_child(p, b);
        assert_eq!(tree.children(p).len(), 2);
        assert_eq!(tree.tag(p), Some("p"));
        assert_eq!(tree.text_content(tree.root()), "one");
    }

    #[test]
    fn test_replace_with_keeps_position() {
        let mut tree = DocumentTree::new();
        let (p, t) = paragraph(&mut tree, "abc");
        let a = tree.create_text("a");
        let m = tree.create_marker(0, "b");
        let c = tree.create_text("c");
        assert!(tree.replace_with(t, &[a, m, c]));
        assert_eq!(tree.children(p), vec![a, m, c]);
        assert!(!tree.is_attached(t));
        assert_eq!(tree.text_content(p), "abc");
    }

    #[test]
    fn test_replace_detached_node_is_refused() {
        let mut tree = DocumentTree::new();
        let lonely = tree.create_text("x");
        let other = tree.create_text("y");
        assert!(!tree.replace_with(lonely, &[other]));
    }

    #[test]
    fn test_descendants_pre_order() {
        let mut tree = DocumentTree::new();
        let (p1, t1) = paragraph(&mut tree, "first");
        let (p2, t2) = paragraph(&mut tree, "second");
        assert_eq!(tree.descendants(tree.root()), vec![p1, t1, p2, t2]);
    }

    #[test]
    fn test_marker_ancestry() {
        let mut tree = DocumentTree::new();
        let (p, t) = paragraph(&mut tree, "x");
        let m = tree.create_marker(3, "x");
        tree.replace_with(t, &[m]);
        let inner = tree.children(m)[0];
        assert!(tree.is_inside_marker(inner));
        assert_eq!(tree.nearest_element_tag(inner), Some("p"));
        assert_eq!(tree.marker_index(m), Some(3));
        assert_eq!(tree.markers(), vec![m]);
        assert!(tree.children(p).contains(&m));
    }

    #[test]
    fn test_release_reuses_slots() {
        let mut tree = DocumentTree::new();
        let (p, t) = paragraph(&mut tree, "abc");
        let m = tree.create_marker(0, "abc");
        tree.replace_with(t, &[m]);
        let slots = tree.arena_len();

        assert!(!tree.release(m));
        assert!(!tree.release(tree.root()));
        tree.replace_with(m, &[t]);
        assert!(tree.release(m));
        assert!(!tree.release(m));

        // Marker and its text child both come back
        let a = tree.create_text("a");
        let b = tree.create_element("b");
        assert_eq!(tree.arena_len(), slots);
        assert_eq!(tree.text(a), Some("a"));
        assert_eq!(tree.tag(b), Some("b"));
        assert_eq!(tree.children(b), Vec::<NodeId>::new());
        assert_eq!(tree.children(p), vec![t]);
        assert_eq!(tree.text_content(p), "abc");
    }

    #[test]
    fn test_current_flag() {
        let mut tree = DocumentTree::new();
        let m = tree.create_marker(0, "x");
        assert!(!tree.is_current_marker(m));
        assert!(tree.set_marker_current(m, true));
        assert!(tree.is_current_marker(m));
        let t = tree.create_text("x");
        assert!(!tree.set_marker_current(t, true));
    }
}
