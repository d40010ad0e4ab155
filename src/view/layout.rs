//! Terminal layout of a document tree.
//!
//! Flattens the tree into wrapped rows of styled segments. Block-level
//! elements start new rows, whitespace collapses outside `pre`, and widths
//! are display columns. The row span of every marker is recorded, which is
//! what the overview strip and scroll requests need.

use crate::document_model::{DocumentTree, NodeId, NodeKind};
use crate::search::{GeometryProvider, Rect};
use std::collections::HashMap;
use unicode_width::UnicodeWidthChar;

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "h1", "h2", "h3", "h4", "h5", "h6", "li", "tr", "section", "article", "header",
    "footer", "pre", "blockquote", "ul", "ol", "table", "title", "body", "main", "nav", "hr",
];

const HIDDEN_TAGS: &[&str] = &[
    "script", "style", "noscript", "head", "template", "iframe", "object", "embed",
];

pub const DEFAULT_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentStyle {
    Plain,
    Marker(NodeId),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub style: SegmentStyle,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutRow {
    pub segments: Vec<Segment>,
    pub width: usize,
}

impl LayoutRow {
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    fn ends_with_space(&self) -> bool {
        self.segments
            .last()
            .is_some_and(|s| s.text.ends_with(' '))
    }

    fn push(&mut self, ch: char, width: usize, style: SegmentStyle) {
        match self.segments.last_mut() {
            Some(segment) if segment.style == style => segment.text.push(ch),
            _ => self.segments.push(Segment {
                text: ch.to_string(),
                style,
            }),
        }
        self.width += width;
    }
}

#[derive(Debug, Clone)]
pub struct TerminalLayout {
    width: usize,
    rows: Vec<LayoutRow>,
    marker_spans: HashMap<NodeId, (usize, usize)>,
}

impl Default for TerminalLayout {
    fn default() -> Self {
        Self::new(DEFAULT_WIDTH)
    }
}

impl TerminalLayout {
    pub fn new(width: usize) -> Self {
        Self {
            width: width.max(1),
            rows: Vec::new(),
            marker_spans: HashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn set_width(&mut self, width: usize) {
        self.width = width.max(1);
    }

    pub fn rows(&self) -> &[LayoutRow] {
        &self.rows
    }

    /// First row and row count of a marker.
    pub fn marker_span(&self, marker: NodeId) -> Option<(usize, usize)> {
        self.marker_spans
            .get(&marker)
            .map(|&(first, last)| (first, last - first + 1))
    }

    fn layout(&mut self, tree: &DocumentTree) {
        let mut builder = Builder {
            width: self.width,
            rows: Vec::new(),
            current: LayoutRow::default(),
            spans: HashMap::new(),
        };
        builder.walk(tree, tree.root(), None, false);
        builder.break_line();
        self.rows = builder.rows;
        self.marker_spans = builder.spans;
    }
}

impl GeometryProvider for TerminalLayout {
    fn refresh(&mut self, tree: &DocumentTree) {
        self.layout(tree);
    }

    fn marker_rect(&self, marker: NodeId) -> Option<Rect> {
        let (top, height) = self.marker_span(marker)?;
        Some(Rect {
            top: top as f64,
            height: height as f64,
        })
    }

    fn content_height(&self) -> f64 {
        self.rows.len() as f64
    }
}

struct Builder {
    width: usize,
    rows: Vec<LayoutRow>,
    current: LayoutRow,
    spans: HashMap<NodeId, (usize, usize)>,
}

impl Builder {
    fn walk(&mut self, tree: &DocumentTree, id: NodeId, marker: Option<NodeId>, pre: bool) {
        let Some(node) = tree.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Document => {
                for child in tree.children(id) {
                    self.walk(tree, child, marker, pre);
                }
            }
            NodeKind::Element { tag } => {
                let tag = tag.as_str();
                if HIDDEN_TAGS.contains(&tag) {
                    return;
                }
                if tag == "br" {
                    self.force_break();
                    return;
                }
                let block = BLOCK_TAGS.contains(&tag);
                if block {
                    self.break_line();
                }
                let pre = pre || tag == "pre";
                for child in tree.children(id) {
                    self.walk(tree, child, marker, pre);
                }
                if block {
                    self.break_line();
                }
            }
            NodeKind::Marker { .. } => {
                for child in tree.children(id) {
                    self.walk(tree, child, Some(id), pre);
                }
            }
            NodeKind::Text { content } => self.emit_text(content, marker, pre),
        }
    }

    fn emit_text(&mut self, text: &str, marker: Option<NodeId>, pre: bool) {
        let style = marker.map_or(SegmentStyle::Plain, SegmentStyle::Marker);
        for ch in text.chars() {
            if pre && ch == '\n' {
                self.force_break();
                continue;
            }
            if !pre && ch.is_whitespace() {
                if self.current.width == 0 || self.current.ends_with_space() {
                    continue;
                }
                self.emit_char(' ', style, marker);
                continue;
            }
            self.emit_char(ch, style, marker);
        }
    }

    fn emit_char(&mut self, ch: char, style: SegmentStyle, marker: Option<NodeId>) {
        let w = ch.width().unwrap_or(0);
        if self.current.width + w > self.width && self.current.width > 0 {
            self.force_break();
            if ch == ' ' {
                return;
            }
        }
        self.current.push(ch, w, style);
        if let Some(marker) = marker {
            let row = self.rows.len();
            self.spans
                .entry(marker)
                .and_modify(|span| span.1 = row)
                .or_insert((row, row));
        }
    }

    /// End the current row if it has content.
    fn break_line(&mut self) {
        if !self.current.segments.is_empty() {
            self.force_break();
        }
    }

    fn force_break(&mut self) {
        let row = std::mem::take(&mut self.current);
        self.rows.push(row);
    }
}
