//! Markup loader and serializer for the document tree.
//!
//! The loader understands the small subset of HTML that matters for text
//! search: start/end tags (attributes are skipped), void and self-closing
//! elements, comments, doctype declarations, a handful of entities, and
//! raw-text `script`/`style` bodies. Input with no tags at all is treated as
//! plain text, one paragraph per blank-line separated block.

use super::tree::{DocumentTree, NodeId, NodeKind};

const VOID_TAGS: &[&str] = &[
    "br", "hr", "img", "input", "meta", "link", "area", "base", "col", "embed", "source", "wbr",
];

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

pub fn parse(input: &str) -> DocumentTree {
    if !looks_like_markup(input) {
        return parse_plain_text(input);
    }

    let mut tree = DocumentTree::new();
    let mut stack: Vec<NodeId> = vec![tree.root()];
    let mut text = String::new();
    let bytes = input.as_bytes();
    let mut pos = 0;

    while pos < input.len() {
        if bytes[pos] != b'<' {
            let next = input[pos..].find('<').map_or(input.len(), |i| pos + i);
            text.push_str(&input[pos..next]);
            pos = next;
            continue;
        }

        let rest = &input[pos..];
        if rest.starts_with("<!--") {
            flush_text(&mut tree, &stack, &mut text);
            pos = rest.find("-->").map_or(input.len(), |i| pos + i + 3);
        } else if rest.starts_with("<!") || rest.starts_with("<?") {
            flush_text(&mut tree, &stack, &mut text);
            pos = rest.find('>').map_or(input.len(), |i| pos + i + 1);
        } else if let Some(after) = rest.strip_prefix("</") {
            flush_text(&mut tree, &stack, &mut text);
            let end = after.find('>').unwrap_or(after.len());
            let name = after[..end].trim().to_ascii_lowercase();
            close_element(&tree, &mut stack, &name);
            pos += 2 + (end + 1).min(after.len());
        } else if rest[1..].starts_with(|c: char| c.is_ascii_alphabetic()) {
            flush_text(&mut tree, &stack, &mut text);
            let Some((name, self_closing, tag_len)) = read_start_tag(rest) else {
                // Unterminated tag: keep the remainder as text
                text.push_str(rest);
                break;
            };
            pos += tag_len;

            let element = tree.create_element(&name);
            let parent = stack.last().copied().unwrap_or(tree.root());
            tree.append_child(parent, element);

            if RAW_TEXT_TAGS.contains(&name.as_str()) && !self_closing {
                let body = &input[pos..];
                let close = find_ascii_case_insensitive(body, &format!("</{name}"));
                let content_end = close.unwrap_or(body.len());
                if content_end > 0 {
                    let raw = tree.create_text(&body[..content_end]);
                    tree.append_child(element, raw);
                }
                pos += content_end;
                pos = input[pos..].find('>').map_or(input.len(), |i| pos + i + 1);
            } else if !self_closing && !VOID_TAGS.contains(&name.as_str()) {
                stack.push(element);
            }
        } else {
            text.push('<');
            pos += 1;
        }
    }
    flush_text(&mut tree, &stack, &mut text);
    tree
}

fn looks_like_markup(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.windows(2).any(|w| {
        w[0] == b'<' && (w[1].is_ascii_alphabetic() || w[1] == b'/' || w[1] == b'!')
    })
}

fn parse_plain_text(input: &str) -> DocumentTree {
    let mut tree = DocumentTree::new();
    let body = tree.create_element("body");
    tree.append_child(tree.root(), body);

    let normalized = input.replace("\r\n", "\n");
    for block in normalized.split("\n\n") {
        let block = block.trim_matches('\n');
        if block.trim().is_empty() {
            continue;
        }
        let p = tree.create_element("p");
        let t = tree.create_text(block);
        tree.append_child(body, p);
        tree.append_child(p, t);
    }
    tree
}

fn flush_text(tree: &mut DocumentTree, stack: &[NodeId], text: &mut String) {
    if text.is_empty() {
        return;
    }
    let parent = stack.last().copied().unwrap_or(tree.root());
    let node = tree.create_text(decode_entities(text));
    tree.append_child(parent, node);
    text.clear();
}

/// Pop up to and including the nearest open element called `name`.
/// A stray end tag with no open counterpart is ignored.
fn close_element(tree: &DocumentTree, stack: &mut Vec<NodeId>, name: &str) {
    if let Some(depth) = stack.iter().rposition(|&id| tree.tag(id) == Some(name)) {
        stack.truncate(depth.max(1));
    }
}

/// Returns (lower-cased name, self-closing, byte length of the whole tag).
fn read_start_tag(rest: &str) -> Option<(String, bool, usize)> {
    let name_end = rest[1..]
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == ':'))
        .map_or(rest.len(), |i| i + 1);
    let name = rest[1..name_end].to_ascii_lowercase();

    let mut quote: Option<char> = None;
    for (i, c) in rest[name_end..].char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => {
                let end = name_end + i;
                let self_closing = rest[..end].ends_with('/');
                return Some((name, self_closing, end + 1));
            }
            (None, _) => {}
        }
    }
    None
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render the tree back to markup. Markers become `<mark>` elements.
pub fn serialize(tree: &DocumentTree) -> String {
    let mut out = String::new();
    for child in tree.children(tree.root()) {
        write_node(tree, child, &mut out);
    }
    out
}

fn write_node(tree: &DocumentTree, id: NodeId, out: &mut String) {
    let Some(node) = tree.node(id) else {
        return;
    };
    match &node.kind {
        NodeKind::Document => {
            for child in tree.children(id) {
                write_node(tree, child, out);
            }
        }
        NodeKind::Text { content } => {
            let raw = tree
                .parent(id)
                .and_then(|p| tree.tag(p))
                .is_some_and(|tag| RAW_TEXT_TAGS.contains(&tag));
            if raw {
                out.push_str(content);
            } else {
                out.push_str(&escape_text(content));
            }
        }
        NodeKind::Element { tag } => {
            out.push('<');
            out.push_str(tag);
            out.push('>');
            if VOID_TAGS.contains(&tag.as_str()) {
                return;
            }
            for child in tree.children(id) {
                write_node(tree, child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        NodeKind::Marker { index, current, .. } => {
            if *current {
                out.push_str(&format!("<mark data-index=\"{index}\" class=\"current\">"));
            } else {
                out.push_str(&format!("<mark data-index=\"{index}\">"));
            }
            for child in tree.children(id) {
                write_node(tree, child, out);
            }
            out.push_str("</mark>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_serialize_simple_markup() {
        let tree = parse("<body><p class=\"x\">Hello <b>world</b></p></body>");
        assert_eq!(serialize(&tree), "<body><p>Hello <b>world</b></p></body>");
        assert_eq!(tree.text_content(tree.root()), "Hello world");
    }

    #[test]
    fn test_script_body_is_raw_text() {
        let tree = parse("<div><script>if (a < b) { x(); }</script>after</div>");
        let script = tree
            .descendants(tree.root())
            .into_iter()
            .find(|&id| tree.tag(id) == Some("script"))
            .unwrap();
        assert_eq!(tree.text_content(script), "if (a < b) { x(); }");
        assert!(serialize(&tree).contains("<script>if (a < b) { x(); }</script>after"));
    }

    #[test]
    fn test_void_and_self_closing_elements() {
        let tree = parse("<p>a<br>b<img src='x.png'/>c</p>");
        assert_eq!(serialize(&tree), "<p>a<br>b<img>c</p>");
    }

    #[test]
    fn test_comments_and_doctype_skipped() {
        let tree = parse("<!DOCTYPE html><!-- note --><p>text</p>");
        assert_eq!(serialize(&tree), "<p>text</p>");
    }

    #[test]
    fn test_entities_decoded_and_reescaped() {
        let tree = parse("<p>fish &amp; chips &lt;3</p>");
        assert_eq!(tree.text_content(tree.root()), "fish & chips <3");
        assert_eq!(serialize(&tree), "<p>fish &amp; chips &lt;3</p>");
    }

    #[test]
    fn test_stray_end_tag_ignored() {
        let tree = parse("<div><p>one</span>two</p></div>");
        assert_eq!(serialize(&tree), "<div><p>onetwo</p></div>");
    }

    #[test]
    fn test_plain_text_paragraphs() {
        let tree = parse("first line\nstill first\n\nsecond\n");
        assert_eq!(
            serialize(&tree),
            "<body><p>first line\nstill first</p><p>second</p></body>"
        );
    }

    #[test]
    fn test_comparison_operator_is_not_markup() {
        let tree = parse("1 < 2 and 3 > 2");
        assert_eq!(tree.text_content(tree.root()), "1 < 2 and 3 > 2");
    }
}
