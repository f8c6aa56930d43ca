//! Element tree over the help XML.
//!
//! Built in one pass over quick-xml events. Every element keeps the byte span
//! of its full markup in the source text, so embedded tables can be handed on
//! exactly as written. Any syntax error, unbalanced tag, or stray content
//! outside the root element rejects the whole document.

use crate::error::{ParseError, ParseResult};
use quick_xml::events::Event;
use quick_xml::Reader;

pub type NodeId = usize;

/// Byte range into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element { name: String },
    Text(String),
}

#[derive(Debug, Clone)]
struct XmlNode {
    kind: NodeKind,
    children: Vec<NodeId>,
    span: Span,
}

#[derive(Debug)]
pub struct XmlTree<'a> {
    source: &'a str,
    nodes: Vec<XmlNode>,
    root: NodeId,
}

impl<'a> XmlTree<'a> {
    pub fn parse(source: &'a str) -> ParseResult<Self> {
        // The reader drops a leading BOM without counting it in its positions.
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let mut reader = Reader::from_str(source);
        let mut nodes: Vec<XmlNode> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;

        loop {
            let event_start = reader.buffer_position();
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(e) => {
                    return Err(ParseError::malformed(format!(
                        "{e} (near byte {})",
                        reader.buffer_position()
                    )))
                }
            };

            match event {
                Event::Start(start) => {
                    let tag = tag_span(source, event_start, reader.buffer_position());
                    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    let id = push_element(&mut nodes, &stack, &mut root, name, tag)?;
                    stack.push(id);
                }
                Event::Empty(start) => {
                    let tag = tag_span(source, event_start, reader.buffer_position());
                    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    push_element(&mut nodes, &stack, &mut root, name, tag)?;
                }
                Event::End(end_tag) => {
                    let id = stack.pop().ok_or_else(|| {
                        ParseError::malformed(format!(
                            "unexpected closing tag </{}>",
                            String::from_utf8_lossy(end_tag.name().as_ref())
                        ))
                    })?;
                    nodes[id].span.end = reader.buffer_position();
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| ParseError::malformed(e.to_string()))?
                        .into_owned();
                    push_text(&mut nodes, &stack, text)?;
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8_lossy(&cdata.into_inner()).into_owned();
                    push_text(&mut nodes, &stack, text)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions, doctype
                _ => {}
            }
        }

        if let Some(&open) = stack.last() {
            return Err(ParseError::malformed(format!(
                "unexpected end of input: <{}> is never closed",
                element_name(&nodes[open])
            )));
        }

        let root = root.ok_or_else(|| ParseError::malformed("no root element"))?;
        Ok(Self {
            source,
            nodes,
            root,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Local name of an element, empty for text nodes.
    pub fn name(&self, id: NodeId) -> &str {
        element_name(&self.nodes[id])
    }

    pub fn is_named(&self, id: NodeId, name: &str) -> bool {
        self.name(id).eq_ignore_ascii_case(name)
    }

    /// Element children of `id`, in document order.
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(move |&child| matches!(self.nodes[child].kind, NodeKind::Element { .. }))
    }

    pub fn children_named<'t>(
        &'t self,
        id: NodeId,
        name: &'t str,
    ) -> impl Iterator<Item = NodeId> + 't {
        self.child_elements(id)
            .filter(move |&child| self.is_named(child, name))
    }

    /// First element named `name` below `id` (depth-first, document order).
    pub fn first_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        let mut pending: Vec<NodeId> = self.child_elements(id).collect();
        pending.reverse();
        while let Some(next) = pending.pop() {
            if self.is_named(next, name) {
                return Some(next);
            }
            let mark = pending.len();
            pending.extend(self.child_elements(next));
            pending[mark..].reverse();
        }
        None
    }

    /// `id` itself when it is named `name`, else its first such descendant.
    pub fn find_self_or_descendant(&self, id: NodeId, name: &str) -> Option<NodeId> {
        if self.is_named(id, name) {
            Some(id)
        } else {
            self.first_descendant(id, name)
        }
    }

    /// Descendants matching `pred`, outermost only: the search does not enter
    /// an element that already matched.
    pub fn outermost_descendants<F>(&self, id: NodeId, pred: F) -> Vec<NodeId>
    where
        F: Fn(NodeId) -> bool,
    {
        let mut found = Vec::new();
        let mut pending: Vec<NodeId> = self.child_elements(id).collect();
        pending.reverse();
        while let Some(next) = pending.pop() {
            if pred(next) {
                found.push(next);
                continue;
            }
            let mark = pending.len();
            pending.extend(self.child_elements(next));
            pending[mark..].reverse();
        }
        found
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self, id: NodeId) -> String {
        self.text_content_excluding(id, |_| false)
    }

    /// Like [`text_content`](Self::text_content), but skips the text of any
    /// descendant element for which `skip` holds.
    pub fn text_content_excluding<F>(&self, id: NodeId, skip: F) -> String
    where
        F: Fn(NodeId) -> bool,
    {
        let mut out = String::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            match &self.nodes[next].kind {
                NodeKind::Text(text) => out.push_str(text),
                NodeKind::Element { .. } if next != id && skip(next) => {}
                NodeKind::Element { .. } => {
                    pending.extend(self.nodes[next].children.iter().rev().copied());
                }
            }
        }
        out
    }

    /// The element's markup exactly as it appears in the source.
    pub fn raw_markup(&self, id: NodeId) -> &'a str {
        let span = self.nodes[id].span;
        &self.source[span.start..span.end]
    }
}

fn element_name(node: &XmlNode) -> &str {
    match &node.kind {
        NodeKind::Element { name } => name,
        NodeKind::Text(_) => "",
    }
}

/// Span of an opening tag. `event_start` is the reader position before the
/// event was read; only text (no markup) can sit between it and the tag.
fn tag_span(source: &str, event_start: usize, tag_end: usize) -> Span {
    let start = source[event_start..tag_end]
        .find('<')
        .map_or(event_start, |offset| event_start + offset);
    Span {
        start,
        end: tag_end,
    }
}

/// Add an element whose opening tag covers `tag`.
fn push_element(
    nodes: &mut Vec<XmlNode>,
    stack: &[NodeId],
    root: &mut Option<NodeId>,
    name: String,
    tag: Span,
) -> ParseResult<NodeId> {
    let id = nodes.len();
    nodes.push(XmlNode {
        kind: NodeKind::Element { name },
        children: Vec::new(),
        span: tag,
    });

    match stack.last() {
        Some(&parent) => nodes[parent].children.push(id),
        None if root.is_none() => *root = Some(id),
        None => {
            return Err(ParseError::malformed(format!(
                "junk after document element: <{}>",
                element_name(&nodes[id])
            )))
        }
    }
    Ok(id)
}

fn push_text(nodes: &mut Vec<XmlNode>, stack: &[NodeId], text: String) -> ParseResult<()> {
    match stack.last() {
        Some(&parent) => {
            let id = nodes.len();
            nodes.push(XmlNode {
                kind: NodeKind::Text(text),
                children: Vec::new(),
                span: Span { start: 0, end: 0 },
            });
            nodes[parent].children.push(id);
            Ok(())
        }
        None if text
            .trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
            .is_empty() =>
        {
            Ok(())
        }
        None => Err(ParseError::malformed(
            "text content outside the document element",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_builds_children_in_order() {
        let tree = XmlTree::parse("<a><b>one</b><c/><b>two</b></a>").unwrap();
        let root = tree.root();
        assert_eq!(tree.name(root), "a");
        let names: Vec<&str> = tree.child_elements(root).map(|id| tree.name(id)).collect();
        assert_eq!(names, vec!["b", "c", "b"]);
        assert_eq!(tree.children_named(root, "b").count(), 2);
    }

    #[test]
    fn test_text_content_concatenates_descendants() {
        let tree = XmlTree::parse("<p>Hello <b>big</b> world &amp; more</p>").unwrap();
        assert_eq!(tree.text_content(tree.root()), "Hello big world & more");
    }

    #[test]
    fn test_cdata_counts_as_text() {
        let tree = XmlTree::parse("<p><![CDATA[a < b]]></p>").unwrap();
        assert_eq!(tree.text_content(tree.root()), "a < b");
    }

    #[test]
    fn test_raw_markup_is_verbatim() {
        let source = "<desc>\n  <p>x</p>\n  <table border=\"1\"><tr><td>A &amp; B</td></tr></table>\n</desc>";
        let tree = XmlTree::parse(source).unwrap();
        let table = tree.first_descendant(tree.root(), "table").unwrap();
        assert_eq!(
            tree.raw_markup(table),
            "<table border=\"1\"><tr><td>A &amp; B</td></tr></table>"
        );
    }

    #[test]
    fn test_raw_markup_of_empty_element() {
        let source = "<desc><p>x</p><table class=\"t\" /></desc>";
        let tree = XmlTree::parse(source).unwrap();
        let table = tree.first_descendant(tree.root(), "table").unwrap();
        assert_eq!(tree.raw_markup(table), "<table class=\"t\" />");
    }

    #[test]
    fn test_raw_markup_after_text() {
        let source = "<desc>lead text<table><tr/></table>tail</desc>";
        let tree = XmlTree::parse(source).unwrap();
        let table = tree.first_descendant(tree.root(), "table").unwrap();
        assert_eq!(tree.raw_markup(table), "<table><tr/></table>");
    }

    #[test]
    fn test_raw_markup_with_angle_bracket_in_attribute() {
        let source = "<desc><p>x</p><table title=\"a<b\"><tr/></table></desc>";
        let tree = XmlTree::parse(source).unwrap();
        let table = tree.first_descendant(tree.root(), "table").unwrap();
        assert_eq!(tree.raw_markup(table), "<table title=\"a<b\"><tr/></table>");
    }

    #[test]
    fn test_raw_markup_after_leading_bom() {
        let source = "\u{feff}<desc><table><tr/></table></desc>";
        let tree = XmlTree::parse(source).unwrap();
        let table = tree.first_descendant(tree.root(), "table").unwrap();
        assert_eq!(tree.raw_markup(table), "<table><tr/></table>");
    }

    #[test]
    fn test_text_content_excluding_skips_subtrees() {
        let tree = XmlTree::parse("<p>See <b>codes</b><table><tr><td>X</td></tr></table> below</p>").unwrap();
        let text = tree.text_content_excluding(tree.root(), |id| tree.is_named(id, "table"));
        assert_eq!(text, "See codes below");
    }

    #[test]
    fn test_walks_survive_deep_nesting() {
        let depth = 50_000;
        let source = format!("<a>{}<p>deep</p>{}</a>", "<div>".repeat(depth), "</div>".repeat(depth));
        let tree = XmlTree::parse(&source).unwrap();
        let p = tree.first_descendant(tree.root(), "p").unwrap();
        assert_eq!(tree.text_content(p), "deep");
        assert_eq!(tree.text_content(tree.root()), "deep");
        let found = tree.outermost_descendants(tree.root(), |id| tree.is_named(id, "p"));
        assert_eq!(found, vec![p]);
    }

    #[test]
    fn test_outermost_descendants_skip_nested_matches() {
        let tree = XmlTree::parse("<d><div><p>outer <p>inner</p></p></div><p>second</p></d>").unwrap();
        let found = tree.outermost_descendants(tree.root(), |id| tree.is_named(id, "p"));
        assert_eq!(found.len(), 2);
        assert_eq!(tree.text_content(found[0]), "outer inner");
        assert_eq!(tree.text_content(found[1]), "second");
    }

    #[test]
    fn test_declaration_and_comments_are_ignored() {
        let tree = XmlTree::parse("<?xml version=\"1.0\"?>\n<!-- c -->\n<root/>\n").unwrap();
        assert_eq!(tree.name(tree.root()), "root");
    }

    #[test]
    fn test_unclosed_element_is_malformed() {
        let err = XmlTree::parse("<a><b>text</b>").unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn test_mismatched_end_is_malformed() {
        assert!(XmlTree::parse("<a><b></a></b>").unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_plain_text_is_malformed() {
        assert!(XmlTree::parse("this is not xml").unwrap_err().is_malformed_input());
        assert!(XmlTree::parse("").unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_second_root_is_malformed() {
        assert!(XmlTree::parse("<a/><b/>").unwrap_err().is_malformed_input());
    }

    #[test]
    fn test_unknown_entity_is_malformed() {
        assert!(XmlTree::parse("<a>&nbsp;</a>").unwrap_err().is_malformed_input());
    }
}
