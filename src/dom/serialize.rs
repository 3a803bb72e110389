//! HTML serialization for the owned node tree
//!
//! Output re-parses to the same tree: text and attribute values are escaped,
//! void elements are self-terminated and the leading newline of `pre`-like
//! elements is preserved.

use super::{Node, NodeType};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// Check if a tag never has children or a closing tag
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Serialize a node including its own tags
pub fn outer_html(node: &Node) -> String {
    let mut out = String::new();
    write_node(node, false, &mut out);
    out
}

/// Serialize the children of a node
pub fn inner_html(node: &Node) -> String {
    let mut out = String::new();
    write_children(node, &mut out);
    out
}

/// Serialize a sequence of sibling nodes
pub fn nodes_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, false, &mut out);
    }
    out
}

/// Escape text for use as element content
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_node(node: &Node, raw_parent: bool, out: &mut String) {
    match &node.node_type {
        NodeType::Document => write_children(node, out),
        NodeType::Text(text) if raw_parent => out.push_str(text),
        NodeType::Text(text) => out.push_str(&escape_text(text)),
        NodeType::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeType::Element(elem) => {
            let tag = elem.tag_name.as_str();
            out.push('<');
            out.push_str(tag);
            for (name, value) in &elem.attributes {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                out.push_str(&escape_attr(value));
                out.push('"');
            }
            if is_void(tag) {
                out.push_str(" />");
                return;
            }
            out.push('>');

            // The parser drops one newline right after these start tags
            if matches!(tag, "pre" | "textarea" | "listing")
                && node
                    .children
                    .first()
                    .and_then(Node::as_text)
                    .is_some_and(|t| t.starts_with('\n'))
            {
                out.push('\n');
            }

            write_children(node, out);
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn write_children(node: &Node, out: &mut String) {
    let raw = node.tag().is_some_and(|t| RAW_TEXT_ELEMENTS.contains(&t));
    for child in &node.children {
        write_node(child, raw, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{Html5everProvider, TreeProvider};

    fn body_html(html: &str) -> String {
        let doc = Html5everProvider::new().parse_document(html).unwrap();
        inner_html(doc.find_body().unwrap())
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let mut a = Node::element("a");
        a.as_element_mut().unwrap().set_attribute("title", "say \"hi\" & go");
        a.add_child(Node::text("1 < 2 & 3"));
        assert_eq!(
            outer_html(&a),
            r#"<a title="say &quot;hi&quot; &amp; go">1 &lt; 2 &amp; 3</a>"#
        );
    }

    #[test]
    fn test_void_elements_self_terminated() {
        assert_eq!(body_html("<p>a<br>b</p><hr>"), "<p>a<br />b</p><hr />");
    }

    #[test]
    fn test_pre_leading_newline_survives() {
        let first = body_html("<pre>\n\nindented</pre>");
        assert_eq!(first, "<pre>\n\nindented</pre>");
        assert_eq!(body_html(&first), first);
    }

    #[test]
    fn test_round_trip_is_fixed_point() {
        let first = body_html("<table><tr><td>A &amp; B</td></tr></table><ul><li>x<li>y</ul>");
        assert_eq!(body_html(&first), first);
    }
}
