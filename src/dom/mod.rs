//! Owned, lightweight HTML node tree
//!
//! Everything above this module (chunking, sanitizing, chunk parsing) works on
//! this tree rather than on a parser-specific one, so the HTML parser is an
//! injected [`TreeProvider`] capability:
//! - [`Html5everProvider`] for real documents
//! - any other implementation for hosts or tests that bring their own parser

mod html;
pub mod serialize;

pub use html::{Html5everProvider, TreeProvider};
pub use serialize::{escape_text, inner_html, outer_html};

#[cfg(test)]
pub use html::MockTreeProvider;

/// Node types in the tree
#[derive(Debug, Clone, PartialEq)]
pub enum NodeType {
    /// Document root
    Document,
    /// Element node (e.g., <div>)
    Element(ElementData),
    /// Text node
    Text(String),
    /// Comment node
    Comment(String),
}

/// Data for element nodes
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Lowercase tag name (e.g., "div", "span")
    pub tag_name: String,
    /// Element attributes, in source order
    pub attributes: Vec<(String, String)>,
}

impl ElementData {
    /// Create a new element
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            attributes: Vec::new(),
        }
    }

    /// Get an attribute value
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute value, replacing any existing one
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Get class names
    pub fn classes(&self) -> Vec<&str> {
        self.get_attribute("class")
            .map(|c| c.split_whitespace().collect())
            .unwrap_or_default()
    }
}

/// A node in the tree
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Node type and data
    pub node_type: NodeType,
    /// Child nodes
    pub children: Vec<Node>,
}

impl Node {
    /// Create a new node
    pub fn new(node_type: NodeType) -> Self {
        Self {
            node_type,
            children: Vec::new(),
        }
    }

    /// Create an element node
    pub fn element(tag_name: impl Into<String>) -> Self {
        Self::new(NodeType::Element(ElementData::new(tag_name)))
    }

    /// Create an element node owning `children`
    pub fn element_with(tag_name: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            node_type: NodeType::Element(ElementData::new(tag_name)),
            children,
        }
    }

    /// Create a text node
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeType::Text(content.into()))
    }

    /// Add a child node
    pub fn add_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Check if this is an element node
    pub fn is_element(&self) -> bool {
        matches!(self.node_type, NodeType::Element(_))
    }

    /// Get element data if this is an element
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Get mutable element data if this is an element
    pub fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        }
    }

    /// Tag name for elements, `None` otherwise
    pub fn tag(&self) -> Option<&str> {
        self.as_element().map(|e| e.tag_name.as_str())
    }

    /// True if this is an element with the given tag
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag() == Some(tag)
    }

    /// Text of a text node
    pub fn as_text(&self) -> Option<&str> {
        match &self.node_type {
            NodeType::Text(text) => Some(text),
            _ => None,
        }
    }

    /// True for text nodes holding only whitespace
    pub fn is_whitespace_text(&self) -> bool {
        self.as_text().is_some_and(|t| t.trim().is_empty())
    }

    /// Element children only
    pub fn children_elements(&self) -> impl Iterator<Item = &Node> {
        self.children.iter().filter(|c| c.is_element())
    }

    /// First descendant (depth-first, self excluded) with the given tag
    pub fn find_first(&self, tag: &str) -> Option<&Node> {
        for child in &self.children {
            if child.is_tag(tag) {
                return Some(child);
            }
            if let Some(found) = child.find_first(tag) {
                return Some(found);
            }
        }
        None
    }

    /// Count of descendants with the given tag
    pub fn count_tag(&self, tag: &str) -> usize {
        self.children
            .iter()
            .map(|c| usize::from(c.is_tag(tag)) + c.count_tag(tag))
            .sum()
    }

    /// The `body` element of a parsed document
    pub fn find_body(&self) -> Option<&Node> {
        if self.is_tag("body") {
            return Some(self);
        }
        self.find_first("body")
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match &self.node_type {
            NodeType::Text(text) => out.push_str(text),
            NodeType::Comment(_) => {}
            _ => {
                for child in &self.children {
                    child.collect_text(out);
                }
            }
        }
    }

    /// Number of whitespace-separated words, summed per text node
    pub fn word_count(&self) -> usize {
        match &self.node_type {
            NodeType::Text(text) => text.split_whitespace().count(),
            NodeType::Comment(_) => 0,
            _ => self.children.iter().map(Node::word_count).sum(),
        }
    }
}

/// Elements that start a new block in flow content
const BLOCK_LEVEL_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "center", "details", "dialog", "dd", "div",
    "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4",
    "h5", "h6", "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

/// Check if a tag is block-level
pub fn is_block_level(tag: &str) -> bool {
    BLOCK_LEVEL_TAGS.contains(&tag)
}

/// Heading depth for `h1`..`h6`
pub fn heading_level(tag: &str) -> Option<u8> {
    match tag.as_bytes() {
        [b'h', d @ b'1'..=b'6'] => Some(d - b'0'),
        _ => None,
    }
}

/// Strip markup from an HTML string without building a tree.
///
/// Used where a tree is not available (plain text of chunk content, word
/// counts when the provider failed). Common entities are decoded.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    decode_entities(&out)
}

fn decode_entities(text: &str) -> String {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Node {
        let mut p = Node::element("p");
        p.add_child(Node::text("Hello "));
        p.add_child(Node::element_with("b", vec![Node::text("big world")]));
        let mut body = Node::element("body");
        body.add_child(p);
        body.add_child(Node::text("\n  "));
        let mut doc = Node::new(NodeType::Document);
        doc.add_child(Node::element_with("html", vec![body]));
        doc
    }

    #[test]
    fn test_find_body() {
        let doc = sample();
        let body = doc.find_body().unwrap();
        assert!(body.is_tag("body"));
        assert_eq!(body.children_elements().count(), 1);
    }

    #[test]
    fn test_text_and_words() {
        let doc = sample();
        assert_eq!(doc.text_content(), "Hello big world\n  ");
        assert_eq!(doc.word_count(), 3);
    }

    #[test]
    fn test_attributes_keep_order() {
        let mut el = ElementData::new("a");
        el.set_attribute("href", "/x");
        el.set_attribute("class", "one two");
        el.set_attribute("href", "/y");
        assert_eq!(el.get_attribute("href"), Some("/y"));
        assert_eq!(el.attributes[0].0, "href");
        assert_eq!(el.classes(), vec!["one", "two"]);
    }

    #[test]
    fn test_heading_level() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<p>a &amp; <b>b</b></p>"), "a & b");
        assert_eq!(strip_tags("plain"), "plain");
    }
}
