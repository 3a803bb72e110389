//! HTML to chunk parser
//!
//! Walks the top-level nodes of a parsed fragment and classifies each one into
//! a [`Chunk`]. Structural `div`s are transparent. Runs of inline content
//! become a single paragraph, so nothing is dropped silently.

use super::{Chunk, ChunkType, Metadata};
use crate::dom::{
    Html5everProvider, Node, NodeType, TreeProvider, escape_text, heading_level, inner_html,
    is_block_level, outer_html, serialize::nodes_html,
};
use serde_json::Value;
use std::sync::Arc;

/// Converts HTML into an ordered chunk sequence
#[derive(Clone)]
pub struct ChunkParser {
    provider: Arc<dyn TreeProvider>,
}

/// Per-call state; ids are unique within one parse only
struct ParseRun {
    chunks: Vec<Chunk>,
    next_id: usize,
}

impl ParseRun {
    fn push(&mut self, chunk_type: ChunkType, content: String, mut metadata: Metadata, html: String) {
        metadata.insert("html".into(), Value::String(html));
        let id = format!("chunk-{}", self.next_id);
        self.next_id += 1;
        self.chunks.push(Chunk::new(id, chunk_type, content, metadata));
    }
}

impl ChunkParser {
    /// Create a parser backed by html5ever
    pub fn new() -> Self {
        Self::with_provider(Arc::new(Html5everProvider::new()))
    }

    /// Create a parser backed by another tree provider
    pub fn with_provider(provider: Arc<dyn TreeProvider>) -> Self {
        Self { provider }
    }

    /// Parse possibly-absent input. `None`, empty and whitespace-only input
    /// yield no chunks.
    pub fn parse(&self, html: Option<&str>) -> Vec<Chunk> {
        html.map(|h| self.parse_str(h)).unwrap_or_default()
    }

    /// Parse an HTML string into chunks
    pub fn parse_str(&self, html: &str) -> Vec<Chunk> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let mut run = ParseRun {
            chunks: Vec::new(),
            next_id: 0,
        };

        match self.provider.parse_document(html) {
            Ok(doc) => {
                if let Some(head) = doc.find_first("head") {
                    fold_head(head, &mut run);
                }
                match doc.find_body() {
                    Some(body) => walk(&body.children, &mut run),
                    None => log::warn!("parsed document has no body, keeping raw input"),
                }
            }
            Err(e) => log::warn!("chunk parse failed, keeping raw input: {}", e),
        }

        if run.chunks.is_empty() {
            run.push(
                ChunkType::Paragraph,
                html.to_string(),
                Metadata::new(),
                html.to_string(),
            );
        }

        run.chunks
    }
}

impl Default for ChunkParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Rejoin chunks into one document
pub fn chunks_to_html(chunks: &[Chunk]) -> String {
    chunks
        .iter()
        .map(Chunk::to_html)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A document title becomes the leading paragraph; other head text is dropped
fn fold_head(head: &Node, run: &mut ParseRun) {
    for child in head.children_elements() {
        let text = child.text_content();
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        if child.is_tag("title") {
            let content = escape_text(text);
            let html = format!("<p>{}</p>", content);
            run.push(ChunkType::Paragraph, content, Metadata::new(), html);
        } else {
            log::debug!(
                "dropping {} bytes of <{}> text from document head",
                text.len(),
                child.tag().unwrap_or_default()
            );
        }
    }
}

fn is_inline(node: &Node) -> bool {
    match &node.node_type {
        NodeType::Element(el) => !is_block_level(&el.tag_name),
        NodeType::Text(_) | NodeType::Comment(_) => true,
        NodeType::Document => false,
    }
}

fn walk(nodes: &[Node], run: &mut ParseRun) {
    let mut i = 0;
    while i < nodes.len() {
        if is_inline(&nodes[i]) {
            let start = i;
            while i < nodes.len() && is_inline(&nodes[i]) {
                i += 1;
            }
            push_inline_run(&nodes[start..i], run);
            continue;
        }
        classify(&nodes[i], run);
        i += 1;
    }
}

fn push_inline_run(nodes: &[Node], run: &mut ParseRun) {
    let has_content = nodes
        .iter()
        .any(|n| n.is_element() || !n.text_content().trim().is_empty());
    if !has_content {
        return;
    }
    let html = nodes_html(nodes).trim().to_string();
    run.push(ChunkType::Paragraph, html.clone(), Metadata::new(), html);
}

fn classify(node: &Node, run: &mut ParseRun) {
    let Some(el) = node.as_element() else {
        return;
    };
    let tag = el.tag_name.as_str();
    let mut meta = Metadata::new();

    if let Some(level) = heading_level(tag) {
        meta.insert("level".into(), level.into());
        run.push(ChunkType::Heading, inner_html(node), meta, outer_html(node));
        return;
    }

    match tag {
        "table" => {
            meta.insert("rows".into(), node.count_tag("tr").into());
            run.push(ChunkType::Table, inner_html(node), meta, outer_html(node));
        }
        "pre" => {
            let language = node
                .find_first("code")
                .and_then(Node::as_element)
                .and_then(|code| {
                    code.classes()
                        .into_iter()
                        .find_map(|c| c.strip_prefix("language-"))
                        .filter(|lang| !lang.is_empty())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "plaintext".to_string());
            meta.insert("language".into(), language.into());
            run.push(ChunkType::Code, node.text_content(), meta, outer_html(node));
        }
        "ul" | "ol" => {
            meta.insert("ordered".into(), (tag == "ol").into());
            run.push(ChunkType::List, inner_html(node), meta, outer_html(node));
        }
        "blockquote" => {
            run.push(ChunkType::Blockquote, inner_html(node), meta, outer_html(node));
        }
        "p" => {
            let content = inner_html(node);
            if !content.trim().is_empty() {
                run.push(ChunkType::Paragraph, content, meta, outer_html(node));
            }
        }
        "hr" => {
            run.push(ChunkType::Separator, "<hr />".into(), meta, outer_html(node));
        }
        "div" => walk(&node.children, run),
        _ => {
            if !node.text_content().trim().is_empty() || !node.children.is_empty() {
                let html = outer_html(node);
                run.push(ChunkType::Paragraph, html.clone(), meta, html);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MockTreeProvider;
    use crate::utils::ParseError;

    #[test]
    fn test_empty_inputs() {
        let parser = ChunkParser::new();
        assert!(parser.parse(None).is_empty());
        assert!(parser.parse(Some("")).is_empty());
        assert!(parser.parse(Some("   \n\t")).is_empty());
    }

    #[test]
    fn test_heading_then_paragraph() {
        let chunks = ChunkParser::new().parse_str("<h1>T</h1><p>Body</p>");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_type(), ChunkType::Heading);
        assert_eq!(chunks[0].level(), Some(1));
        assert_eq!(chunks[1].chunk_type(), ChunkType::Paragraph);
        assert_eq!(chunks[1].content(), "Body");
        assert_eq!(chunks[0].id(), "chunk-0");
        assert_eq!(chunks[1].id(), "chunk-1");
    }

    #[test]
    fn test_plain_text_is_one_paragraph() {
        let chunks = ChunkParser::new().parse_str("just some words");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type(), ChunkType::Paragraph);
        assert_eq!(chunks[0].content(), "just some words");
    }

    #[test]
    fn test_inline_run_stays_together() {
        let chunks = ChunkParser::new().parse_str("Hello <b>bold</b> world<p>Next</p>");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content(), "Hello <b>bold</b> world");
    }

    #[test]
    fn test_table_rows_and_markup() {
        let chunks = ChunkParser::new()
            .parse_str("<table><tr><th>H</th></tr><tr><td>1</td></tr><tr><td>2</td></tr></table>");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type(), ChunkType::Table);
        assert_eq!(chunks[0].rows(), Some(3));
        assert!(chunks[0].original_html().unwrap().starts_with("<table>"));
    }

    #[test]
    fn test_code_language() {
        let parser = ChunkParser::new();
        let chunks = parser.parse_str(
            r#"<pre><code class="hl language-rust">fn main() {}</code></pre><pre>raw &lt;x&gt;</pre>"#,
        );
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_type(), ChunkType::Code);
        assert_eq!(chunks[0].language(), "rust");
        assert_eq!(chunks[0].content(), "fn main() {}");
        assert_eq!(chunks[1].language(), "plaintext");
        assert_eq!(chunks[1].content(), "raw <x>");
    }

    #[test]
    fn test_lists_blockquote_separator() {
        let chunks = ChunkParser::new()
            .parse_str("<ol><li>a</li></ol><ul><li>b</li></ul><blockquote>q</blockquote><hr>");
        let types: Vec<_> = chunks.iter().map(Chunk::chunk_type).collect();
        assert_eq!(
            types,
            vec![ChunkType::List, ChunkType::List, ChunkType::Blockquote, ChunkType::Separator]
        );
        assert!(chunks[0].ordered());
        assert!(!chunks[1].ordered());
    }

    #[test]
    fn test_empty_paragraphs_skipped_and_divs_transparent() {
        let chunks = ChunkParser::new()
            .parse_str("<p>  </p><div><div><h2>Inner</h2></div><p>x</p></div><p></p>");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].level(), Some(2));
    }

    #[test]
    fn test_unknown_block_becomes_paragraph() {
        let chunks = ChunkParser::new().parse_str("<section><em>kept</em></section>");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chunk_type(), ChunkType::Paragraph);
        assert_eq!(chunks[0].content(), "<section><em>kept</em></section>");
    }

    #[test]
    fn test_title_becomes_leading_paragraph() {
        let chunks = ChunkParser::new().parse_str("<title>Q1 &amp; Q2</title><p>body</p>");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].chunk_type(), ChunkType::Paragraph);
        assert_eq!(chunks[0].content(), "Q1 &amp; Q2");
        assert_eq!(chunks[0].plain_text(), "Q1 & Q2");
        assert_eq!(chunks[1].content(), "body");
        assert_eq!(chunks_to_html(&chunks), "<p>Q1 &amp; Q2</p>\n<p>body</p>");
    }

    #[test]
    fn test_head_styles_are_not_text() {
        let chunks = ChunkParser::new().parse_str("<style>p { color: red }</style><p>x</p>");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content(), "x");
    }

    #[test]
    fn test_provider_failure_keeps_raw_input() {
        let mut provider = MockTreeProvider::new();
        provider
            .expect_parse_document()
            .returning(|_| Err(ParseError::Html("boom".into()).into()));
        let parser = ChunkParser::with_provider(Arc::new(provider));

        let chunks = parser.parse_str("<p>data</p>");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content(), "<p>data</p>");
        assert_eq!(chunks_to_html(&chunks), "<p>data</p>");
    }

    #[test]
    fn test_chunks_to_html_reconstructs() {
        let html = "<h1>T</h1>\n<p class=\"lead\">Body &amp; more</p>\n<hr />";
        let chunks = ChunkParser::new().parse_str(html);
        assert_eq!(chunks_to_html(&chunks), html);
    }
}
