//! Normalization and sanitization of untrusted HTML
//!
//! Two passes, composed per processing chunk:
//! - [`Normalizer`] repairs malformed markup (unclosed tags are closed by the
//!   parser, void elements are self-terminated, loose table rows get a `tbody`)
//! - [`Sanitizer`] strips disallowed tags and attributes while keeping their
//!   text, then repairs table and code block structure

mod allowlist;
mod repair;

pub use allowlist::{is_allowed_attr, is_allowed_tag, is_safe_attr};

use crate::dom::{ElementData, Html5everProvider, Node, NodeType, TreeProvider, inner_html};
use crate::utils::{ParseError, Result};
use std::sync::Arc;

/// Extra reparse rounds allowed before sanitized output must be stable
const MAX_SETTLE_ROUNDS: usize = 4;

fn parse_body(provider: &dyn TreeProvider, html: &str) -> Result<Node> {
    let doc = provider.parse_document(html)?;
    let body = doc
        .find_body()
        .ok_or_else(|| ParseError::Fragment("no body element".into()))?;
    Ok(body.clone())
}

/// Heuristic markup repair
#[derive(Clone)]
pub struct Normalizer {
    provider: Arc<dyn TreeProvider>,
}

impl Normalizer {
    pub fn new(provider: Arc<dyn TreeProvider>) -> Self {
        Self { provider }
    }

    /// Repair `html` without removing any tag
    pub fn normalize(&self, html: &str) -> Result<String> {
        if html.trim().is_empty() {
            return Ok(String::new());
        }
        let mut body = parse_body(self.provider.as_ref(), html)?;
        repair::repair_tree(&mut body, true);
        Ok(inner_html(&body))
    }
}

/// Allow-list sanitizer with post-sanitize structural repair
#[derive(Clone)]
pub struct Sanitizer {
    provider: Arc<dyn TreeProvider>,
    normalizer: Normalizer,
}

impl Sanitizer {
    /// Create a sanitizer backed by html5ever
    pub fn new() -> Self {
        Self::with_provider(Arc::new(Html5everProvider::new()))
    }

    pub fn with_provider(provider: Arc<dyn TreeProvider>) -> Self {
        Self {
            normalizer: Normalizer::new(provider.clone()),
            provider,
        }
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Strip untrusted markup. Idempotent.
    ///
    /// Unwrapping a disallowed element can leave nesting the HTML parser
    /// rebuilds differently (a `div` inside a `p`), so passes repeat until
    /// the output reparses to itself.
    pub fn sanitize(&self, html: &str) -> Result<String> {
        if html.trim().is_empty() {
            return Ok(String::new());
        }
        let mut out = self.clean_pass(html)?;
        for _ in 0..MAX_SETTLE_ROUNDS {
            let next = self.clean_pass(&out)?;
            if next == out {
                return Ok(out);
            }
            out = next;
        }
        log::debug!("sanitized markup still changing after {} rounds", MAX_SETTLE_ROUNDS);
        Ok(out)
    }

    fn clean_pass(&self, html: &str) -> Result<String> {
        let body = parse_body(self.provider.as_ref(), html)?;

        let mut cleaned = Vec::with_capacity(body.children.len());
        for child in &body.children {
            clean_node(child, &mut cleaned);
        }
        let mut root = Node::element_with("body", cleaned);
        repair::repair_tree(&mut root, false);

        Ok(inner_html(&root))
    }

    /// Normalize then sanitize one processing chunk.
    ///
    /// On failure the chunk's original HTML is returned unchanged so one bad
    /// chunk never aborts the document.
    pub fn process_chunk(&self, html: &str) -> String {
        match self
            .normalizer
            .normalize(html)
            .and_then(|normalized| self.sanitize(&normalized))
        {
            Ok(clean) => clean,
            Err(e) => {
                log::warn!("sanitize failed, keeping chunk unmodified: {}", e);
                html.to_string()
            }
        }
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy `node` into `out` keeping only allowed markup. Children of a
/// disallowed element are re-parented to the nearest kept ancestor.
fn clean_node(node: &Node, out: &mut Vec<Node>) {
    match &node.node_type {
        NodeType::Text(_) => out.push(node.clone()),
        NodeType::Comment(_) => {}
        NodeType::Document => {
            for child in &node.children {
                clean_node(child, out);
            }
        }
        NodeType::Element(el) => {
            let tag = el.tag_name.as_str();
            if allowlist::drops_content(tag) {
                return;
            }

            let mut children = Vec::with_capacity(node.children.len());
            for child in &node.children {
                clean_node(child, &mut children);
            }

            if !allowlist::is_allowed_tag(tag) {
                out.extend(children);
                return;
            }

            let mut clean = ElementData::new(tag);
            clean.attributes = el
                .attributes
                .iter()
                .filter(|(name, value)| allowlist::is_safe_attr(name, value))
                .cloned()
                .collect();
            out.push(Node {
                node_type: NodeType::Element(clean),
                children,
            });
        }
    }
}
