//! Word-budget chunking of large documents
//!
//! Splits a document into processing chunks between block-level elements.
//! A block is never split; a block larger than the budget becomes a chunk of
//! its own.

use crate::dom::{
    Html5everProvider, Node, NodeType, TreeProvider, is_block_level, outer_html,
    serialize::nodes_html, strip_tags,
};
use std::sync::Arc;

/// Default word budget per processing chunk
pub const DEFAULT_WORD_BUDGET: usize = 3000;

/// One indivisible piece of the document
#[derive(Debug)]
struct Unit {
    html: String,
    words: usize,
}

/// Splits HTML into word-bounded processing chunks
#[derive(Clone)]
pub struct WordBudgetChunker {
    provider: Arc<dyn TreeProvider>,
    budget: usize,
}

impl WordBudgetChunker {
    /// Create a chunker backed by html5ever. A budget of 0 is treated as 1.
    pub fn new(budget: usize) -> Self {
        Self::with_provider(Arc::new(Html5everProvider::new()), budget)
    }

    pub fn with_provider(provider: Arc<dyn TreeProvider>, budget: usize) -> Self {
        Self {
            provider,
            budget: budget.max(1),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    /// Words of text content, tags excluded
    pub fn count_words(&self, html: &str) -> usize {
        match self.provider.parse_document(html) {
            Ok(doc) => doc.find_body().map(Node::word_count).unwrap_or(0),
            Err(e) => {
                log::debug!("word count falling back to tag stripping: {}", e);
                strip_tags(html).split_whitespace().count()
            }
        }
    }

    /// Split `html` into processing chunks of at most `budget` words each,
    /// except where a single block alone exceeds the budget.
    pub fn chunk_by_word_budget(&self, html: &str) -> Vec<String> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let doc = match self.provider.parse_document(html) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("chunking failed, using whole document: {}", e);
                return vec![html.to_string()];
            }
        };
        let Some(body) = doc.find_body() else {
            return vec![html.to_string()];
        };

        let units = collect_units(find_container(body));
        if units.is_empty() {
            return vec![html.to_string()];
        }

        let mut chunks = Vec::new();
        let mut current: Vec<String> = Vec::new();
        let mut current_words = 0;

        for unit in units {
            if current_words + unit.words > self.budget && !current.is_empty() {
                chunks.push(current.join("\n"));
                current.clear();
                current_words = 0;
            }
            current_words += unit.words;
            current.push(unit.html);
        }
        if !current.is_empty() {
            chunks.push(current.join("\n"));
        }

        log::debug!(
            "split document into {} processing chunks (budget {} words)",
            chunks.len(),
            self.budget
        );
        chunks
    }
}

impl Default for WordBudgetChunker {
    fn default() -> Self {
        Self::new(DEFAULT_WORD_BUDGET)
    }
}

fn is_content_wrapper(node: &Node) -> bool {
    match node.as_element() {
        Some(el) => {
            matches!(el.tag_name.as_str(), "main" | "article" | "div")
                || el.get_attribute("role") == Some("main")
        }
        None => false,
    }
}

/// Descend through a `main`/`article`/`div`/`[role=main]` wrapper that is the
/// only content of its parent
fn find_container(body: &Node) -> &Node {
    let mut container = body;
    loop {
        let mut content = container
            .children
            .iter()
            .filter(|c| !c.is_whitespace_text() && !matches!(c.node_type, NodeType::Comment(_)));
        match (content.next(), content.next()) {
            (Some(only), None) if is_content_wrapper(only) => container = only,
            _ => return container,
        }
    }
}

fn is_block(node: &Node) -> bool {
    node.tag().is_some_and(is_block_level)
}

/// Block elements become one unit each; runs of inline nodes are grouped
fn collect_units(container: &Node) -> Vec<Unit> {
    let mut units = Vec::new();
    let children = &container.children;
    let mut i = 0;

    while i < children.len() {
        if is_block(&children[i]) {
            units.push(Unit {
                html: outer_html(&children[i]),
                words: children[i].word_count(),
            });
            i += 1;
            continue;
        }

        let start = i;
        while i < children.len() && !is_block(&children[i]) {
            i += 1;
        }
        let run = &children[start..i];
        if run.iter().all(Node::is_whitespace_text) {
            continue;
        }
        units.push(Unit {
            html: nodes_html(run).trim().to_string(),
            words: run.iter().map(Node::word_count).sum(),
        });
    }

    units
}
