//! HTML5 tree provider implementation using html5ever

use super::{ElementData, Node, NodeType};
use crate::utils::{ParseError, Result};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Capability that turns an HTML string into an owned [`Node`] tree.
///
/// The returned root is a `Document` node; a conforming provider always
/// places flow content under a `body` element.
#[cfg_attr(test, mockall::automock)]
pub trait TreeProvider: Send + Sync {
    /// Parse a complete document or fragment
    fn parse_document(&self, html: &str) -> Result<Node>;
}

/// HTML5 tree provider using html5ever
#[derive(Debug, Clone, Copy, Default)]
pub struct Html5everProvider;

impl Html5everProvider {
    /// Create a new provider
    pub fn new() -> Self {
        Self
    }

    fn opts() -> ParseOpts {
        ParseOpts {
            tree_builder: TreeBuilderOpts {
                drop_doctype: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn convert_node(handle: &Handle) -> Option<Node> {
        match &handle.data {
            NodeData::Document => {
                let mut node = Node::new(NodeType::Document);
                node.children = Self::convert_children(handle);
                Some(node)
            }
            NodeData::Element { name, attrs, .. } => {
                let mut elem_data = ElementData::new(name.local.to_string());
                for attr in attrs.borrow().iter() {
                    elem_data.set_attribute(attr.name.local.to_string(), attr.value.to_string());
                }
                let mut node = Node::new(NodeType::Element(elem_data));
                node.children = Self::convert_children(handle);
                Some(node)
            }
            NodeData::Text { contents } => Some(Node::text(contents.borrow().to_string())),
            NodeData::Comment { contents } => {
                Some(Node::new(NodeType::Comment(contents.to_string())))
            }
            NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => None,
        }
    }

    fn convert_children(handle: &Handle) -> Vec<Node> {
        handle
            .children
            .borrow()
            .iter()
            .filter_map(Self::convert_node)
            .collect()
    }
}

impl TreeProvider for Html5everProvider {
    fn parse_document(&self, html: &str) -> Result<Node> {
        let dom = parse_document(RcDom::default(), Self::opts())
            .from_utf8()
            .read_from(&mut html.as_bytes())
            .map_err(|e| ParseError::Html(e.to_string()))?;

        Self::convert_node(&dom.document)
            .ok_or_else(|| ParseError::Fragment("document node missing".into()).into())
    }
}
