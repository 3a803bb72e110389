//! Render-level chunk model
//!
//! A [`Chunk`] is one semantic unit of a document (paragraph, heading, table,
//! code block, list, blockquote, separator). Chunks are immutable-with-clone:
//! every change goes through [`Chunk::clone_with`], which recomputes the
//! estimated height.

mod height;
pub mod parser;
mod plain_text;

pub use height::HeightModel;
pub(crate) use height::count_open_tags;
pub use parser::{ChunkParser, chunks_to_html};
pub use plain_text::parse_plain_text;

use crate::dom::{escape_text, strip_tags};
use crate::utils::{ChunkviewError, Result};
use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Open metadata mapping. Recognized keys: `level`, `rows`, `language`,
/// `alignment`, `ordered`, `html`.
pub type Metadata = BTreeMap<String, Value>;

/// Closed set of chunk types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkType {
    Paragraph,
    Heading,
    Table,
    Code,
    List,
    Blockquote,
    Separator,
}

impl ChunkType {
    pub const ALL: [ChunkType; 7] = [
        ChunkType::Paragraph,
        ChunkType::Heading,
        ChunkType::Table,
        ChunkType::Code,
        ChunkType::List,
        ChunkType::Blockquote,
        ChunkType::Separator,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkType::Paragraph => "paragraph",
            ChunkType::Heading => "heading",
            ChunkType::Table => "table",
            ChunkType::Code => "code",
            ChunkType::List => "list",
            ChunkType::Blockquote => "blockquote",
            ChunkType::Separator => "separator",
        }
    }

    /// Strict lookup; unknown names are an `UnsupportedType` error
    pub fn parse(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| ChunkviewError::UnsupportedType(name.to_string()))
    }

    /// Lenient lookup; unknown names become `Paragraph`
    pub fn coerce(name: &str) -> Self {
        Self::parse(name).unwrap_or_else(|e| {
            log::debug!("{}, using paragraph", e);
            ChunkType::Paragraph
        })
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Block alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(Alignment::Left),
            "center" => Some(Alignment::Center),
            "right" => Some(Alignment::Right),
            _ => None,
        }
    }
}

pub(crate) fn meta_u64(metadata: &Metadata, key: &str) -> Option<u64> {
    metadata.get(key).and_then(Value::as_u64)
}

pub(crate) fn meta_str<'a>(metadata: &'a Metadata, key: &str) -> Option<&'a str> {
    metadata.get(key).and_then(Value::as_str)
}

/// Partial update for [`Chunk::clone_with`].
///
/// Metadata entries are shallow-merged; a `Value::Null` entry removes the key.
#[derive(Debug, Clone, Default)]
pub struct ChunkUpdate {
    pub id: Option<String>,
    pub chunk_type: Option<ChunkType>,
    pub content: Option<String>,
    pub metadata: Metadata,
}

impl ChunkUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn chunk_type(mut self, chunk_type: ChunkType) -> Self {
        self.chunk_type = Some(chunk_type);
        self
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn remove_meta(mut self, key: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), Value::Null);
        self
    }
}

/// One renderable unit of a document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    id: String,
    #[serde(rename = "type")]
    chunk_type: ChunkType,
    content: String,
    metadata: Metadata,
    #[serde(rename = "estimatedHeight")]
    estimated_height: u32,
}

impl Chunk {
    /// Create a chunk; the estimated height is derived here
    pub fn new(
        id: impl Into<String>,
        chunk_type: ChunkType,
        content: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        let content = content.into();
        let estimated_height = HeightModel::default().estimate(chunk_type, &content, &metadata);
        Self {
            id: id.into(),
            chunk_type,
            content,
            metadata,
            estimated_height,
        }
    }

    /// Create a chunk from an untyped type name, coercing unknown names to paragraph
    pub fn create(
        id: impl Into<String>,
        chunk_type: &str,
        content: impl Into<String>,
        metadata: Metadata,
    ) -> Self {
        Self::new(id, ChunkType::coerce(chunk_type), content, metadata)
    }

    /// Validate a duck-typed chunk object.
    ///
    /// Requires an object with `id` (string or number), `type` and `content`
    /// strings; `metadata` must be an object when present. Anything else is
    /// rejected with `None`.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = match obj.get("id")? {
            Value::String(s) if !s.is_empty() => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let chunk_type = obj.get("type")?.as_str()?;
        let content = obj.get("content")?.as_str()?;
        let metadata = match obj.get("metadata") {
            None | Some(Value::Null) => Metadata::new(),
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Some(_) => return None,
        };
        Some(Self::create(id, chunk_type, content, metadata))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chunk_type(&self) -> ChunkType {
        self.chunk_type
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Layout hint, never a measurement
    pub fn estimated_height(&self) -> u32 {
        self.estimated_height
    }

    /// Heading depth (1..=6)
    pub fn level(&self) -> Option<u8> {
        meta_u64(&self.metadata, "level").map(|l| l.clamp(1, 6) as u8)
    }

    pub fn rows(&self) -> Option<u64> {
        meta_u64(&self.metadata, "rows")
    }

    /// Code block language, "plaintext" when unset
    pub fn language(&self) -> &str {
        meta_str(&self.metadata, "language").unwrap_or("plaintext")
    }

    /// Alignment from metadata; values other than left/center/right are ignored
    pub fn alignment(&self) -> Option<Alignment> {
        meta_str(&self.metadata, "alignment").and_then(Alignment::parse)
    }

    pub fn ordered(&self) -> bool {
        self.metadata
            .get("ordered")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Original outer markup retained by the parser
    pub fn original_html(&self) -> Option<&str> {
        meta_str(&self.metadata, "html").filter(|h| !h.is_empty())
    }

    /// Derive a new chunk; the receiver is left untouched
    pub fn clone_with(&self, update: ChunkUpdate) -> Self {
        let mut metadata = self.metadata.clone();
        for (key, value) in update.metadata {
            if value.is_null() {
                metadata.remove(&key);
            } else {
                metadata.insert(key, value);
            }
        }
        Self::new(
            update.id.unwrap_or_else(|| self.id.clone()),
            update.chunk_type.unwrap_or(self.chunk_type),
            update.content.unwrap_or_else(|| self.content.clone()),
            metadata,
        )
    }

    /// Content with all markup removed
    pub fn plain_text(&self) -> String {
        if self.chunk_type == ChunkType::Code {
            return self.content.clone();
        }
        strip_tags(&self.content)
    }

    /// Case-insensitive search over the plain text.
    ///
    /// With `is_regex` the query is a regular expression; an invalid pattern
    /// matches nothing.
    pub fn matches(&self, query: &str, is_regex: bool) -> bool {
        let text = self.plain_text();
        if is_regex {
            return match RegexBuilder::new(query).case_insensitive(true).build() {
                Ok(re) => re.is_match(&text),
                Err(e) => {
                    log::debug!("invalid search pattern {:?}: {}", query, e);
                    false
                }
            };
        }
        text.to_lowercase().contains(&query.to_lowercase())
    }

    /// Outer markup for this chunk.
    ///
    /// Uses the retained original markup when present, otherwise synthesizes
    /// markup from the type, content and metadata.
    pub fn to_html(&self) -> String {
        if let Some(html) = self.original_html() {
            return html.to_string();
        }
        let align = self
            .alignment()
            .map(|a| format!(" style=\"text-align: {}\"", a.as_str()))
            .unwrap_or_default();
        match self.chunk_type {
            ChunkType::Paragraph => format!("<p{align}>{}</p>", self.content),
            ChunkType::Heading => {
                let level = self.level().unwrap_or(2);
                format!("<h{level}{align}>{}</h{level}>", self.content)
            }
            ChunkType::Table => format!("<table>{}</table>", self.content),
            ChunkType::Code => format!(
                "<pre><code class=\"language-{}\">{}</code></pre>",
                self.language(),
                escape_text(&self.content)
            ),
            ChunkType::List => {
                let tag = if self.ordered() { "ol" } else { "ul" };
                format!("<{tag}{align}>{}</{tag}>", self.content)
            }
            ChunkType::Blockquote => format!("<blockquote{align}>{}</blockquote>", self.content),
            ChunkType::Separator => "<hr />".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_alignment_not_emitted() {
        let chunk = Chunk::from_value(&json!({
            "id": "a",
            "type": "paragraph",
            "content": "x",
            "metadata": {"alignment": "left\" onmouseover=\"evil()"}
        }))
        .unwrap();
        assert_eq!(chunk.alignment(), None);
        assert_eq!(chunk.to_html(), "<p>x</p>");

        let centered = chunk.clone_with(ChunkUpdate::new().meta("alignment", "center"));
        assert_eq!(centered.to_html(), "<p style=\"text-align: center\">x</p>");
    }

    #[test]
    fn test_type_parse_and_coerce() {
        assert_eq!(ChunkType::parse("heading").unwrap(), ChunkType::Heading);
        assert!(matches!(
            ChunkType::parse("widget"),
            Err(ChunkviewError::UnsupportedType(_))
        ));
        assert_eq!(ChunkType::coerce("widget"), ChunkType::Paragraph);
    }

    #[test]
    fn test_create_unknown_type_falls_back() {
        let chunk = Chunk::create("a", "sidebar", "text", Metadata::new());
        assert_eq!(chunk.chunk_type(), ChunkType::Paragraph);
    }

    #[test]
    fn test_clone_with_does_not_mutate_receiver() {
        let mut meta = Metadata::new();
        meta.insert("level".into(), json!(1));
        meta.insert("html".into(), json!("<h1>Old</h1>"));
        let original = Chunk::new("c1", ChunkType::Heading, "Old", meta);

        let updated = original.clone_with(
            ChunkUpdate::new()
                .content("New")
                .meta("level", 3)
                .remove_meta("html"),
        );

        assert_eq!(original.content(), "Old");
        assert_eq!(original.level(), Some(1));
        assert_eq!(updated.content(), "New");
        assert_eq!(updated.level(), Some(3));
        assert!(updated.original_html().is_none());
        assert_eq!(updated.id(), "c1");
        assert!(updated.estimated_height() < original.estimated_height());
    }

    #[test]
    fn test_plain_text_and_matches() {
        let chunk = Chunk::new("p", ChunkType::Paragraph, "Hello <b>World</b>", Metadata::new());
        assert_eq!(chunk.plain_text(), "Hello World");
        assert!(chunk.matches("hello world", false));
        assert!(!chunk.matches("<b>", false));
        assert!(chunk.matches(r"w\w+d", true));
        assert!(!chunk.matches("([unclosed", true));
    }

    #[test]
    fn test_code_plain_text_keeps_angle_brackets() {
        let chunk = Chunk::new("c", ChunkType::Code, "Vec<u8>", Metadata::new());
        assert_eq!(chunk.plain_text(), "Vec<u8>");
        assert_eq!(
            chunk.to_html(),
            "<pre><code class=\"language-plaintext\">Vec&lt;u8&gt;</code></pre>"
        );
    }

    #[test]
    fn test_to_html_prefers_original_markup() {
        let mut meta = Metadata::new();
        meta.insert("html".into(), json!("<p class=\"lead\">Hi</p>"));
        let chunk = Chunk::new("p", ChunkType::Paragraph, "Hi", meta);
        assert_eq!(chunk.to_html(), "<p class=\"lead\">Hi</p>");

        let bare = Chunk::new("p", ChunkType::Paragraph, "Hi", Metadata::new());
        assert_eq!(bare.to_html(), "<p>Hi</p>");
    }

    #[test]
    fn test_from_value_validates_shape() {
        let ok = Chunk::from_value(&json!({
            "id": "x", "type": "heading", "content": "T", "metadata": {"level": 1}
        }))
        .unwrap();
        assert_eq!(ok.level(), Some(1));

        assert!(Chunk::from_value(&Value::Null).is_none());
        assert!(Chunk::from_value(&json!(42)).is_none());
        assert!(Chunk::from_value(&json!({"id": "x", "type": "paragraph"})).is_none());
        assert!(Chunk::from_value(&json!({"id": "x", "type": "paragraph", "content": "a", "metadata": 3})).is_none());
    }

    #[test]
    fn test_serializes_with_wire_names() {
        let chunk = Chunk::new("x", ChunkType::Separator, "<hr />", Metadata::new());
        let value = serde_json::to_value(&chunk).unwrap();
        assert_eq!(value["type"], "separator");
        assert_eq!(value["estimatedHeight"], 24);
    }
}
