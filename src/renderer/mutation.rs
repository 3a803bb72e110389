//! Copy-on-write chunk mutations
//!
//! Every mutation takes the full sequence and returns a new one; the chunk at
//! `index` is replaced or removed, never edited in place. Any mutation other
//! than delete drops the retained original markup, since it no longer matches.

use crate::chunk::{Alignment, Chunk, ChunkType, ChunkUpdate, count_open_tags};
use crate::dom::escape_text;
use crate::utils::{ChunkviewError, Result};

/// Inline style applied by the toolbar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InlineStyle {
    Bold,
    Italic,
    Underline,
}

impl InlineStyle {
    pub fn tag(&self) -> &'static str {
        match self {
            InlineStyle::Bold => "strong",
            InlineStyle::Italic => "em",
            InlineStyle::Underline => "u",
        }
    }
}

/// A change requested through the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkMutation {
    /// Replace the content (callers debounce keystrokes)
    EditContent(String),
    /// Rebuild the chunk as another type
    ChangeType(ChunkType),
    /// Wrap the content in an inline style tag. Repeated toggles nest.
    ToggleStyle(InlineStyle),
    SetAlignment(Alignment),
    Delete,
}

/// Apply `mutation` to the chunk at `index`, returning the new sequence
pub fn apply_mutation(chunks: &[Chunk], index: usize, mutation: &ChunkMutation) -> Result<Vec<Chunk>> {
    let Some(target) = chunks.get(index) else {
        return Err(ChunkviewError::Input(format!(
            "chunk index {} out of range ({} chunks)",
            index,
            chunks.len()
        )));
    };

    let replacement = match mutation {
        ChunkMutation::Delete => {
            let mut next = chunks.to_vec();
            next.remove(index);
            return Ok(next);
        }
        ChunkMutation::EditContent(content) => {
            let mut update = ChunkUpdate::new().content(content.clone()).remove_meta("html");
            if target.chunk_type() == ChunkType::Table {
                update = update.meta("rows", count_open_tags(content, "tr"));
            }
            target.clone_with(update)
        }
        ChunkMutation::ChangeType(chunk_type) => convert_type(target, *chunk_type),
        ChunkMutation::ToggleStyle(style) => {
            let tag = style.tag();
            target.clone_with(
                ChunkUpdate::new()
                    .content(format!("<{tag}>{}</{tag}>", target.content()))
                    .remove_meta("html"),
            )
        }
        ChunkMutation::SetAlignment(alignment) => target.clone_with(
            ChunkUpdate::new()
                .meta("alignment", alignment.as_str())
                .remove_meta("html"),
        ),
    };

    let mut next = chunks.to_vec();
    next[index] = replacement;
    Ok(next)
}

/// Content of `chunk` usable as inline HTML inside another block type
fn inline_content(chunk: &Chunk) -> String {
    match chunk.chunk_type() {
        ChunkType::Code => escape_text(chunk.content()),
        ChunkType::List | ChunkType::Table => escape_text(chunk.plain_text().trim()),
        ChunkType::Separator => String::new(),
        _ => chunk.content().to_string(),
    }
}

/// Build a chunk of `target` type from `chunk`, supplying metadata defaults
pub fn convert_type(chunk: &Chunk, target: ChunkType) -> Chunk {
    if chunk.chunk_type() == target {
        return chunk.clone();
    }

    let mut update = ChunkUpdate::new().chunk_type(target).remove_meta("html");
    match target {
        ChunkType::Heading => {
            if chunk.level().is_none() {
                update = update.meta("level", 2);
            }
            update = update.content(inline_content(chunk));
        }
        ChunkType::Code => {
            update = update
                .meta("language", chunk.language().to_string())
                .content(chunk.plain_text());
        }
        ChunkType::List => {
            if !chunk.metadata().contains_key("ordered") {
                update = update.meta("ordered", false);
            }
            update = update.content(format!("<li>{}</li>", inline_content(chunk)));
        }
        ChunkType::Table => {
            update = update
                .meta("rows", 1)
                .content(format!("<tbody><tr><td>{}</td></tr></tbody>", inline_content(chunk)));
        }
        ChunkType::Separator => {
            update = update.content("<hr />");
        }
        ChunkType::Paragraph | ChunkType::Blockquote => {
            update = update.content(inline_content(chunk));
        }
    }
    chunk.clone_with(update)
}
