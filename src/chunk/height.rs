//! Height estimation for virtualized layout
//!
//! Estimates are layout hints only. They are computed from the chunk's type,
//! content length and metadata and never from a rendered element; the renderer
//! reconciles them against measured heights.

use super::{ChunkType, Metadata, meta_u64};

/// Constants used to estimate chunk heights, in pixel-equivalent units
#[derive(Debug, Clone, PartialEq)]
pub struct HeightModel {
    /// Heading heights for levels 1..=6, tallest first
    pub heading_heights: [u32; 6],
    /// Line height for paragraph-like text
    pub line_height: u32,
    /// Characters per rendered line of paragraph text
    pub chars_per_line: usize,
    /// Vertical padding added to paragraphs
    pub paragraph_padding: u32,
    /// Cap for paragraph-like chunks
    pub paragraph_max: u32,
    /// Height of one table row
    pub table_row_height: u32,
    /// Fixed table overhead (borders, header spacing)
    pub table_overhead: u32,
    /// Cap for tables
    pub table_max: u32,
    /// Line height inside code blocks
    pub code_line_height: u32,
    /// Fixed code block overhead
    pub code_overhead: u32,
    /// Height of one list item
    pub list_item_height: u32,
    /// Fixed list overhead
    pub list_overhead: u32,
    /// Extra height for blockquote borders and margins
    pub blockquote_extra: u32,
    /// Height of a separator
    pub separator_height: u32,
}

impl Default for HeightModel {
    fn default() -> Self {
        Self {
            heading_heights: [48, 40, 34, 30, 26, 24],
            line_height: 24,
            chars_per_line: 80,
            paragraph_padding: 16,
            paragraph_max: 400,
            table_row_height: 40,
            table_overhead: 60,
            table_max: 600,
            code_line_height: 20,
            code_overhead: 40,
            list_item_height: 28,
            list_overhead: 20,
            blockquote_extra: 16,
            separator_height: 24,
        }
    }
}

impl HeightModel {
    /// Estimate the height of a chunk. Pure.
    pub fn estimate(&self, chunk_type: ChunkType, content: &str, metadata: &Metadata) -> u32 {
        match chunk_type {
            ChunkType::Heading => {
                let level = meta_u64(metadata, "level").unwrap_or(2).clamp(1, 6) as usize;
                self.heading_heights[level - 1]
            }
            ChunkType::Table => {
                let rows = meta_u64(metadata, "rows")
                    .map(|r| u32::try_from(r).unwrap_or(u32::MAX))
                    .unwrap_or_else(|| count_open_tags(content, "tr").max(1));
                rows.saturating_mul(self.table_row_height)
                    .saturating_add(self.table_overhead)
                    .min(self.table_max)
            }
            ChunkType::Code => {
                let lines = u32::try_from(content.lines().count().max(1)).unwrap_or(u32::MAX);
                lines
                    .saturating_mul(self.code_line_height)
                    .saturating_add(self.code_overhead)
            }
            ChunkType::List => {
                let items = count_open_tags(content, "li").max(1);
                items
                    .saturating_mul(self.list_item_height)
                    .saturating_add(self.list_overhead)
            }
            ChunkType::Blockquote => {
                self.paragraph(content).saturating_add(self.blockquote_extra)
            }
            ChunkType::Separator => self.separator_height,
            ChunkType::Paragraph => self.paragraph(content),
        }
    }

    fn paragraph(&self, content: &str) -> u32 {
        let len = content.chars().count();
        let lines = len.div_ceil(self.chars_per_line.max(1)).max(1) as u32;
        lines
            .saturating_mul(self.line_height)
            .saturating_add(self.paragraph_padding)
            .min(self.paragraph_max)
    }
}

/// Count `<tag` openings (`<li>`, `<li class=..>`) without matching `<link>`
pub(crate) fn count_open_tags(html: &str, tag: &str) -> u32 {
    let needle = format!("<{tag}");
    let lower = html.to_ascii_lowercase();
    lower
        .match_indices(&needle)
        .filter(|(pos, _)| {
            lower[pos + needle.len()..]
                .chars()
                .next()
                .is_some_and(|c| c == '>' || c == '/' || c.is_ascii_whitespace())
        })
        .count() as u32
}
