//! Smart chunking of plain text input
//!
//! Text extracted from binary documents arrives without markup. Blocks are
//! separated by blank lines; light markdown-like cues pick the chunk type.

use super::{Chunk, ChunkType, Metadata};
use crate::dom::escape_text;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Block {
    None,
    Paragraph,
    List { ordered: bool },
    Quote,
}

struct TextChunker {
    chunks: Vec<Chunk>,
    block: Block,
    lines: Vec<String>,
}

impl TextChunker {
    fn emit(&mut self, chunk_type: ChunkType, content: String, metadata: Metadata) {
        let id = format!("chunk-{}", self.chunks.len());
        self.chunks.push(Chunk::new(id, chunk_type, content, metadata));
    }

    fn flush(&mut self) {
        let lines = std::mem::take(&mut self.lines);
        let block = std::mem::replace(&mut self.block, Block::None);
        if lines.is_empty() {
            return;
        }
        match block {
            Block::None => {}
            Block::Paragraph => {
                self.emit(ChunkType::Paragraph, escape_text(&lines.join(" ")), Metadata::new());
            }
            Block::Quote => {
                let content = format!("<p>{}</p>", escape_text(&lines.join(" ")));
                self.emit(ChunkType::Blockquote, content, Metadata::new());
            }
            Block::List { ordered } => {
                let content: String = lines
                    .iter()
                    .map(|item| format!("<li>{}</li>", escape_text(item)))
                    .collect();
                let mut meta = Metadata::new();
                meta.insert("ordered".into(), Value::Bool(ordered));
                self.emit(ChunkType::List, content, meta);
            }
        }
    }

    fn push_line(&mut self, block: Block, line: &str) {
        if self.block != block {
            self.flush();
            self.block = block;
        }
        self.lines.push(line.to_string());
    }
}

fn list_item(line: &str) -> Option<(bool, &str)> {
    for marker in ["- ", "* ", "+ "] {
        if let Some(rest) = line.strip_prefix(marker) {
            return Some((false, rest));
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(". ") {
            return Some((true, rest));
        }
    }
    None
}

fn is_rule(line: &str) -> bool {
    line.len() >= 3
        && ['-', '*', '_']
            .iter()
            .any(|&c| line.chars().all(|l| l == c))
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let hashes = line.chars().take_while(|&c| c == '#').count();
    if (1..=6).contains(&hashes) {
        let rest = line[hashes..].strip_prefix(' ')?;
        return Some((hashes, rest.trim()));
    }
    None
}

/// Split plain text into chunks
pub fn parse_plain_text(text: &str) -> Vec<Chunk> {
    let mut chunker = TextChunker {
        chunks: Vec::new(),
        block: Block::None,
        lines: Vec::new(),
    };

    let mut lines = text.lines();
    while let Some(raw) = lines.next() {
        let line = raw.trim();

        if let Some(lang) = line.strip_prefix("```") {
            chunker.flush();
            let mut body = Vec::new();
            for code_line in lines.by_ref() {
                if code_line.trim() == "```" {
                    break;
                }
                body.push(code_line);
            }
            let mut meta = Metadata::new();
            let lang = lang.trim();
            meta.insert(
                "language".into(),
                Value::String(if lang.is_empty() { "plaintext" } else { lang }.to_string()),
            );
            chunker.emit(ChunkType::Code, body.join("\n"), meta);
            continue;
        }

        if line.is_empty() {
            chunker.flush();
        } else if let Some((level, title)) = heading(line) {
            chunker.flush();
            let mut meta = Metadata::new();
            meta.insert("level".into(), level.into());
            chunker.emit(ChunkType::Heading, escape_text(title), meta);
        } else if is_rule(line) {
            chunker.flush();
            chunker.emit(ChunkType::Separator, "<hr />".into(), Metadata::new());
        } else if let Some((ordered, item)) = list_item(line) {
            chunker.push_line(Block::List { ordered }, item);
        } else if let Some(quote) = line.strip_prefix('>') {
            chunker.push_line(Block::Quote, quote.trim());
        } else {
            chunker.push_line(Block::Paragraph, line);
        }
    }
    chunker.flush();

    chunker.chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraphs_split_on_blank_lines() {
        let chunks = parse_plain_text("first line\nstill first\n\nsecond & last");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].content(), "first line still first");
        assert_eq!(chunks[1].content(), "second &amp; last");
    }

    #[test]
    fn test_structure_cues() {
        let text = "# Title\n\n- a\n- b\n1. one\n\n> quoted\n\n---\n```rust\nfn x() {}\n\nlet y = 1;\n```\ntail";
        let chunks = parse_plain_text(text);
        let types: Vec<_> = chunks.iter().map(Chunk::chunk_type).collect();
        assert_eq!(
            types,
            vec![
                ChunkType::Heading,
                ChunkType::List,
                ChunkType::List,
                ChunkType::Blockquote,
                ChunkType::Separator,
                ChunkType::Code,
                ChunkType::Paragraph,
            ]
        );
        assert_eq!(chunks[0].level(), Some(1));
        assert_eq!(chunks[1].content(), "<li>a</li><li>b</li>");
        assert!(chunks[2].ordered());
        assert_eq!(chunks[5].language(), "rust");
        assert_eq!(chunks[5].content(), "fn x() {}\n\nlet y = 1;");
    }

    #[test]
    fn test_ids_are_sequential() {
        let chunks = parse_plain_text("a\n\nb\n\nc");
        let ids: Vec<_> = chunks.iter().map(|c| c.id().to_string()).collect();
        assert_eq!(ids, vec!["chunk-0", "chunk-1", "chunk-2"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(parse_plain_text("").is_empty());
        assert!(parse_plain_text("\n\n  \n").is_empty());
    }
}
