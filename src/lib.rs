//! # Chunkview - Chunked Document Formatting and Virtualized Rendering
//!
//! Takes arbitrary (possibly malformed) HTML, normalizes and sanitizes it in
//! bounded word-budget pieces, splits the result into typed render chunks and
//! lays those out in a windowed renderer that only materializes what is near
//! the viewport.
//!
//! ## Architecture
//!
//! - **dom**: owned node tree, html5ever-backed parsing and serialization
//! - **streaming**: word-budget chunking and the async processing loop
//! - **sanitize**: structural repair and allow-list sanitization
//! - **chunk**: render chunk model, height estimation and HTML/text parsers
//! - **renderer**: virtual layout, interaction state and chunk mutations
//! - **utils**: shared error types

pub mod chunk;
pub mod dom;
pub mod renderer;
pub mod sanitize;
pub mod streaming;
pub mod utils;

// Re-export main types for convenience
pub use chunk::{Chunk, ChunkParser, ChunkType, Metadata};
pub use renderer::{RenderOutput, RendererConfig, VirtualizedRenderer};
pub use sanitize::Sanitizer;
pub use streaming::{DocumentProcessor, FormattedDocument, ProcessorConfig, Progress};
pub use utils::error::{ChunkviewError, Result};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = "Chunkview";

/// Default tuning constants
pub mod defaults {
    /// Words per processing chunk
    pub const WORD_BUDGET: usize = crate::streaming::DEFAULT_WORD_BUDGET;
    /// Viewport height used before the host reports one
    pub const VIEWPORT_HEIGHT: f32 = 800.0;
    /// Chunks rendered beyond each viewport edge
    pub const OVERSCAN: usize = 5;
    /// Minimum measured/estimated height difference worth a relayout
    pub const RECONCILE_THRESHOLD: u32 = 24;
}
