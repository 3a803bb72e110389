//! Incremental document processing
//!
//! Large documents are processed in word-bounded slices:
//! - [`WordBudgetChunker`] splits HTML between block-level elements
//! - [`DocumentProcessor`] sanitizes the slices one at a time, reports
//!   progress and yields to the runtime between slices
//! - [`FormattingBackend`] is the seam for an external formatting service

mod backend;
mod chunker;
mod processor;

pub use backend::{FormattingBackend, PassthroughBackend};
#[cfg(test)]
pub use backend::MockFormattingBackend;
pub use chunker::{DEFAULT_WORD_BUDGET, WordBudgetChunker};
pub use processor::{DocumentProcessor, FormattedDocument, ProcessorConfig, Progress, Stage};
