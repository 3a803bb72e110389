//! Document-level processing loop
//!
//! Chunk, sanitize each processing chunk in order, recombine, then parse into
//! render chunks. The loop yields to the runtime after every chunk so a host
//! UI stays responsive; it never runs chunks in parallel.

use super::backend::FormattingBackend;
use super::chunker::{DEFAULT_WORD_BUDGET, WordBudgetChunker};
use crate::chunk::{Chunk, ChunkParser};
use crate::dom::{Html5everProvider, TreeProvider};
use crate::sanitize::Sanitizer;
use crate::utils::Result;
use serde::Serialize;
use std::sync::Arc;

/// Processing configuration
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Maximum words per processing chunk
    pub word_budget: usize,
    /// Yield to the async runtime after each processing chunk
    pub yield_between_chunks: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            word_budget: DEFAULT_WORD_BUDGET,
            yield_between_chunks: true,
        }
    }
}

/// Pipeline stage reported with progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Chunking,
    Processing,
    Combining,
    Complete,
}

/// Advisory progress report
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Processing chunks finished so far
    pub current: usize,
    /// Total processing chunks
    pub total: usize,
    /// 0..=100
    pub percentage: u32,
    pub stage: Stage,
    /// Only set once the final word count is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_words: Option<usize>,
}

/// Result of processing a document
#[derive(Debug, Clone, Default)]
pub struct FormattedDocument {
    /// Normalized, sanitized HTML
    pub html: String,
    /// Render chunks parsed from `html`
    pub chunks: Vec<Chunk>,
    pub total_words: usize,
    pub processing_chunks: usize,
}

/// Stateless document processing service
#[derive(Clone)]
pub struct DocumentProcessor {
    config: ProcessorConfig,
    chunker: WordBudgetChunker,
    sanitizer: Sanitizer,
    parser: ChunkParser,
}

impl DocumentProcessor {
    /// Create a processor backed by html5ever
    pub fn new(config: ProcessorConfig) -> Self {
        Self::with_provider(config, Arc::new(Html5everProvider::new()))
    }

    pub fn with_provider(config: ProcessorConfig, provider: Arc<dyn TreeProvider>) -> Self {
        Self {
            chunker: WordBudgetChunker::with_provider(provider.clone(), config.word_budget),
            sanitizer: Sanitizer::with_provider(provider.clone()),
            parser: ChunkParser::with_provider(provider),
            config,
        }
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn chunker(&self) -> &WordBudgetChunker {
        &self.chunker
    }

    /// Normalize and sanitize a document, reporting progress.
    ///
    /// Percentages: 10 once chunking has run, 10..90 across processing chunks,
    /// 95 at recombination and 100 only after the result is complete.
    pub async fn format_document<F>(&self, html: &str, mut on_progress: F) -> FormattedDocument
    where
        F: FnMut(Progress),
    {
        match self.run(html, None, &mut on_progress).await {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("document processing failed: {}", e);
                FormattedDocument::default()
            }
        }
    }

    /// Like [`format_document`](Self::format_document), but every processing
    /// chunk goes through `backend` first. A backend failure aborts the run.
    pub async fn format_with_backend<F>(
        &self,
        backend: &dyn FormattingBackend,
        html: &str,
        mut on_progress: F,
    ) -> Result<FormattedDocument>
    where
        F: FnMut(Progress),
    {
        self.run(html, Some(backend), &mut on_progress).await
    }

    async fn run<F>(
        &self,
        html: &str,
        backend: Option<&dyn FormattingBackend>,
        on_progress: &mut F,
    ) -> Result<FormattedDocument>
    where
        F: FnMut(Progress),
    {
        if html.trim().is_empty() {
            on_progress(Progress {
                current: 0,
                total: 0,
                percentage: 100,
                stage: Stage::Complete,
                total_words: Some(0),
            });
            return Ok(FormattedDocument::default());
        }

        let pieces = self.chunker.chunk_by_word_budget(html);
        let total = pieces.len();
        on_progress(Progress {
            current: 0,
            total,
            percentage: 10,
            stage: Stage::Chunking,
            total_words: None,
        });

        let mut results = Vec::with_capacity(total);
        for (i, piece) in pieces.iter().enumerate() {
            let processed = match backend {
                Some(backend) => {
                    let formatted = backend.format(piece).await.inspect_err(|e| {
                        log::warn!("formatting backend failed on chunk {}/{}: {}", i + 1, total, e);
                    })?;
                    self.sanitizer.process_chunk(&formatted)
                }
                None => self.sanitizer.process_chunk(piece),
            };
            results.push(processed);

            on_progress(Progress {
                current: i + 1,
                total,
                percentage: 10 + (80 * (i + 1) / total) as u32,
                stage: Stage::Processing,
                total_words: None,
            });

            if self.config.yield_between_chunks {
                tokio::task::yield_now().await;
            }
        }

        on_progress(Progress {
            current: total,
            total,
            percentage: 95,
            stage: Stage::Combining,
            total_words: None,
        });

        let combined = results.join("\n");
        let total_words = self.chunker.count_words(&combined);
        let chunks = self.parser.parse_str(&combined);
        log::debug!(
            "processed {} chunks into {} render chunks, {} words",
            total,
            chunks.len(),
            total_words
        );

        on_progress(Progress {
            current: total,
            total,
            percentage: 100,
            stage: Stage::Complete,
            total_words: Some(total_words),
        });

        Ok(FormattedDocument {
            html: combined,
            chunks,
            total_words,
            processing_chunks: total,
        })
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(ProcessorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkType;
    use crate::streaming::PassthroughBackend;
    use crate::utils::{BackendError, ChunkviewError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn processor(budget: usize) -> DocumentProcessor {
        DocumentProcessor::new(ProcessorConfig {
            word_budget: budget,
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn test_progress_sequence() {
        let html = "<p>a b</p><p>c d</p><p>e f</p><p>g h</p>";
        let mut seen = Vec::new();
        let doc = processor(2).format_document(html, |p| seen.push(p)).await;

        let percentages: Vec<u32> = seen.iter().map(|p| p.percentage).collect();
        assert_eq!(percentages, vec![10, 30, 50, 70, 90, 95, 100]);
        assert_eq!(seen[0].stage, Stage::Chunking);
        assert_eq!(seen.last().unwrap().stage, Stage::Complete);
        assert_eq!(seen.last().unwrap().total_words, Some(8));
        assert!(seen[..seen.len() - 1].iter().all(|p| p.total_words.is_none()));
        assert_eq!(doc.processing_chunks, 4);
        assert_eq!(doc.total_words, 8);
    }

    #[tokio::test]
    async fn test_results_keep_document_order() {
        let html = "<h1>One</h1><p>two</p><table><tr><th>H</th></tr></table><p>four</p>";
        let doc = processor(1).format_document(html, |_| {}).await;
        let types: Vec<_> = doc.chunks.iter().map(|c| c.chunk_type()).collect();
        assert_eq!(
            types,
            vec![ChunkType::Heading, ChunkType::Paragraph, ChunkType::Table, ChunkType::Paragraph]
        );
        assert!(doc.html.contains("<thead>"));
    }

    #[tokio::test]
    async fn test_empty_document() {
        let mut seen = Vec::new();
        let doc = processor(10).format_document("   ", |p| seen.push(p)).await;
        assert!(doc.chunks.is_empty());
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].percentage, 100);
    }

    #[tokio::test]
    async fn test_sanitizes_each_chunk() {
        let html = "<p onclick=\"x\">safe<script>bad()</script></p>";
        let doc = processor(100).format_document(html, |_| {}).await;
        assert_eq!(doc.html, "<p>safe</p>");
    }

    struct CountingBackend {
        calls: AtomicUsize,
        fail_on: Option<usize>,
    }

    #[async_trait]
    impl FormattingBackend for CountingBackend {
        async fn format(&self, text: &str) -> std::result::Result<String, BackendError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if Some(call) == self.fail_on {
                return Err(BackendError::Timeout);
            }
            Ok(text.replace("<p>", "<p class=\"fmt\">"))
        }
    }

    #[tokio::test]
    async fn test_backend_runs_per_chunk() {
        let backend = CountingBackend {
            calls: AtomicUsize::new(0),
            fail_on: None,
        };
        let doc = processor(1)
            .format_with_backend(&backend, "<p>a</p><p>b</p>", |_| {})
            .await
            .unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert_eq!(doc.html, "<p class=\"fmt\">a</p>\n<p class=\"fmt\">b</p>");
    }

    #[tokio::test]
    async fn test_backend_failure_surfaces() {
        let backend = CountingBackend {
            calls: AtomicUsize::new(0),
            fail_on: Some(1),
        };
        let mut last = None;
        let err = processor(1)
            .format_with_backend(&backend, "<p>a</p><p>b</p><p>c</p>", |p| last = Some(p))
            .await
            .unwrap_err();
        assert!(matches!(err, ChunkviewError::Backend(BackendError::Timeout)));
        assert_ne!(last.map(|p| p.percentage), Some(100));
    }

    #[tokio::test]
    async fn test_passthrough_backend_matches_plain_run() {
        let html = "<h2>x</h2><pre>y</pre>";
        let p = processor(50);
        let plain = p.format_document(html, |_| {}).await;
        let passed = p
            .format_with_backend(&PassthroughBackend, html, |_| {})
            .await
            .unwrap();
        assert_eq!(plain.html, passed.html);
    }

    #[tokio::test]
    async fn test_rejected_chunk_stops_run() {
        let mut backend = crate::streaming::MockFormattingBackend::new();
        backend
            .expect_format()
            .times(1)
            .returning(|_| Err(BackendError::Rejected("quota".into())));

        let err = processor(1)
            .format_with_backend(&backend, "<p>a</p><p>b</p>", |_| {})
            .await
            .unwrap_err();
        match err {
            ChunkviewError::Backend(e) => assert!(!e.is_retryable()),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_runs_without_yielding() {
        let processor = DocumentProcessor::new(ProcessorConfig {
            word_budget: 1,
            yield_between_chunks: false,
        });
        let doc = tokio_test::block_on(processor.format_document("<p>a</p><p>b</p>", |_| {}));
        assert_eq!(doc.processing_chunks, 2);
        assert_eq!(doc.chunks.len(), 2);
    }
}
