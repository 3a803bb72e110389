//! Layout batching for scroll and edit coalescing
//!
//! Groups layout changes together so a burst of scroll/resize events or
//! edits costs one layout pass:
//! - Queue changes as they arrive
//! - Flush once per frame, or when the batch grows too large

use std::time::{Duration, Instant};

use super::dirty_tracking::{DirtyTracker, LayoutChange};

/// When an open batch becomes due
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Queued changes that force a flush
    pub max_batch_size: usize,
    /// Age of the open batch that forces a flush (one frame)
    pub max_batch_delay: Duration,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 100,
            max_batch_delay: Duration::from_millis(16), // ~60fps
        }
    }
}

/// Collects layout changes until the next frame
#[derive(Debug)]
pub struct LayoutBatcher {
    config: BatchConfig,
    pending: DirtyTracker,
    opened_at: Option<Instant>,
    stats: BatchStats,
}

/// Running totals across flushed batches
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub total_batches: usize,
    pub total_changes: usize,
    pub changes_per_batch: f32,
    /// Layout passes avoided by coalescing
    pub layouts_saved: usize,
}

impl BatchStats {
    fn record(&mut self, changes: usize) {
        self.total_batches += 1;
        self.total_changes += changes;
        self.changes_per_batch = self.total_changes as f32 / self.total_batches as f32;
        self.layouts_saved += changes.saturating_sub(1);
    }
}

/// What one layout pass has to apply
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub changes_processed: usize,
    /// Slots to re-measure, ascending
    pub dirty_chunks: Vec<usize>,
    /// Latest requested scroll offset, if any
    pub scroll_top: Option<f32>,
    /// Latest requested viewport height, if any
    pub viewport_height: Option<f32>,
    pub needs_full_layout: bool,
}

impl From<DirtyTracker> for BatchResult {
    fn from(tracker: DirtyTracker) -> Self {
        Self {
            changes_processed: tracker.pending_changes().len(),
            dirty_chunks: tracker.dirty_chunks().collect(),
            scroll_top: tracker.scroll_top(),
            viewport_height: tracker.viewport_height(),
            needs_full_layout: tracker.needs_full_layout(),
        }
    }
}

impl LayoutBatcher {
    pub fn new(config: BatchConfig) -> Self {
        Self {
            config,
            pending: DirtyTracker::new(),
            opened_at: None,
            stats: BatchStats::default(),
        }
    }

    /// Add a change to the open batch, opening one if needed
    pub fn queue(&mut self, change: LayoutChange) {
        self.opened_at.get_or_insert_with(Instant::now);
        self.pending.queue_change(change);
    }

    /// True once the open batch is full or a frame has elapsed since it opened
    pub fn is_due(&self) -> bool {
        if self.is_empty() {
            return false;
        }
        self.pending_count() >= self.config.max_batch_size
            || self
                .opened_at
                .is_some_and(|at| at.elapsed() >= self.config.max_batch_delay)
    }

    /// Close the open batch and hand back everything it collected
    pub fn flush(&mut self) -> BatchResult {
        self.opened_at = None;
        let result = BatchResult::from(std::mem::take(&mut self.pending));
        self.stats.record(result.changes_processed);
        result
    }

    pub fn stats(&self) -> &BatchStats {
        &self.stats
    }

    pub fn pending_count(&self) -> usize {
        self.pending.pending_changes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending_count() == 0
    }
}

impl Default for LayoutBatcher {
    fn default() -> Self {
        Self::new(BatchConfig::default())
    }
}
