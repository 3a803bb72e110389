//! Dirty tracking for incremental layout
//!
//! Tracks which parts of the chunk layout need recalculation:
//! - Dirty chunks: slots whose content or type changed
//! - Viewport changes: only the most recent scroll/resize matters
//! - Full layout: the sequence itself changed shape

use std::collections::{BTreeSet, VecDeque};

/// Type of layout change
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutChange {
    /// Chunk content changed
    ContentChange(usize),
    /// Chunk type changed
    TypeChange(usize),
    /// Chunk removed from the sequence
    ChunkRemoved(usize),
    /// Whole sequence replaced
    SequenceReplaced,
    /// Scroll offset changed
    Scroll(f32),
    /// Viewport height changed
    ViewportResize(f32),
}

/// Dirty tracking for layout invalidation
#[derive(Debug, Default)]
pub struct DirtyTracker {
    /// Indices of dirty chunk slots
    dirty_chunks: BTreeSet<usize>,
    /// Pending layout changes
    pending_changes: VecDeque<LayoutChange>,
    /// Latest requested scroll offset
    scroll_top: Option<f32>,
    /// Latest requested viewport height
    viewport_height: Option<f32>,
    /// Whether full layout is needed
    needs_full_layout: bool,
}

impl DirtyTracker {
    /// Create a new dirty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a layout change
    pub fn queue_change(&mut self, change: LayoutChange) {
        match &change {
            LayoutChange::ContentChange(index) | LayoutChange::TypeChange(index) => {
                self.dirty_chunks.insert(*index);
            }
            LayoutChange::ChunkRemoved(_) | LayoutChange::SequenceReplaced => {
                self.needs_full_layout = true;
            }
            LayoutChange::Scroll(offset) => self.scroll_top = Some(*offset),
            LayoutChange::ViewportResize(height) => self.viewport_height = Some(*height),
        }
        self.pending_changes.push_back(change);
    }

    /// Check if full layout is needed
    pub fn needs_full_layout(&self) -> bool {
        self.needs_full_layout
    }

    /// Dirty slots in ascending order
    pub fn dirty_chunks(&self) -> impl Iterator<Item = usize> + '_ {
        self.dirty_chunks.iter().copied()
    }

    pub fn scroll_top(&self) -> Option<f32> {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> Option<f32> {
        self.viewport_height
    }

    /// Get pending changes
    pub fn pending_changes(&self) -> &VecDeque<LayoutChange> {
        &self.pending_changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_scroll_wins() {
        let mut tracker = DirtyTracker::new();
        tracker.queue_change(LayoutChange::Scroll(10.0));
        tracker.queue_change(LayoutChange::Scroll(250.0));
        tracker.queue_change(LayoutChange::ViewportResize(600.0));

        assert_eq!(tracker.scroll_top(), Some(250.0));
        assert_eq!(tracker.viewport_height(), Some(600.0));
        assert_eq!(tracker.pending_changes().len(), 3);
        assert!(!tracker.needs_full_layout());
    }

    #[test]
    fn test_removal_needs_full_layout() {
        let mut tracker = DirtyTracker::new();
        tracker.queue_change(LayoutChange::ChunkRemoved(4));

        assert!(tracker.needs_full_layout());
        assert_eq!(tracker.dirty_chunks().count(), 0);
    }

    #[test]
    fn test_edits_mark_slots_in_order() {
        let mut tracker = DirtyTracker::new();
        tracker.queue_change(LayoutChange::TypeChange(7));
        tracker.queue_change(LayoutChange::ContentChange(2));
        tracker.queue_change(LayoutChange::ContentChange(7));

        assert_eq!(tracker.dirty_chunks().collect::<Vec<_>>(), vec![2, 7]);
        assert!(!tracker.needs_full_layout());
    }
}
