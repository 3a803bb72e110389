//! Vertical layout of chunk slots
//!
//! Slots are stacked top to bottom using estimated (or reconciled) heights.
//! Prefix sums give each slot's position; the visible range is found by
//! binary search.

use std::ops::Range;

/// Vertical span of one slot
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Span {
    pub top: f32,
    pub height: f32,
}

/// Stacked slot layout
#[derive(Debug, Clone, Default)]
pub struct VirtualLayout {
    heights: Vec<f32>,
    starts: Vec<f32>,
    ends: Vec<f32>,
}

impl VirtualLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lay out all slots from scratch
    pub fn rebuild(&mut self, heights: impl IntoIterator<Item = f32>) {
        self.heights = heights.into_iter().map(|h| h.max(0.0)).collect();
        self.starts = vec![0.0; self.heights.len()];
        self.ends = vec![0.0; self.heights.len()];
        self.recompute_from(0);
    }

    /// Replace one slot's height; slots below it shift
    pub fn set_height(&mut self, index: usize, height: f32) {
        if let Some(slot) = self.heights.get_mut(index) {
            *slot = height.max(0.0);
            self.recompute_from(index);
        }
    }

    fn recompute_from(&mut self, index: usize) {
        let mut top = if index == 0 { 0.0 } else { self.ends[index - 1] };
        for i in index..self.heights.len() {
            self.starts[i] = top;
            top += self.heights[i];
            self.ends[i] = top;
        }
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn span(&self, index: usize) -> Option<Span> {
        Some(Span {
            top: *self.starts.get(index)?,
            height: self.heights[index],
        })
    }

    pub fn total_height(&self) -> f32 {
        self.ends.last().copied().unwrap_or(0.0)
    }

    /// Slots intersecting the viewport, widened by `overscan` slots each way
    pub fn visible_range(&self, scroll_top: f32, viewport_height: f32, overscan: usize) -> Range<usize> {
        let n = self.len();
        if n == 0 {
            return 0..0;
        }
        let bottom = scroll_top + viewport_height.max(0.0);
        let first = self.ends.partition_point(|&end| end <= scroll_top);
        let last = self.starts.partition_point(|&start| start < bottom).max(first);

        first.saturating_sub(overscan)..(last + overscan).min(n)
    }
}
