//! Virtualized chunk renderer
//!
//! Headless: the host supplies scroll offsets, viewport size and pointer/focus
//! events, and draws whatever [`VirtualizedRenderer::render`] returns. Only the
//! chunks intersecting the viewport plus an overscan margin are returned.

mod dirty_tracking;
mod interaction;
mod layout;
mod layout_batch;
mod mutation;

pub use dirty_tracking::{DirtyTracker, LayoutChange};
pub use interaction::{InteractionState, InteractionTracker};
pub use layout::{Span, VirtualLayout};
pub use layout_batch::{BatchConfig, BatchResult, BatchStats, LayoutBatcher};
pub use crate::chunk::Alignment;
pub use mutation::{ChunkMutation, InlineStyle, apply_mutation, convert_type};

use crate::chunk::{Chunk, ChunkUpdate};
use crate::utils::Result;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Text shown when there is nothing to render
pub const EMPTY_PLACEHOLDER: &str = "No content";

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Initial viewport height
    pub viewport_height: f32,
    /// Extra chunks rendered above and below the viewport
    pub overscan: usize,
    /// Measured heights closer than this to the current one are ignored
    pub reconcile_threshold: u32,
    pub batch: BatchConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            viewport_height: crate::defaults::VIEWPORT_HEIGHT,
            overscan: crate::defaults::OVERSCAN,
            reconcile_threshold: crate::defaults::RECONCILE_THRESHOLD,
            batch: BatchConfig::default(),
        }
    }
}

/// One chunk placed in the layout
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualItem {
    pub index: usize,
    pub id: String,
    pub top: f32,
    pub height: f32,
    pub state: InteractionState,
}

/// What the host should draw
#[derive(Debug, Clone, PartialEq)]
pub enum RenderOutput {
    /// Nothing to show
    Placeholder(&'static str),
    /// Chunks to mount, in document order
    Items(Vec<VirtualItem>),
}

/// Windowed renderer over an owned chunk sequence
#[derive(Debug)]
pub struct VirtualizedRenderer {
    config: RendererConfig,
    chunks: Vec<Chunk>,
    layout: VirtualLayout,
    /// Reconciled heights by chunk id
    measured: HashMap<String, f32>,
    scroll_top: f32,
    viewport_height: f32,
    interaction: InteractionTracker,
    batcher: LayoutBatcher,
    layout_passes: usize,
}

impl VirtualizedRenderer {
    pub fn new(config: RendererConfig) -> Self {
        Self {
            viewport_height: config.viewport_height.max(0.0),
            batcher: LayoutBatcher::new(config.batch.clone()),
            config,
            chunks: Vec::new(),
            layout: VirtualLayout::new(),
            measured: HashMap::new(),
            scroll_top: 0.0,
            interaction: InteractionTracker::new(),
            layout_passes: 0,
        }
    }

    /// Replace the displayed sequence.
    ///
    /// Interaction and measured heights are keyed by id, so a repeated id is
    /// renamed to `{id}-{index}`.
    pub fn set_chunks(&mut self, chunks: Vec<Chunk>) {
        let chunks = unique_ids(chunks);
        let alive = |id: &str| chunks.iter().any(|c| c.id() == id);
        self.measured.retain(|id, _| alive(id.as_str()));
        self.interaction.retain(alive);
        self.chunks = chunks;
        self.batcher.queue(LayoutChange::SequenceReplaced);
    }

    /// Replace the displayed sequence from untyped entries.
    ///
    /// Entries that are not well-formed chunk objects are skipped. Returns
    /// the number of chunks kept.
    pub fn set_entries(&mut self, entries: &[Value]) -> usize {
        let chunks: Vec<Chunk> = entries.iter().filter_map(Chunk::from_value).collect();
        let dropped = entries.len() - chunks.len();
        if dropped > 0 {
            log::debug!("skipped {} malformed chunk entries", dropped);
        }
        let kept = chunks.len();
        self.set_chunks(chunks);
        kept
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Request a scroll; applied on the next layout pass
    pub fn scroll_to(&mut self, offset: f32) {
        self.batcher.queue(LayoutChange::Scroll(offset.max(0.0)));
    }

    /// Request a viewport resize; applied on the next layout pass
    pub fn resize(&mut self, height: f32) {
        self.batcher.queue(LayoutChange::ViewportResize(height.max(0.0)));
    }

    pub fn scroll_top(&self) -> f32 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    /// Number of layout passes run so far
    pub fn layout_passes(&self) -> usize {
        self.layout_passes
    }

    pub fn batch_stats(&self) -> &BatchStats {
        self.batcher.stats()
    }

    pub fn pointer_enter(&mut self, index: usize) {
        if let Some(chunk) = self.chunks.get(index) {
            self.interaction.pointer_enter(chunk.id());
        }
    }

    pub fn pointer_leave(&mut self, index: usize) {
        if let Some(chunk) = self.chunks.get(index) {
            self.interaction.pointer_leave(chunk.id());
        }
    }

    pub fn focus(&mut self, index: usize) {
        if let Some(chunk) = self.chunks.get(index) {
            self.interaction.focus(chunk.id());
        }
    }

    pub fn blur(&mut self, index: usize) {
        if let Some(chunk) = self.chunks.get(index) {
            self.interaction.blur(chunk.id());
        }
    }

    pub fn state(&self, index: usize) -> InteractionState {
        self.chunks
            .get(index)
            .map(|c| self.interaction.state(c.id()))
            .unwrap_or_default()
    }

    /// The chunk the contextual toolbar is bound to
    pub fn toolbar_target(&self) -> Option<&Chunk> {
        let id = self.interaction.focused()?;
        self.chunks.iter().find(|c| c.id() == id)
    }

    /// Apply a mutation to the chunk at `index`.
    ///
    /// The renderer adopts the new sequence and invalidates that slot; the
    /// returned sequence is the caller's copy to store.
    pub fn mutate(&mut self, index: usize, mutation: ChunkMutation) -> Result<Vec<Chunk>> {
        let next = apply_mutation(&self.chunks, index, &mutation)?;
        let id = self.chunks[index].id().to_string();
        self.measured.remove(&id);

        let change = match mutation {
            ChunkMutation::Delete => {
                self.interaction.pointer_leave(&id);
                self.interaction.blur(&id);
                LayoutChange::ChunkRemoved(index)
            }
            ChunkMutation::ChangeType(_) => LayoutChange::TypeChange(index),
            _ => LayoutChange::ContentChange(index),
        };
        self.batcher.queue(change);
        self.chunks = next.clone();
        Ok(next)
    }

    /// Run a layout pass if the pending batch is due (frame elapsed or
    /// batch full)
    pub fn poll_frame(&mut self) -> Option<BatchResult> {
        if self.batcher.is_due() {
            Some(self.layout_pass())
        } else {
            None
        }
    }

    /// Run a layout pass for all pending changes, if any
    pub fn flush_layout(&mut self) -> Option<BatchResult> {
        if self.batcher.is_empty() {
            None
        } else {
            Some(self.layout_pass())
        }
    }

    fn slot_height(&self, chunk: &Chunk) -> f32 {
        self.measured
            .get(chunk.id())
            .copied()
            .unwrap_or(chunk.estimated_height() as f32)
    }

    fn layout_pass(&mut self) -> BatchResult {
        let result = self.batcher.flush();

        if let Some(height) = result.viewport_height {
            self.viewport_height = height;
        }

        if result.needs_full_layout || self.layout.len() != self.chunks.len() {
            let heights: Vec<f32> = self.chunks.iter().map(|c| self.slot_height(c)).collect();
            self.layout.rebuild(heights);
        } else {
            for &index in &result.dirty_chunks {
                if let Some(chunk) = self.chunks.get(index) {
                    let height = self.slot_height(chunk);
                    self.layout.set_height(index, height);
                }
            }
        }

        let max_scroll = (self.layout.total_height() - self.viewport_height).max(0.0);
        self.scroll_top = result.scroll_top.unwrap_or(self.scroll_top).min(max_scroll);

        self.layout_passes += 1;
        result
    }

    /// Record a measured height for the chunk at `index`.
    ///
    /// Ignored unless it differs from the current slot height by more than
    /// the reconcile threshold. Returns whether the layout changed.
    pub fn reconcile_height(&mut self, index: usize, measured: f32) -> bool {
        self.flush_layout();
        let Some(span) = self.layout.span(index) else {
            return false;
        };
        if (measured - span.height).abs() <= self.config.reconcile_threshold as f32 {
            return false;
        }
        let id = self.chunks[index].id().to_string();
        self.measured.insert(id, measured);
        self.layout.set_height(index, measured);
        true
    }

    /// Chunks to mount after the last layout pass
    pub fn visible_range(&self) -> Range<usize> {
        self.layout
            .visible_range(self.scroll_top, self.viewport_height, self.config.overscan)
    }

    pub fn total_height(&self) -> f32 {
        self.layout.total_height()
    }

    /// Run any pending layout pass, then return the windowed items
    pub fn render(&mut self) -> RenderOutput {
        self.flush_layout();

        if self.chunks.is_empty() {
            return RenderOutput::Placeholder(EMPTY_PLACEHOLDER);
        }

        let items = self
            .visible_range()
            .filter_map(|index| {
                let chunk = self.chunks.get(index)?;
                let span = self.layout.span(index)?;
                Some(VirtualItem {
                    index,
                    id: chunk.id().to_string(),
                    top: span.top,
                    height: span.height,
                    state: self.interaction.state(chunk.id()),
                })
            })
            .collect();

        RenderOutput::Items(items)
    }
}

fn unique_ids(chunks: Vec<Chunk>) -> Vec<Chunk> {
    let mut seen: HashSet<String> = chunks.iter().map(|c| c.id().to_string()).collect();
    if seen.len() == chunks.len() {
        return chunks;
    }

    let mut kept = HashSet::with_capacity(chunks.len());
    chunks
        .into_iter()
        .enumerate()
        .map(|(index, chunk)| {
            if kept.insert(chunk.id().to_string()) {
                return chunk;
            }
            let mut id = format!("{}-{}", chunk.id(), index);
            while seen.contains(&id) {
                id.push('_');
            }
            log::debug!("duplicate chunk id {:?} renamed to {:?}", chunk.id(), id);
            seen.insert(id.clone());
            kept.insert(id.clone());
            chunk.clone_with(ChunkUpdate::new().id(id))
        })
        .collect()
}

impl Default for VirtualizedRenderer {
    fn default() -> Self {
        Self::new(RendererConfig::default())
    }
}
