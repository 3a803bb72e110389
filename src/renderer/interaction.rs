//! Per-chunk interaction state
//!
//! `Idle -> Hovered -> EditingFocused`, driven by pointer and focus events.
//! At most one chunk is focused; the contextual toolbar binds to it.

/// Interaction state of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Hovered,
    EditingFocused,
}

/// Tracks hover and focus by chunk id
#[derive(Debug, Clone, Default)]
pub struct InteractionTracker {
    hovered: Option<String>,
    focused: Option<String>,
}

impl InteractionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: &str) -> InteractionState {
        if self.focused.as_deref() == Some(id) {
            InteractionState::EditingFocused
        } else if self.hovered.as_deref() == Some(id) {
            InteractionState::Hovered
        } else {
            InteractionState::Idle
        }
    }

    pub fn pointer_enter(&mut self, id: &str) {
        self.hovered = Some(id.to_string());
    }

    pub fn pointer_leave(&mut self, id: &str) {
        if self.hovered.as_deref() == Some(id) {
            self.hovered = None;
        }
    }

    /// Focus `id`, taking focus away from any other chunk
    pub fn focus(&mut self, id: &str) {
        self.focused = Some(id.to_string());
    }

    pub fn blur(&mut self, id: &str) {
        if self.focused.as_deref() == Some(id) {
            self.focused = None;
        }
    }

    /// Id of the chunk the toolbar is bound to
    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Drop state for ids no longer present
    pub fn retain(&mut self, mut alive: impl FnMut(&str) -> bool) {
        if self.hovered.as_deref().is_some_and(|id| !alive(id)) {
            self.hovered = None;
        }
        if self.focused.as_deref().is_some_and(|id| !alive(id)) {
            self.focused = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let mut tracker = InteractionTracker::new();
        assert_eq!(tracker.state("a"), InteractionState::Idle);

        tracker.pointer_enter("a");
        assert_eq!(tracker.state("a"), InteractionState::Hovered);

        tracker.focus("a");
        assert_eq!(tracker.state("a"), InteractionState::EditingFocused);

        tracker.pointer_leave("a");
        assert_eq!(tracker.state("a"), InteractionState::EditingFocused);

        tracker.blur("a");
        assert_eq!(tracker.state("a"), InteractionState::Idle);
    }

    #[test]
    fn test_single_focus() {
        let mut tracker = InteractionTracker::new();
        tracker.focus("a");
        tracker.focus("b");
        assert_eq!(tracker.state("a"), InteractionState::Idle);
        assert_eq!(tracker.focused(), Some("b"));

        tracker.blur("a");
        assert_eq!(tracker.focused(), Some("b"));
    }

    #[test]
    fn test_retain_forgets_removed() {
        let mut tracker = InteractionTracker::new();
        tracker.pointer_enter("a");
        tracker.focus("b");
        tracker.retain(|id| id == "a");
        assert_eq!(tracker.state("a"), InteractionState::Hovered);
        assert!(tracker.focused().is_none());
    }
}
