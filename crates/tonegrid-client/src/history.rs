//! Linear undo/redo history over text states.
//!
//! Branch-discard policy: any committed edit clears the redo list. Edits
//! equal to the current text are ignored, so the timeline never holds two
//! identical neighbours produced by an edit.
//!
//! A **baseline** is captured the first time text is loaded with
//! `skip_history`, or when a stored history is restored. [`reset`] returns to
//! it and drops both stacks.
//!
//! [`reset`]: HistoryEngine::reset

use tonegrid_types::HistoryState;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryEngine {
    state: HistoryState,
    baseline: String,
    has_baseline: bool,
}

impl HistoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn present(&self) -> &str {
        &self.state.present
    }

    pub fn baseline(&self) -> &str {
        &self.baseline
    }

    pub fn has_baseline(&self) -> bool {
        self.has_baseline
    }

    pub fn can_undo(&self) -> bool {
        self.state.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.state.can_redo()
    }

    /// Replace the text.
    ///
    /// With `skip_history` the present is overwritten in place (initial
    /// load) and, if no baseline exists yet, becomes the baseline. Otherwise
    /// this is a normal edit. Returns whether `present` changed.
    pub fn set_text(&mut self, text: impl Into<String>, skip_history: bool) -> bool {
        let text = text.into();
        if skip_history {
            let changed = self.state.present != text;
            if !self.has_baseline {
                self.baseline = text.clone();
                self.has_baseline = true;
            }
            self.state.present = text;
            return changed;
        }
        self.commit(text)
    }

    /// Record a pipeline result. Same mechanics as an edit.
    pub fn apply_transform(&mut self, text: impl Into<String>) -> bool {
        self.commit(text.into())
    }

    /// Step back one state. Returns false when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.state.past.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.state.present, previous);
        self.state.future.insert(0, current);
        true
    }

    /// Step forward one state. Returns false when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.state.future.is_empty() {
            return false;
        }
        let next = self.state.future.remove(0);
        let current = std::mem::replace(&mut self.state.present, next);
        self.state.past.push(current);
        true
    }

    /// Back to the baseline with empty past and future. Not undoable.
    pub fn reset(&mut self) {
        self.state = HistoryState::new(self.baseline.clone());
    }

    /// Adopt a stored history; its present becomes the baseline.
    pub fn restore(&mut self, state: HistoryState) {
        self.baseline = state.present.clone();
        self.has_baseline = true;
        self.state = state;
    }

    fn commit(&mut self, text: String) -> bool {
        if self.state.present == text {
            return false;
        }
        let previous = std::mem::replace(&mut self.state.present, text);
        self.state.past.push(previous);
        self.state.future.clear();
        true
    }
}
