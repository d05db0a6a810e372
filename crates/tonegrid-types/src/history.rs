//! Linear text history state.
//!
//! `past` is oldest-first, `future` is nearest-first. Reading
//! `past ++ [present] ++ future` left to right walks the timeline from the
//! oldest state to the furthest redo target. The mutation rules live with the
//! history engine on the session side; this is just the shape that gets
//! persisted and exchanged.

use serde::{Deserialize, Serialize};

/// past / present / future text states.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryState {
    /// Prior states, oldest first.
    pub past: Vec<String>,
    /// Current text (possibly empty).
    pub present: String,
    /// Redo targets, nearest first.
    pub future: Vec<String>,
}

impl HistoryState {
    /// A history with no past or future.
    pub fn new(present: impl Into<String>) -> Self {
        Self {
            past: Vec::new(),
            present: present.into(),
            future: Vec::new(),
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// The full timeline, `past ++ [present] ++ future`.
    pub fn timeline(&self) -> Vec<&str> {
        self.past
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.present.as_str()))
            .chain(self.future.iter().map(String::as_str))
            .collect()
    }

    /// Index of `present` within [`timeline`](Self::timeline).
    pub fn cursor(&self) -> usize {
        self.past.len()
    }
}
