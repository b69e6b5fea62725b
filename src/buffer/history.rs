//! Single-level undo for the line buffer.
//!
//! Before every mutating command the buffer's lines, current line and marks
//! are deep-copied into one slot, overwriting whatever was there. Undo swaps
//! the live state with the slot, so a second undo redoes.

use super::marks::Marks;
use super::Line;

/// Saved buffer state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub lines: Vec<Line>,
    pub current: Option<usize>,
    pub marks: Marks,
}

/// The one undo slot
#[derive(Debug, Clone, Default)]
pub struct UndoSlot {
    saved: Option<Snapshot>,
}

impl UndoSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the slot
    pub fn store(&mut self, snapshot: Snapshot) {
        self.saved = Some(snapshot);
    }

    /// Exchange `live` with the saved snapshot. Returns false when empty.
    pub fn swap(&mut self, live: &mut Snapshot) -> bool {
        match self.saved.as_mut() {
            Some(saved) => {
                std::mem::swap(saved, live);
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.saved.is_some()
    }
}
