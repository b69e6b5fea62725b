//! Line references that survive edits.
//!
//! Marks (`ka` .. `kz`) and the pending targets of a `g`/`v` command both
//! name lines by index. After each primitive mutation the buffer runs every
//! stored index through one of the `translate_*` functions so it keeps
//! pointing at the same line, or is dropped when that line is gone.

/// Where a block of lines moved: `[start, end]` now begins at `new_start`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Relocation {
    pub start: usize,
    pub end: usize,
    pub new_start: usize,
}

/// Lines `[start, end]` were removed
pub(crate) fn translate_delete(index: usize, start: usize, end: usize) -> Option<usize> {
    if index < start {
        Some(index)
    } else if index <= end {
        None
    } else {
        Some(index - (end - start + 1))
    }
}

/// `count` lines were inserted so the first new line sits at `at`
pub(crate) fn translate_insert(index: usize, at: usize, count: usize) -> usize {
    if index >= at {
        index + count
    } else {
        index
    }
}

pub(crate) fn translate_move(index: usize, moved: Relocation) -> usize {
    let Relocation {
        start,
        end,
        new_start,
    } = moved;
    let len = end - start + 1;
    if (start..=end).contains(&index) {
        new_start + (index - start)
    } else if new_start < start && (new_start..start).contains(&index) {
        // Block moved up past these lines
        index + len
    } else if new_start > start && index > end && index < new_start + len {
        // Block moved down past these lines
        index - len
    } else {
        index
    }
}

/// Convert a mark letter to its slot
pub(crate) fn mark_slot(letter: u8) -> Option<usize> {
    letter
        .is_ascii_lowercase()
        .then(|| usize::from(letter - b'a'))
}

/// The 26 named marks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Marks {
    slots: [Option<usize>; 26],
}

impl Marks {
    pub fn get(&self, letter: u8) -> Option<usize> {
        mark_slot(letter).and_then(|slot| self.slots[slot])
    }

    /// Returns false for anything but `a`..`z`
    pub fn set(&mut self, letter: u8, index: usize) -> bool {
        match mark_slot(letter) {
            Some(slot) => {
                self.slots[slot] = Some(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.slots = [None; 26];
    }

    pub(crate) fn on_delete(&mut self, start: usize, end: usize) {
        for slot in &mut self.slots {
            *slot = slot.and_then(|i| translate_delete(i, start, end));
        }
    }

    pub(crate) fn on_insert(&mut self, at: usize, count: usize) {
        for slot in self.slots.iter_mut().flatten() {
            *slot = translate_insert(*slot, at, count);
        }
    }

    pub(crate) fn on_move(&mut self, moved: Relocation) {
        for slot in self.slots.iter_mut().flatten() {
            *slot = translate_move(*slot, moved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delete_clears_inside_and_shifts_after() {
        assert_eq!(translate_delete(1, 2, 4), Some(1));
        assert_eq!(translate_delete(3, 2, 4), None);
        assert_eq!(translate_delete(7, 2, 4), Some(4));
    }

    #[test]
    fn test_insert_shifts_at_and_after() {
        assert_eq!(translate_insert(2, 3, 5), 2);
        assert_eq!(translate_insert(3, 3, 5), 8);
    }

    #[test]
    fn test_move_up() {
        // Lines 5..=6 moved to the top of "0 1 2 3 4 5 6 7"
        let moved = Relocation {
            start: 5,
            end: 6,
            new_start: 0,
        };
        let after: Vec<usize> = (0..8).map(|i| translate_move(i, moved)).collect();
        assert_eq!(after, vec![2, 3, 4, 5, 6, 0, 1, 7]);
    }

    #[test]
    fn test_move_down() {
        // Lines 1..=2 moved after line 5: "0 3 4 5 1 2 6"
        let moved = Relocation {
            start: 1,
            end: 2,
            new_start: 4,
        };
        let after: Vec<usize> = (0..7).map(|i| translate_move(i, moved)).collect();
        assert_eq!(after, vec![0, 4, 5, 1, 2, 3, 6]);
    }

    #[test]
    fn test_marks_follow_edits() {
        let mut marks = Marks::default();
        assert!(marks.set(b'a', 1));
        assert!(marks.set(b'b', 3));
        assert!(!marks.set(b'A', 0));

        marks.on_insert(2, 2);
        assert_eq!(marks.get(b'a'), Some(1));
        assert_eq!(marks.get(b'b'), Some(5));

        marks.on_delete(0, 1);
        assert_eq!(marks.get(b'a'), None);
        assert_eq!(marks.get(b'b'), Some(3));
    }
}
