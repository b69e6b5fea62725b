//! The line buffer: an ordered list of byte lines with a current-line
//! pointer, dirty flag, marks, and a one-shot undo snapshot.
//!
//! All indices here are 0-based. Translating the 1-based addresses users
//! type happens once, in the dispatcher.
//!
//! Every primitive mutation (insert, delete, move) immediately translates
//! the marks and any pending global targets, so commands built from several
//! primitives (`c` is delete + insert) keep marks exact.

mod file;
mod history;
mod marks;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{EdError, Result};
use crate::util::escape_line;

pub use file::{read_lines, write_lines, Loaded};
pub use history::{Snapshot, UndoSlot};
pub use marks::Marks;

use marks::{translate_delete, translate_insert, translate_move, Relocation};

/// One line of text, without its newline
pub type Line = Vec<u8>;

/// An inclusive range of 0-based line indices, `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn single(index: usize) -> Self {
        Self::new(index, index)
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, index: usize) -> bool {
        (self.start..=self.end).contains(&index)
    }
}

/// How the print commands render a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrintMode {
    /// `p`: verbatim
    #[default]
    Plain,
    /// `n`: 1-based line number and a tab
    Numbered,
    /// `l`: escaped, ending in `$`
    List,
}

#[derive(Debug, Default)]
pub struct LineBuffer {
    lines: Vec<Line>,
    current: Option<usize>,
    dirty: bool,
    filename: Option<PathBuf>,
    marks: Marks,
    undo: UndoSlot,
    /// Lines a running `g`/`v` still has to visit, in collection order
    global_targets: Vec<usize>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A clean buffer holding `lines`, current line at the last one
    pub fn from_lines(lines: Vec<Line>) -> Self {
        let current = lines.len().checked_sub(1);
        Self {
            lines,
            current,
            ..Self::default()
        }
    }

    // === Queries ===

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> Option<&[u8]> {
        self.lines.get(index).map(Vec::as_slice)
    }

    pub fn last_index(&self) -> Option<usize> {
        self.lines.len().checked_sub(1)
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    pub fn set_filename(&mut self, name: impl Into<PathBuf>) {
        self.filename = Some(name.into());
    }

    pub fn mark(&self, letter: u8) -> Option<usize> {
        self.marks.get(letter).filter(|&i| i < self.lines.len())
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn full_range(&self) -> Option<LineRange> {
        self.last_index().map(|last| LineRange::new(0, last))
    }

    fn check_range(&self, range: LineRange) -> Result<()> {
        if range.start > range.end || range.end >= self.lines.len() {
            return Err(EdError::InvalidAddress);
        }
        Ok(())
    }

    fn check_after(&self, after: Option<usize>) -> Result<()> {
        match after {
            Some(i) if i >= self.lines.len() => Err(EdError::InvalidAddress),
            _ => Ok(()),
        }
    }

    // === Cursor, marks, undo ===

    pub fn set_current(&mut self, index: usize) -> Result<()> {
        if index >= self.lines.len() {
            return Err(EdError::InvalidAddress);
        }
        self.current = Some(index);
        Ok(())
    }

    pub fn set_mark(&mut self, letter: u8, index: usize) -> Result<()> {
        if index >= self.lines.len() {
            return Err(EdError::InvalidAddress);
        }
        if !self.marks.set(letter, index) {
            return Err(EdError::InvalidMark);
        }
        Ok(())
    }

    /// Overwrite the undo slot with a deep copy of the current state
    pub fn snapshot(&mut self) {
        let snapshot = self.capture();
        self.undo.store(snapshot);
    }

    /// Deep copy of the current state, for storing once a command succeeds
    pub fn capture(&self) -> Snapshot {
        Snapshot {
            lines: self.lines.clone(),
            current: self.current,
            marks: self.marks.clone(),
        }
    }

    pub fn store_undo(&mut self, snapshot: Snapshot) {
        self.undo.store(snapshot);
    }

    /// Swap the live state with the snapshot
    pub fn undo(&mut self) -> Result<()> {
        if !self.undo.can_undo() {
            return Err(EdError::NothingToUndo);
        }
        let mut live = Snapshot {
            lines: std::mem::take(&mut self.lines),
            current: self.current,
            marks: std::mem::take(&mut self.marks),
        };
        self.undo.swap(&mut live);
        self.lines = live.lines;
        self.current = live.current;
        self.marks = live.marks;
        self.global_targets.clear();
        self.dirty = true;
        Ok(())
    }

    // === Global targets ===

    pub fn set_global_targets(&mut self, targets: Vec<usize>) {
        self.global_targets = targets;
    }

    /// Next target in descending collection order
    pub fn next_global_target(&mut self) -> Option<usize> {
        self.global_targets.pop()
    }

    pub fn clear_global_targets(&mut self) {
        self.global_targets.clear();
    }

    // === Primitive mutations ===

    fn raw_insert(&mut self, at: usize, new_lines: Vec<Line>) -> usize {
        let count = new_lines.len();
        if count == 0 {
            return 0;
        }
        self.lines.splice(at..at, new_lines);
        self.marks.on_insert(at, count);
        for target in &mut self.global_targets {
            *target = translate_insert(*target, at, count);
        }
        self.dirty = true;
        count
    }

    fn raw_delete(&mut self, range: LineRange) {
        self.lines.drain(range.start..=range.end);
        self.marks.on_delete(range.start, range.end);
        self.global_targets = self
            .global_targets
            .iter()
            .filter_map(|&t| translate_delete(t, range.start, range.end))
            .collect();
        self.dirty = true;
    }

    /// Current line after removing lines from `start` on
    fn current_after_delete(&self, start: usize) -> Option<usize> {
        if start < self.lines.len() {
            Some(start)
        } else {
            self.last_index()
        }
    }

    // === Commands ===

    /// Replace the whole buffer with `lines` (file load). Clears dirty and
    /// marks; current becomes the last line.
    pub fn replace_all(&mut self, lines: Vec<Line>) {
        self.current = lines.len().checked_sub(1);
        self.lines = lines;
        self.marks.clear();
        self.global_targets.clear();
        self.dirty = false;
    }

    /// `e`: load `path` and adopt it as the filename
    pub fn load(&mut self, path: &Path) -> Result<usize> {
        let Loaded { lines, bytes } = read_lines(path)?;
        self.replace_all(lines);
        self.filename = Some(path.to_path_buf());
        Ok(bytes)
    }

    /// `w`: write all lines to `name`, or the stored filename. A given
    /// `name` becomes the stored filename.
    pub fn write(&mut self, name: Option<&Path>) -> Result<usize> {
        let path = self.resolve_filename(name, true)?;
        let bytes = write_lines(&path, &self.lines, false)?;
        self.dirty = false;
        Ok(bytes)
    }

    /// Write a sub-range (or append it). Dirty is cleared only when the
    /// whole buffer was written to the file. Appending adopts `name` only
    /// if no filename is stored.
    pub fn write_range(
        &mut self,
        range: Option<LineRange>,
        name: Option<&Path>,
        append: bool,
    ) -> Result<usize> {
        let path = self.resolve_filename(name, !append)?;
        let selected: &[Line] = match range {
            Some(r) => {
                self.check_range(r)?;
                &self.lines[r.start..=r.end]
            }
            None => &[],
        };
        let whole = selected.len() == self.lines.len();
        let bytes = write_lines(&path, selected, append)?;
        if whole && !append {
            self.dirty = false;
        }
        Ok(bytes)
    }

    /// `W`: append lines to a file; dirty is unchanged
    pub fn write_append(&mut self, range: Option<LineRange>, name: Option<&Path>) -> Result<usize> {
        self.write_range(range, name, true)
    }

    fn resolve_filename(&mut self, name: Option<&Path>, adopt: bool) -> Result<PathBuf> {
        match (name, &self.filename) {
            (Some(name), stored) => {
                if adopt || stored.is_none() {
                    self.filename = Some(name.to_path_buf());
                }
                Ok(name.to_path_buf())
            }
            (None, Some(stored)) => Ok(stored.clone()),
            (None, None) => Err(EdError::NoFilename),
        }
    }

    /// `a` / `r`: insert after `after` (`None` = before the first line).
    /// Returns the number of lines inserted.
    pub fn append_at(&mut self, after: Option<usize>, new_lines: Vec<Line>) -> Result<usize> {
        self.check_after(after)?;
        let at = after.map_or(0, |i| i + 1);
        let count = self.raw_insert(at, new_lines);
        if count > 0 {
            self.current = Some(at + count - 1);
        } else if after.is_some() {
            self.current = after;
        }
        Ok(count)
    }

    /// `i`: insert before line `index`
    pub fn insert_at(&mut self, index: usize, new_lines: Vec<Line>) -> Result<usize> {
        if index > self.lines.len() {
            return Err(EdError::InvalidAddress);
        }
        self.append_at(index.checked_sub(1), new_lines)
    }

    /// `d`
    pub fn delete(&mut self, range: LineRange) -> Result<()> {
        self.check_range(range)?;
        self.raw_delete(range);
        self.current = self.current_after_delete(range.start);
        Ok(())
    }

    /// `c`: delete the range, then insert `new_lines` where it started
    pub fn change(&mut self, range: LineRange, new_lines: Vec<Line>) -> Result<usize> {
        self.check_range(range)?;
        self.raw_delete(range);
        self.current = self.current_after_delete(range.start);
        let count = self.raw_insert(range.start, new_lines);
        if count > 0 {
            self.current = Some(range.start + count - 1);
        }
        Ok(count)
    }

    /// `m`: move the range after `dest` (`None` = to the top)
    pub fn move_lines(&mut self, range: LineRange, dest: Option<usize>) -> Result<()> {
        self.check_range(range)?;
        self.check_after(dest)?;
        if dest.is_some_and(|d| range.contains(d)) {
            return Err(EdError::InvalidDestination);
        }

        let count = range.len();
        let new_start = match dest {
            Some(d) if d > range.end => d + 1 - count,
            Some(d) => d + 1,
            None => 0,
        };

        let block: Vec<Line> = self.lines.drain(range.start..=range.end).collect();
        self.lines.splice(new_start..new_start, block);

        let moved = Relocation {
            start: range.start,
            end: range.end,
            new_start,
        };
        self.marks.on_move(moved);
        for target in &mut self.global_targets {
            *target = translate_move(*target, moved);
        }
        self.current = Some(new_start + count - 1);
        self.dirty = true;
        Ok(())
    }

    /// `t`: copy the range after `dest`
    pub fn copy_lines(&mut self, range: LineRange, dest: Option<usize>) -> Result<()> {
        self.check_range(range)?;
        self.check_after(dest)?;
        let block = self.lines[range.start..=range.end].to_vec();
        self.append_at(dest, block)?;
        Ok(())
    }

    /// `j`: concatenate the range into its first line
    pub fn join(&mut self, range: LineRange) -> Result<()> {
        self.check_range(range)?;
        if range.start == range.end {
            self.current = Some(range.start);
            return Ok(());
        }
        let joined: Line = self.lines[range.start..=range.end].concat();
        self.raw_delete(LineRange::new(range.start + 1, range.end));
        self.lines[range.start] = joined;
        self.current = Some(range.start);
        Ok(())
    }

    /// Swap in new text for one line, keeping marks on it
    pub fn replace_line(&mut self, index: usize, text: Line) -> Result<()> {
        let line = self.lines.get_mut(index).ok_or(EdError::InvalidAddress)?;
        if *line != text {
            *line = text;
            self.dirty = true;
        }
        Ok(())
    }

    /// `p`, `n`, `l`: write the range to `out` and make its last line current
    pub fn print(&mut self, range: LineRange, mode: PrintMode, out: &mut dyn Write) -> Result<()> {
        self.check_range(range)?;
        self.render(range, mode, out).map_err(EdError::Output)?;
        self.current = Some(range.end);
        Ok(())
    }

    fn render(&self, range: LineRange, mode: PrintMode, out: &mut dyn Write) -> io::Result<()> {
        for index in range.start..=range.end {
            let line = &self.lines[index];
            match mode {
                PrintMode::Plain => out.write_all(line)?,
                PrintMode::Numbered => {
                    write!(out, "{}\t", index + 1)?;
                    out.write_all(line)?;
                }
                PrintMode::List => out.write_all(&escape_line(line))?,
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
