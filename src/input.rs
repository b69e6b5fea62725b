//! Line sources for the command stream and `a`/`i`/`c` input blocks.
//!
//! The same trait feeds both the interactive read loop and global-command
//! replay, so an input block inside a `g` command list is taken from the
//! stored list rather than from the terminal.

use std::collections::VecDeque;
use std::io::BufRead;

use crate::buffer::Line;
use crate::error::{EdError, Result};

pub trait LineSource {
    /// Next line without its newline, or `None` at end of input
    fn read_line(&mut self) -> Result<Option<Line>>;
}

/// Lines from any buffered reader (stdin, a script file, a byte slice)
pub struct ReaderSource<R> {
    reader: R,
}

impl<R: BufRead> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for ReaderSource<R> {
    fn read_line(&mut self) -> Result<Option<Line>> {
        let mut line = Vec::new();
        let read = self
            .reader
            .read_until(b'\n', &mut line)
            .map_err(EdError::Input)?;
        if read == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        }
        Ok(Some(line))
    }
}

/// A stored command list being replayed by `g`/`v`
#[derive(Debug, Clone, Default)]
pub struct ScriptSource {
    lines: VecDeque<Line>,
}

impl ScriptSource {
    pub fn new(lines: impl IntoIterator<Item = Line>) -> Self {
        Self {
            lines: lines.into_iter().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl LineSource for ScriptSource {
    fn read_line(&mut self) -> Result<Option<Line>> {
        Ok(self.lines.pop_front())
    }
}

/// Read an input block: every line up to one consisting of a single `.`.
/// End of input closes the block too.
pub fn read_input_block(source: &mut dyn LineSource) -> Result<Vec<Line>> {
    let mut block = Vec::new();
    while let Some(line) = source.read_line()? {
        if line == b"." {
            break;
        }
        block.push(line);
    }
    Ok(block)
}
