//! Whole-file reads and writes of newline-terminated lines.
//!
//! Files are opened, fully consumed or produced, and closed within one call.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::Line;
use crate::error::{EdError, Result};
use crate::util::{filename_for_display, split_lines, validate_file_for_opening, FileOpenError};

/// Lines read from a file and the number of bytes consumed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub lines: Vec<Line>,
    pub bytes: usize,
}

pub fn read_lines(path: &Path) -> Result<Loaded> {
    let name = filename_for_display(path);
    validate_file_for_opening(path).map_err(|e| EdError::file(e.user_message(&name)))?;

    let data = fs::read(path)
        .map_err(|e| EdError::file(FileOpenError::from_io(&e).user_message(&name)))?;
    let lines = split_lines(&data);

    tracing::info!(
        "Read {} lines ({} bytes) from {}",
        lines.len(),
        data.len(),
        name
    );
    Ok(Loaded {
        lines,
        bytes: data.len(),
    })
}

/// Write `lines`, each followed by `\n`. Returns the byte count.
pub fn write_lines<'a>(
    path: &Path,
    lines: impl IntoIterator<Item = &'a Line>,
    append: bool,
) -> Result<usize> {
    let name = filename_for_display(path);
    let cannot_open = |e: std::io::Error| EdError::file(format!("Cannot open output file: {} ({})", name, e));

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .map_err(cannot_open)?;

    let mut writer = BufWriter::new(file);
    let mut bytes = 0;
    let mut count = 0;
    for line in lines {
        writer
            .write_all(line)
            .and_then(|_| writer.write_all(b"\n"))
            .map_err(|e| EdError::file(format!("Cannot write {}: {}", name, e)))?;
        bytes += line.len() + 1;
        count += 1;
    }
    writer
        .flush()
        .map_err(|e| EdError::file(format!("Cannot write {}: {}", name, e)))?;

    tracing::info!(
        "Wrote {} lines ({} bytes) to {}{}",
        count,
        bytes,
        name,
        if append { " (append)" } else { "" }
    );
    Ok(bytes)
}
