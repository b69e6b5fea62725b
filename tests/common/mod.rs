//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use edkit::input::ReaderSource;
use edkit::model::EditorModel;
use edkit::runtime::{Session, SessionEnd};

/// Create a clean session over `lines`, current line at the last one
pub fn model_with_lines(lines: &[&str]) -> EditorModel {
    EditorModel::with_lines(lines.iter().map(|l| l.as_bytes().to_vec()).collect())
}

/// Feed `script` through the read loop; returns how it ended and stdout
pub fn run_script(model: &mut EditorModel, script: &str) -> (SessionEnd, String) {
    let mut input = ReaderSource::new(script.as_bytes());
    let mut out = Vec::new();
    let end = Session::new().run(model, &mut input, &mut out);
    (end, String::from_utf8_lossy(&out).into_owned())
}

/// Buffer contents as strings
pub fn lines_of(model: &EditorModel) -> Vec<String> {
    model
        .buffer
        .lines()
        .iter()
        .map(|l| String::from_utf8_lossy(l).into_owned())
        .collect()
}

/// 1-based current line, 0 for an empty buffer
pub fn current_line(model: &EditorModel) -> usize {
    model.buffer.current().map_or(0, |i| i + 1)
}
