//! File commands in full sessions

mod common;

use std::fs;

use common::{lines_of, model_with_lines, run_script};
use edkit::model::EditorModel;

#[test]
fn test_edit_modify_write_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "first\nsecond\nthird\n").unwrap();

    let mut model = EditorModel::new();
    let script = format!("e {}\n2d\n$a\nfourth\n.\nw\nq\n", path.display());
    let (end, out) = run_script(&mut model, &script);

    assert_eq!(end.exit_code(), 0);
    assert_eq!(out, "19\n19\n");
    assert_eq!(fs::read_to_string(&path).unwrap(), "first\nthird\nfourth\n");
    assert!(!model.buffer.is_dirty());
}

#[test]
fn test_quit_refused_until_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.txt");

    let mut model = EditorModel::new();
    let script = format!("a\nline\n.\nq\nw {}\nq\n", path.display());
    let (_, out) = run_script(&mut model, &script);
    assert_eq!(out, "?\n5\n");
    assert_eq!(model.buffer.filename(), Some(path.as_path()));
}

#[test]
fn test_file_without_trailing_newline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("raw.txt");
    fs::write(&path, "a\nb").unwrap();

    let mut model = EditorModel::new();
    let (_, out) = run_script(&mut model, &format!("e {}\nw\n", path.display()));
    assert_eq!(out, "3\n4\n");
    assert_eq!(fs::read(&path).unwrap(), b"a\nb\n");
}

#[test]
fn test_read_into_empty_buffer_adopts_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.txt");
    fs::write(&path, "x\ny\n").unwrap();

    let mut model = EditorModel::new();
    let (_, out) = run_script(&mut model, &format!("r {}\nf\n", path.display()));
    assert_eq!(out, format!("4\n{}\n", path.display()));
    assert_eq!(lines_of(&model), vec!["x", "y"]);
    assert!(model.buffer.is_dirty());
}

#[test]
fn test_write_range_and_append() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("parts.txt");

    let mut model = model_with_lines(&["one", "two", "three"]);
    let script = format!("1w {p}\n3W {p}\n", p = path.display());
    let (_, out) = run_script(&mut model, &script);
    assert_eq!(out, "4\n6\n");
    assert_eq!(fs::read_to_string(&path).unwrap(), "one\nthree\n");
}

#[test]
fn test_write_and_quit() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wq.txt");

    let mut model = EditorModel::new();
    let script = format!("a\ndone\n.\nwq {}\np\n", path.display());
    let (end, out) = run_script(&mut model, &script);
    assert_eq!(end.exit_code(), 0);
    assert_eq!(out, "5\n");
    assert_eq!(fs::read_to_string(&path).unwrap(), "done\n");
}

#[test]
fn test_missing_file_reports_error() {
    let mut model = EditorModel::new();
    model.diagnostics.verbose = true;
    let (_, out) = run_script(&mut model, "e /nonexistent/edkit/none.txt\n");
    assert!(out.starts_with("Cannot open input file"));
    assert!(model.buffer.is_empty());
}

#[test]
fn test_silent_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("s.txt");
    fs::write(&path, "abc\n").unwrap();

    let mut model = EditorModel::new();
    model.silent = true;
    let (_, out) = run_script(&mut model, &format!("e {}\nw\np\n", path.display()));
    assert_eq!(out, "abc\n");
}
