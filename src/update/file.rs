//! File commands: `r`, `w`, `W`, `e`

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::buffer::{read_lines, LineRange, Loaded};
use crate::error::{EdError, Result};
use crate::model::EditorModel;

fn path_or_stored(model: &EditorModel, path: Option<&Path>) -> Result<PathBuf> {
    path.or_else(|| model.buffer.filename())
        .map(Path::to_path_buf)
        .ok_or(EdError::NoFilename)
}

fn report_bytes(model: &EditorModel, bytes: usize, out: &mut dyn Write) -> Result<()> {
    if !model.silent {
        writeln!(out, "{}", bytes).map_err(EdError::Output)?;
    }
    Ok(())
}

/// `r`: insert a file after 1-based line `after`
pub(super) fn read(
    model: &mut EditorModel,
    after: usize,
    path: Option<&Path>,
    out: &mut dyn Write,
) -> Result<()> {
    let path = path_or_stored(model, path)?;
    let Loaded { lines, bytes } = read_lines(&path)?;
    if model.buffer.filename().is_none() {
        model.buffer.set_filename(&path);
    }
    model.buffer.append_at(after.checked_sub(1), lines)?;
    report_bytes(model, bytes, out)
}

/// `w`/`W`: `range` is `None` when no address was given
pub(super) fn write(
    model: &mut EditorModel,
    range: Option<LineRange>,
    path: Option<&Path>,
    append: bool,
    out: &mut dyn Write,
) -> Result<()> {
    let bytes = match range {
        _ if append => {
            let range = range.or_else(|| model.buffer.full_range());
            model.buffer.write_append(range, path)?
        }
        None => model.buffer.write(path)?,
        Some(range) => model.buffer.write_range(Some(range), path, false)?,
    };
    report_bytes(model, bytes, out)
}

/// `e`/`E`: replace the buffer with a file
pub(super) fn edit(model: &mut EditorModel, path: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let path = path_or_stored(model, path)?;
    let bytes = model.buffer.load(&path)?;
    report_bytes(model, bytes, out)
}

#[cfg(test)]
mod tests {
    use crate::address::AddressContext;
    use crate::error::EdError;
    use crate::input::ReaderSource;
    use crate::model::EditorModel;
    use crate::update::execute;
    use std::fs;

    fn run(model: &mut EditorModel, line: &str) -> Result<String, EdError> {
        let mut source = ReaderSource::new(&b""[..]);
        let mut out = Vec::new();
        execute(model, line.as_bytes(), &mut source, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    fn model(lines: &[&str]) -> EditorModel {
        EditorModel::with_lines(lines.iter().map(|l| l.as_bytes().to_vec()).collect())
    }

    #[test]
    fn test_write_reports_bytes_and_adopts_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let mut m = model(&["alpha", "beta"]);
        run(&mut m, "d").unwrap();
        assert!(m.buffer.is_dirty());

        let out = run(&mut m, &format!("w {}", path.display())).unwrap();
        assert_eq!(out, "6\n");
        assert_eq!(fs::read(&path).unwrap(), b"alpha\n");
        assert_eq!(m.buffer.filename(), Some(path.as_path()));
        assert!(!m.buffer.is_dirty());
    }

    #[test]
    fn test_partial_write_keeps_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.txt");
        let mut m = model(&["a", "b", "c"]);
        run(&mut m, "2d").unwrap();
        run(&mut m, &format!("1w {}", path.display())).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a\n");
        assert!(m.buffer.is_dirty());
    }

    #[test]
    fn test_write_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        fs::write(&path, "old\n").unwrap();
        let mut m = model(&["new"]);
        assert_eq!(run(&mut m, &format!("W {}", path.display())).unwrap(), "4\n");
        assert_eq!(fs::read(&path).unwrap(), b"old\nnew\n");
    }

    #[test]
    fn test_silent_suppresses_counts() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quiet.txt");
        let mut m = model(&["x"]);
        m.silent = true;
        assert_eq!(run(&mut m, &format!("w {}", path.display())).unwrap(), "");
    }

    #[test]
    fn test_read_inserts_after_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.txt");
        fs::write(&path, "r1\nr2").unwrap();
        let mut m = model(&["a", "b"]);
        assert_eq!(run(&mut m, &format!("1r {}", path.display())).unwrap(), "5\n");
        let lines: Vec<&[u8]> = m.buffer.lines().iter().map(Vec::as_slice).collect();
        assert_eq!(lines, vec![&b"a"[..], b"r1", b"r2", b"b"]);
        assert_eq!(m.buffer.current_line(), 3);
    }

    #[test]
    fn test_edit_refuses_dirty_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("other.txt");
        fs::write(&path, "fresh\n").unwrap();
        let mut m = model(&["a"]);
        run(&mut m, "d").unwrap();

        let err = run(&mut m, &format!("e {}", path.display())).unwrap_err();
        assert!(matches!(err, EdError::BufferModified));

        assert_eq!(run(&mut m, &format!("E {}", path.display())).unwrap(), "6\n");
        assert!(!m.buffer.is_dirty());
        assert_eq!(m.buffer.lines(), &[b"fresh".to_vec()]);
    }

    #[test]
    fn test_write_without_filename() {
        let mut m = model(&["a"]);
        assert!(matches!(run(&mut m, "w"), Err(EdError::NoFilename)));
    }

    #[test]
    fn test_missing_file_is_a_user_error() {
        let mut m = model(&[]);
        let err = run(&mut m, "e /nonexistent/edkit/missing").unwrap_err();
        assert!(!err.is_fatal());
        assert!(err.to_string().starts_with("Cannot open input file"));
    }
}
