//! `s`: substitute over a range of lines

use crate::buffer::{LineBuffer, LineRange};
use crate::commands::Substitution;
use crate::error::{EdError, Result};

/// Apply `substitution` to every line of `range`. Fails with `No match`
/// when no line matched; the current line becomes the end of the range.
pub(super) fn run(
    buffer: &mut LineBuffer,
    range: LineRange,
    substitution: &Substitution,
) -> Result<()> {
    let mut replaced = 0;
    for index in range.start..=range.end {
        let Some(line) = buffer.line(index) else {
            return Err(EdError::InvalidAddress);
        };
        if let Some(new_text) = substitution.regex.replace(
            line,
            &substitution.replacement,
            substitution.occurrence,
        ) {
            buffer.replace_line(index, new_text)?;
            replaced += 1;
        }
    }

    if replaced == 0 {
        return Err(EdError::NoMatch);
    }
    tracing::debug!("Substituted on {} of {} lines", replaced, range.len());
    buffer.set_current(range.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex::{Occurrence, Regex};

    fn sub(pattern: &str, replacement: &str, occurrence: Occurrence) -> Substitution {
        Substitution {
            regex: Regex::new(pattern.as_bytes()).unwrap(),
            replacement: replacement.as_bytes().to_vec(),
            occurrence,
        }
    }

    fn buffer(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|l| l.as_bytes().to_vec()).collect())
    }

    #[test]
    fn test_global_flag_replaces_every_match() {
        let mut buf = buffer(&["foo", "bar boo", "zoo"]);
        run(&mut buf, LineRange::new(0, 2), &sub("o", "0", Occurrence::All)).unwrap();
        assert_eq!(
            buf.lines(),
            &[b"f00".to_vec(), b"bar b00".to_vec(), b"z00".to_vec()]
        );
        assert_eq!(buf.current(), Some(2));
        assert!(buf.is_dirty());
    }

    #[test]
    fn test_no_match_leaves_buffer_clean() {
        let mut buf = buffer(&["abc"]);
        let err = run(&mut buf, LineRange::single(0), &sub("x", "y", Occurrence::First));
        assert!(matches!(err, Err(EdError::NoMatch)));
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_current_is_range_end_even_without_match_there() {
        let mut buf = buffer(&["a", "b", "c"]);
        run(&mut buf, LineRange::new(0, 2), &sub("a", "x", Occurrence::First)).unwrap();
        assert_eq!(buf.current(), Some(2));
    }

    #[test]
    fn test_growing_replacement_terminates() {
        let mut buf = buffer(&["aaa"]);
        run(&mut buf, LineRange::single(0), &sub("a", "aa", Occurrence::All)).unwrap();
        assert_eq!(buf.lines(), &[b"aaaaaa".to_vec()]);
    }
}
