//! Address resolution against a real buffer

use edkit::address::{parse, Addresses, LastPattern};
use edkit::buffer::LineBuffer;
use edkit::error::EdError;

fn buffer(lines: &[&str]) -> LineBuffer {
    LineBuffer::from_lines(lines.iter().map(|l| l.as_bytes().to_vec()).collect())
}

fn resolve(buf: &LineBuffer, line: &str) -> Result<Addresses, EdError> {
    parse(line.as_bytes(), buf, &mut LastPattern::default())
}

fn pair(addrs: &Addresses) -> (Option<usize>, Option<usize>) {
    (addrs.first, addrs.second)
}

#[test]
fn test_tail_points_at_operator() {
    let mut buf = buffer(&["a", "b", "c", "d"]);
    buf.set_mark(b'a', 1).unwrap();
    for (line, op) in [
        ("p", b'p'),
        ("2p", b'p'),
        ("1,$d", b'd'),
        ("/c/-1n", b'n'),
        ("'a=", b'='),
        ("-1;+1l", b'l'),
        ("%s/a/b/", b's'),
    ] {
        let addrs = resolve(&buf, line).unwrap();
        assert_eq!(line.as_bytes()[addrs.tail], op, "{:?}", line);
    }
}

#[test]
fn test_empty_line_has_no_address() {
    let buf = buffer(&["a"]);
    let addrs = resolve(&buf, "").unwrap();
    assert_eq!(addrs.count, 0);
    assert_eq!(addrs.tail, 0);
}

#[test]
fn test_whole_buffer_forms() {
    let buf = buffer(&["a", "b", "c"]);
    assert_eq!(pair(&resolve(&buf, ",p").unwrap()), (Some(1), Some(3)));
    assert_eq!(pair(&resolve(&buf, "%p").unwrap()), (Some(1), Some(3)));
    assert_eq!(pair(&resolve(&buf, "1,$p").unwrap()), (Some(1), Some(3)));
}

#[test]
fn test_offsets_accumulate() {
    let mut buf = buffer(&["a", "b", "c", "d", "e"]);
    buf.set_current(0).unwrap();
    assert_eq!(resolve(&buf, ".++p").unwrap().second, Some(3));
    assert_eq!(resolve(&buf, "+2-1p").unwrap().second, Some(2));
    assert_eq!(resolve(&buf, "$--p").unwrap().second, Some(3));
}

#[test]
fn test_search_wraps_around() {
    let mut buf = buffer(&["needle", "hay", "hay"]);
    buf.set_current(1).unwrap();
    assert_eq!(resolve(&buf, "/needle/").unwrap().second, Some(1));
    assert_eq!(resolve(&buf, "?needle?").unwrap().second, Some(1));
    assert!(matches!(resolve(&buf, "/straw/"), Err(EdError::NoMatch)));
}

#[test]
fn test_out_of_range() {
    let buf = buffer(&["a", "b"]);
    assert!(matches!(resolve(&buf, "3p"), Err(EdError::InvalidAddress)));
    assert!(matches!(resolve(&buf, "1-2p"), Err(EdError::InvalidAddress)));
    assert!(matches!(
        resolve(&buf, "99999999999999999999p"),
        Err(EdError::NumberOutOfRange)
    ));
}
