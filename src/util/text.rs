//! Byte-string rendering helpers for the print commands

/// Render a line the way `l` shows it: C escapes for control bytes,
/// `\NNN` octal for other non-printables, `\\` and `\$` for the two bytes
/// that would otherwise be ambiguous, and a closing `$`.
pub fn escape_line(line: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(line.len() + 1);
    for &byte in line {
        match byte {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'$' => out.extend_from_slice(b"\\$"),
            0x07 => out.extend_from_slice(b"\\a"),
            0x08 => out.extend_from_slice(b"\\b"),
            0x0c => out.extend_from_slice(b"\\f"),
            b'\r' => out.extend_from_slice(b"\\r"),
            b'\t' => out.extend_from_slice(b"\\t"),
            0x0b => out.extend_from_slice(b"\\v"),
            0x20..=0x7e => out.push(byte),
            _ => out.extend_from_slice(format!("\\{:03o}", byte).as_bytes()),
        }
    }
    out.push(b'$');
    out
}

/// Split raw file contents into lines. A final line without a trailing
/// newline is kept.
pub fn split_lines(data: &[u8]) -> Vec<Vec<u8>> {
    if data.is_empty() {
        return Vec::new();
    }
    let body = data.strip_suffix(b"\n").unwrap_or(data);
    body.split(|&b| b == b'\n').map(<[u8]>::to_vec).collect()
}
