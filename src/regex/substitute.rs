//! Replacement rendering and match-replace loops

use super::{Match, Regex};

/// Which matches on a line a substitution replaces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Occurrence {
    /// Only the leftmost match
    #[default]
    First,
    /// Only the Nth match (1-based)
    Nth(usize),
    /// Every non-overlapping match, left to right
    All,
}

/// Bytes produced by expanding `replacement` against one match.
///
/// `\1`..`\9` expand to the captured span (empty when the group did not
/// take part), any other `\x` yields `x`, and a lone trailing backslash is
/// kept as is.
fn rendered_len(text: &[u8], m: &Match, replacement: &[u8]) -> usize {
    let mut len = 0;
    let mut i = 0;
    while i < replacement.len() {
        match (replacement[i], replacement.get(i + 1)) {
            (b'\\', Some(&d @ b'1'..=b'9')) => {
                len += group_bytes(text, m, d).len();
                i += 2;
            }
            (b'\\', Some(_)) => {
                len += 1;
                i += 2;
            }
            _ => {
                len += 1;
                i += 1;
            }
        }
    }
    len
}

fn render_into(out: &mut Vec<u8>, text: &[u8], m: &Match, replacement: &[u8]) {
    let mut i = 0;
    while i < replacement.len() {
        match (replacement[i], replacement.get(i + 1)) {
            (b'\\', Some(&d @ b'1'..=b'9')) => {
                out.extend_from_slice(group_bytes(text, m, d));
                i += 2;
            }
            (b'\\', Some(&escaped)) => {
                out.push(escaped);
                i += 2;
            }
            (byte, _) => {
                out.push(byte);
                i += 1;
            }
        }
    }
}

fn group_bytes<'t>(text: &'t [u8], m: &Match, digit: u8) -> &'t [u8] {
    m.group(usize::from(digit - b'0'))
        .map_or(&[][..], |span| &text[span.range()])
}

/// Replace the leftmost match; `None` when nothing matched.
///
/// The output is sized up front as prefix + rendered replacement + suffix.
pub(crate) fn replace_first(regex: &Regex, text: &[u8], replacement: &[u8]) -> Option<Vec<u8>> {
    let m = regex.find(text)?;
    let size = m.start() + rendered_len(text, &m, replacement) + (text.len() - m.end());
    let mut out = Vec::with_capacity(size);
    out.extend_from_slice(&text[..m.start()]);
    render_into(&mut out, text, &m, replacement);
    out.extend_from_slice(&text[m.end()..]);
    Some(out)
}

/// Scan matches left to right and replace those selected by `occurrence`.
///
/// An empty match directly after the previous match is not counted, and an
/// empty match advances the scan by one byte, so the loop always ends.
pub(crate) fn replace(
    regex: &Regex,
    text: &[u8],
    replacement: &[u8],
    occurrence: Occurrence,
) -> Option<Vec<u8>> {
    if occurrence == Occurrence::First {
        return replace_first(regex, text, replacement);
    }

    let mut out = Vec::with_capacity(text.len());
    let mut copied = 0;
    let mut pos = 0;
    let mut seen = 0;
    let mut last_end = None;
    let mut replaced = false;

    while let Some(m) = regex.find_at(text, pos) {
        let adjacent_empty = m.is_empty() && last_end == Some(m.start());
        if !adjacent_empty {
            seen += 1;
            let selected = match occurrence {
                Occurrence::All => true,
                Occurrence::Nth(n) => seen == n,
                Occurrence::First => seen == 1,
            };
            if selected {
                out.extend_from_slice(&text[copied..m.start()]);
                render_into(&mut out, text, &m, replacement);
                copied = m.end();
                replaced = true;
                if occurrence != Occurrence::All {
                    break;
                }
            }
            last_end = Some(m.end());
        }

        pos = if m.is_empty() { m.end() + 1 } else { m.end() };
        if pos > text.len() {
            break;
        }
    }

    if !replaced {
        return None;
    }
    out.extend_from_slice(&text[copied..]);
    Some(out)
}
