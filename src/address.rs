//! Address parsing for command lines.
//!
//! ```text
//! address   := [ sign ] [ number ] [ anchor ] [ offset ]
//!            | "'" letter [ offset ]
//!            | "/" re "/"  [ offset ]
//!            | "?" re "?"  [ offset ]
//! anchor    := "." | "$"
//! offset    := sign? digits
//! range     := address? ( ("," | ";") address? )*
//! ```
//!
//! Addresses are 1-based line numbers; 0 is the position before the first
//! line and is only meaningful to commands that insert after an address.
//! The parser stops at the first byte that cannot continue an address and
//! reports that offset as `tail`, which is where the command letter sits.

use crate::buffer::LineBuffer;
use crate::error::{EdError, Result};
use crate::regex::Regex;

/// What the address parser needs from the buffer, in 1-based terms
pub trait AddressContext {
    /// Current line, 0 when the buffer is empty
    fn current_line(&self) -> usize;
    /// Last line, 0 when the buffer is empty
    fn last_line(&self) -> usize;
    fn mark_line(&self, letter: u8) -> Option<usize>;
    /// Text of `line` (1..=last_line)
    fn line_text(&self, line: usize) -> &[u8];
}

impl AddressContext for LineBuffer {
    fn current_line(&self) -> usize {
        self.current().map_or(0, |i| i + 1)
    }

    fn last_line(&self) -> usize {
        self.len()
    }

    fn mark_line(&self, letter: u8) -> Option<usize> {
        self.mark(letter).map(|i| i + 1)
    }

    fn line_text(&self, line: usize) -> &[u8] {
        self.line(line - 1).unwrap_or_default()
    }
}

/// The most recent regex, reused by empty patterns (`//`, `s//x/`)
#[derive(Debug, Clone, Default)]
pub struct LastPattern {
    regex: Option<Regex>,
}

impl LastPattern {
    /// Compile `pattern` and remember it, or reuse the previous one when
    /// `pattern` is empty.
    pub fn resolve(&mut self, pattern: &[u8]) -> Result<Regex> {
        if pattern.is_empty() {
            return self.regex.clone().ok_or(EdError::NoPreviousPattern);
        }
        let regex = Regex::new(pattern)?;
        self.regex = Some(regex.clone());
        Ok(regex)
    }
}

/// Result of parsing the address prefix of a command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Addresses {
    pub first: Option<usize>,
    pub second: Option<usize>,
    /// How many addresses were given (0, 1 or 2+)
    pub count: usize,
    /// A `,`, `;` or `%` appeared
    pub separator: bool,
    /// Offset of the first byte after the addresses
    pub tail: usize,
}

impl Addresses {
    fn push(&mut self, line: usize) {
        self.first = self.second.or(Some(line));
        self.second = Some(line);
        self.count += 1;
    }
}

/// Parse the address prefix of `line`.
///
/// `;` makes the first address current before the second is resolved; that
/// only affects resolution here, the buffer itself is untouched.
pub fn parse(line: &[u8], ctx: &impl AddressContext, last: &mut LastPattern) -> Result<Addresses> {
    let mut parser = Parser {
        line,
        pos: 0,
        current: ctx.current_line(),
        ctx,
        last,
    };
    let mut addrs = Addresses::default();
    // Value used when a separator is followed by no address
    let mut pending: Option<usize> = None;

    loop {
        let component = parser.component()?;
        parser.skip_blanks();
        let separator = match parser.peek() {
            Some(sep @ (b',' | b';' | b'%')) => Some(sep),
            _ => None,
        };

        match (component, separator) {
            (Some(value), None) => {
                addrs.push(value);
                break;
            }
            (None, None) => {
                if let Some(value) = pending {
                    addrs.push(value);
                }
                break;
            }
            (Some(value), Some(sep)) => {
                parser.pos += 1;
                addrs.separator = true;
                addrs.push(value);
                if sep == b';' {
                    parser.current = value;
                }
                pending = Some(value);
            }
            (None, Some(sep)) => {
                parser.pos += 1;
                addrs.separator = true;
                let start = if sep == b';' { parser.current } else { 1 };
                addrs.push(start.min(ctx.last_line()));
                pending = Some(ctx.last_line());
            }
        }
    }

    addrs.tail = parser.pos;
    Ok(addrs)
}

struct Parser<'l, 'c, C: AddressContext> {
    line: &'l [u8],
    pos: usize,
    current: usize,
    ctx: &'c C,
    last: &'c mut LastPattern,
}

impl<C: AddressContext> Parser<'_, '_, C> {
    fn peek(&self) -> Option<u8> {
        self.line.get(self.pos).copied()
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn number(&mut self) -> Result<Option<i64>> {
        let start = self.pos;
        let mut value: i64 = 0;
        while let Some(d @ b'0'..=b'9') = self.peek() {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(d - b'0')))
                .ok_or(EdError::NumberOutOfRange)?;
            self.pos += 1;
        }
        Ok((self.pos > start).then_some(value))
    }

    /// One address with its trailing offsets, or `None` if there is none
    fn component(&mut self) -> Result<Option<usize>> {
        self.skip_blanks();
        let mut value: i64 = match self.peek() {
            Some(b'0'..=b'9') => self.number()?.unwrap_or(0),
            Some(b'.') => {
                self.pos += 1;
                self.current as i64
            }
            Some(b'$') => {
                self.pos += 1;
                self.ctx.last_line() as i64
            }
            Some(b'\'') => {
                let letter = self.line.get(self.pos + 1).copied();
                self.pos += 2;
                match letter {
                    Some(l) if l.is_ascii_lowercase() => {
                        self.ctx.mark_line(l).ok_or(EdError::InvalidAddress)? as i64
                    }
                    _ => return Err(EdError::InvalidMark),
                }
            }
            Some(delim @ (b'/' | b'?')) => self.search(delim)? as i64,
            Some(b'+' | b'-' | b'^') => self.current as i64,
            _ => return Ok(None),
        };

        loop {
            self.skip_blanks();
            match self.peek() {
                Some(sign @ (b'+' | b'-' | b'^')) => {
                    self.pos += 1;
                    let step = self.number()?.unwrap_or(1);
                    value = if sign == b'+' {
                        value.checked_add(step)
                    } else {
                        value.checked_sub(step)
                    }
                    .ok_or(EdError::NumberOutOfRange)?;
                }
                Some(b'0'..=b'9') => {
                    let step = self.number()?.unwrap_or(0);
                    value = value.checked_add(step).ok_or(EdError::NumberOutOfRange)?;
                }
                _ => break,
            }
        }

        if value < 0 || value as usize > self.ctx.last_line() {
            return Err(EdError::InvalidAddress);
        }
        Ok(Some(value as usize))
    }

    /// `/re/` searches forward from the line after current, `?re?` backward
    /// from the line before it; both wrap around and finish on current.
    fn search(&mut self, delim: u8) -> Result<usize> {
        let (pattern, next) = take_pattern(self.line, self.pos + 1, delim)?;
        self.pos = next;
        let regex = self.last.resolve(&pattern)?;

        let last = self.ctx.last_line();
        let mut line = self.current;
        for _ in 0..last {
            line = if delim == b'/' {
                if line >= last {
                    1
                } else {
                    line + 1
                }
            } else if line <= 1 {
                last
            } else {
                line - 1
            };
            if regex.is_match(self.ctx.line_text(line)) {
                return Ok(line);
            }
        }
        Err(EdError::NoMatch)
    }
}

/// Read a delimited pattern starting at `start`. Returns the pattern with
/// `\delim` unescaped and the offset just past the closing delimiter.
/// Bracket expressions are copied whole so `[/]` does not end the pattern.
pub fn take_pattern(line: &[u8], start: usize, delim: u8) -> Result<(Vec<u8>, usize)> {
    match scan_delimited(line, start, delim, true) {
        (pattern, Some(next)) => Ok((pattern, next)),
        (_, None) => Err(EdError::MissingDelimiter),
    }
}

/// Like [`take_pattern`] but tolerates a missing closing delimiter at the
/// end of the line (`None` offset). With `brackets` false a `[` is an
/// ordinary byte, as in the replacement part of `s`.
pub fn scan_delimited(
    line: &[u8],
    start: usize,
    delim: u8,
    brackets: bool,
) -> (Vec<u8>, Option<usize>) {
    let mut out = Vec::new();
    let mut pos = start;
    while let Some(&byte) = line.get(pos) {
        if byte == delim {
            return (out, Some(pos + 1));
        }
        match byte {
            b'\\' => match line.get(pos + 1) {
                Some(&next) if next == delim => {
                    out.push(delim);
                    pos += 2;
                }
                Some(&next) => {
                    out.extend_from_slice(&[b'\\', next]);
                    pos += 2;
                }
                None => {
                    out.push(b'\\');
                    pos += 1;
                }
            },
            b'[' if brackets => {
                let end = bracket_end(line, pos);
                out.extend_from_slice(&line[pos..end]);
                pos = end;
            }
            _ => {
                out.push(byte);
                pos += 1;
            }
        }
    }
    (out, None)
}

/// Offset just past the bracket expression opening at `open`, or the end
/// of the line if it never closes.
fn bracket_end(line: &[u8], open: usize) -> usize {
    let mut pos = open + 1;
    if line.get(pos) == Some(&b'^') {
        pos += 1;
    }
    if line.get(pos) == Some(&b']') {
        pos += 1;
    }
    while let Some(&byte) = line.get(pos) {
        match byte {
            b']' => return pos + 1,
            b'[' if line.get(pos + 1) == Some(&b':') => {
                let close = line[pos + 2..]
                    .windows(2)
                    .position(|w| w == b":]")
                    .map_or(line.len(), |i| pos + 2 + i + 2);
                pos = close;
            }
            _ => pos += 1,
        }
    }
    line.len()
}
