//! POSIX Basic Regular Expressions over bytes.
//!
//! This engine backs address searches, `s`, and `g`/`v` in the editor.
//! It implements the BRE dialect where grouping and intervals use
//! backslashed delimiters:
//!
//! | Construct | Meaning |
//! |-----------|---------|
//! | `c`, `\c` | literal byte |
//! | `.` | any byte except NUL |
//! | `^` / `$` | anchors, first / last byte of the pattern only |
//! | `[set]`, `[^set]` | bracket expression with ranges and `[:class:]` |
//! | `\(...\)` | capture group, up to 9 |
//! | `*`, `\+`, `\{n\}`, `\{n,\}`, `\{n,m\}` | repetition, bounds up to 255 |
//!
//! Matching is leftmost-first with greedy repetition that backs off one
//! occurrence at a time, so capture positions are deterministic.
//!
//! # Example
//!
//! ```
//! use edkit::regex::{self, Regex};
//!
//! let re = Regex::new(br"h\(...\)o").unwrap();
//! let m = re.find(b"say hello").unwrap();
//! assert_eq!(m.range(), 4..9);
//! assert_eq!(m.group(1).map(|g| g.range()), Some(5..8));
//!
//! let out = regex::substitute(b"hello", br"h\(...\)o", br"h\1X").unwrap();
//! assert_eq!(out, b"hellX");
//! ```

mod compile;
mod matcher;
mod substitute;

use std::ops::Range;

pub use compile::{MAX_GROUPS, MAX_REPEAT};
pub use substitute::Occurrence;

use compile::Program;

/// Pattern syntax errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegexError {
    /// Pattern ends in the middle of an escape
    TrailingBackslash,
    /// `\(` without `\)` or the reverse
    UnmatchedParen,
    /// `[` without a closing `]`
    UnmatchedBracket,
    /// `\{` without a closing `\}`, or a stray `\}`
    UnmatchedBrace,
    /// Interval body is not `n`, `n,` or `n,m` with `n <= m <= 255`
    InvalidInterval,
    /// Quantifier with no atom before it, or two quantifiers in a row
    NothingToRepeat,
    /// More than nine capture groups
    TooManyGroups,
    /// Range endpoint out of order, e.g. `[z-a]`
    InvalidRange,
    /// Unknown `[:name:]`
    InvalidClass,
}

impl std::fmt::Display for RegexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let msg = match self {
            Self::TrailingBackslash => "Trailing backslash (\\)",
            Self::UnmatchedParen => "Unmatched ( or \\(",
            Self::UnmatchedBracket => "Unmatched [ or [^",
            Self::UnmatchedBrace => "Unmatched \\{",
            Self::InvalidInterval => "Invalid content of \\{\\}",
            Self::NothingToRepeat => "Invalid preceding regular expression",
            Self::TooManyGroups => "Too many subexpressions",
            Self::InvalidRange => "Invalid range end",
            Self::InvalidClass => "Invalid character class name",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for RegexError {}

/// A byte range inside the searched text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// A successful match with its capture groups
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    span: Span,
    groups: [Option<Span>; MAX_GROUPS],
    group_count: usize,
}

impl Match {
    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end()
    }

    pub fn len(&self) -> usize {
        self.span.len
    }

    pub fn is_empty(&self) -> bool {
        self.span.len == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.span.range()
    }

    pub fn span(&self) -> Span {
        self.span
    }

    /// Number of groups the pattern declares (0..=9)
    pub fn group_count(&self) -> usize {
        self.group_count
    }

    /// Span of group `n` (1-based); `None` if the group did not participate
    /// or does not exist.
    pub fn group(&self, n: usize) -> Option<Span> {
        if n == 0 || n > MAX_GROUPS {
            return None;
        }
        self.groups[n - 1]
    }
}

/// A compiled BRE
#[derive(Debug, Clone)]
pub struct Regex {
    pattern: Vec<u8>,
    program: Program,
}

impl Regex {
    pub fn new(pattern: &[u8]) -> Result<Self, RegexError> {
        let program = compile::compile(pattern)?;
        Ok(Self {
            pattern: pattern.to_vec(),
            program,
        })
    }

    /// The source pattern
    pub fn as_bytes(&self) -> &[u8] {
        &self.pattern
    }

    pub fn group_count(&self) -> usize {
        self.program.groups
    }

    /// Leftmost match in `text`
    pub fn find(&self, text: &[u8]) -> Option<Match> {
        matcher::search(&self.program, text, 0)
    }

    /// Leftmost match starting at or after byte `start`. Anchors still
    /// refer to the edges of the whole `text`.
    pub fn find_at(&self, text: &[u8], start: usize) -> Option<Match> {
        matcher::search(&self.program, text, start)
    }

    pub fn is_match(&self, text: &[u8]) -> bool {
        self.find(text).is_some()
    }

    /// Replace the first match, or return a copy of `text`
    pub fn substitute(&self, text: &[u8], replacement: &[u8]) -> Vec<u8> {
        substitute::replace_first(self, text, replacement).unwrap_or_else(|| text.to_vec())
    }

    /// Replace the matches chosen by `occurrence`; `None` if none were
    /// replaced.
    pub fn replace(
        &self,
        text: &[u8],
        replacement: &[u8],
        occurrence: Occurrence,
    ) -> Option<Vec<u8>> {
        substitute::replace(self, text, replacement, occurrence)
    }
}

/// Compile `pattern` and find its leftmost match in `text`.
///
/// `Ok(None)` is the no-match case; `Err` means the pattern is malformed.
pub fn find(text: &[u8], pattern: &[u8]) -> Result<Option<Match>, RegexError> {
    Ok(Regex::new(pattern)?.find(text))
}

/// Compile `pattern` and replace its first match in `text`.
///
/// When nothing matches the result is a byte-for-byte copy of `text`.
pub fn substitute(text: &[u8], pattern: &[u8], replacement: &[u8]) -> Result<Vec<u8>, RegexError> {
    Ok(Regex::new(pattern)?.substitute(text, replacement))
}
