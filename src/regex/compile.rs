//! Pattern compilation: turns BRE bytes into a flat node list.
//!
//! Anchors are only recognized at the very edges of the pattern: `^` as the
//! first byte, `$` as the last unescaped byte. Everywhere else they are
//! literal bytes.

use super::RegexError;

/// Capture groups are numbered `\1` through `\9`
pub const MAX_GROUPS: usize = 9;

/// Upper bound for either side of a `\{n,m\}` interval
pub const MAX_REPEAT: u32 = 255;

/// 256-bit membership table for bracket expressions
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct ByteSet([u64; 4]);

impl ByteSet {
    pub(crate) fn new() -> Self {
        Self([0; 4])
    }

    pub(crate) fn insert(&mut self, byte: u8) {
        self.0[(byte >> 6) as usize] |= 1 << (byte & 63);
    }

    pub(crate) fn insert_range(&mut self, lo: u8, hi: u8) {
        for byte in lo..=hi {
            self.insert(byte);
        }
    }

    pub(crate) fn insert_where(&mut self, pred: impl Fn(u8) -> bool) {
        for byte in 0..=u8::MAX {
            if pred(byte) {
                self.insert(byte);
            }
        }
    }

    pub(crate) fn invert(&mut self) {
        for word in &mut self.0 {
            *word = !*word;
        }
    }

    pub(crate) fn contains(&self, byte: u8) -> bool {
        self.0[(byte >> 6) as usize] & (1 << (byte & 63)) != 0
    }
}

impl std::fmt::Debug for ByteSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let members: Vec<u8> = (0..=u8::MAX).filter(|&b| self.contains(b)).collect();
        write!(f, "ByteSet({})", members.escape_ascii())
    }
}

/// One matchable unit
#[derive(Debug, Clone)]
pub(crate) enum Atom {
    Byte(u8),
    /// `.` matches anything but NUL
    Any,
    Set(Box<ByteSet>),
    /// `\(...\)`, `index` is 0-based (group `\1` has index 0)
    Group { index: usize, body: Vec<Node> },
}

impl Atom {
    /// Single-byte test; groups never reach here
    pub(crate) fn matches_byte(&self, byte: u8) -> bool {
        match self {
            Atom::Byte(b) => *b == byte,
            Atom::Any => byte != 0,
            Atom::Set(set) => set.contains(byte),
            Atom::Group { .. } => false,
        }
    }
}

/// An atom with its repetition bounds. `max == None` is unbounded.
#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub atom: Atom,
    pub min: u32,
    pub max: Option<u32>,
}

impl Node {
    fn once(atom: Atom) -> Self {
        Self {
            atom,
            min: 1,
            max: Some(1),
        }
    }
}

/// A compiled pattern
#[derive(Debug, Clone)]
pub(crate) struct Program {
    pub nodes: Vec<Node>,
    pub anchored_start: bool,
    pub anchored_end: bool,
    pub groups: usize,
}

pub(crate) fn compile(pattern: &[u8]) -> Result<Program, RegexError> {
    let anchored_start = pattern.first() == Some(&b'^');
    let start = usize::from(anchored_start);
    let anchored_end = pattern.len() > start && ends_with_anchor(pattern);
    let end = if anchored_end {
        pattern.len() - 1
    } else {
        pattern.len()
    };

    let mut parser = Parser {
        pat: &pattern[..end],
        pos: start,
        groups: 0,
    };
    let nodes = parser.sequence(0)?;

    Ok(Program {
        nodes,
        anchored_start,
        anchored_end,
        groups: parser.groups,
    })
}

/// True when the final `$` is not itself escaped by an odd run of backslashes
fn ends_with_anchor(pattern: &[u8]) -> bool {
    let Some((&b'$', head)) = pattern.split_last() else {
        return false;
    };
    let slashes = head.iter().rev().take_while(|&&b| b == b'\\').count();
    slashes % 2 == 0
}

struct Parser<'p> {
    pat: &'p [u8],
    pos: usize,
    groups: usize,
}

impl<'p> Parser<'p> {
    fn peek(&self) -> Option<u8> {
        self.pat.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.pat.get(self.pos + offset).copied()
    }

    /// Parse atoms until the end of input (depth 0) or a closing `\)`.
    fn sequence(&mut self, depth: usize) -> Result<Vec<Node>, RegexError> {
        let mut nodes = Vec::new();

        while let Some(byte) = self.peek() {
            let atom = match byte {
                b'\\' => {
                    let Some(escaped) = self.peek_at(1) else {
                        return Err(RegexError::TrailingBackslash);
                    };
                    match escaped {
                        b'(' => {
                            self.pos += 2;
                            self.group(depth)?
                        }
                        b')' => {
                            if depth == 0 {
                                return Err(RegexError::UnmatchedParen);
                            }
                            self.pos += 2;
                            return Ok(nodes);
                        }
                        b'{' | b'+' => return Err(RegexError::NothingToRepeat),
                        b'}' => return Err(RegexError::UnmatchedBrace),
                        other => {
                            self.pos += 2;
                            Atom::Byte(other)
                        }
                    }
                }
                b'.' => {
                    self.pos += 1;
                    Atom::Any
                }
                b'[' => {
                    self.pos += 1;
                    Atom::Set(Box::new(self.bracket()?))
                }
                // A leading star has nothing to repeat and stands for itself
                b'*' if nodes.is_empty() => {
                    self.pos += 1;
                    Atom::Byte(b'*')
                }
                other => {
                    self.pos += 1;
                    Atom::Byte(other)
                }
            };

            let mut node = Node::once(atom);
            if let Some((min, max)) = self.quantifier()? {
                node.min = min;
                node.max = max;
                // `a**` is `a*`
                if max.is_none() && min == 0 {
                    while self.peek() == Some(b'*') {
                        self.pos += 1;
                    }
                }
                if self.at_quantifier() {
                    return Err(RegexError::NothingToRepeat);
                }
            }
            nodes.push(node);
        }

        if depth > 0 {
            return Err(RegexError::UnmatchedParen);
        }
        Ok(nodes)
    }

    fn group(&mut self, depth: usize) -> Result<Atom, RegexError> {
        if self.groups == MAX_GROUPS {
            return Err(RegexError::TooManyGroups);
        }
        let index = self.groups;
        self.groups += 1;
        let body = self.sequence(depth + 1)?;
        Ok(Atom::Group { index, body })
    }

    fn at_quantifier(&self) -> bool {
        match self.peek() {
            Some(b'*') => true,
            Some(b'\\') => matches!(self.peek_at(1), Some(b'+') | Some(b'{')),
            _ => false,
        }
    }

    /// Parse an optional `*`, `\+` or `\{n,m\}` following an atom
    fn quantifier(&mut self) -> Result<Option<(u32, Option<u32>)>, RegexError> {
        match (self.peek(), self.peek_at(1)) {
            (Some(b'*'), _) => {
                self.pos += 1;
                Ok(Some((0, None)))
            }
            (Some(b'\\'), Some(b'+')) => {
                self.pos += 2;
                Ok(Some((1, None)))
            }
            (Some(b'\\'), Some(b'{')) => {
                self.pos += 2;
                self.interval().map(Some)
            }
            _ => Ok(None),
        }
    }

    fn interval(&mut self) -> Result<(u32, Option<u32>), RegexError> {
        let min = self.number()?.ok_or(RegexError::InvalidInterval)?;
        let max = if self.peek() == Some(b',') {
            self.pos += 1;
            self.number()?
        } else {
            Some(min)
        };

        match (self.peek(), self.peek_at(1)) {
            (Some(b'\\'), Some(b'}')) => self.pos += 2,
            (None, _) => return Err(RegexError::UnmatchedBrace),
            _ => return Err(RegexError::InvalidInterval),
        }

        if max.is_some_and(|max| max < min) {
            return Err(RegexError::InvalidInterval);
        }
        Ok((min, max))
    }

    fn number(&mut self) -> Result<Option<u32>, RegexError> {
        let mut value: Option<u32> = None;
        while let Some(digit @ b'0'..=b'9') = self.peek() {
            let next = value.unwrap_or(0) * 10 + u32::from(digit - b'0');
            if next > MAX_REPEAT {
                return Err(RegexError::InvalidInterval);
            }
            value = Some(next);
            self.pos += 1;
        }
        Ok(value)
    }

    /// Parse a bracket expression; `pos` is just past the opening `[`.
    /// Backslash is an ordinary byte in here.
    fn bracket(&mut self) -> Result<ByteSet, RegexError> {
        let mut set = ByteSet::new();
        let negated = self.peek() == Some(b'^');
        if negated {
            self.pos += 1;
        }

        let mut first = true;
        loop {
            let Some(byte) = self.peek() else {
                return Err(RegexError::UnmatchedBracket);
            };
            if byte == b']' && !first {
                self.pos += 1;
                break;
            }
            first = false;

            if byte == b'[' && self.peek_at(1) == Some(b':') {
                self.class(&mut set)?;
                continue;
            }

            match (self.peek_at(1), self.peek_at(2)) {
                (Some(b'-'), Some(hi)) if hi != b']' => {
                    if hi < byte {
                        return Err(RegexError::InvalidRange);
                    }
                    set.insert_range(byte, hi);
                    self.pos += 3;
                }
                _ => {
                    set.insert(byte);
                    self.pos += 1;
                }
            }
        }

        if negated {
            set.invert();
        }
        Ok(set)
    }

    /// `[:name:]` inside a bracket; `pos` is at the `[`
    fn class(&mut self, set: &mut ByteSet) -> Result<(), RegexError> {
        let rest = &self.pat[self.pos + 2..];
        let close = rest
            .windows(2)
            .position(|w| w == b":]")
            .ok_or(RegexError::UnmatchedBracket)?;
        let name = &rest[..close];

        let pred: fn(u8) -> bool = match name {
            b"alpha" => |b| b.is_ascii_alphabetic(),
            b"digit" => |b| b.is_ascii_digit(),
            b"alnum" => |b| b.is_ascii_alphanumeric(),
            b"upper" => |b| b.is_ascii_uppercase(),
            b"lower" => |b| b.is_ascii_lowercase(),
            b"space" => |b| matches!(b, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c),
            b"blank" => |b| b == b' ' || b == b'\t',
            b"punct" => |b| b.is_ascii_punctuation(),
            b"print" => |b| (0x20..0x7f).contains(&b),
            b"graph" => |b| b.is_ascii_graphic(),
            b"cntrl" => |b| b.is_ascii_control(),
            b"xdigit" => |b| b.is_ascii_hexdigit(),
            _ => return Err(RegexError::InvalidClass),
        };
        set.insert_where(pred);
        self.pos += 2 + close + 2;
        Ok(())
    }
}
