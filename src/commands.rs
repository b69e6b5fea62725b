//! Command parsing: the operator byte after the addresses and its
//! arguments.
//!
//! Parsing resolves everything that only depends on the text of the line
//! (patterns, destinations, filenames, flags). Defaults and range checks
//! that depend on the command are applied by [`crate::update`].

use std::path::PathBuf;

use crate::address::{self, AddressContext, Addresses, LastPattern};
use crate::buffer::PrintMode;
use crate::error::{EdError, Result};
use crate::regex::{Occurrence, Regex};

/// A fully parsed command line
#[derive(Debug, Clone)]
pub struct CommandLine {
    pub addrs: Addresses,
    pub command: Command,
    /// Print suffix (`p`, `n`, `l`) to run after the command
    pub print: Option<PrintMode>,
}

#[derive(Debug, Clone)]
pub enum Command {
    /// Empty command: print the addressed line or the next one
    Null,
    Append,
    Insert,
    Change,
    Delete,
    Print(PrintMode),
    /// `=`
    LineNumber,
    /// `k`
    Mark(u8),
    /// `m`, destination as a 1-based address (0 = top)
    Move(usize),
    /// `t`
    Transfer(usize),
    Join,
    Read(Option<PathBuf>),
    Write {
        path: Option<PathBuf>,
        append: bool,
        quit: bool,
    },
    Edit {
        path: Option<PathBuf>,
        force: bool,
    },
    Filename(Option<PathBuf>),
    Quit {
        force: bool,
    },
    Undo,
    Help,
    ToggleVerbose,
    TogglePrompt,
    Substitute(Substitution),
    /// Bare `s`, optionally overriding the stored occurrence
    RepeatSubstitute(Option<Occurrence>),
    Global {
        invert: bool,
        regex: Regex,
        list: CommandList,
    },
}

impl Command {
    /// Commands that reject any address
    fn takes_addresses(&self) -> bool {
        !matches!(
            self,
            Self::Edit { .. }
                | Self::Filename(_)
                | Self::Quit { .. }
                | Self::Undo
                | Self::Help
                | Self::ToggleVerbose
                | Self::TogglePrompt
        )
    }

    /// Commands that change the buffer and so take an undo snapshot
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Append
                | Self::Insert
                | Self::Change
                | Self::Delete
                | Self::Move(_)
                | Self::Transfer(_)
                | Self::Join
                | Self::Read(_)
                | Self::Edit { .. }
                | Self::Substitute(_)
                | Self::RepeatSubstitute(_)
        )
    }
}

/// The pieces of an `s` command, remembered for a later bare `s`
#[derive(Debug, Clone)]
pub struct Substitution {
    pub regex: Regex,
    pub replacement: Vec<u8>,
    pub occurrence: Occurrence,
}

/// Commands a `g`/`v` runs on each target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandList {
    /// The rest of the `g` line
    Inline(Vec<u8>),
    /// `{`: following command lines up to a lone `}`
    Block,
}

/// Parse one command line against the buffer state in `ctx`
pub fn parse(
    line: &[u8],
    ctx: &impl AddressContext,
    last: &mut LastPattern,
) -> Result<CommandLine> {
    let addrs = address::parse(line, ctx, last)?;
    let mut args = Args {
        line,
        pos: addrs.tail,
    };

    let Some(op) = args.next() else {
        return Ok(CommandLine {
            addrs,
            command: Command::Null,
            print: None,
        });
    };

    let mut print = None;
    let command = match op {
        b'a' => Command::Append,
        b'i' => Command::Insert,
        b'c' => Command::Change,
        b'd' => Command::Delete,
        b'p' => Command::Print(PrintMode::Plain),
        b'n' => Command::Print(PrintMode::Numbered),
        b'l' => Command::Print(PrintMode::List),
        b'=' => Command::LineNumber,
        b'j' => Command::Join,
        b'k' => {
            let letter = args
                .next()
                .filter(u8::is_ascii_lowercase)
                .ok_or(EdError::InvalidMark)?;
            Command::Mark(letter)
        }
        b'm' => Command::Move(args.destination(ctx, last)?),
        b't' => Command::Transfer(args.destination(ctx, last)?),
        b'r' => Command::Read(args.filename()?),
        b'w' | b'W' => {
            let quit = op == b'w' && args.eat(b'q');
            Command::Write {
                path: args.filename()?,
                append: op == b'W',
                quit,
            }
        }
        b'e' | b'E' => Command::Edit {
            path: args.filename()?,
            force: op == b'E',
        },
        b'f' => Command::Filename(args.filename()?),
        b'q' => Command::Quit { force: false },
        b'Q' => Command::Quit { force: true },
        b'u' => Command::Undo,
        b'h' => Command::Help,
        b'H' => Command::ToggleVerbose,
        b'P' => Command::TogglePrompt,
        b's' => {
            let (command, suffix) = args.substitute(last)?;
            print = suffix;
            command
        }
        b'g' | b'v' => args.global(last, op == b'v')?,
        _ => return Err(EdError::UnknownCommand),
    };

    if addrs.count > 0 && !command.takes_addresses() {
        return Err(EdError::UnexpectedAddress);
    }
    if let Some(suffix) = args.print_suffix()? {
        print = Some(suffix);
    }

    tracing::debug!(
        "Parsed {:?} with {} address(es)",
        command_name(&command),
        addrs.count
    );
    Ok(CommandLine {
        addrs,
        command,
        print,
    })
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Null => "null",
        Command::Append => "append",
        Command::Insert => "insert",
        Command::Change => "change",
        Command::Delete => "delete",
        Command::Print(_) => "print",
        Command::LineNumber => "line-number",
        Command::Mark(_) => "mark",
        Command::Move(_) => "move",
        Command::Transfer(_) => "transfer",
        Command::Join => "join",
        Command::Read(_) => "read",
        Command::Write { .. } => "write",
        Command::Edit { .. } => "edit",
        Command::Filename(_) => "filename",
        Command::Quit { .. } => "quit",
        Command::Undo => "undo",
        Command::Help => "help",
        Command::ToggleVerbose => "verbose",
        Command::TogglePrompt => "prompt",
        Command::Substitute(_) | Command::RepeatSubstitute(_) => "substitute",
        Command::Global { .. } => "global",
    }
}

/// Cursor over the bytes after the operator
struct Args<'a> {
    line: &'a [u8],
    pos: usize,
}

impl<'a> Args<'a> {
    fn peek(&self) -> Option<u8> {
        self.line.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        Some(byte)
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn rest(&self) -> &'a [u8] {
        &self.line[self.pos.min(self.line.len())..]
    }

    /// Trailing `p`/`n`/`l` letters; anything else is an error
    fn print_suffix(&mut self) -> Result<Option<PrintMode>> {
        let mut mode = None;
        while let Some(byte) = self.next() {
            mode = Some(print_mode(byte).ok_or(EdError::InvalidSuffix)?);
        }
        Ok(mode)
    }

    /// Optional filename separated from the operator by blanks
    fn filename(&mut self) -> Result<Option<PathBuf>> {
        match self.peek() {
            None => return Ok(None),
            Some(b' ' | b'\t') => {}
            Some(_) => return Err(EdError::InvalidSuffix),
        }
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        let name = self.rest();
        self.pos = self.line.len();
        Ok((!name.is_empty()).then(|| path_from_bytes(name)))
    }

    /// Destination address of `m`/`t`
    fn destination(&mut self, ctx: &impl AddressContext, last: &mut LastPattern) -> Result<usize> {
        let dest = address::parse(self.rest(), ctx, last)?;
        let line = dest
            .second
            .filter(|_| dest.count > 0)
            .ok_or(EdError::InvalidDestination)?;
        self.pos += dest.tail;
        Ok(line)
    }

    fn pattern_delimiter(&mut self) -> Result<u8> {
        match self.next() {
            Some(b' ' | b'\n') | None => Err(EdError::InvalidPatternDelimiter),
            Some(delim) => Ok(delim),
        }
    }

    fn substitute(&mut self, last: &mut LastPattern) -> Result<(Command, Option<PrintMode>)> {
        match self.peek() {
            None => return Ok((Command::RepeatSubstitute(None), None)),
            Some(b) if b.is_ascii_digit() || b"gpnl".contains(&b) => {
                let (occurrence, print) = self.substitute_flags()?;
                return Ok((Command::RepeatSubstitute(occurrence), print));
            }
            _ => {}
        }

        let delim = self.pattern_delimiter()?;
        let (pattern, next) = address::take_pattern(self.line, self.pos, delim)?;
        let regex = last.resolve(&pattern)?;
        let (replacement, end) = address::scan_delimited(self.line, next, delim, false);

        let Some(end) = end else {
            self.pos = self.line.len();
            let substitution = Substitution {
                regex,
                replacement,
                occurrence: Occurrence::First,
            };
            return Ok((Command::Substitute(substitution), Some(PrintMode::Plain)));
        };

        self.pos = end;
        let (occurrence, print) = self.substitute_flags()?;
        let substitution = Substitution {
            regex,
            replacement,
            occurrence: occurrence.unwrap_or_default(),
        };
        Ok((Command::Substitute(substitution), print))
    }

    /// `g`, a count `N`, and print letters, in any order
    fn substitute_flags(&mut self) -> Result<(Option<Occurrence>, Option<PrintMode>)> {
        let mut occurrence = None;
        let mut print = None;
        while let Some(byte) = self.peek() {
            match byte {
                b'g' if occurrence.is_none() => {
                    self.pos += 1;
                    occurrence = Some(Occurrence::All);
                }
                b'0'..=b'9' if occurrence.is_none() => {
                    let mut count: usize = 0;
                    while let Some(d @ b'0'..=b'9') = self.peek() {
                        count = count
                            .checked_mul(10)
                            .and_then(|c| c.checked_add(usize::from(d - b'0')))
                            .ok_or(EdError::NumberOutOfRange)?;
                        self.pos += 1;
                    }
                    if count == 0 {
                        return Err(EdError::InvalidSuffix);
                    }
                    occurrence = Some(Occurrence::Nth(count));
                }
                _ => match print_mode(byte) {
                    Some(mode) => {
                        self.pos += 1;
                        print = Some(mode);
                    }
                    None => return Err(EdError::InvalidSuffix),
                },
            }
        }
        Ok((occurrence, print))
    }

    fn global(&mut self, last: &mut LastPattern, invert: bool) -> Result<Command> {
        let delim = self.pattern_delimiter()?;
        let (pattern, next) = address::take_pattern(self.line, self.pos, delim)?;
        let regex = last.resolve(&pattern)?;
        self.pos = next;

        let rest = self.rest();
        let list = if rest.trim_ascii() == b"{" {
            CommandList::Block
        } else if rest.is_empty() {
            CommandList::Inline(b"p".to_vec())
        } else {
            CommandList::Inline(rest.to_vec())
        };
        self.pos = self.line.len();
        Ok(Command::Global {
            invert,
            regex,
            list,
        })
    }
}

fn print_mode(byte: u8) -> Option<PrintMode> {
    match byte {
        b'p' => Some(PrintMode::Plain),
        b'n' => Some(PrintMode::Numbered),
        b'l' => Some(PrintMode::List),
        _ => None,
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::LineBuffer;

    fn buffer(lines: &[&str]) -> LineBuffer {
        LineBuffer::from_lines(lines.iter().map(|l| l.as_bytes().to_vec()).collect())
    }

    fn parse_on(buf: &LineBuffer, line: &str) -> Result<CommandLine> {
        parse(line.as_bytes(), buf, &mut LastPattern::default())
    }

    #[test]
    fn test_empty_line_is_null_command() {
        let buf = buffer(&["a", "b"]);
        let parsed = parse_on(&buf, "").unwrap();
        assert!(matches!(parsed.command, Command::Null));
        assert_eq!(parsed.addrs.count, 0);

        let parsed = parse_on(&buf, "2").unwrap();
        assert!(matches!(parsed.command, Command::Null));
        assert_eq!(parsed.addrs.second, Some(2));
    }

    #[test]
    fn test_print_commands_and_suffixes() {
        let buf = buffer(&["a", "b", "c"]);
        let parsed = parse_on(&buf, "1,2n").unwrap();
        assert!(matches!(parsed.command, Command::Print(PrintMode::Numbered)));
        assert_eq!(parsed.print, None);

        let parsed = parse_on(&buf, "2dp").unwrap();
        assert!(matches!(parsed.command, Command::Delete));
        assert_eq!(parsed.print, Some(PrintMode::Plain));

        assert!(matches!(
            parse_on(&buf, "dx"),
            Err(EdError::InvalidSuffix)
        ));
    }

    #[test]
    fn test_unknown_command() {
        let buf = buffer(&["a"]);
        assert!(matches!(parse_on(&buf, "z"), Err(EdError::UnknownCommand)));
    }

    #[test]
    fn test_address_rejected_where_not_allowed() {
        let buf = buffer(&["a"]);
        assert!(matches!(parse_on(&buf, "1q"), Err(EdError::UnexpectedAddress)));
        assert!(matches!(parse_on(&buf, "1u"), Err(EdError::UnexpectedAddress)));
        assert!(parse_on(&buf, "q").is_ok());
    }

    #[test]
    fn test_mark_letter() {
        let buf = buffer(&["a"]);
        assert!(matches!(parse_on(&buf, "kx").unwrap().command, Command::Mark(b'x')));
        assert!(matches!(parse_on(&buf, "kX"), Err(EdError::InvalidMark)));
        assert!(matches!(parse_on(&buf, "k"), Err(EdError::InvalidMark)));
    }

    #[test]
    fn test_move_destination() {
        let buf = buffer(&["a", "b", "c", "d", "e"]);
        let parsed = parse_on(&buf, "2,4m3").unwrap();
        assert!(matches!(parsed.command, Command::Move(3)));
        assert_eq!((parsed.addrs.first, parsed.addrs.second), (Some(2), Some(4)));

        assert!(matches!(parse_on(&buf, "1t$").unwrap().command, Command::Transfer(5)));
        assert!(matches!(parse_on(&buf, "1m0").unwrap().command, Command::Move(0)));
        assert!(matches!(parse_on(&buf, "1m"), Err(EdError::InvalidDestination)));

        let parsed = parse_on(&buf, "1t.p").unwrap();
        assert_eq!(parsed.print, Some(PrintMode::Plain));
    }

    #[test]
    fn test_filenames() {
        let buf = LineBuffer::new();
        match parse_on(&buf, "w  out.txt").unwrap().command {
            Command::Write {
                path,
                append,
                quit,
            } => {
                assert_eq!(path, Some(PathBuf::from("out.txt")));
                assert!(!append && !quit);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(matches!(
            parse_on(&buf, "e").unwrap().command,
            Command::Edit { path: None, force: false }
        ));
        assert!(matches!(parse_on(&buf, "rfile"), Err(EdError::InvalidSuffix)));
        assert!(matches!(
            parse_on(&buf, "wq").unwrap().command,
            Command::Write { quit: true, .. }
        ));
    }

    #[test]
    fn test_substitute_parts() {
        let buf = buffer(&["hello"]);
        let parsed = parse_on(&buf, r"s/h\(...\)o/h\1X/").unwrap();
        let Command::Substitute(sub) = parsed.command else {
            panic!("expected substitute");
        };
        assert_eq!(sub.regex.as_bytes(), br"h\(...\)o");
        assert_eq!(sub.replacement, br"h\1X");
        assert_eq!(sub.occurrence, Occurrence::First);
        assert_eq!(parsed.print, None);
    }

    #[test]
    fn test_substitute_flags() {
        let buf = buffer(&["a"]);
        let parsed = parse_on(&buf, "s/a/b/gp").unwrap();
        let Command::Substitute(sub) = parsed.command else {
            panic!("expected substitute");
        };
        assert_eq!(sub.occurrence, Occurrence::All);
        assert_eq!(parsed.print, Some(PrintMode::Plain));

        let parsed = parse_on(&buf, "s|a|b|2n").unwrap();
        let Command::Substitute(sub) = parsed.command else {
            panic!("expected substitute");
        };
        assert_eq!(sub.occurrence, Occurrence::Nth(2));
        assert_eq!(parsed.print, Some(PrintMode::Numbered));

        assert!(matches!(parse_on(&buf, "s/a/b/x"), Err(EdError::InvalidSuffix)));
        assert!(matches!(parse_on(&buf, "s/a/b/0"), Err(EdError::InvalidSuffix)));
        assert!(matches!(
            parse_on(&buf, "s a b "),
            Err(EdError::InvalidPatternDelimiter)
        ));
    }

    #[test]
    fn test_substitute_missing_final_delimiter_prints() {
        let buf = buffer(&["a"]);
        let parsed = parse_on(&buf, "s/a/b").unwrap();
        let Command::Substitute(sub) = parsed.command else {
            panic!("expected substitute");
        };
        assert_eq!(sub.replacement, b"b");
        assert_eq!(parsed.print, Some(PrintMode::Plain));
    }

    #[test]
    fn test_substitute_escaped_delimiter_and_bracket_replacement() {
        let buf = buffer(&["a"]);
        let parsed = parse_on(&buf, r"s/a\/b/[x\/]/").unwrap();
        let Command::Substitute(sub) = parsed.command else {
            panic!("expected substitute");
        };
        assert_eq!(sub.regex.as_bytes(), b"a/b");
        assert_eq!(sub.replacement, b"[x/]");
    }

    #[test]
    fn test_bare_substitute_repeats() {
        let buf = buffer(&["a"]);
        assert!(matches!(
            parse_on(&buf, "s").unwrap().command,
            Command::RepeatSubstitute(None)
        ));
        assert!(matches!(
            parse_on(&buf, "sg").unwrap().command,
            Command::RepeatSubstitute(Some(Occurrence::All))
        ));
    }

    #[test]
    fn test_global_command_lists() {
        let buf = buffer(&["a"]);
        let Command::Global { invert, list, .. } = parse_on(&buf, "g/a/s/a/b/").unwrap().command
        else {
            panic!("expected global");
        };
        assert!(!invert);
        assert_eq!(list, CommandList::Inline(b"s/a/b/".to_vec()));

        let Command::Global { invert, list, .. } = parse_on(&buf, "v/a/").unwrap().command else {
            panic!("expected global");
        };
        assert!(invert);
        assert_eq!(list, CommandList::Inline(b"p".to_vec()));

        let Command::Global { list, .. } = parse_on(&buf, "g/a/{").unwrap().command else {
            panic!("expected global");
        };
        assert_eq!(list, CommandList::Block);
    }

    #[test]
    fn test_empty_pattern_reuses_previous() {
        let buf = buffer(&["abc"]);
        let mut last = LastPattern::default();
        assert!(matches!(
            parse(b"s//x/", &buf, &mut last),
            Err(EdError::NoPreviousPattern)
        ));
        parse(b"g/b/p", &buf, &mut last).unwrap();
        let Command::Substitute(sub) = parse(b"s//x/", &buf, &mut last).unwrap().command else {
            panic!("expected substitute");
        };
        assert_eq!(sub.regex.as_bytes(), b"b");
    }
}
