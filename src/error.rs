//! Editor errors
//!
//! Every user-facing failure carries a short fixed message. The runtime
//! records it as the last error and prints either `?` or the message.

use crate::regex::RegexError;

#[derive(Debug)]
pub enum EdError {
    /// Address out of range, unset mark, or malformed address
    InvalidAddress,
    /// Address given to a command that takes none
    UnexpectedAddress,
    /// Line number does not fit in a machine word
    NumberOutOfRange,
    /// Search or substitution found nothing
    NoMatch,
    /// `m` destination inside the moved range
    InvalidDestination,
    UnknownCommand,
    /// Trailing garbage after a command
    InvalidSuffix,
    /// `q` or `e` with unsaved changes
    BufferModified,
    NoFilename,
    /// `k` or `'` with something other than a lowercase letter
    InvalidMark,
    NothingToUndo,
    /// Empty pattern with no earlier pattern to reuse
    NoPreviousPattern,
    /// Bare `s` with no earlier substitution to repeat
    NoPreviousSubstitution,
    /// `/`, `?` or `s` delimiter never closed
    MissingDelimiter,
    InvalidPatternDelimiter,
    /// `g` or `v` inside a global command list
    NestedGlobal,
    /// `{` command list not closed by `}`
    UnterminatedCommandList,
    Regex(RegexError),
    /// A file could not be opened, read, or written
    File { message: String },
    /// Writing to the output stream failed
    Output(std::io::Error),
    /// Reading the command stream failed
    Input(std::io::Error),
}

impl EdError {
    pub fn file(message: impl Into<String>) -> Self {
        Self::File {
            message: message.into(),
        }
    }

    /// Fatal errors end the session instead of returning to the prompt
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Output(_) | Self::Input(_))
    }
}

impl std::fmt::Display for EdError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAddress => write!(f, "Invalid address"),
            Self::UnexpectedAddress => write!(f, "Unexpected address"),
            Self::NumberOutOfRange => write!(f, "Number out of range"),
            Self::NoMatch => write!(f, "No match"),
            Self::InvalidDestination => write!(f, "Invalid destination"),
            Self::UnknownCommand => write!(f, "Unknown command"),
            Self::InvalidSuffix => write!(f, "Invalid command suffix"),
            Self::BufferModified => write!(f, "Warning: buffer modified"),
            Self::NoFilename => write!(f, "No current filename"),
            Self::InvalidMark => write!(f, "Invalid mark character"),
            Self::NothingToUndo => write!(f, "Nothing to undo"),
            Self::NoPreviousPattern => write!(f, "No previous pattern"),
            Self::NoPreviousSubstitution => write!(f, "No previous substitution"),
            Self::MissingDelimiter => write!(f, "Missing pattern delimiter"),
            Self::InvalidPatternDelimiter => write!(f, "Invalid pattern delimiter"),
            Self::NestedGlobal => write!(f, "Cannot nest global commands"),
            Self::UnterminatedCommandList => write!(f, "Unterminated command list"),
            Self::Regex(e) => write!(f, "{}", e),
            Self::File { message } => write!(f, "{}", message),
            Self::Output(e) => write!(f, "Cannot write output: {}", e),
            Self::Input(e) => write!(f, "Cannot read input: {}", e),
        }
    }
}

impl std::error::Error for EdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Regex(e) => Some(e),
            Self::Output(e) | Self::Input(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RegexError> for EdError {
    fn from(e: RegexError) -> Self {
        Self::Regex(e)
    }
}

pub type Result<T, E = EdError> = std::result::Result<T, E>;
