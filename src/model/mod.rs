//! Editor model - the complete state of an editing session
//!
//! The buffer is the document; everything else here is session memory the
//! commands consult: the last pattern and substitution, the last error, and
//! how the prompt and diagnostics are shown.

use crate::address::LastPattern;
use crate::buffer::{Line, LineBuffer};
use crate::commands::Substitution;
use crate::config::EditorConfig;
use crate::error::EdError;

/// Error reporting state (`h`, `H`)
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    /// Message of the most recent failed command
    pub last_error: Option<String>,
    /// Print messages instead of `?`
    pub verbose: bool,
}

impl Diagnostics {
    pub fn record(&mut self, error: &EdError) {
        self.last_error = Some(error.to_string());
    }
}

/// Command prompt (`P`, `-p`)
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub enabled: bool,
}

impl Default for Prompt {
    fn default() -> Self {
        Self {
            text: "*".to_string(),
            enabled: false,
        }
    }
}

impl Prompt {
    /// The prompt to show before reading a command, if any
    pub fn visible(&self) -> Option<&str> {
        self.enabled.then_some(self.text.as_str())
    }
}

#[derive(Debug, Default)]
pub struct EditorModel {
    pub buffer: LineBuffer,
    pub last_pattern: LastPattern,
    /// Remembered for a bare `s`
    pub last_substitution: Option<Substitution>,
    pub diagnostics: Diagnostics,
    pub prompt: Prompt,
    /// Suppress byte counts from `e`, `r`, `w`
    pub silent: bool,
    /// A `g`/`v` command list is being replayed
    pub(crate) in_global: bool,
}

impl EditorModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// A session over a clean buffer holding `lines`
    pub fn with_lines(lines: Vec<Line>) -> Self {
        Self {
            buffer: LineBuffer::from_lines(lines),
            ..Self::default()
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            diagnostics: Diagnostics {
                last_error: None,
                verbose: config.verbose,
            },
            prompt: Prompt {
                text: config.prompt.clone(),
                enabled: false,
            },
            ..Self::default()
        }
    }

    pub fn in_global(&self) -> bool {
        self.in_global
    }
}
