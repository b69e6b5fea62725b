//! The command read loop
//!
//! Reads one command line at a time, runs it, and reports failures the way
//! ed does: `?` normally, the message itself in verbose mode. End of input
//! ends the session like `Q`. Fatal errors (broken output, unreadable
//! input) call the fatal hook with the buffer and end the session.

use std::io::Write;

use crate::buffer::LineBuffer;
use crate::error::{EdError, Result};
use crate::input::LineSource;
use crate::model::EditorModel;
use crate::update::{self, Outcome};

/// Called with the buffer before a fatal exit
pub type FatalHook<'a> = Box<dyn FnMut(&LineBuffer) + 'a>;

/// How a session ended
#[derive(Debug)]
pub enum SessionEnd {
    /// `q`, `Q`, or end of input
    Quit,
    Fatal(EdError),
}

impl SessionEnd {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Quit => 0,
            Self::Fatal(_) => 1,
        }
    }
}

pub struct Session<'a> {
    on_fatal: Option<FatalHook<'a>>,
}

impl Default for Session<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Session<'a> {
    pub fn new() -> Self {
        Self { on_fatal: None }
    }

    pub fn with_fatal_hook(mut self, hook: impl FnMut(&LineBuffer) + 'a) -> Self {
        self.on_fatal = Some(Box::new(hook));
        self
    }

    pub fn run(
        &mut self,
        model: &mut EditorModel,
        input: &mut dyn LineSource,
        out: &mut dyn Write,
    ) -> SessionEnd {
        match run_loop(model, input, out) {
            Ok(()) => SessionEnd::Quit,
            Err(error) => {
                tracing::error!("Fatal: {}", error);
                if let Some(hook) = self.on_fatal.as_mut() {
                    hook(&model.buffer);
                }
                SessionEnd::Fatal(error)
            }
        }
    }
}

/// Runs until quit or end of input; `Err` only for fatal errors
fn run_loop(model: &mut EditorModel, input: &mut dyn LineSource, out: &mut dyn Write) -> Result<()> {
    loop {
        if let Some(prompt) = model.prompt.visible() {
            write!(out, "{}", prompt).map_err(EdError::Output)?;
        }
        out.flush().map_err(EdError::Output)?;

        let Some(line) = input.read_line()? else {
            tracing::debug!("End of input");
            return Ok(());
        };

        match update::execute(model, &line, input, out) {
            Ok(Outcome::Continue) => {}
            Ok(Outcome::Quit) => {
                out.flush().map_err(EdError::Output)?;
                return Ok(());
            }
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => report(model, &error, out)?,
        }
    }
}

fn report(model: &mut EditorModel, error: &EdError, out: &mut dyn Write) -> Result<()> {
    tracing::debug!("Command failed: {}", error);
    model.diagnostics.record(error);
    if model.diagnostics.verbose {
        writeln!(out, "{}", error).map_err(EdError::Output)
    } else {
        writeln!(out, "?").map_err(EdError::Output)
    }
}
