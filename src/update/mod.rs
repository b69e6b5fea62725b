//! Command dispatch
//!
//! Applies a parsed [`CommandLine`] to the [`EditorModel`]: resolves
//! default addresses, translates 1-based addresses to buffer indices, takes
//! the undo snapshot and runs the print suffix.

mod file;
mod global;
mod substitute;

use std::io::Write;

use crate::address::{AddressContext, Addresses};
use crate::buffer::{LineBuffer, LineRange, PrintMode};
use crate::commands::{self, Command, CommandLine};
use crate::error::{EdError, Result};
use crate::input::{read_input_block, LineSource};
use crate::model::EditorModel;

/// What the read loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

/// Parse and run one command line. Input blocks for `a`, `i`, `c` and `g`
/// command lists are read from `input`.
pub fn execute(
    model: &mut EditorModel,
    line: &[u8],
    input: &mut dyn LineSource,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let parsed = commands::parse(line, &model.buffer, &mut model.last_pattern)?;
    update(model, parsed, input, out)
}

/// Run a parsed command
pub fn update(
    model: &mut EditorModel,
    parsed: CommandLine,
    input: &mut dyn LineSource,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let CommandLine {
        addrs,
        command,
        print,
    } = parsed;

    let is_global = matches!(command, Command::Global { .. });
    let undo = ((command.is_mutating() || is_global) && !model.in_global)
        .then(|| model.buffer.capture());

    let result = apply(model, addrs, command, input, out);

    if let Some(snapshot) = undo {
        // A failed global may already have changed lines; keep it undoable
        let changed = snapshot.lines.as_slice() != model.buffer.lines();
        if result.is_ok() || (is_global && changed) {
            model.buffer.store_undo(snapshot);
        }
    }

    let outcome = result?;
    if let Some(mode) = print {
        print_current(model, mode, out)?;
    }
    Ok(outcome)
}

fn apply(
    model: &mut EditorModel,
    addrs: Addresses,
    command: Command,
    input: &mut dyn LineSource,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let buffer = &mut model.buffer;
    let current = buffer.current_line();
    let last = buffer.last_line();

    match command {
        Command::Null => {
            let line = if addrs.count == 0 {
                current + 1
            } else {
                target(&addrs, current)
            };
            let range = line_range(buffer, line, line)?;
            buffer.print(range, PrintMode::Plain, out)?;
        }
        Command::Append => {
            let after = target(&addrs, last);
            let block = read_input_block(input)?;
            buffer.append_at(after.checked_sub(1), block)?;
        }
        Command::Insert => {
            let before = target(&addrs, current);
            let block = read_input_block(input)?;
            buffer.insert_at(before.saturating_sub(1), block)?;
        }
        Command::Change => {
            let range = resolve(buffer, &addrs, current, current)?;
            let block = read_input_block(input)?;
            buffer.change(range, block)?;
        }
        Command::Delete => {
            let range = resolve(buffer, &addrs, current, current)?;
            buffer.delete(range)?;
        }
        Command::Print(mode) => {
            let range = resolve(buffer, &addrs, current, current)?;
            buffer.print(range, mode, out)?;
        }
        Command::LineNumber => {
            let line = target(&addrs, last);
            writeln!(out, "{}", line).map_err(EdError::Output)?;
        }
        Command::Mark(letter) => {
            let line = target(&addrs, current);
            if line == 0 {
                return Err(EdError::InvalidAddress);
            }
            buffer.set_mark(letter, line - 1)?;
        }
        Command::Move(dest) => {
            let range = resolve(buffer, &addrs, current, current)?;
            buffer.move_lines(range, dest.checked_sub(1))?;
        }
        Command::Transfer(dest) => {
            let range = resolve(buffer, &addrs, current, current)?;
            buffer.copy_lines(range, dest.checked_sub(1))?;
        }
        Command::Join => {
            let range = resolve(buffer, &addrs, current, current + 1)?;
            buffer.join(range)?;
        }
        Command::Read(path) => {
            let after = target(&addrs, last);
            file::read(model, after, path.as_deref(), out)?;
        }
        Command::Write { path, append, quit } => {
            let range = if addrs.count == 0 {
                None
            } else {
                Some(resolve(buffer, &addrs, 1, last)?)
            };
            file::write(model, range, path.as_deref(), append, out)?;
            if quit {
                return quit_session(model, false);
            }
        }
        Command::Edit { path, force } => {
            if buffer.is_dirty() && !force {
                return Err(EdError::BufferModified);
            }
            file::edit(model, path.as_deref(), out)?;
        }
        Command::Filename(path) => {
            if let Some(path) = path {
                buffer.set_filename(path);
            }
            let name = buffer.filename().ok_or(EdError::NoFilename)?;
            writeln!(out, "{}", name.display()).map_err(EdError::Output)?;
        }
        Command::Quit { force } => return quit_session(model, force),
        Command::Undo => buffer.undo()?,
        Command::Help => {
            if let Some(message) = &model.diagnostics.last_error {
                writeln!(out, "{}", message).map_err(EdError::Output)?;
            }
        }
        Command::ToggleVerbose => {
            let diagnostics = &mut model.diagnostics;
            diagnostics.verbose = !diagnostics.verbose;
            if let (true, Some(message)) = (diagnostics.verbose, &diagnostics.last_error) {
                writeln!(out, "{}", message).map_err(EdError::Output)?;
            }
        }
        Command::TogglePrompt => model.prompt.enabled = !model.prompt.enabled,
        Command::Substitute(substitution) => {
            let range = resolve(buffer, &addrs, current, current)?;
            model.last_substitution = Some(substitution.clone());
            substitute::run(&mut model.buffer, range, &substitution)?;
        }
        Command::RepeatSubstitute(occurrence) => {
            let range = resolve(buffer, &addrs, current, current)?;
            let mut substitution = model
                .last_substitution
                .clone()
                .ok_or(EdError::NoPreviousSubstitution)?;
            if let Some(occurrence) = occurrence {
                substitution.occurrence = occurrence;
            }
            substitute::run(&mut model.buffer, range, &substitution)?;
        }
        Command::Global {
            invert,
            regex,
            list,
        } => {
            let range = resolve(buffer, &addrs, 1, last)?;
            return global::run(model, range, invert, &regex, list, input, out);
        }
    }

    Ok(Outcome::Continue)
}

fn quit_session(model: &EditorModel, force: bool) -> Result<Outcome> {
    if model.buffer.is_dirty() && !force {
        return Err(EdError::BufferModified);
    }
    tracing::debug!("Quit requested");
    Ok(Outcome::Quit)
}

/// Second address, or `default` when none was given
fn target(addrs: &Addresses, default: usize) -> usize {
    if addrs.count == 0 {
        default
    } else {
        addrs.second.unwrap_or(default)
    }
}

/// The addressed range, or `first,second` when no address was given
fn resolve(
    buffer: &LineBuffer,
    addrs: &Addresses,
    first: usize,
    second: usize,
) -> Result<LineRange> {
    if addrs.count == 0 {
        return line_range(buffer, first, second);
    }
    let second_given = addrs.second.unwrap_or(0);
    line_range(buffer, addrs.first.unwrap_or(second_given), second_given)
}

/// 1-based `first..=second` as buffer indices
fn line_range(buffer: &LineBuffer, first: usize, second: usize) -> Result<LineRange> {
    if first == 0 || first > second || second > buffer.last_line() {
        return Err(EdError::InvalidAddress);
    }
    Ok(LineRange::new(first - 1, second - 1))
}

fn print_current(model: &mut EditorModel, mode: PrintMode, out: &mut dyn Write) -> Result<()> {
    let current = model.buffer.current().ok_or(EdError::InvalidAddress)?;
    model.buffer.print(LineRange::single(current), mode, out)
}
