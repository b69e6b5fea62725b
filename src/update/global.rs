//! `g` and `v`: collect target lines, then replay a command list on each

use std::io::Write;

use crate::address::Addresses;
use crate::buffer::{Line, LineRange};
use crate::commands::{self, Command, CommandList};
use crate::error::{EdError, Result};
use crate::input::{LineSource, ScriptSource};
use crate::model::EditorModel;
use crate::regex::Regex;

use super::{update, Outcome};

pub(super) fn run(
    model: &mut EditorModel,
    range: LineRange,
    invert: bool,
    regex: &Regex,
    list: CommandList,
    input: &mut dyn LineSource,
    out: &mut dyn Write,
) -> Result<Outcome> {
    if model.in_global {
        return Err(EdError::NestedGlobal);
    }

    let (script, inline) = match list {
        CommandList::Inline(line) => (vec![line], true),
        CommandList::Block => (read_block(input)?, false),
    };

    let targets: Vec<usize> = (range.start..=range.end)
        .filter(|&index| {
            model
                .buffer
                .line(index)
                .is_some_and(|line| regex.is_match(line) != invert)
        })
        .collect();
    tracing::debug!(
        "Global {} collected {} target(s)",
        if invert { "v" } else { "g" },
        targets.len()
    );

    model.buffer.set_global_targets(targets);
    model.in_global = true;
    let result = replay(model, &script, inline, out);
    model.in_global = false;
    model.buffer.clear_global_targets();
    result
}

/// Command lines after `{` up to a lone `}`
fn read_block(input: &mut dyn LineSource) -> Result<Vec<Line>> {
    let mut block = Vec::new();
    loop {
        match input.read_line()? {
            Some(line) if line.trim_ascii() == b"}" => return Ok(block),
            Some(line) => block.push(line),
            None => return Err(EdError::UnterminatedCommandList),
        }
    }
}

/// Visit targets highest first. Targets removed by earlier iterations have
/// already been dropped from the buffer's list.
///
/// A substitution that finds nothing on one target does not stop the
/// replay; `No match` is reported only if no target was substituted.
fn replay(
    model: &mut EditorModel,
    script_lines: &[Line],
    inline: bool,
    out: &mut dyn Write,
) -> Result<Outcome> {
    let mut substituted = false;
    let mut missed = false;
    while let Some(target) = model.buffer.next_global_target() {
        model.buffer.set_current(target)?;
        let mut script = ScriptSource::new(script_lines.iter().cloned());

        while let Some(line) = script.read_line()? {
            let mut parsed = commands::parse(&line, &model.buffer, &mut model.last_pattern)?;
            if inline && parsed.addrs.count == 0 {
                parsed.addrs = Addresses {
                    first: Some(target + 1),
                    second: Some(target + 1),
                    count: 1,
                    ..parsed.addrs
                };
            }
            let substitution = matches!(
                parsed.command,
                Command::Substitute(_) | Command::RepeatSubstitute(_)
            );
            match update(model, parsed, &mut script, out) {
                Ok(Outcome::Quit) => return Ok(Outcome::Quit),
                Ok(Outcome::Continue) => substituted |= substitution,
                Err(EdError::NoMatch) if substitution => missed = true,
                Err(e) => return Err(e),
            }
        }
    }
    if missed && !substituted {
        return Err(EdError::NoMatch);
    }
    Ok(Outcome::Continue)
}
