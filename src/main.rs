use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use edkit::buffer::{write_lines, LineBuffer};
use edkit::cli::{CliArgs, StartupConfig};
use edkit::config::EditorConfig;
use edkit::error::EdError;
use edkit::input::ReaderSource;
use edkit::model::EditorModel;
use edkit::runtime::Session;

fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();
    edkit::tracing::init();

    let config = EditorConfig::load();
    let startup = args.into_config(&config).map_err(anyhow::Error::msg)?;
    let mut model = startup.build_model();

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    open_initial_file(&mut model, &startup, &mut out)?;

    let stdin = io::stdin();
    let mut input = ReaderSource::new(stdin.lock());
    let emergency_file = startup.emergency_file.clone();

    let end = Session::new()
        .with_fatal_hook(|buffer: &LineBuffer| emergency_save(buffer, &emergency_file))
        .run(&mut model, &mut input, &mut out);

    // Nothing more can be reported once the output stream has failed
    let _ = out.flush();
    Ok(ExitCode::from(end.exit_code() as u8))
}

/// Load the file named on the command line. A file that does not exist yet
/// only sets the filename; any other failure aborts startup.
fn open_initial_file(
    model: &mut EditorModel,
    startup: &StartupConfig,
    out: &mut impl Write,
) -> Result<()> {
    let Some(path) = &startup.file else {
        return Ok(());
    };

    if !path.exists() {
        model.buffer.set_filename(path);
        let error = EdError::file(format!("{}: No such file or directory", path.display()));
        model.diagnostics.record(&error);
        if model.diagnostics.verbose {
            writeln!(out, "{}", error)?;
        } else {
            writeln!(out, "?")?;
        }
        return Ok(());
    }

    let bytes = model
        .buffer
        .load(path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    if !model.silent {
        writeln!(out, "{}", bytes)?;
    }
    Ok(())
}

/// Write a dirty buffer somewhere safe before a fatal exit
fn emergency_save(buffer: &LineBuffer, path: &Path) {
    if !buffer.is_dirty() {
        return;
    }
    match write_lines(path, buffer.lines(), false) {
        Ok(bytes) => tracing::warn!("Saved {} bytes to {}", bytes, path.display()),
        Err(e) => tracing::error!("Emergency save to {} failed: {}", path.display(), e),
    }
}
