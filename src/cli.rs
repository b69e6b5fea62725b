//! Command-line argument parsing for the editor
//!
//! Supports:
//! - An optional file to edit
//! - A custom prompt (`-p`), which also turns the prompt on
//! - Script mode without byte counts (`-s`)
//! - Verbose error messages from the start (`-v`)

use clap::Parser;
use std::path::PathBuf;

use crate::config::EditorConfig;
use crate::model::{Diagnostics, EditorModel, Prompt};

/// A line-oriented text editor
#[derive(Parser, Debug)]
#[command(name = "edkit", version, about = "A line-oriented text editor")]
pub struct CliArgs {
    /// File to edit
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Use PROMPT as the command prompt and show it
    #[arg(short = 'p', long, value_name = "PROMPT")]
    pub prompt: Option<String>,

    /// Suppress byte counts
    #[arg(short = 's', long)]
    pub silent: bool,

    /// Print error messages instead of `?`
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Configuration derived from CLI arguments layered over the config file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartupConfig {
    pub file: Option<PathBuf>,
    pub prompt: String,
    pub prompt_enabled: bool,
    pub silent: bool,
    pub verbose: bool,
    /// Target of the fatal-error save
    pub emergency_file: PathBuf,
}

impl CliArgs {
    /// Convert parsed CLI args into startup configuration; CLI values win
    /// over `config`.
    pub fn into_config(self, config: &EditorConfig) -> Result<StartupConfig, String> {
        if let Some(file) = &self.file {
            if file.is_dir() {
                return Err(format!("{} is a directory", file.display()));
            }
        }

        let prompt_enabled = self.prompt.is_some();
        Ok(StartupConfig {
            file: self.file,
            prompt: self.prompt.unwrap_or_else(|| config.prompt.clone()),
            prompt_enabled,
            silent: self.silent,
            verbose: self.verbose || config.verbose,
            emergency_file: PathBuf::from(&config.emergency_file),
        })
    }
}

impl StartupConfig {
    /// A fresh editing session with these settings; the file is not loaded
    pub fn build_model(&self) -> EditorModel {
        EditorModel {
            diagnostics: Diagnostics {
                last_error: None,
                verbose: self.verbose,
            },
            prompt: Prompt {
                text: self.prompt.clone(),
                enabled: self.prompt_enabled,
            },
            silent: self.silent,
            ..EditorModel::default()
        }
    }
}
