//! edkit - a line-oriented text editor in the ed tradition
//!
//! The crate is layered bottom-up: a POSIX basic regular expression engine
//! ([`regex`]), a line buffer with marks and single-level undo
//! ([`buffer`]), the address parser ([`address`]), and the command layer
//! that parses ([`commands`]) and applies ([`update`]) command lines to the
//! session state ([`model`]). [`runtime`] drives the read loop.

pub mod address;
pub mod buffer;
pub mod cli;
pub mod commands;
pub mod config;
pub mod config_paths;
pub mod error;
pub mod input;
pub mod model;
pub mod regex;
pub mod runtime;
pub mod tracing;
pub mod update;
pub mod util;

// Re-export commonly used types
pub use buffer::LineBuffer;
pub use commands::Command;
pub use config::EditorConfig;
pub use error::EdError;
pub use model::EditorModel;
pub use regex::Regex;
pub use update::{execute, Outcome};
