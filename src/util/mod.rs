//! Utility modules

pub mod file_validation;
pub mod text;

pub use text::{escape_line, split_lines};

pub use file_validation::{filename_for_display, validate_file_for_opening, FileOpenError};
