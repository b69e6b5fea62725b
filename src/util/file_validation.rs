//! File validation before reading a file into the buffer
//!
//! Checks the path up front so `e`, `E` and `r` can report a clear reason
//! instead of a raw I/O error:
//! - File existence and permissions
//! - Directories

use std::fs;
use std::path::Path;

/// Errors that can occur when validating a file for reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOpenError {
    /// File does not exist
    NotFound,
    /// Permission denied to read file
    PermissionDenied,
    /// Path is a directory, not a file
    IsDirectory,
    /// Other I/O error
    IoError(String),
}

impl FileOpenError {
    /// Get a user-friendly error message
    pub fn user_message(&self, filename: &str) -> String {
        match self {
            Self::NotFound => format!("Cannot open input file: {}", filename),
            Self::PermissionDenied => format!("Permission denied: {}", filename),
            Self::IsDirectory => format!("Cannot read a directory: {}", filename),
            Self::IoError(msg) => format!("Error reading {}: {}", filename, msg),
        }
    }

    pub fn from_io(e: &std::io::Error) -> Self {
        match e.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound,
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::IoError(e.to_string()),
        }
    }
}

impl std::fmt::Display for FileOpenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(f, "file not found"),
            Self::PermissionDenied => write!(f, "permission denied"),
            Self::IsDirectory => write!(f, "is a directory"),
            Self::IoError(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for FileOpenError {}

/// Validate a file before attempting to read it
///
/// Checks:
/// - File exists
/// - Is not a directory
pub fn validate_file_for_opening(path: &Path) -> Result<(), FileOpenError> {
    let metadata = fs::metadata(path).map_err(|e| FileOpenError::from_io(&e))?;

    if metadata.is_dir() {
        return Err(FileOpenError::IsDirectory);
    }

    Ok(())
}

/// Get the path as shown in error messages
pub fn filename_for_display(path: &Path) -> String {
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_validate_nonexistent_file() {
        let result = validate_file_for_opening(Path::new("/nonexistent/path/file.txt"));
        assert!(matches!(result, Err(FileOpenError::NotFound)));
    }

    #[test]
    fn test_validate_directory() {
        let dir = tempfile::tempdir().unwrap();
        let result = validate_file_for_opening(dir.path());
        assert!(matches!(result, Err(FileOpenError::IsDirectory)));
    }

    #[test]
    fn test_validate_valid_file() {
        let temp = NamedTempFile::new().unwrap();
        let result = validate_file_for_opening(temp.path());
        assert!(result.is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FileOpenError::NotFound.user_message("test.txt"),
            "Cannot open input file: test.txt"
        );
        assert_eq!(
            FileOpenError::IsDirectory.user_message("mydir"),
            "Cannot read a directory: mydir"
        );
    }
}
