//! Editor configuration persistence
//!
//! Stores user preferences in `~/.config/edkit/config.yaml`

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Editor configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Prompt string shown once the prompt is enabled (`P` or `-p`)
    #[serde(default = "default_prompt")]
    pub prompt: String,
    /// Print error messages instead of `?`
    #[serde(default)]
    pub verbose: bool,
    /// Where a dirty buffer is saved when the session dies on a fatal error
    #[serde(default = "default_emergency_file")]
    pub emergency_file: String,
}

fn default_prompt() -> String {
    "*".to_string()
}

fn default_emergency_file() -> String {
    "ed.hup".to_string()
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            prompt: default_prompt(),
            verbose: false,
            emergency_file: default_emergency_file(),
        }
    }
}

impl EditorConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = crate::config_paths::config_file() else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load from an explicit path; missing or malformed files give defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
