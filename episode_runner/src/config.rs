//! Runtime configuration, loaded from TOML.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Errors raised while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level runner configuration. Every field has a default.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    pub persistence: PersistenceConfig,
    pub presentation: PresentationConfig,
    pub minigame: MinigameConfig,
}

impl RunnerConfig {
    /// Parse configuration from a TOML string.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }
}

/// Where and how saves are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Prefix of every slot key; the slot number is appended.
    pub key_prefix: String,

    /// Slot written after every transition.
    pub auto_slot: u32,

    /// Directory used by file-backed stores.
    pub save_dir: PathBuf,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            key_prefix: "gmh-save-".to_owned(),
            auto_slot: 0,
            save_dir: PathBuf::from("saves"),
        }
    }
}

/// Text used when rendering lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresentationConfig {
    /// Final line emitted by every `end` node.
    pub end_line: String,

    /// Placed between a speaker and their line.
    pub speaker_separator: String,
}

impl PresentationConfig {
    /// Format a line, prefixing the speaker when there is one.
    pub fn format_line(&self, speaker: Option<&str>, text: &str) -> String {
        match speaker {
            Some(who) => format!("{}{}{}", who, self.speaker_separator, text),
            None => text.to_owned(),
        }
    }
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            end_line: "The End".to_owned(),
            speaker_separator: ": ".to_owned(),
        }
    }
}

/// How `minigame` nodes pick their branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MinigamePolicy {
    /// Always follow `onWin`.
    #[default]
    AutoWin,
    /// Ask the presentation sink for the outcome.
    AskSink,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MinigameConfig {
    pub policy: MinigamePolicy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RunnerConfig::default();
        assert_eq!(config.persistence.key_prefix, "gmh-save-");
        assert_eq!(config.persistence.auto_slot, 0);
        assert_eq!(config.presentation.end_line, "The End");
        assert_eq!(config.minigame.policy, MinigamePolicy::AutoWin);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(RunnerConfig::from_toml_str("").unwrap(), RunnerConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config = RunnerConfig::from_toml_str(
            r#"
            [persistence]
            auto_slot = 3

            [minigame]
            policy = "ask_sink"
            "#,
        )
        .unwrap();

        assert_eq!(config.persistence.auto_slot, 3);
        assert_eq!(config.persistence.key_prefix, "gmh-save-");
        assert_eq!(config.minigame.policy, MinigamePolicy::AskSink);
    }

    #[test]
    fn test_invalid_toml() {
        let err = RunnerConfig::from_toml_str("[minigame]\npolicy = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_format_line() {
        let presentation = PresentationConfig::default();
        assert_eq!(presentation.format_line(Some("Mira"), "Hello"), "Mira: Hello");
        assert_eq!(presentation.format_line(None, "The End"), "The End");
    }
}
