//! Configuration loading and persisted state.
//!
//! Settings come from `~/.jsstyle/config.toml`, one table per linter
//! variant. Persisted key/value state (which one-time notices were shown)
//! lives next to it in `state.json`.

mod settings;
mod state;

pub use settings::{LinterSettings, ServerSettings};
pub use state::{FileMemento, Memento, MemoryMemento, StateError};

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Default, Deserialize)]
pub struct JsstyleConfig {
    #[serde(default)]
    pub standard: LinterSettings,
    #[serde(default)]
    pub semistandard: LinterSettings,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

impl JsstyleConfig {
    /// Load from the default location. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(source) => {
                tracing::warn!("Failed to read config at {}: {source}", path.display());
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {}: {source}", path.display());
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Settings section for a variant scope. Unknown scopes get defaults.
    #[must_use]
    pub fn section(&self, scope: &str) -> LinterSettings {
        match scope {
            "standard" => self.standard.clone(),
            "semistandard" => self.semistandard.clone(),
            other => {
                tracing::debug!("No settings section for '{other}', using defaults");
                LinterSettings::default()
            }
        }
    }
}

/// `~/.jsstyle`
#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".jsstyle"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn parses_both_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[standard]
auto_fix_on_save = true

[semistandard]
enable = false
node_path = "/usr/lib/node_modules"

[semistandard.server]
command = "semistandard-server"
args = ["--stdio"]
"#,
        )
        .unwrap();

        let config = JsstyleConfig::load_from(&path).unwrap();
        let standard = config.section("standard");
        assert!(standard.enable);
        assert!(standard.auto_fix_on_save);

        let semi = config.section("semistandard");
        assert!(!semi.enable);
        assert_eq!(semi.node_path.as_deref(), Some("/usr/lib/node_modules"));
        assert_eq!(semi.server.command, "semistandard-server");
    }

    #[test]
    fn missing_sections_default() {
        let config: JsstyleConfig = toml::from_str("").unwrap();
        assert_eq!(config.section("standard"), LinterSettings::default());
        assert_eq!(config.section("eslint"), LinterSettings::default());
    }

    #[test]
    fn parse_error_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[standard\nenable = ").unwrap();

        let err = JsstyleConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.path(), path.as_path());
    }

    #[test]
    fn read_error_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");
        let err = JsstyleConfig::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
