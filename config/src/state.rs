//! Persisted key/value state.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Durable key/value storage that survives restarts.
pub trait Memento {
    fn get(&self, key: &str) -> Option<Value>;

    fn update(&mut self, key: &str, value: Value) -> Result<(), StateError>;
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to write state to {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize state")]
    Serialize(#[from] serde_json::Error),
}

/// JSON object on disk, rewritten atomically on every update.
#[derive(Debug)]
pub struct FileMemento {
    path: PathBuf,
    values: Map<String, Value>,
}

impl FileMemento {
    /// Open `path`. A missing or unreadable file starts empty.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Map<String, Value>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    tracing::warn!("Ignoring malformed state at {}: {e}", path.display());
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                tracing::warn!("Failed to read state at {}: {e}", path.display());
                Map::new()
            }
        };
        Self { path, values }
    }

    /// `~/.jsstyle/state.json`
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        crate::config_dir().map(|dir| dir.join("state.json"))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StateError> {
        let io_err = |source| StateError::Io {
            path: self.path.clone(),
            source,
        };
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent).map_err(io_err)?;

        let bytes = serde_json::to_vec_pretty(&self.values)?;
        let mut tmp = NamedTempFile::new_in(parent).map_err(io_err)?;
        tmp.write_all(&bytes).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;
        tmp.persist(&self.path).map_err(|e| io_err(e.error))?;
        Ok(())
    }
}

impl Memento for FileMemento {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn update(&mut self, key: &str, value: Value) -> Result<(), StateError> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }
}

/// In-process state for runs that should not touch disk.
#[derive(Debug, Default, Clone)]
pub struct MemoryMemento {
    values: HashMap<String, Value>,
}

impl MemoryMemento {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Memento for MemoryMemento {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn update(&mut self, key: &str, value: Value) -> Result<(), StateError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn update_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.json");

        let mut state = FileMemento::open(&path);
        assert_eq!(state.get("standard.alwaysShowNoConfig"), None);
        state
            .update("standard.alwaysShowNoConfig", json!({ "global": true }))
            .unwrap();

        let reopened = FileMemento::open(&path);
        assert_eq!(
            reopened.get("standard.alwaysShowNoConfig"),
            Some(json!({ "global": true }))
        );
    }

    #[test]
    fn malformed_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "not json").unwrap();

        let mut state = FileMemento::open(&path);
        assert_eq!(state.get("anything"), None);
        state.update("k", json!(1)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"k\""));
    }

    #[test]
    fn memory_memento_round_trip() {
        let mut state = MemoryMemento::new();
        state.update("k", json!([1, 2])).unwrap();
        assert_eq!(state.get("k"), Some(json!([1, 2])));
    }
}
