use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::app_config_dir;
use crate::ports::{ConfigError, ConfigResult, PreferenceStore};

/// Preferences kept as a flat JSON object of strings in `preferences.json`.
pub struct FilePreferenceStore {
    path: PathBuf,
    // Serializes the read-modify-write in `set`
    write_lock: Mutex<()>,
}

impl FilePreferenceStore {
    pub fn new() -> ConfigResult<Self> {
        Ok(Self::in_dir(app_config_dir()?))
    }

    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join("preferences.json"),
            write_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> ConfigResult<BTreeMap<String, String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(ConfigError::ReadError(e.to_string())),
        };

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        let _write = self
            .write_lock
            .lock()
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        // A corrupt file is replaced rather than blocking every future write.
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(ConfigError::InvalidFormat(e)) => {
                tracing::warn!("Discarding malformed preferences file: {}", e);
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(&values)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| ConfigError::WriteError(e.to_string()))
    }
}

/// Process-lifetime preferences, used when no config directory is available.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
