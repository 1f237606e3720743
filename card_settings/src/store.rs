//! Key-value backends holding the single settings entry.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::{Result, SettingsError};

/// A store holding one raw settings entry.
///
/// `read` returns `Ok(None)` when nothing has been stored yet.
pub trait SettingsStore {
    fn read(&self) -> Result<Option<String>>;
    fn write(&mut self, contents: &str) -> Result<()>;
}

// ════════════════════════════════════════════════════════════════════════════
// JsonFileStore
// ════════════════════════════════════════════════════════════════════════════

/// Settings entry kept as a JSON file on disk.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileStore { path: path.into() }
    }

    /// `<config_dir>/card_draw/settings.json`, if the platform has a config
    /// directory.
    pub fn default_location() -> Option<Self> {
        dirs::config_dir().map(|d| Self::new(d.join("card_draw").join("settings.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SettingsError {
        SettingsError::Io { path: self.path.clone(), source }
    }
}

impl SettingsStore for JsonFileStore {
    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        fs::write(&self.path, contents).map_err(|e| self.io_error(e))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// MemoryStore
// ════════════════════════════════════════════════════════════════════════════

/// In-process store, for tests and for running without a writable config
/// directory.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    contents: Option<String>,
}

impl MemoryStore {
    pub fn with_contents(contents: &str) -> Self {
        MemoryStore { contents: Some(contents.to_string()) }
    }

    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl SettingsStore for MemoryStore {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        self.contents = Some(contents.to_string());
        Ok(())
    }
}
