//! Persistence for the raw usage record.

use super::UsageError;
use directories::BaseDirs;
use parking_lot::Mutex;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const USAGE_FILENAME: &str = "usage.json";

/// Holds the serialized usage record. Implementations never interpret it.
pub trait UsageStorage: Send + Sync {
    /// Raw record, or `None` when nothing has been saved.
    fn load(&self) -> Result<Option<String>, UsageError>;
    fn save(&self, raw: &str) -> Result<(), UsageError>;
    /// Delete the record; deleting a missing record succeeds.
    fn remove(&self) -> Result<(), UsageError>;
}

/// Record kept in a single local file.
#[derive(Debug, Clone)]
pub struct FileUsageStorage {
    path: PathBuf,
}

impl FileUsageStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl UsageStorage for FileUsageStorage {
    fn load(&self) -> Result<Option<String>, UsageError> {
        match fs::read_to_string(&self.path) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(UsageError::Io(err)),
        }
    }

    fn save(&self, raw: &str) -> Result<(), UsageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, raw)?;
        fs::rename(&staging, &self.path)?;
        Ok(())
    }

    fn remove(&self) -> Result<(), UsageError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(UsageError::Io(err)),
        }
    }
}

/// Record kept in process memory.
#[derive(Debug, Default)]
pub struct InMemoryUsageStorage {
    slot: Mutex<Option<String>>,
}

impl InMemoryUsageStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with a raw record, which need not be valid.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(raw.into())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.slot.lock().clone()
    }
}

impl UsageStorage for InMemoryUsageStorage {
    fn load(&self) -> Result<Option<String>, UsageError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, raw: &str) -> Result<(), UsageError> {
        *self.slot.lock() = Some(raw.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<(), UsageError> {
        self.slot.lock().take();
        Ok(())
    }
}

/// `~/.swiftdesk/usage.json`, or `./.swiftdesk/usage.json` without a home
/// directory.
pub fn default_usage_path() -> Result<PathBuf, UsageError> {
    if let Some(home) = BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()) {
        return Ok(home.join(".swiftdesk").join(USAGE_FILENAME));
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(".swiftdesk").join(USAGE_FILENAME))
}
