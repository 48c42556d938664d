//! Locating and reading config layer files.

use super::{ConfigLayer, ConfigLayerSource, DEFAULT_CONFIG_DIR, DEFAULT_CONFIG_FILE, schema};
use crate::ConfigError;
use directories::BaseDirs;
use log::debug;
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// A parsed layer that passed the schema check.
pub(super) struct LoadedLayer {
    pub(super) meta: ConfigLayer,
    pub(super) value: Value,
}

/// Read the layer at `path`. A missing file is `Ok(None)` unless `required`.
pub(super) fn read_layer(
    source: ConfigLayerSource,
    path: &Path,
    required: bool,
) -> Result<Option<LoadedLayer>, ConfigError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound && !required => {
            debug!("no {} layer at {}", source.label(), path.display());
            return Ok(None);
        }
        Err(err) => return Err(ConfigError::ReadFailed(err)),
    };
    let value: Value = json5::from_str(&raw)?;
    schema::validate_layer_schema(&value, &format!("{}:{}", source.label(), path.display()))?;
    debug!(
        "read {} layer (path={}, bytes={})",
        source.label(),
        path.display(),
        raw.len()
    );
    Ok(Some(LoadedLayer {
        meta: ConfigLayer {
            source,
            path: path.to_path_buf(),
        },
        value,
    }))
}

/// Machine-wide layer location, if the platform has one.
pub(super) fn system_layer_path() -> Option<PathBuf> {
    if cfg!(unix) {
        Some(PathBuf::from("/etc/swiftdesk").join(DEFAULT_CONFIG_FILE))
    } else if cfg!(windows) {
        Some(PathBuf::from(r"C:\ProgramData\swiftdesk").join(DEFAULT_CONFIG_FILE))
    } else {
        None
    }
}

/// `~/.swiftdesk/swiftdesk.json5`
pub(super) fn user_layer_path() -> Option<PathBuf> {
    BaseDirs::new().map(|dirs| {
        dirs.home_dir()
            .join(DEFAULT_CONFIG_DIR)
            .join(DEFAULT_CONFIG_FILE)
    })
}

/// Canonical form of `path` when it exists, used to detect a file listed
/// under two layers.
pub(super) fn identity(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
