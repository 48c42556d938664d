//! Layered configuration loader.
//!
//! Layers are read in precedence order (system, user, cwd, runtime), each is
//! schema-checked on its own, and the merged document is decoded and
//! validated as a whole.

mod layer_io;
mod merge;
mod schema;

#[cfg(test)]
mod tests;

use crate::{ConfigError, StoreProvider, SwiftDeskConfig};
use layer_io::LoadedLayer;
use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Config filename looked up in the cwd and user layers.
const DEFAULT_CONFIG_FILE: &str = "swiftdesk.json5";
/// Directory under the home directory holding the user layer.
const DEFAULT_CONFIG_DIR: &str = ".swiftdesk";

/// Merged config and the files it was built from.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    pub config: SwiftDeskConfig,
    /// Contributing layers, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

/// Where a layer sits in the precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    System,
    User,
    /// `swiftdesk.json5` in the working directory.
    Cwd,
    /// Files passed explicitly, applied last.
    Runtime,
}

impl ConfigLayerSource {
    /// Short name used in logs and validation errors.
    pub fn label(self) -> &'static str {
        match self {
            ConfigLayerSource::System => "system",
            ConfigLayerSource::User => "user",
            ConfigLayerSource::Cwd => "cwd",
            ConfigLayerSource::Runtime => "runtime",
        }
    }
}

/// A layer file that contributed to the merged config.
#[derive(Debug, Clone)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Layer locations for [`SwiftDeskConfig::load_layered_with_options`].
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Directory searched for the cwd layer.
    pub cwd: PathBuf,
    /// `None` skips the system layer.
    pub system_config_path: Option<PathBuf>,
    /// `None` skips the user layer.
    pub user_config_path: Option<PathBuf>,
    /// Required files applied after every discovered layer, in order.
    pub runtime_paths: Vec<PathBuf>,
}

impl LayeredConfigOptions {
    /// Platform default system and user locations plus the given cwd.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::system_layer_path(),
            user_config_path: layer_io::user_layer_path(),
            runtime_paths: Vec::new(),
        }
    }

    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl SwiftDeskConfig {
    /// Load one file without layering.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!("loading config file {}", path.display());
        Self::load_from_str(&fs::read_to_string(path)?)
    }

    /// Parse one JSON5 document without layering.
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        let value: Value = json5::from_str(contents)?;
        schema::validate_layer_schema(&value, "config")?;
        config_from_value(merge_layers([&value]), "config")
    }

    /// Load the default layer stack for `cwd`.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load the layer stack described by `options`.
    ///
    /// Discovered layers are optional and a file reachable through two
    /// locations is read once; runtime layers must exist.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = match options.cwd.canonicalize() {
            Ok(path) => path,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => options.cwd.clone(),
            Err(err) => return Err(ConfigError::ReadFailed(err)),
        };
        let discovered = [
            (ConfigLayerSource::System, options.system_config_path),
            (ConfigLayerSource::User, options.user_config_path),
            (ConfigLayerSource::Cwd, Some(cwd.join(DEFAULT_CONFIG_FILE))),
        ];

        let mut seen = HashSet::new();
        let mut loaded: Vec<LoadedLayer> = Vec::new();
        for (source, path) in discovered {
            let Some(path) = path else {
                continue;
            };
            if !seen.insert(layer_io::identity(&path)) {
                debug!("{} layer already read: {}", source.label(), path.display());
                continue;
            }
            loaded.extend(layer_io::read_layer(source, &path, false)?);
        }
        for path in &options.runtime_paths {
            loaded.extend(layer_io::read_layer(ConfigLayerSource::Runtime, path, true)?);
        }

        let config = config_from_value(
            merge_layers(loaded.iter().map(|layer| &layer.value)),
            "effective",
        )?;
        let layers: Vec<ConfigLayer> = loaded.into_iter().map(|layer| layer.meta).collect();
        info!("config loaded from {} layer(s)", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Cross-field and range rules checked after decoding.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.history_window == 0 {
            return Err(ConfigError::Invalid(
                "chat.history_window must be at least 1".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.chat.default_temperature) {
            return Err(ConfigError::Invalid(
                "chat.default_temperature must be between 0 and 2".to_string(),
            ));
        }
        if self.usage.fallback_rate < 0.0 {
            return Err(ConfigError::Invalid(
                "usage.fallback_rate must not be negative".to_string(),
            ));
        }
        if let Some((model, _)) = self.usage.rates.iter().find(|(_, rate)| **rate < 0.0) {
            return Err(ConfigError::Invalid(format!(
                "usage.rates.{model} must not be negative"
            )));
        }
        if self.store.provider == StoreProvider::Firebase && self.store.url.is_none() {
            return Err(ConfigError::Invalid(
                "store.url is required for the firebase provider".to_string(),
            ));
        }
        Ok(())
    }
}

/// Fold layers over an empty document, dropping null-valued keys.
fn merge_layers<'a>(layers: impl IntoIterator<Item = &'a Value>) -> Value {
    let mut merged = Value::Object(Map::new());
    for layer in layers {
        merge::merge_json_values(&mut merged, layer);
    }
    merged
}

fn config_from_value(value: Value, label: &str) -> Result<SwiftDeskConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: SwiftDeskConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}
