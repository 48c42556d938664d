//! Loader behaviour over real files in temp dirs.

use super::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write a layer file, creating its directory.
fn write_json5(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("dir");
    }
    fs::write(path, contents).expect("write");
}

/// Options that only look at the provided layers.
fn isolated_options(cwd: &Path) -> LayeredConfigOptions {
    let mut options = LayeredConfigOptions::new(cwd);
    options.system_config_path = None;
    options.user_config_path = None;
    options
}

/// An empty document yields every default.
#[test]
fn parse_minimal_config() {
    let config = SwiftDeskConfig::load_from_str("{}").expect("config");
    assert_eq!(config.chat.default_model, "gpt-4o");
    assert_eq!(config.chat.history_window, 5);
    assert_eq!(config.search.default_count, 5);
    assert_eq!(config.usage.fallback_rate, 0.005);
    assert_eq!(config.store.provider, StoreProvider::File);
}

#[test]
fn rejects_unknown_top_level_key() {
    let err = SwiftDeskConfig::load_from_str(r#"{ unexpected: true }"#).unwrap_err();
    assert!(format!("{err}").contains("unknown key"));
}

/// Reject unknown store providers with the offending path in the message.
#[test]
fn rejects_invalid_store_provider() {
    let err = SwiftDeskConfig::load_from_str(r#"{ store: { provider: "s3" } }"#).unwrap_err();
    assert!(format!("{err}").contains("store.provider"));
}

#[test]
fn firebase_requires_url() {
    let err =
        SwiftDeskConfig::load_from_str(r#"{ store: { provider: "firebase" } }"#).unwrap_err();
    assert!(format!("{err}").contains("store.url"));
}

#[test]
fn rejects_zero_history_window() {
    let err = SwiftDeskConfig::load_from_str(r#"{ chat: { history_window: 0 } }"#).unwrap_err();
    assert!(format!("{err}").contains("history_window"));
}

#[test]
fn null_values_fall_back_to_defaults() {
    let config =
        SwiftDeskConfig::load_from_str(r#"{ chat: { default_model: null } }"#).expect("config");
    assert_eq!(config.chat.default_model, "gpt-4o");
}

/// Ensure cwd config takes precedence over user and system config.
#[test]
fn layered_config_prefers_cwd_over_user() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let cwd = root.join("project");
    fs::create_dir_all(&cwd).expect("cwd");

    let system_config = root.join("system.json5");
    write_json5(&system_config, r#"{ chat: { default_model: "system" } }"#);
    let user_config = root.join("user.json5");
    write_json5(
        &user_config,
        r#"{ chat: { default_model: "user", history_window: 3 } }"#,
    );
    write_json5(
        &cwd.join(DEFAULT_CONFIG_FILE),
        r#"{ chat: { default_model: "cwd" } }"#,
    );

    let mut options = LayeredConfigOptions::new(&cwd);
    options.system_config_path = Some(system_config);
    options.user_config_path = Some(user_config);

    let layered = SwiftDeskConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.chat.default_model, "cwd");
    assert_eq!(layered.config.chat.history_window, 3);
    assert_eq!(layered.layers.len(), 3);
    assert_eq!(layered.layers[2].source, ConfigLayerSource::Cwd);
}

#[test]
fn runtime_override_wins() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    write_json5(
        &root.join(DEFAULT_CONFIG_FILE),
        r#"{ usage: { rates: { "gpt-4o": 0.01 } } }"#,
    );
    let runtime_config = root.join("runtime.json5");
    write_json5(
        &runtime_config,
        r#"{ usage: { rates: { "custom-model": 0.002 } } }"#,
    );

    let options = isolated_options(root).with_runtime_path(&runtime_config);
    let layered = SwiftDeskConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.usage.rates.get("gpt-4o"), Some(&0.01));
    assert_eq!(layered.config.usage.rates.get("custom-model"), Some(&0.002));
}

#[test]
fn runtime_null_unsets_lower_layer() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    write_json5(
        &root.join(DEFAULT_CONFIG_FILE),
        r#"{ server: { bind: "0.0.0.0:9000" } }"#,
    );
    let runtime_config = root.join("runtime.json5");
    write_json5(&runtime_config, r#"{ server: { bind: null } }"#);

    let options = isolated_options(root).with_runtime_path(&runtime_config);
    let layered = SwiftDeskConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.config.server.bind, "127.0.0.1:8787");
}

#[test]
fn missing_runtime_layer_is_an_error() {
    let temp = TempDir::new().expect("tmp");
    let options = isolated_options(temp.path()).with_runtime_path(temp.path().join("nope.json5"));
    let err = SwiftDeskConfig::load_layered_with_options(options).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed(_)));
}

#[test]
fn same_file_in_two_layers_is_read_once() {
    let temp = TempDir::new().expect("tmp");
    let root = temp.path();
    let shared = root.join(DEFAULT_CONFIG_FILE);
    write_json5(&shared, r#"{ search: { default_count: 7 } }"#);

    let mut options = isolated_options(root);
    options.user_config_path = Some(shared);
    let layered = SwiftDeskConfig::load_layered_with_options(options).expect("layered");
    assert_eq!(layered.layers.len(), 1);
    assert_eq!(layered.layers[0].source, ConfigLayerSource::User);
    assert_eq!(layered.config.search.default_count, 7);
}

#[test]
fn missing_discovered_layers_are_skipped() {
    let temp = TempDir::new().expect("tmp");
    let mut options = isolated_options(temp.path());
    options.user_config_path = Some(temp.path().join("absent.json5"));
    let layered = SwiftDeskConfig::load_layered_with_options(options).expect("layered");
    assert!(layered.layers.is_empty());
    assert_eq!(layered.config.server.bind, "127.0.0.1:8787");
}
