//! Typed config sections. Every field has a serde default, so an empty
//! document is a complete config.

use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Root config for the SwiftDesk service and CLI.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SwiftDeskConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub usage: UsageConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8787".to_string()
}

/// Chat completion upstream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_endpoint")]
    pub endpoint: String,
    /// Environment variable holding the provider API key.
    #[serde(default = "default_chat_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_chat_model")]
    pub default_model: String,
    #[serde(default = "default_temperature")]
    pub default_temperature: f64,
    /// Number of most recent client messages forwarded upstream.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chat_endpoint(),
            api_key_env: default_chat_key_env(),
            default_model: default_chat_model(),
            default_temperature: default_temperature(),
            history_window: default_history_window(),
            timeout_secs: None,
        }
    }
}

fn default_chat_endpoint() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_chat_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_chat_model() -> String {
    "gpt-4o".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_history_window() -> usize {
    5
}

/// Web search upstream configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_search_count")]
    pub default_count: u32,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key_env: default_search_key_env(),
            default_count: default_search_count(),
            timeout_secs: None,
        }
    }
}

fn default_search_endpoint() -> String {
    "https://api.search.brave.com/res/v1/web/search".to_string()
}

fn default_search_key_env() -> String {
    "BRAVE_API_KEY".to_string()
}

fn default_search_count() -> u32 {
    5
}

/// Backend used for the remote document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreProvider {
    /// Volatile in-process tree.
    Memory,
    /// JSON document persisted to a local file.
    #[default]
    File,
    /// Firebase Realtime Database over REST.
    Firebase,
}

/// Remote store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub provider: StoreProvider,
    /// File path for the `file` provider.
    #[serde(default)]
    pub path: Option<String>,
    /// Database URL for the `firebase` provider.
    #[serde(default)]
    pub url: Option<String>,
    /// Environment variable holding the database auth token.
    #[serde(default = "default_store_auth_env")]
    pub auth_env: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provider: StoreProvider::default(),
            path: None,
            url: None,
            auth_env: default_store_auth_env(),
            timeout_secs: None,
        }
    }
}

fn default_store_auth_env() -> String {
    "FIREBASE_AUTH".to_string()
}

/// Token usage tracking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageConfig {
    /// Location of the persisted usage record.
    #[serde(default)]
    pub path: Option<String>,
    /// Price per 1000 tokens for models missing from the rate table.
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,
    /// Extra or overriding model rates (price per 1000 tokens).
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            path: None,
            fallback_rate: default_fallback_rate(),
            rates: BTreeMap::new(),
        }
    }
}

fn default_fallback_rate() -> f64 {
    0.005
}

/// Read a secret from the environment variable named by the config.
pub fn secret_from_env(var: &str) -> Result<String, ConfigError> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingEnv(var.to_string())),
    }
}
