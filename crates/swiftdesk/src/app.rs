//! Service wiring from a loaded config.

use anyhow::{Context, bail};
use log::{debug, info, warn};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use swiftdesk_config::{
    LayeredConfigOptions, StoreConfig, StoreProvider, SwiftDeskConfig, UsageConfig,
    secret_from_env,
};
use swiftdesk_core::{
    ChatRelay, ContextAggregator, FileUsageStorage, NotesService, RateTable, RelaySettings,
    SearchRelay, SimpleChatRelay, UsageObserver, UsageTracker, default_usage_path,
};
use swiftdesk_server::AppState;
use swiftdesk_store::{FileStore, FirebaseStore, InMemoryStore, RemoteStore, paths};
use swiftdesk_upstream::{BraveSearchClient, OpenAiChatClient};

/// Store file used by the `file` provider when no path is configured.
pub const DEFAULT_STORE_FILE: &str = ".swiftdesk/store.json";

/// Load the layered config for `cwd`, with `runtime` applied last.
pub fn load_config(cwd: &Path, runtime: Option<&Path>) -> anyhow::Result<SwiftDeskConfig> {
    let mut options = LayeredConfigOptions::new(cwd);
    if let Some(path) = runtime {
        info!("using runtime config layer: {}", path.display());
        options = options.with_runtime_path(path);
    }
    let layered = SwiftDeskConfig::load_layered_with_options(options)
        .context("failed to load layered config")?;
    debug!("layered config loaded (layers={})", layered.layers.len());
    Ok(layered.config)
}

/// Open the configured remote store. Relative file paths resolve against
/// `cwd`.
pub fn build_store(config: &StoreConfig, cwd: &Path) -> anyhow::Result<Arc<dyn RemoteStore>> {
    let store: Arc<dyn RemoteStore> = match config.provider {
        StoreProvider::Memory => {
            warn!("using in-memory store; data is lost on exit");
            Arc::new(InMemoryStore::new())
        }
        StoreProvider::File => {
            let path = resolve(cwd, config.path.as_deref().unwrap_or(DEFAULT_STORE_FILE));
            Arc::new(
                FileStore::new(&path)
                    .with_context(|| format!("failed to open file store {}", path.display()))?,
            )
        }
        StoreProvider::Firebase => {
            let Some(url) = config.url.as_deref() else {
                bail!("store.url is required for the firebase provider");
            };
            let auth = match secret_from_env(&config.auth_env) {
                Ok(token) => Some(token),
                Err(_) => {
                    warn!(
                        "{} is not set; accessing the database without auth",
                        config.auth_env
                    );
                    None
                }
            };
            Arc::new(
                FirebaseStore::new(url, auth, config.timeout_secs.map(Duration::from_secs))
                    .context("failed to build firebase client")?,
            )
        }
    };
    info!("remote store ready (provider={:?})", config.provider);
    Ok(store)
}

/// File-backed usage tracker at the configured or default location.
pub fn build_usage_tracker(
    config: &UsageConfig,
    cwd: &Path,
    observer: Option<Arc<dyn UsageObserver>>,
) -> anyhow::Result<UsageTracker> {
    let path = match config.path.as_deref() {
        Some(path) => resolve(cwd, path),
        None => default_usage_path().context("failed to resolve usage path")?,
    };
    debug!("usage record path: {}", path.display());
    let mut tracker = UsageTracker::new(
        Arc::new(FileUsageStorage::new(path)),
        RateTable::from_config(config),
    );
    if let Some(observer) = observer {
        tracker = tracker.with_observer(observer);
    }
    Ok(tracker)
}

/// Assemble the HTTP state. Upstream API keys come from the environment
/// variables named in the config.
pub fn build_state(
    config: &SwiftDeskConfig,
    store: Arc<dyn RemoteStore>,
    usage: Arc<UsageTracker>,
) -> anyhow::Result<AppState> {
    let chat_key = secret_from_env(&config.chat.api_key_env)
        .context("chat completion API key is not configured")?;
    let search_key = secret_from_env(&config.search.api_key_env)
        .context("search API key is not configured")?;

    let chat = Arc::new(
        OpenAiChatClient::new(
            config.chat.endpoint.clone(),
            chat_key,
            config.chat.timeout_secs.map(Duration::from_secs),
        )
        .context("failed to build chat client")?,
    );
    let search = Arc::new(
        BraveSearchClient::new(
            config.search.endpoint.clone(),
            search_key,
            config.search.timeout_secs.map(Duration::from_secs),
        )
        .context("failed to build search client")?,
    );

    let settings = RelaySettings::from_config(config);
    Ok(AppState {
        chat: ChatRelay::new(
            ContextAggregator::new(store.clone()),
            chat.clone(),
            settings.clone(),
        )
        .with_usage(usage.clone()),
        simple_chat: SimpleChatRelay::new(chat, settings.default_model.clone()),
        search: SearchRelay::new(search, settings.search_count),
        notes: NotesService::new(store),
        usage,
    })
}

/// Shared records outside the per-user context slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record<'a> {
    /// `users/{uid}/profile`
    Profile(&'a str),
    /// `guestinfo/{guestId}`
    Guest(&'a str),
    /// `stores/{storeId}`
    Store(&'a str),
}

/// Read one shared record; a missing record is the empty mapping.
pub async fn fetch_record(store: &dyn RemoteStore, record: Record<'_>) -> anyhow::Result<Value> {
    let path = match record {
        Record::Profile(uid) => paths::user_profile(uid),
        Record::Guest(id) => paths::guest(id),
        Record::Store(id) => paths::store_record(id),
    }
    .with_context(|| format!("invalid record id in {record:?}"))?;
    store
        .fetch_node(&path)
        .await
        .with_context(|| format!("failed to read {path}"))
}

fn resolve(cwd: &Path, raw: &str) -> PathBuf {
    let path = PathBuf::from(raw);
    if path.is_absolute() { path } else { cwd.join(path) }
}

#[cfg(test)]
mod tests {
    use super::{Record, build_store, build_usage_tracker, fetch_record, load_config};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::fs;
    use swiftdesk_config::{StoreConfig, StoreProvider, UsageConfig};
    use swiftdesk_store::{InMemoryStore, StorePath};
    use tempfile::tempdir;

    #[tokio::test]
    async fn file_store_resolves_relative_path_against_cwd() {
        let temp = tempdir().expect("tempdir");
        let config = StoreConfig {
            provider: StoreProvider::File,
            path: Some("data/store.json".to_string()),
            ..StoreConfig::default()
        };
        let store = build_store(&config, temp.path()).expect("store");
        store
            .write_node(
                &StorePath::parse("users/u1/memory").expect("path"),
                json!("hi"),
            )
            .await
            .expect("write");
        assert!(temp.path().join("data").join("store.json").is_file());
    }

    #[test]
    fn firebase_without_url_is_rejected() {
        let temp = tempdir().expect("tempdir");
        let config = StoreConfig {
            provider: StoreProvider::Firebase,
            ..StoreConfig::default()
        };
        assert!(build_store(&config, temp.path()).is_err());
    }

    #[test]
    fn usage_tracker_uses_configured_path_and_rates() {
        let temp = tempdir().expect("tempdir");
        let config = UsageConfig {
            path: Some("usage.json".to_string()),
            ..UsageConfig::default()
        };
        let tracker = build_usage_tracker(&config, temp.path(), None).expect("tracker");
        tracker.add_tokens(1000).expect("add");
        assert!(temp.path().join("usage.json").is_file());
        assert_eq!(tracker.get_stats().total, 1000);
    }

    #[test]
    fn runtime_layer_overrides_cwd_layer() {
        let temp = tempdir().expect("tempdir");
        fs::write(
            temp.path().join("swiftdesk.json5"),
            "{ server: { bind: '0.0.0.0:1' } }",
        )
        .expect("write cwd");
        let runtime = temp.path().join("override.json5");
        fs::write(&runtime, "{ server: { bind: '127.0.0.1:9999' } }").expect("write runtime");

        let config = load_config(temp.path(), Some(&runtime)).expect("config");
        assert_eq!(config.server.bind, "127.0.0.1:9999");
    }

    #[tokio::test]
    async fn records_resolve_to_their_store_locations() {
        let store = InMemoryStore::with_root(json!({
            "users": { "u1": { "profile": { "name": "Ada" } } },
            "guestinfo": { "g1": { "table": 4 } },
            "stores": { "s1": { "open": true } },
        }));

        let profile = fetch_record(&store, Record::Profile("u1")).await.expect("profile");
        assert_eq!(profile, json!({ "name": "Ada" }));
        let guest = fetch_record(&store, Record::Guest("g1")).await.expect("guest");
        assert_eq!(guest, json!({ "table": 4 }));
        let shop = fetch_record(&store, Record::Store("s1")).await.expect("store");
        assert_eq!(shop, json!({ "open": true }));
        let missing = fetch_record(&store, Record::Store("s2")).await.expect("missing");
        assert_eq!(missing, json!({}));

        assert!(fetch_record(&store, Record::Guest("a.b")).await.is_err());
    }
}
