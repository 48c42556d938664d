use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use swiftdesk_store::{InMemoryStore, RemoteStore, StoreError, StorePath};

/// In-memory store that records every path it is asked about.
#[derive(Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    calls: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: Value) -> Self {
        Self {
            inner: InMemoryStore::with_root(root),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Calls seen so far, formatted as `op:path`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn snapshot(&self) -> Value {
        self.inner.snapshot()
    }

    fn record(&self, op: &str, path: &StorePath) {
        self.calls.lock().push(format!("{op}:{path}"));
    }
}

#[async_trait]
impl RemoteStore for RecordingStore {
    async fn fetch_node(&self, path: &StorePath) -> Result<Value, StoreError> {
        self.record("fetch", path);
        self.inner.fetch_node(path).await
    }

    async fn write_node(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.record("write", path);
        self.inner.write_node(path, value).await
    }

    async fn append_node(&self, path: &StorePath, entry: Value) -> Result<String, StoreError> {
        self.record("append", path);
        self.inner.append_node(path, entry).await
    }
}

/// Store that fails with a transport error for paths starting with `prefix`
/// and serves an empty tree otherwise.
pub struct FailingStore {
    prefix: String,
    inner: InMemoryStore,
}

impl FailingStore {
    /// Fail every call.
    pub fn always() -> Self {
        Self::for_prefix("")
    }

    /// Fail calls whose path starts with `prefix`.
    pub fn for_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            inner: InMemoryStore::new(),
        }
    }

    fn check(&self, path: &StorePath) -> Result<(), StoreError> {
        if path.to_string().starts_with(&self.prefix) {
            return Err(StoreError::Transport(format!("store unavailable: {path}")));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for FailingStore {
    async fn fetch_node(&self, path: &StorePath) -> Result<Value, StoreError> {
        self.check(path)?;
        self.inner.fetch_node(path).await
    }

    async fn write_node(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.check(path)?;
        self.inner.write_node(path, value).await
    }

    async fn append_node(&self, path: &StorePath, entry: Value) -> Result<String, StoreError> {
        self.check(path)?;
        self.inner.append_node(path, entry).await
    }
}
