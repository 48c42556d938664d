//! Store interface and local implementations.

use crate::error::StoreError;
use crate::ids::next_push_id;
use crate::path::StorePath;
use crate::tree::{get_node, set_node};
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Value returned for nodes that do not exist.
pub fn empty_node() -> Value {
    Value::Object(Map::new())
}

#[async_trait]
/// Key-path document store used by every SwiftDesk component.
///
/// Reads never fail for a missing node: they yield the empty mapping.
/// Transport and IO failures propagate to the caller unchanged; nothing is
/// retried.
pub trait RemoteStore: Send + Sync {
    /// Read the node at `path`.
    async fn fetch_node(&self, path: &StorePath) -> Result<Value, StoreError>;

    /// Replace the node at `path`. Writing `null` deletes it.
    async fn write_node(&self, path: &StorePath, value: Value) -> Result<(), StoreError>;

    /// Add `entry` under a freshly generated child key of `path` and return
    /// the key.
    async fn append_node(&self, path: &StorePath, entry: Value) -> Result<String, StoreError>;

    /// Read the direct child `key` of `path`.
    async fn read_child(&self, path: &StorePath, key: &str) -> Result<Value, StoreError> {
        let child = path.child(key)?;
        self.fetch_node(&child).await
    }
}

/// Volatile store holding the whole tree in memory.
#[derive(Debug)]
pub struct InMemoryStore {
    root: RwLock<Value>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::with_root(empty_node())
    }

    /// Create a store seeded with `root` (used by tests and fixtures).
    pub fn with_root(root: Value) -> Self {
        Self {
            root: RwLock::new(root),
        }
    }

    /// Copy of the entire tree.
    pub fn snapshot(&self) -> Value {
        self.root.read().clone()
    }
}

#[async_trait]
impl RemoteStore for InMemoryStore {
    async fn fetch_node(&self, path: &StorePath) -> Result<Value, StoreError> {
        let root = self.root.read();
        Ok(get_node(&root, path.segments())
            .cloned()
            .unwrap_or_else(empty_node))
    }

    async fn write_node(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        set_node(&mut self.root.write(), path.segments(), value);
        debug!("wrote memory node (path={path})");
        Ok(())
    }

    async fn append_node(&self, path: &StorePath, entry: Value) -> Result<String, StoreError> {
        let key = next_push_id();
        let child = path.child(&key)?;
        set_node(&mut self.root.write(), child.segments(), entry);
        debug!("appended memory node (path={path}, key={key})");
        Ok(key)
    }
}

/// Store persisting the whole tree as one JSON document on disk.
#[derive(Debug)]
pub struct FileStore {
    /// Location of the JSON document.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Create a store backed by `path`, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        info!("initialized file store (path={})", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the temporary file used for atomic rewrites.
    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the tree; a missing or empty file is the empty tree.
    fn load_tree(&self) -> Result<Value, StoreError> {
        if !self.path.exists() {
            return Ok(empty_node());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(empty_node());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    /// Rewrite the tree through a temp file and rename.
    fn write_tree(&self, tree: &Value) -> Result<(), StoreError> {
        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            let body = serde_json::to_string_pretty(tree)?;
            file.write_all(body.as_bytes())?;
            file.sync_all()?;
        }
        std::fs::rename(temp_path, &self.path)?;
        Ok(())
    }

    fn update(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock();
        let mut tree = self.load_tree()?;
        set_node(&mut tree, path.segments(), value);
        self.write_tree(&tree)
    }
}

#[async_trait]
impl RemoteStore for FileStore {
    async fn fetch_node(&self, path: &StorePath) -> Result<Value, StoreError> {
        let tree = {
            let _guard = self.write_lock.lock();
            self.load_tree()?
        };
        Ok(get_node(&tree, path.segments())
            .cloned()
            .unwrap_or_else(empty_node))
    }

    async fn write_node(&self, path: &StorePath, value: Value) -> Result<(), StoreError> {
        self.update(path, value)?;
        debug!("wrote file node (path={path})");
        Ok(())
    }

    async fn append_node(&self, path: &StorePath, entry: Value) -> Result<String, StoreError> {
        let key = next_push_id();
        self.update(&path.child(&key)?, entry)?;
        debug!("appended file node (path={path}, key={key})");
        Ok(key)
    }
}
