//! Validated slash-separated store paths.

use crate::StoreError;
use std::fmt;
use std::str::FromStr;

/// Characters the Realtime Database refuses in keys.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']'];

/// Path to a node in the document store, e.g. `notes/u1/2024-05-01`.
///
/// Leading, trailing and repeated slashes are ignored; the empty path is the
/// root node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// Root of the store.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse and validate a path.
    pub fn parse(raw: &str) -> Result<Self, StoreError> {
        let mut path = Self::root();
        for segment in raw.split('/').filter(|segment| !segment.is_empty()) {
            path.push(segment)?;
        }
        Ok(path)
    }

    /// Path of a direct child.
    pub fn child(&self, key: &str) -> Result<Self, StoreError> {
        let mut path = self.clone();
        path.push(key)?;
        Ok(path)
    }

    /// Path segments from the root.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    fn push(&mut self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.segments.push(key.to_string());
        Ok(())
    }
}

/// Validate a single key (no slashes, no forbidden characters, not blank).
pub fn validate_key(key: &str) -> Result<(), StoreError> {
    if key.trim().is_empty() {
        return Err(StoreError::InvalidPath("empty key".to_string()));
    }
    if key.contains('/') {
        return Err(StoreError::InvalidPath(format!("key contains '/': {key}")));
    }
    if let Some(ch) = key.chars().find(|ch| FORBIDDEN_KEY_CHARS.contains(ch)) {
        return Err(StoreError::InvalidPath(format!(
            "key contains '{ch}': {key}"
        )));
    }
    if key.chars().any(char::is_control) {
        return Err(StoreError::InvalidPath(format!(
            "key contains control characters: {key:?}"
        )));
    }
    Ok(())
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl FromStr for StorePath {
    type Err = StoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::parse(raw)
    }
}
