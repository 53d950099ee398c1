//! Persistent storage collaborator.
//!
//! The core only ever writes one small text record, so the interface is a
//! plain path/content pair. Paths are relative to the backing store.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;

/// Directory under the user's data dir used when nothing is configured.
pub const DEFAULT_DATA_DIR: &str = "lebirun";

/// File-level read/write access used by the economy save/load commands.
pub trait Storage {
    /// Create or replace `path` with `content`.
    fn write_file(&self, path: &str, content: &str) -> Result<()>;
    /// Read `path`, returning `None` when it does not exist.
    fn read_file(&self, path: &str) -> Result<Option<String>>;
}

/// Storage rooted in a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    /// Create a storage rooted at the provided directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Default location under the user's data directory.
    pub fn default_root() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(DEFAULT_DATA_DIR)
    }

    /// Directory every path is resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf> {
        let name = sanitize_component(path);
        if name.is_empty() {
            return Err(anyhow!("invalid storage path '{path}'"));
        }
        Ok(self.root.join(name))
    }
}

impl Storage for FsStorage {
    fn write_file(&self, path: &str, content: &str) -> Result<()> {
        let target = self.resolve(path)?;
        fs::create_dir_all(&self.root)
            .with_context(|| format!("failed to create {}", self.root.display()))?;
        fs::write(&target, content).with_context(|| format!("failed to write {}", target.display()))
    }

    fn read_file(&self, path: &str) -> Result<Option<String>> {
        let target = self.resolve(path)?;
        if !target.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&target)
            .with_context(|| format!("failed to read {}", target.display()))?;
        Ok(Some(content))
    }
}

/// In-memory storage; clones share the same backing map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or overwrite a file directly.
    pub fn insert(&self, path: &str, content: &str) {
        self.files.lock().insert(path.to_string(), content.to_string());
    }

    /// Snapshot of a file's content.
    pub fn get(&self, path: &str) -> Option<String> {
        self.files.lock().get(path).cloned()
    }
}

impl Storage for MemoryStorage {
    fn write_file(&self, path: &str, content: &str) -> Result<()> {
        self.insert(path, content);
        Ok(())
    }

    fn read_file(&self, path: &str) -> Result<Option<String>> {
        Ok(self.get(path))
    }
}

// Flattens to a single file name so a record can never escape the root.
fn sanitize_component(input: &str) -> String {
    let file_name = input
        .rsplit(['/', '\\', ':'])
        .next()
        .unwrap_or_default();
    file_name
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
        .collect::<String>()
        .trim_start_matches('.')
        .to_string()
}
