//! In-memory file system.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{FileSystem, ResourceError, is_excluded, is_hidden, normalize_path};

/// Content tree held entirely in memory.
///
/// Used by tests and by embedders that feed sources from somewhere other than
/// a directory (an editor buffer, an archive).
#[derive(Debug)]
pub struct MemoryFileSystem {
  root: PathBuf,
  build_dir: String,
  files: RwLock<BTreeMap<String, Arc<[u8]>>>,
}

impl MemoryFileSystem {
  pub fn new(build_dir: &str) -> Self {
    Self {
      root: PathBuf::from("/"),
      build_dir: build_dir.trim_matches('/').to_string(),
      files: RwLock::new(BTreeMap::new()),
    }
  }

  /// Add a source file by logical path.
  pub fn add_file(&self, path: &str, content: impl AsRef<[u8]>) {
    let key = normalize_path(path).trim_start_matches('/').to_string();
    self.files.write().insert(key, content.as_ref().into());
  }

  /// All stored keys, sorted.
  pub fn keys(&self) -> Vec<String> {
    self.files.read().keys().cloned().collect()
  }
}

impl FileSystem for MemoryFileSystem {
  fn root(&self) -> &Path {
    &self.root
  }

  fn build_dir(&self) -> &str {
    &self.build_dir
  }

  fn exists(&self, key: &str) -> bool {
    self.files.read().contains_key(key)
  }

  fn read(&self, key: &str) -> Result<Arc<[u8]>, ResourceError> {
    self
      .files
      .read()
      .get(key)
      .cloned()
      .ok_or_else(|| ResourceError::NotFound(key.to_string()))
  }

  fn write(&self, key: &str, data: &[u8]) -> Result<(), ResourceError> {
    self.files.write().insert(key.to_string(), data.into());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), ResourceError> {
    self.files.write().remove(key);
    Ok(())
  }

  fn remove_build_dir(&self) -> Result<(), ResourceError> {
    let prefix = format!("{}/", self.build_dir);
    self.files.write().retain(|k, _| !k.starts_with(&prefix));
    Ok(())
  }

  fn walk(&self, skip_dirs: &[String]) -> Result<Vec<String>, ResourceError> {
    Ok(
      self
        .files
        .read()
        .keys()
        .filter(|k| !is_hidden(k) && !is_excluded(k, &self.build_dir, skip_dirs))
        .map(|k| format!("/{}", k))
        .collect(),
    )
  }

  // Nothing to drop: the map is the storage.
  fn clear_cache(&self) {}
}
