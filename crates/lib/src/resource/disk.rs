//! File system backed by a real content directory.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::{FileSystem, ResourceError, is_excluded, is_hidden};

/// Content tree on disk with a shared read cache.
///
/// Content is cached on first read and on every write, so builders that read
/// a file written earlier in the same run (generated payloads, for instance)
/// never touch the disk twice.
#[derive(Debug)]
pub struct DiskFileSystem {
  root: PathBuf,
  build_dir: String,
  cache: RwLock<HashMap<String, Arc<[u8]>>>,
}

impl DiskFileSystem {
  pub fn new(root: impl Into<PathBuf>, build_dir: &str) -> Self {
    Self {
      root: root.into(),
      build_dir: build_dir.trim_matches('/').to_string(),
      cache: RwLock::new(HashMap::new()),
    }
  }

  fn io_error(&self, key: &str, source: io::Error) -> ResourceError {
    ResourceError::Io {
      path: self.root.join(key).display().to_string(),
      source,
    }
  }
}

impl FileSystem for DiskFileSystem {
  fn root(&self) -> &Path {
    &self.root
  }

  fn build_dir(&self) -> &str {
    &self.build_dir
  }

  fn exists(&self, key: &str) -> bool {
    self.cache.read().contains_key(key) || self.root.join(key).is_file()
  }

  fn read(&self, key: &str) -> Result<Arc<[u8]>, ResourceError> {
    if let Some(content) = self.cache.read().get(key) {
      return Ok(content.clone());
    }

    let content: Arc<[u8]> = match fs::read(self.root.join(key)) {
      Ok(bytes) => bytes.into(),
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ResourceError::NotFound(key.to_string())),
      Err(e) => return Err(self.io_error(key, e)),
    };

    trace!(key, bytes = content.len(), "cached resource");
    self.cache.write().insert(key.to_string(), content.clone());
    Ok(content)
  }

  fn write(&self, key: &str, data: &[u8]) -> Result<(), ResourceError> {
    let path = self.root.join(key);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| self.io_error(key, e))?;
    }
    fs::write(&path, data).map_err(|e| self.io_error(key, e))?;
    self.cache.write().insert(key.to_string(), data.into());
    Ok(())
  }

  fn replace(&self, key: &str, data: &[u8]) -> Result<(), ResourceError> {
    let path = self.root.join(key);
    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).map_err(|e| self.io_error(key, e))?;
    }
    let mut temp_path = path.clone().into_os_string();
    temp_path.push(".tmp");
    fs::write(&temp_path, data).map_err(|e| self.io_error(key, e))?;
    fs::rename(&temp_path, &path).map_err(|e| self.io_error(key, e))?;
    self.cache.write().insert(key.to_string(), data.into());
    Ok(())
  }

  fn remove(&self, key: &str) -> Result<(), ResourceError> {
    self.cache.write().remove(key);
    match fs::remove_file(self.root.join(key)) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(self.io_error(key, e)),
    }
  }

  fn remove_build_dir(&self) -> Result<(), ResourceError> {
    let prefix = format!("{}/", self.build_dir);
    self.cache.write().retain(|k, _| !k.starts_with(&prefix));

    let dir = self.root.join(&self.build_dir);
    debug!(dir = %dir.display(), "removing build directory");
    match fs::remove_dir_all(&dir) {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(self.io_error(&self.build_dir, e)),
    }
  }

  fn walk(&self, skip_dirs: &[String]) -> Result<Vec<String>, ResourceError> {
    let mut paths = Vec::new();

    let walker = WalkDir::new(&self.root).sort_by_file_name().into_iter().filter_entry(|entry| {
      if entry.depth() == 0 {
        return true;
      }
      match relative_key(&self.root, entry.path()) {
        Some(key) => !is_hidden(&key) && !is_excluded(&key, &self.build_dir, skip_dirs),
        None => false,
      }
    });

    for entry in walker {
      let entry = entry.map_err(|e| ResourceError::Walk(e.to_string()))?;
      if !entry.file_type().is_file() {
        continue;
      }
      if let Some(key) = relative_key(&self.root, entry.path()) {
        paths.push(format!("/{}", key));
      }
    }

    paths.sort();
    Ok(paths)
  }

  fn clear_cache(&self) {
    self.cache.write().clear();
  }
}

/// Root-relative key of a walked path, using forward slashes.
fn relative_key(root: &Path, path: &Path) -> Option<String> {
  let relative = path.strip_prefix(root).ok()?;
  let parts: Vec<String> = relative
    .components()
    .map(|c| c.as_os_str().to_string_lossy().into_owned())
    .collect();
  Some(parts.join("/"))
}
