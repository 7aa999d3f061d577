//! Resource abstraction.
//!
//! A [`Resource`] is a logical, root-relative handle to a file either in the
//! content tree or in its build-output mirror. Builders never see physical
//! paths: they ask for resources by logical path (`/main/player.go`) and the
//! [`FileSystem`] behind the handle decides where the bytes live.
//!
//! # Keys
//!
//! Every resource maps to a *key*: its physical path relative to the root,
//! without a leading slash. Source resources use their logical path, build
//! resources are prefixed by the build directory:
//!
//! ```text
//! /main/player.go   (source) -> main/player.go
//! /main/player.goc  (build)  -> build/main/player.goc
//! ```

mod disk;
mod memory;

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

pub use disk::DiskFileSystem;
pub use memory::MemoryFileSystem;

/// Errors raised by a [`FileSystem`].
#[derive(Debug, Error)]
pub enum ResourceError {
  #[error("resource not found: {0}")]
  NotFound(String),

  #[error("io error on {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to walk content root: {0}")]
  Walk(String),
}

/// Storage backend for resources.
///
/// Implementations must be safe for concurrent reads. Writes only ever target
/// the declared outputs of the task being built, so there is no cross-task
/// write contention.
pub trait FileSystem: Send + Sync + fmt::Debug {
  /// Content root directory.
  fn root(&self) -> &Path;

  /// Build directory, relative to the root, without leading or trailing slash.
  fn build_dir(&self) -> &str;

  fn exists(&self, key: &str) -> bool;

  fn read(&self, key: &str) -> Result<Arc<[u8]>, ResourceError>;

  fn write(&self, key: &str, data: &[u8]) -> Result<(), ResourceError>;

  /// Write a file so readers never observe partial content.
  fn replace(&self, key: &str, data: &[u8]) -> Result<(), ResourceError> {
    self.write(key, data)
  }

  /// Remove a single file. Removing a missing file is not an error.
  fn remove(&self, key: &str) -> Result<(), ResourceError>;

  /// Remove the whole build directory.
  fn remove_build_dir(&self) -> Result<(), ResourceError>;

  /// List the logical paths of all source files, sorted.
  ///
  /// The build directory, hidden entries and `skip_dirs` (root-relative
  /// folders) are never listed.
  fn walk(&self, skip_dirs: &[String]) -> Result<Vec<String>, ResourceError>;

  /// Drop all cached content.
  fn clear_cache(&self);

  fn abs_path(&self, key: &str) -> PathBuf {
    self.root().join(key)
  }
}

/// Which tree a resource belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
  Source,
  Build,
}

/// Normalize a logical path.
///
/// Backslashes become slashes, empty and `.` segments are dropped and `..`
/// pops a segment without ever leaving the root. The result always starts with
/// `/`.
pub fn normalize_path(path: &str) -> String {
  let mut segments: Vec<&str> = Vec::new();
  let unified = path.replace('\\', "/");
  for segment in unified.split('/') {
    match segment {
      "" | "." => {}
      ".." => {
        segments.pop();
      }
      s => segments.push(s),
    }
  }
  format!("/{}", segments.join("/"))
}

/// Returns true if `key` lies inside the build directory or any of `skip_dirs`.
pub(crate) fn is_excluded(key: &str, build_dir: &str, skip_dirs: &[String]) -> bool {
  let inside = |dir: &str| {
    let dir = dir.trim_matches('/');
    !dir.is_empty() && (key == dir || key.starts_with(&format!("{}/", dir)))
  };
  inside(build_dir) || skip_dirs.iter().any(|d| inside(d.as_str()))
}

/// Returns true if any segment of `key` is hidden (starts with a dot).
pub(crate) fn is_hidden(key: &str) -> bool {
  key.split('/').any(|s| s.starts_with('.') && s != "." && s != "..")
}

/// Handle to a logical resource.
#[derive(Clone)]
pub struct Resource {
  path: String,
  namespace: Namespace,
  fs: Arc<dyn FileSystem>,
}

impl Resource {
  /// Look up a source resource by logical path.
  pub fn new(fs: Arc<dyn FileSystem>, path: &str) -> Self {
    Self {
      path: normalize_path(path),
      namespace: Namespace::Source,
      fs,
    }
  }

  /// Logical path, always starting with `/`.
  pub fn path(&self) -> &str {
    &self.path
  }

  pub fn namespace(&self) -> Namespace {
    self.namespace
  }

  pub fn is_output(&self) -> bool {
    self.namespace == Namespace::Build
  }

  pub fn file_system(&self) -> &Arc<dyn FileSystem> {
    &self.fs
  }

  /// Physical path relative to the root.
  pub fn key(&self) -> String {
    let relative = self.path.trim_start_matches('/');
    match self.namespace {
      Namespace::Source => relative.to_string(),
      Namespace::Build => format!("{}/{}", self.fs.build_dir(), relative),
    }
  }

  pub fn abs_path(&self) -> PathBuf {
    self.fs.abs_path(&self.key())
  }

  pub fn exists(&self) -> bool {
    self.fs.exists(&self.key())
  }

  pub fn content(&self) -> Result<Arc<[u8]>, ResourceError> {
    self.fs.read(&self.key())
  }

  pub fn set_content(&self, data: &[u8]) -> Result<(), ResourceError> {
    self.fs.write(&self.key(), data)
  }

  pub fn remove(&self) -> Result<(), ResourceError> {
    self.fs.remove(&self.key())
  }

  /// Extension of the file name including the dot, e.g. `.go`.
  pub fn ext(&self) -> Option<&str> {
    path_ext(&self.path)
  }

  /// Logical path without the extension.
  pub fn stem(&self) -> &str {
    match self.ext() {
      Some(ext) => &self.path[..self.path.len() - ext.len()],
      None => &self.path,
    }
  }

  /// Same resource with a different extension, in the same namespace.
  pub fn change_ext(&self, ext: &str) -> Resource {
    let ext = ext.trim_start_matches('.');
    Resource {
      path: format!("{}.{}", self.stem(), ext),
      namespace: self.namespace,
      fs: self.fs.clone(),
    }
  }

  /// Counterpart of this resource in the build tree.
  pub fn output(&self) -> Resource {
    Resource {
      path: self.path.clone(),
      namespace: Namespace::Build,
      fs: self.fs.clone(),
    }
  }

  /// A source resource referenced from this one by root-relative path.
  pub fn resolve(&self, reference: &str) -> Resource {
    Resource::new(self.fs.clone(), reference)
  }

  /// A resource in the same folder and namespace.
  pub fn sibling(&self, name: &str) -> Resource {
    let parent = match self.path.rfind('/') {
      Some(idx) => &self.path[..idx],
      None => "",
    };
    Resource {
      path: normalize_path(&format!("{}/{}", parent, name)),
      namespace: self.namespace,
      fs: self.fs.clone(),
    }
  }
}

/// Extension of the last path segment, including the dot.
pub fn path_ext(path: &str) -> Option<&str> {
  let name_start = path.rfind('/').map(|i| i + 1).unwrap_or(0);
  let name = &path[name_start..];
  match name.rfind('.') {
    Some(0) | None => None,
    Some(idx) => Some(&path[name_start + idx..]),
  }
}

impl PartialEq for Resource {
  fn eq(&self, other: &Self) -> bool {
    self.namespace == other.namespace && self.path == other.path
  }
}

impl Eq for Resource {}

impl std::hash::Hash for Resource {
  fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
    self.namespace.hash(state);
    self.path.hash(state);
  }
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.namespace {
      Namespace::Source => write!(f, "{}", self.path),
      Namespace::Build => write!(f, "/{}{}", self.fs.build_dir(), self.path),
    }
  }
}

impl fmt::Debug for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Resource")
      .field("path", &self.path)
      .field("namespace", &self.namespace)
      .finish()
  }
}
