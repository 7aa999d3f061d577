//! Project configuration.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

use crate::consts::{BUILD_DIR_ENV, DEFAULT_BUILD_DIR};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("build directory must be relative to the content root: {0}")]
  AbsoluteBuildDir(PathBuf),

  #[error("build directory must stay inside the content root: {0}")]
  EscapingBuildDir(PathBuf),

  #[error("build directory must not be the content root itself")]
  EmptyBuildDir,

  #[error("content root not found: {0}")]
  RootNotFound(PathBuf),

  #[error("file system build directory '{actual}' does not match configured '{expected}'")]
  BuildDirMismatch { expected: String, actual: String },
}

/// Where content lives and where compiled output goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConfig {
  /// Content root.
  pub root: PathBuf,
  /// Build directory, relative to `root`.
  pub build_dir: PathBuf,
  /// Folders, relative to `root`, that are never scanned.
  pub skip_dirs: Vec<String>,
}

impl Default for ProjectConfig {
  fn default() -> Self {
    Self {
      root: PathBuf::from("."),
      build_dir: PathBuf::from(DEFAULT_BUILD_DIR),
      skip_dirs: Vec::new(),
    }
  }
}

impl ProjectConfig {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      ..Self::default()
    }
  }

  /// Config for `root`, taking the build directory from `FORGE_BUILD_DIR` if set.
  pub fn from_env(root: impl Into<PathBuf>) -> Self {
    let config = Self::new(root);
    match std::env::var(BUILD_DIR_ENV) {
      Ok(dir) if !dir.is_empty() => config.with_build_dir(dir),
      _ => config,
    }
  }

  pub fn with_build_dir(mut self, build_dir: impl Into<PathBuf>) -> Self {
    self.build_dir = build_dir.into();
    self
  }

  pub fn with_skip_dirs(mut self, skip_dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
    self.skip_dirs = skip_dirs.into_iter().map(Into::into).collect();
    self
  }

  /// Check that the build directory is a folder strictly inside the root.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let build_dir = self.build_dir.as_path();
    if build_dir.is_absolute() || build_dir.has_root() || build_dir.to_string_lossy().starts_with('/') {
      return Err(ConfigError::AbsoluteBuildDir(self.build_dir.clone()));
    }
    if build_dir.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_))) {
      return Err(ConfigError::EscapingBuildDir(self.build_dir.clone()));
    }
    if self.build_dir_key().is_empty() {
      return Err(ConfigError::EmptyBuildDir);
    }
    Ok(())
  }

  /// Build directory as a root-relative key with forward slashes.
  pub fn build_dir_key(&self) -> String {
    path_key(&self.build_dir)
  }
}

fn path_key(path: &Path) -> String {
  path
    .components()
    .filter_map(|c| match c {
      Component::Normal(s) => Some(s.to_string_lossy().into_owned()),
      _ => None,
    })
    .collect::<Vec<_>>()
    .join("/")
}
