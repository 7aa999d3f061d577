//! Extension to builder lookup.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::{Builder, BuilderDescriptor, BuilderEntry};

/// Errors raised while registering builders.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
  #[error("extension '{ext}' is claimed by both {existing} and {new}")]
  DuplicateExtension {
    ext: String,
    existing: String,
    new: String,
  },

  #[error("builder {builder} declares invalid extension '{ext}' (extensions start with '.')")]
  InvalidExtension { builder: String, ext: String },

  #[error("builder {0} declares no input extensions")]
  NoInputExtensions(String),
}

/// Maps input extensions to builders.
///
/// Builder instances are created once at registration and shared by every task
/// they own, so builders must not keep per-task state.
#[derive(Default, Clone)]
pub struct BuilderRegistry {
  builders: Vec<(BuilderDescriptor, Arc<dyn Builder>)>,
  by_ext: HashMap<&'static str, usize>,
}

impl BuilderRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register one builder. Nothing is registered if any of its extensions is
  /// invalid or already taken.
  pub fn register(&mut self, entry: BuilderEntry) -> Result<(), RegistryError> {
    let descriptor = entry.descriptor;
    if descriptor.in_exts.is_empty() {
      return Err(RegistryError::NoInputExtensions(descriptor.name.to_string()));
    }

    for ext in descriptor.in_exts.iter().chain(std::iter::once(&descriptor.out_ext)) {
      if !is_valid_ext(ext) {
        return Err(RegistryError::InvalidExtension {
          builder: descriptor.name.to_string(),
          ext: ext.to_string(),
        });
      }
    }

    for ext in descriptor.in_exts {
      if let Some(&idx) = self.by_ext.get(ext) {
        return Err(RegistryError::DuplicateExtension {
          ext: ext.to_string(),
          existing: self.builders[idx].0.name.to_string(),
          new: descriptor.name.to_string(),
        });
      }
    }

    let idx = self.builders.len();
    self.builders.push((descriptor, (entry.factory)(&descriptor)));
    for ext in descriptor.in_exts {
      self.by_ext.insert(*ext, idx);
    }
    debug!(builder = descriptor.name, exts = ?descriptor.in_exts, "registered builder");
    Ok(())
  }

  /// Register every entry of a package.
  pub fn scan(&mut self, entries: impl IntoIterator<Item = BuilderEntry>) -> Result<(), RegistryError> {
    entries.into_iter().try_for_each(|entry| self.register(entry))
  }

  /// Builder for an input extension (including the dot).
  pub fn resolve(&self, ext: &str) -> Option<Arc<dyn Builder>> {
    self.by_ext.get(ext).map(|&idx| self.builders[idx].1.clone())
  }

  pub fn descriptor(&self, ext: &str) -> Option<&BuilderDescriptor> {
    self.by_ext.get(ext).map(|&idx| &self.builders[idx].0)
  }

  /// Output extension of the builder handling `in_ext`.
  pub fn out_ext(&self, in_ext: &str) -> Option<&'static str> {
    self.descriptor(in_ext).map(|d| d.out_ext)
  }

  /// All registered descriptors in registration order.
  pub fn descriptors(&self) -> impl Iterator<Item = &BuilderDescriptor> {
    self.builders.iter().map(|(d, _)| d)
  }

  pub fn len(&self) -> usize {
    self.builders.len()
  }

  pub fn is_empty(&self) -> bool {
    self.builders.is_empty()
  }
}

impl std::fmt::Debug for BuilderRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list().entries(self.descriptors().map(|d| d.name)).finish()
  }
}

fn is_valid_ext(ext: &str) -> bool {
  ext.len() > 1 && ext.starts_with('.') && !ext[1..].contains(['.', '/', '\\'])
}
