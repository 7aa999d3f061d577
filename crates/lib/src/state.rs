//! Incremental build state.
//!
//! After every successful task the signature of the task (see
//! [`task_signature`](crate::util::hash::task_signature)) is recorded against
//! each of its outputs. On the next run a task whose outputs all exist and
//! carry the current signature is skipped.
//!
//! # Storage Layout
//!
//! ```text
//! {root}/{build_dir}/.forge-state.json
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::consts::STATE_FILE;
use crate::resource::{FileSystem, ResourceError};
use crate::task::Task;
use crate::util::hash::ContentHash;

/// Current state file format version.
pub const STATE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StateError {
  #[error("failed to access build state: {0}")]
  Resource(#[from] ResourceError),

  #[error("failed to serialize build state: {0}")]
  Serialize(#[source] serde_json::Error),
}

/// Output signatures from previous runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildState {
  pub version: u32,
  /// Output key -> signature of the task that produced it.
  signatures: BTreeMap<String, ContentHash>,
}

impl Default for BuildState {
  fn default() -> Self {
    Self {
      version: STATE_VERSION,
      signatures: BTreeMap::new(),
    }
  }
}

/// Key of the state file for a file system.
pub fn state_key(fs: &dyn FileSystem) -> String {
  format!("{}/{}", fs.build_dir(), STATE_FILE)
}

impl BuildState {
  /// Load the state file.
  ///
  /// A missing, unreadable or outdated file yields an empty state: the worst
  /// case is a full rebuild.
  pub fn load(fs: &dyn FileSystem) -> Result<Self, StateError> {
    let key = state_key(fs);
    let content = match fs.read(&key) {
      Ok(content) => content,
      Err(ResourceError::NotFound(_)) => return Ok(Self::default()),
      Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice::<BuildState>(&content) {
      Ok(state) if state.version == STATE_VERSION => {
        debug!(entries = state.signatures.len(), "loaded build state");
        Ok(state)
      }
      Ok(state) => {
        warn!(version = state.version, "unsupported build state version, starting fresh");
        Ok(Self::default())
      }
      Err(e) => {
        warn!(error = %e, "corrupt build state, starting fresh");
        Ok(Self::default())
      }
    }
  }

  /// Write the state file, or remove it when there is nothing to remember.
  pub fn save(&self, fs: &dyn FileSystem) -> Result<(), StateError> {
    let key = state_key(fs);
    if self.is_empty() {
      fs.remove(&key)?;
      return Ok(());
    }
    let content = serde_json::to_vec_pretty(self).map_err(StateError::Serialize)?;
    fs.replace(&key, &content)?;
    Ok(())
  }

  pub fn get(&self, key: &str) -> Option<&ContentHash> {
    self.signatures.get(key)
  }

  /// Record a successful task.
  pub fn record(&mut self, task: &Task, signature: &ContentHash) {
    for output in task.outputs() {
      self.signatures.insert(output.key(), signature.clone());
    }
  }

  /// Forget a failed or skipped task so it is rebuilt next time.
  pub fn invalidate(&mut self, task: &Task) {
    for output in task.outputs() {
      self.signatures.remove(&output.key());
    }
  }

  /// True when every output of `task` exists and carries `signature`.
  pub fn is_up_to_date(&self, task: &Task, signature: &ContentHash) -> bool {
    !task.outputs().is_empty()
      && task
        .outputs()
        .iter()
        .all(|output| output.exists() && self.signatures.get(&output.key()) == Some(signature))
  }

  /// Keys of every recorded output.
  pub fn outputs(&self) -> impl Iterator<Item = &str> {
    self.signatures.keys().map(String::as_str)
  }

  pub fn clear(&mut self) {
    self.signatures.clear();
  }

  pub fn len(&self) -> usize {
    self.signatures.len()
  }

  pub fn is_empty(&self) -> bool {
    self.signatures.is_empty()
  }
}
