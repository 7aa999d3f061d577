//! Hashing utilities for incremental builds.
//!
//! - `ContentHash`: a full 64-character SHA-256 digest
//! - `task_signature()`: digest of everything a task's outputs depend on
//! - `hash_bytes()`: arbitrary byte hashing

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::resource::ResourceError;
use crate::task::Task;

/// A full 64-character SHA-256 digest, lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(pub String);

impl std::fmt::Display for ContentHash {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Hash arbitrary bytes.
pub fn hash_bytes(data: &[u8]) -> ContentHash {
  ContentHash(hex::encode(Sha256::digest(data)))
}

/// Signature of a task: builder, crate version, output paths, and every
/// input's path and content.
///
/// A missing input hashes to a marker instead of failing, so the task is simply
/// considered out of date and its builder reports the real problem.
pub fn task_signature(task: &Task) -> ContentHash {
  let mut hasher = Sha256::new();
  hasher.update(task.name().as_bytes());
  hasher.update([0]);
  hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
  hasher.update([0]);

  for input in task.inputs() {
    hasher.update(input.to_string().as_bytes());
    hasher.update([0]);
    match input.content() {
      Ok(content) => {
        hasher.update((content.len() as u64).to_le_bytes());
        hasher.update(&content[..]);
      }
      Err(ResourceError::NotFound(_)) => hasher.update(b"<missing>"),
      Err(_) => hasher.update(b"<unreadable>"),
    }
  }

  for output in task.outputs() {
    hasher.update(output.to_string().as_bytes());
    hasher.update([0]);
  }

  ContentHash(hex::encode(hasher.finalize()))
}
