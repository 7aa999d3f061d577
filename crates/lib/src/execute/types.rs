//! Types for task execution.
//!
//! This module defines the error type and configuration for executing a task
//! graph.

use thiserror::Error;

use crate::state::StateError;

/// Errors that stop execution as a whole.
///
/// Individual task failures are not errors at this level: they are reported
/// as failed [`TaskResult`](crate::task::TaskResult)s.
#[derive(Debug, Error)]
pub enum ExecuteError {
  /// Cycle detected in the dependency graph.
  #[error("dependency cycle detected")]
  CycleDetected,

  #[error(transparent)]
  State(#[from] StateError),
}

/// Configuration for task execution.
#[derive(Debug, Clone)]
pub struct ExecuteConfig {
  /// Maximum number of tasks to build in parallel.
  pub parallelism: usize,

  /// Skip tasks whose outputs are up to date.
  pub incremental: bool,
}

impl Default for ExecuteConfig {
  fn default() -> Self {
    Self {
      parallelism: num_cpus(),
      incremental: true,
    }
  }
}

/// Get the number of CPUs for default parallelism.
fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}
