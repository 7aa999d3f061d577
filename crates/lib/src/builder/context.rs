//! Task creation context handed to `Builder::create`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::BuildError;
use crate::resource::Resource;
use crate::task::{TaskGraph, TaskId};

use super::{Builder, BuilderRegistry};

/// Access to the registry and task graph while tasks are being created.
///
/// Builders use it to create tasks for resources they generate. The same
/// (resource, builder) pair always maps to one task.
pub struct CreateContext<'a> {
  registry: &'a BuilderRegistry,
  graph: &'a mut TaskGraph,
  in_progress: HashSet<String>,
}

impl<'a> CreateContext<'a> {
  pub fn new(registry: &'a BuilderRegistry, graph: &'a mut TaskGraph) -> Self {
    Self {
      registry,
      graph,
      in_progress: HashSet::new(),
    }
  }

  pub fn registry(&self) -> &BuilderRegistry {
    self.registry
  }

  pub fn graph(&self) -> &TaskGraph {
    self.graph
  }

  /// Create (or find) the task for `resource` using the builder registered for
  /// its extension. Returns `None` when no builder handles the extension.
  pub fn create_task(&mut self, resource: &Resource) -> Result<Option<TaskId>, BuildError> {
    let Some(builder) = resource.ext().and_then(|ext| self.registry.resolve(ext)) else {
      warn!(resource = %resource, "no builder registered for resource");
      return Ok(None);
    };
    self.create_task_with(resource, builder).map(Some)
  }

  /// Create (or find) the task for `resource` using a specific builder.
  pub fn create_task_with(&mut self, resource: &Resource, builder: Arc<dyn Builder>) -> Result<TaskId, BuildError> {
    let key = TaskGraph::key(resource, builder.as_ref());
    if let Some(id) = self.graph.find(&key) {
      return Ok(id);
    }
    if !self.in_progress.insert(key.clone()) {
      return Err(BuildError::Internal(format!("recursive task creation for {}", key)));
    }

    let spec = builder.create(resource, self);
    self.in_progress.remove(&key);
    let spec = spec?;

    let id = self.graph.insert(key, resource, builder, spec);
    debug!(task = %id, resource = %resource, builder = self.graph.get(id).name(), "created task");
    Ok(id)
  }
}
