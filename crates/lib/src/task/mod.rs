//! Tasks: one unit of build work.
//!
//! A [`Task`] binds a builder to the resources it reads and the resources it
//! writes. Tasks live in a [`TaskGraph`] arena and refer to each other by
//! [`TaskId`]. A task spawned while another task was being created records its
//! parent through `product_of`, which is how diagnostics for generated
//! resources are traced back to the file a user actually wrote.

mod graph;
mod result;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::builder::Builder;
use crate::resource::Resource;

pub use graph::{OutputConflict, TaskGraph};
pub use result::{TaskResult, TaskStatus};

/// Opaque builder-private payload carried from `create` to `build`.
pub type TaskData = Arc<dyn Any + Send + Sync>;

/// Index of a task in its [`TaskGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub usize);

impl fmt::Display for TaskId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "#{}", self.0)
  }
}

/// What a builder's `create` returns: the shape of the task to insert.
#[derive(Default)]
pub struct TaskSpec {
  pub(crate) inputs: Vec<Resource>,
  pub(crate) outputs: Vec<Resource>,
  pub(crate) data: Option<TaskData>,
  pub(crate) spawned: Vec<TaskId>,
}

impl TaskSpec {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn input(mut self, resource: Resource) -> Self {
    self.inputs.push(resource);
    self
  }

  pub fn output(mut self, resource: Resource) -> Self {
    self.outputs.push(resource);
    self
  }

  /// Attach builder-private data, retrievable with [`Task::data`].
  pub fn data<T: Any + Send + Sync>(mut self, value: T) -> Self {
    self.data = Some(Arc::new(value));
    self
  }

  /// Record a task created while building this spec. The inserted task becomes
  /// its `product_of` parent.
  pub fn spawn(mut self, child: TaskId) -> Self {
    self.spawned.push(child);
    self
  }

  pub fn outputs(&self) -> &[Resource] {
    &self.outputs
  }
}

impl fmt::Debug for TaskSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TaskSpec")
      .field("inputs", &self.inputs)
      .field("outputs", &self.outputs)
      .field("has_data", &self.data.is_some())
      .field("spawned", &self.spawned)
      .finish()
  }
}

/// A unit of build work.
pub struct Task {
  id: TaskId,
  builder: Arc<dyn Builder>,
  inputs: Vec<Resource>,
  outputs: Vec<Resource>,
  data: Option<TaskData>,
  product_of: Option<TaskId>,
  children: Vec<TaskId>,
}

impl Task {
  pub fn id(&self) -> TaskId {
    self.id
  }

  /// Name of the builder that owns this task.
  pub fn name(&self) -> &'static str {
    self.builder.descriptor().name
  }

  pub fn builder(&self) -> &Arc<dyn Builder> {
    &self.builder
  }

  pub fn inputs(&self) -> &[Resource] {
    &self.inputs
  }

  pub fn outputs(&self) -> &[Resource] {
    &self.outputs
  }

  /// The resource the task was created for.
  ///
  /// Every task has one: the graph refuses specs without inputs.
  pub fn primary_input(&self) -> &Resource {
    &self.inputs[0]
  }

  pub fn primary_output(&self) -> Option<&Resource> {
    self.outputs.first()
  }

  /// Builder-private data, if it was attached with the given type.
  pub fn data<T: Any + Send + Sync>(&self) -> Option<&T> {
    self.data.as_ref().and_then(|d| d.downcast_ref::<T>())
  }

  /// The task whose creation spawned this one.
  pub fn product_of(&self) -> Option<TaskId> {
    self.product_of
  }

  pub fn children(&self) -> &[TaskId] {
    &self.children
  }
}

impl fmt::Display for Task {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.name(), self.primary_input())
  }
}

impl fmt::Debug for Task {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Task")
      .field("id", &self.id)
      .field("builder", &self.name())
      .field("inputs", &self.inputs)
      .field("outputs", &self.outputs)
      .field("product_of", &self.product_of)
      .field("children", &self.children)
      .finish()
  }
}
