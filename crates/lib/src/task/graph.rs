//! Arena of tasks keyed by (resource, builder).

use std::collections::HashMap;
use std::sync::Arc;

use crate::builder::Builder;
use crate::consts::GENERATED_INFIX;
use crate::resource::Resource;

use super::{Task, TaskId, TaskSpec};

/// Two tasks declaring the same output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConflict {
  pub output: String,
  pub first: String,
  pub second: String,
}

/// All tasks of a build, in creation order.
#[derive(Default)]
pub struct TaskGraph {
  tasks: Vec<Task>,
  keys: HashMap<String, TaskId>,
}

impl TaskGraph {
  pub fn new() -> Self {
    Self::default()
  }

  /// Deduplication key of a (resource, builder) pair.
  pub fn key(resource: &Resource, builder: &dyn Builder) -> String {
    format!("{} {}", resource, builder.descriptor().name)
  }

  pub fn find(&self, key: &str) -> Option<TaskId> {
    self.keys.get(key).copied()
  }

  /// Insert a task built from `spec` for `resource`.
  ///
  /// Tasks listed in `spec.spawned` get the new task as their `product_of`
  /// parent. A spec without inputs gets `resource` as its only input.
  pub fn insert(&mut self, key: String, resource: &Resource, builder: Arc<dyn Builder>, spec: TaskSpec) -> TaskId {
    let id = TaskId(self.tasks.len());
    let TaskSpec {
      mut inputs,
      outputs,
      data,
      spawned,
    } = spec;
    if inputs.is_empty() {
      inputs.push(resource.clone());
    }

    for &child in &spawned {
      if let Some(task) = self.tasks.get_mut(child.0) {
        task.product_of = Some(id);
      }
    }

    self.tasks.push(Task {
      id,
      builder,
      inputs,
      outputs,
      data,
      product_of: None,
      children: spawned,
    });
    self.keys.insert(key, id);
    id
  }

  /// Task by id. Ids are only ever handed out by this graph.
  pub fn get(&self, id: TaskId) -> &Task {
    &self.tasks[id.0]
  }

  pub fn try_get(&self, id: TaskId) -> Option<&Task> {
    self.tasks.get(id.0)
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Task> {
    self.tasks.iter()
  }

  /// The nearest real source file a task descends from.
  ///
  /// Walks `product_of` links upward until a task whose primary input is an
  /// existing source resource is found. Falls back to the task's own input.
  pub fn origin(&self, id: TaskId) -> &Resource {
    let start = self.get(id);
    let mut current = start;
    // Each step moves to an earlier task, so the walk is bounded.
    for _ in 0..=self.tasks.len() {
      let input = current.primary_input();
      if !input.is_output() && input.exists() {
        return input;
      }
      match current.product_of.and_then(|p| self.try_get(p)) {
        Some(parent) => current = parent,
        None => break,
      }
    }
    start.primary_input()
  }

  /// First pair of tasks that claim the same output, if any.
  ///
  /// Generated intermediates are named after their parent and cannot collide
  /// in a meaningful way, so they are not checked.
  pub fn find_output_conflict(&self) -> Option<OutputConflict> {
    let mut owners: HashMap<&Resource, &Task> = HashMap::new();
    for task in &self.tasks {
      for output in &task.outputs {
        if output.path().contains(GENERATED_INFIX) {
          continue;
        }
        if let Some(previous) = owners.insert(output, task)
          && previous.id != task.id
        {
          return Some(OutputConflict {
            output: output.to_string(),
            first: previous.primary_input().to_string(),
            second: task.primary_input().to_string(),
          });
        }
      }
    }
    None
  }
}

impl std::fmt::Debug for TaskGraph {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_list().entries(self.tasks.iter()).finish()
  }
}
