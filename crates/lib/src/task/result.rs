//! Outcome of one task.

use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::consts::{RC_COMPILE_ERROR, RC_OK};
use crate::error::BuildError;
use crate::resource::Resource;

use super::{Task, TaskId};

/// How a task ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
  Succeeded,
  Failed,
  /// Not executed because a task it depends on failed.
  Skipped,
}

/// Outcome of running (or failing to create) one task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
  /// `None` when the task could not even be created.
  pub task: Option<TaskId>,
  pub builder: String,
  /// Primary input of the task, as displayed.
  pub input: String,
  /// Source file the failure is attributed to.
  pub origin: String,
  pub status: TaskStatus,
  pub return_code: i32,
  pub message: String,
  pub line_number: Option<usize>,
  /// Set only for internal failures; reported compile errors leave it empty.
  #[serde(serialize_with = "serialize_exception")]
  pub exception: Option<Arc<BuildError>>,
}

impl TaskResult {
  pub fn ok(task: &Task, origin: &Resource) -> Self {
    Self {
      task: Some(task.id()),
      builder: task.name().to_string(),
      input: task.primary_input().to_string(),
      origin: origin.to_string(),
      status: TaskStatus::Succeeded,
      return_code: RC_OK,
      message: "OK".to_string(),
      line_number: None,
      exception: None,
    }
  }

  pub fn failed(task: &Task, origin: &Resource, error: BuildError) -> Self {
    let mut result = Self::from_error(task.name(), task.primary_input(), origin, error);
    result.task = Some(task.id());
    result
  }

  pub fn skipped(task: &Task, origin: &Resource, failed_dependency: &Task) -> Self {
    Self {
      task: Some(task.id()),
      builder: task.name().to_string(),
      input: task.primary_input().to_string(),
      origin: origin.to_string(),
      status: TaskStatus::Skipped,
      return_code: RC_COMPILE_ERROR,
      message: format!("skipped: dependency {} failed", failed_dependency.primary_input()),
      line_number: None,
      exception: None,
    }
  }

  /// Result for a resource whose builder failed in `create`.
  pub fn create_failed(builder: &str, input: &Resource, error: BuildError) -> Self {
    Self::from_error(builder, input, input, error)
  }

  fn from_error(builder: &str, input: &Resource, origin: &Resource, error: BuildError) -> Self {
    let message = match &error {
      BuildError::Compile(e) => e.message.clone(),
      other => other.to_string(),
    };
    let return_code = error.return_code();
    let line_number = error.line();
    let exception = (!error.is_compile()).then(|| Arc::new(error));
    Self {
      task: None,
      builder: builder.to_string(),
      input: input.to_string(),
      origin: origin.to_string(),
      status: TaskStatus::Failed,
      return_code,
      message,
      line_number,
      exception,
    }
  }

  pub fn is_ok(&self) -> bool {
    self.return_code == RC_OK
  }
}

fn serialize_exception<S: Serializer>(exception: &Option<Arc<BuildError>>, serializer: S) -> Result<S::Ok, S::Error> {
  match exception {
    Some(e) => serializer.serialize_some(&e.to_string()),
    None => serializer.serialize_none(),
  }
}
