//! Errors raised while creating and building tasks.
//!
//! Two classes of failure exist. A [`CompileError`] is expected and
//! user-actionable: a missing dependency, a missing required field, an
//! unsupported input format. Everything else is an internal failure of the
//! pipeline and is kept verbatim in the task result so operators can tell the
//! two apart.

use thiserror::Error;

use crate::consts::{RC_COMPILE_ERROR, RC_INTERNAL_ERROR};
use crate::resource::{Resource, ResourceError};

/// A reported compile error, pointing at a resource and optionally a line.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct CompileError {
  /// Display path of the offending resource.
  pub resource: String,
  /// 1-based line number, if known.
  pub line: Option<usize>,
  pub message: String,
  /// Return code reported for the task.
  pub code: i32,
}

impl CompileError {
  pub fn new(resource: &Resource, message: impl Into<String>) -> Self {
    Self {
      resource: resource.to_string(),
      line: None,
      message: message.into(),
      code: RC_COMPILE_ERROR,
    }
  }

  pub fn with_line(mut self, line: usize) -> Self {
    self.line = Some(line);
    self
  }

  pub fn with_code(mut self, code: i32) -> Self {
    self.code = code;
    self
  }

  /// Compile error for a document that failed to parse or validate.
  pub fn from_json(resource: &Resource, err: &serde_json::Error) -> Self {
    let mut message = err.to_string();
    // serde_json appends " at line N column M"; the line is reported separately.
    if let Some(idx) = message.find(" at line ") {
      message.truncate(idx);
    }
    let error = Self::new(resource, message);
    if err.line() > 0 { error.with_line(err.line()) } else { error }
  }
}

/// Any failure of a builder's `create` or `build`.
#[derive(Debug, Error)]
pub enum BuildError {
  #[error(transparent)]
  Compile(#[from] CompileError),

  #[error("resource error: {0}")]
  Resource(#[from] ResourceError),

  #[error("encode error: {0}")]
  Encode(#[from] bincode::Error),

  #[error("image error: {0}")]
  Image(#[from] image::ImageError),

  #[error("internal error: {0}")]
  Internal(String),
}

impl BuildError {
  /// Returns true for reported, user-actionable failures.
  pub fn is_compile(&self) -> bool {
    matches!(self, BuildError::Compile(_))
  }

  pub fn return_code(&self) -> i32 {
    match self {
      BuildError::Compile(e) => e.code,
      _ => RC_INTERNAL_ERROR,
    }
  }

  pub fn line(&self) -> Option<usize> {
    match self {
      BuildError::Compile(e) => e.line,
      _ => None,
    }
  }
}

/// Read a resource, reporting a missing file as a compile error.
pub fn read_input(resource: &Resource) -> Result<std::sync::Arc<[u8]>, BuildError> {
  match resource.content() {
    Ok(content) => Ok(content),
    Err(ResourceError::NotFound(_)) => Err(CompileError::new(resource, "resource not found").into()),
    Err(e) => Err(e.into()),
  }
}
