//! Schema-driven builders.
//!
//! Most content types are a single structured document: parse it into a typed
//! message, check it, rewrite its resource references to compiled paths and
//! write the binary encoding. [`SchemaBuilder`] does exactly that for any type
//! implementing [`Message`]; per-type behavior lives in the message's
//! `validate` and `transform` hooks.
//!
//! Documents are JSON. Unknown fields are rejected by the message types
//! themselves (`#[serde(deny_unknown_fields)]`), and parse errors are reported
//! with the line they occurred on.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{BuildError, CompileError, read_input};
use crate::resource::Resource;
use crate::task::Task;

use super::{Builder, BuilderDescriptor, BuilderEntry};

/// A typed content document.
pub trait Message: Serialize + DeserializeOwned + Send + Sync + 'static {
  /// Semantic checks that the parser cannot express.
  fn validate(&self, _input: &Resource) -> Result<(), CompileError> {
    Ok(())
  }

  /// Rewrite resource references before encoding.
  fn transform(self, _input: &Resource) -> Result<Self, BuildError> {
    Ok(self)
  }
}

/// Builder for any [`Message`] type.
pub struct SchemaBuilder<M> {
  descriptor: BuilderDescriptor,
  _message: PhantomData<fn() -> M>,
}

impl<M: Message> SchemaBuilder<M> {
  pub fn new(descriptor: BuilderDescriptor) -> Self {
    Self {
      descriptor,
      _message: PhantomData,
    }
  }

  pub fn factory(descriptor: &BuilderDescriptor) -> Arc<dyn Builder> {
    Arc::new(Self::new(*descriptor))
  }
}

impl<M: Message> Builder for SchemaBuilder<M> {
  fn descriptor(&self) -> &BuilderDescriptor {
    &self.descriptor
  }

  fn build(&self, task: &Task) -> Result<(), BuildError> {
    let input = task.primary_input();
    let message: M = parse_document(input)?;
    message.validate(input)?;
    let message = message.transform(input)?;

    let output = task
      .primary_output()
      .ok_or_else(|| BuildError::Internal(format!("{} declares no output", task)))?;
    output.set_content(&encode(&message)?)?;
    Ok(())
  }
}

/// Registry entry for a schema builder.
pub fn schema_entry<M: Message>(descriptor: BuilderDescriptor) -> BuilderEntry {
  BuilderEntry::new(descriptor, SchemaBuilder::<M>::factory)
}

/// Parse a JSON document, reporting syntax and shape errors with their line.
pub fn parse_document<M: DeserializeOwned>(input: &Resource) -> Result<M, BuildError> {
  let content = read_input(input)?;
  serde_json::from_slice(&content).map_err(|e| CompileError::from_json(input, &e).into())
}

/// Binary encoding of a compiled message.
pub fn encode<M: Serialize>(message: &M) -> Result<Vec<u8>, BuildError> {
  Ok(bincode::serialize(message)?)
}

/// Inverse of [`encode`].
pub fn decode<M: DeserializeOwned>(bytes: &[u8]) -> Result<M, bincode::Error> {
  bincode::deserialize(bytes)
}

/// Check that a required reference is set and points at an existing source file.
pub fn check_resource(input: &Resource, field: &str, reference: &str) -> Result<(), CompileError> {
  if reference.is_empty() {
    return Err(with_line_of(CompileError::new(input, format!("missing required field '{}'", field)), input, field));
  }
  check_optional_resource(input, reference)
}

/// Check that a reference, if set, points at an existing source file.
pub fn check_optional_resource(input: &Resource, reference: &str) -> Result<(), CompileError> {
  if reference.is_empty() || input.resolve(reference).exists() {
    return Ok(());
  }
  Err(with_line_of(
    CompileError::new(input, format!("missing dependent resource file '{}'", reference)),
    input,
    reference,
  ))
}

/// Attach the line of the first occurrence of `needle` in the input document.
pub fn with_line_of(error: CompileError, input: &Resource, needle: &str) -> CompileError {
  if needle.is_empty() {
    return error;
  }
  let Ok(content) = input.content() else {
    return error;
  };
  match line_of(&String::from_utf8_lossy(&content), needle) {
    Some(line) => error.with_line(line),
    None => error,
  }
}

/// 1-based line of the first occurrence of `needle` in `text`.
pub fn line_of(text: &str, needle: &str) -> Option<usize> {
  text.find(needle).map(|idx| text[..idx].matches('\n').count() + 1)
}
