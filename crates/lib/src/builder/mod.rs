//! Builders and the registry that maps file extensions to them.
//!
//! A builder has two phases. `create` runs single-threaded while the task graph
//! is being assembled: it decides inputs and outputs and may spawn child tasks
//! for resources it generates. `build` runs later, possibly in parallel with
//! other tasks, and turns inputs into outputs.
//!
//! Builders are registered through explicit [`BuilderEntry`] tables. Each
//! builder module exposes a `package()` function returning its entries;
//! [`builtin_registry`] collects them all.

mod context;
pub mod ext;
pub mod gameobject;
mod registry;
pub mod schema;
pub mod schemas;
pub mod texture;

use std::sync::Arc;

use crate::error::BuildError;
use crate::resource::Resource;
use crate::task::{Task, TaskSpec};

pub use context::CreateContext;
pub use registry::{BuilderRegistry, RegistryError};

/// Static description of a builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuilderDescriptor {
  pub name: &'static str,
  /// Input extensions, each including the leading dot.
  pub in_exts: &'static [&'static str],
  /// Output extension, including the leading dot.
  pub out_ext: &'static str,
  /// Lower values are created first.
  pub create_order: i32,
  /// Whether scanned files of this type get a task automatically. Builders
  /// with `auto_create` off only run when another builder spawns them.
  pub auto_create: bool,
}

impl BuilderDescriptor {
  pub const fn new(name: &'static str, in_exts: &'static [&'static str], out_ext: &'static str) -> Self {
    Self {
      name,
      in_exts,
      out_ext,
      create_order: 0,
      auto_create: true,
    }
  }

  pub const fn with_create_order(mut self, create_order: i32) -> Self {
    self.create_order = create_order;
    self
  }

  pub const fn manual(mut self) -> Self {
    self.auto_create = false;
    self
  }
}

/// Creates a builder instance for a registered descriptor.
pub type BuilderFactory = fn(&BuilderDescriptor) -> Arc<dyn Builder>;

/// One row of a builder package.
#[derive(Clone, Copy)]
pub struct BuilderEntry {
  pub descriptor: BuilderDescriptor,
  pub factory: BuilderFactory,
}

impl BuilderEntry {
  pub const fn new(descriptor: BuilderDescriptor, factory: BuilderFactory) -> Self {
    Self { descriptor, factory }
  }
}

impl std::fmt::Debug for BuilderEntry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BuilderEntry").field("descriptor", &self.descriptor).finish()
  }
}

/// A content builder.
pub trait Builder: Send + Sync {
  fn descriptor(&self) -> &BuilderDescriptor;

  /// Describe the task for `input`.
  ///
  /// The default reads `input` and writes one output next to it in the build
  /// tree with the builder's output extension.
  fn create(&self, input: &Resource, _ctx: &mut CreateContext<'_>) -> Result<TaskSpec, BuildError> {
    Ok(
      TaskSpec::new()
        .input(input.clone())
        .output(input.change_ext(self.descriptor().out_ext).output()),
    )
  }

  /// Produce every declared output of `task`.
  fn build(&self, task: &Task) -> Result<(), BuildError>;
}

/// Registry holding every builder that ships with the crate.
pub fn builtin_registry() -> Result<BuilderRegistry, RegistryError> {
  let mut registry = BuilderRegistry::new();
  registry.scan(schemas::package())?;
  registry.scan(gameobject::package())?;
  registry.scan(texture::package())?;
  Ok(registry)
}
