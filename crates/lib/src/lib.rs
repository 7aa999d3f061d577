//! forge-lib: content build pipeline.
//!
//! This crate turns a tree of authored content files into compiled runtime
//! files:
//! - `Resource`: logical handle to a source or build file
//! - `Builder`: per-type compiler, looked up by extension in a `BuilderRegistry`
//! - `Task`: one unit of build work, possibly spawned by another task
//! - `Project`: scans a content root, creates tasks and executes them in
//!   parallel with failure isolation and incremental skipping

pub mod builder;
pub mod consts;
pub mod error;
pub mod execute;
pub mod project;
pub mod report;
pub mod resource;
pub mod state;
pub mod task;
pub mod util;

pub use builder::{Builder, BuilderDescriptor, BuilderEntry, BuilderRegistry, builtin_registry};
pub use error::{BuildError, CompileError};
pub use project::{Command, Project, ProjectConfig, ProjectError};
pub use resource::Resource;
pub use task::{Task, TaskId, TaskResult};
