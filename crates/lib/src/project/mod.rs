//! Project orchestration.
//!
//! A [`Project`] ties a content tree to a builder registry. Typical use:
//!
//! ```ignore
//! let mut project = Project::new(ProjectConfig::new("content"), builtin_registry()?)?;
//! project.scan()?;
//! let results = project.build(&[Command::Build]).await?;
//! project.dispose();
//! ```
//!
//! `scan` only lists candidate inputs. Tasks are created by the `build`
//! command, in builder `create_order`, and then executed.

mod config;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::builder::{BuilderRegistry, CreateContext};
use crate::consts::IGNORE_FILE;
use crate::error::BuildError;
use crate::execute::{ExecuteConfig, ExecuteError, execute_tasks};
use crate::resource::{DiskFileSystem, FileSystem, Resource, ResourceError, normalize_path, path_ext};
use crate::state::{BuildState, StateError};
use crate::task::{TaskGraph, TaskId, TaskResult};

pub use config::{ConfigError, ProjectConfig};

#[derive(Debug, Error)]
pub enum ProjectError {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Resource(#[from] ResourceError),

  #[error("output {output} is produced by both {first} and {second}")]
  ConflictingOutput {
    output: String,
    first: String,
    second: String,
  },

  #[error(transparent)]
  Execute(#[from] ExecuteError),

  #[error(transparent)]
  State(#[from] StateError),

  #[error("unknown command '{0}' (expected build, clean or distclean)")]
  UnknownCommand(String),
}

/// A project command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  /// Create and run tasks.
  Build,
  /// Remove every output recorded by previous builds.
  Clean,
  /// Remove the whole build directory.
  Distclean,
}

impl Command {
  pub fn as_str(&self) -> &'static str {
    match self {
      Command::Build => "build",
      Command::Clean => "clean",
      Command::Distclean => "distclean",
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Command {
  type Err = ProjectError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "build" => Ok(Command::Build),
      "clean" => Ok(Command::Clean),
      "distclean" => Ok(Command::Distclean),
      other => Err(ProjectError::UnknownCommand(other.to_string())),
    }
  }
}

/// A content tree and everything needed to build it.
pub struct Project {
  config: ProjectConfig,
  execute: ExecuteConfig,
  fs: Arc<dyn FileSystem>,
  registry: BuilderRegistry,
  inputs: Vec<String>,
  graph: TaskGraph,
  create_failures: Vec<TaskResult>,
}

impl Project {
  /// Project over a directory on disk.
  pub fn new(config: ProjectConfig, registry: BuilderRegistry) -> Result<Self, ProjectError> {
    config.validate()?;
    if !config.root.is_dir() {
      return Err(ConfigError::RootNotFound(config.root.clone()).into());
    }
    let fs = Arc::new(DiskFileSystem::new(&config.root, &config.build_dir_key()));
    Self::with_file_system(config, registry, fs)
  }

  /// Project over any file system. Its build directory must match `config`.
  pub fn with_file_system(
    config: ProjectConfig,
    registry: BuilderRegistry,
    fs: Arc<dyn FileSystem>,
  ) -> Result<Self, ProjectError> {
    config.validate()?;
    let expected = config.build_dir_key();
    if fs.build_dir() != expected {
      return Err(
        ConfigError::BuildDirMismatch {
          expected,
          actual: fs.build_dir().to_string(),
        }
        .into(),
      );
    }

    Ok(Self {
      config,
      execute: ExecuteConfig::default(),
      fs,
      registry,
      inputs: Vec::new(),
      graph: TaskGraph::new(),
      create_failures: Vec::new(),
    })
  }

  pub fn with_execute_config(mut self, execute: ExecuteConfig) -> Self {
    self.execute = execute;
    self
  }

  pub fn config(&self) -> &ProjectConfig {
    &self.config
  }

  pub fn execute_config(&self) -> &ExecuteConfig {
    &self.execute
  }

  pub fn registry(&self) -> &BuilderRegistry {
    &self.registry
  }

  pub fn file_system(&self) -> &Arc<dyn FileSystem> {
    &self.fs
  }

  /// Tasks created so far. Empty again after a build consumed them.
  pub fn tasks(&self) -> &TaskGraph {
    &self.graph
  }

  /// Candidate inputs found by [`scan`](Self::scan), sorted.
  pub fn inputs(&self) -> &[String] {
    &self.inputs
  }

  /// Source resource by logical path.
  pub fn get(&self, path: &str) -> Resource {
    Resource::new(self.fs.clone(), path)
  }

  /// List every source file some builder handles.
  ///
  /// The build directory, hidden entries, configured skip folders and the
  /// folders listed in `.forgeignore` are not scanned.
  pub fn scan(&mut self) -> Result<usize, ProjectError> {
    let mut skip_dirs = self.config.skip_dirs.clone();
    skip_dirs.extend(self.ignored_dirs()?);

    let paths = self.fs.walk(&skip_dirs)?;
    let total = paths.len();
    self.inputs = paths
      .into_iter()
      .filter(|path| {
        path_ext(path).is_some_and(|ext| self.registry.descriptor(ext).is_some())
      })
      .collect();

    info!(
      candidates = self.inputs.len(),
      files = total,
      skipped_dirs = skip_dirs.len(),
      "scanned content root"
    );
    Ok(self.inputs.len())
  }

  /// Replace the candidate inputs.
  pub fn set_inputs(&mut self, paths: impl IntoIterator<Item = impl AsRef<str>>) {
    self.inputs = paths.into_iter().map(|p| normalize_path(p.as_ref())).collect();
    self.inputs.sort();
  }

  fn ignored_dirs(&self) -> Result<Vec<String>, ProjectError> {
    let content = match self.get(IGNORE_FILE).content() {
      Ok(content) => content,
      Err(ResourceError::NotFound(_)) => return Ok(Vec::new()),
      Err(e) => return Err(e.into()),
    };
    Ok(
      String::from_utf8_lossy(&content)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect(),
    )
  }

  /// Create (or find) the task for one resource.
  pub fn create_task(&mut self, resource: &Resource) -> Result<Option<TaskId>, BuildError> {
    let mut ctx = CreateContext::new(&self.registry, &mut self.graph);
    ctx.create_task(resource)
  }

  /// Create tasks for every scanned input.
  ///
  /// Inputs are visited by builder `create_order`, then by path. Inputs whose
  /// builder has `auto_create` off are left for other builders to spawn, and
  /// inputs deleted since the scan are dropped. A failing `create` is recorded
  /// as a failed result and does not stop the others.
  pub fn create_tasks(&mut self) -> Result<(), ProjectError> {
    let mut ordered: Vec<(i32, String)> = self
      .inputs
      .iter()
      .filter_map(|path| {
        if !self.get(path).exists() {
          debug!(path = %path, "input no longer exists");
          return None;
        }
        let descriptor = path_ext(path).and_then(|ext| self.registry.descriptor(ext))?;
        descriptor.auto_create.then(|| (descriptor.create_order, path.clone()))
      })
      .collect();
    ordered.sort();

    self.create_failures.clear();
    for (_, path) in ordered {
      let resource = self.get(&path);
      if let Err(e) = self.create_task(&resource) {
        let builder = resource
          .ext()
          .and_then(|ext| self.registry.descriptor(ext))
          .map_or("unknown", |d| d.name);
        error!(resource = %resource, error = %e, "task creation failed");
        self.create_failures.push(TaskResult::create_failed(builder, &resource, e));
      }
    }

    debug!(tasks = self.graph.len(), failures = self.create_failures.len(), "created tasks");

    if let Some(conflict) = self.graph.find_output_conflict() {
      return Err(ProjectError::ConflictingOutput {
        output: conflict.output,
        first: conflict.first,
        second: conflict.second,
      });
    }
    Ok(())
  }

  /// The source file a task's diagnostics belong to.
  pub fn origin(&self, id: TaskId) -> Option<&Resource> {
    self.graph.try_get(id).map(|_| self.graph.origin(id))
  }

  /// Run commands in order.
  ///
  /// Stops after a build that produced any failed result; the commands after
  /// it are not run. Results of every build run are returned.
  pub async fn build(&mut self, commands: &[Command]) -> Result<Vec<TaskResult>, ProjectError> {
    let mut state = BuildState::load(self.fs.as_ref())?;
    let mut results = Vec::new();

    for &command in commands {
      info!(command = %command, "running command");
      match command {
        Command::Build => {
          // Sources may have changed since the previous build of this project.
          self.fs.clear_cache();
          self.create_tasks()?;
          let graph = Arc::new(std::mem::take(&mut self.graph));
          let mut run = std::mem::take(&mut self.create_failures);
          run.extend(execute_tasks(graph, &mut state, &self.execute).await?);

          let failed = run.iter().filter(|r| !r.is_ok()).count();
          results.extend(run);
          if failed > 0 {
            warn!(failed, "build failed, not running remaining commands");
            break;
          }
        }
        Command::Clean => self.clean(&mut state)?,
        Command::Distclean => {
          self.fs.remove_build_dir()?;
          state.clear();
        }
      }
    }

    state.save(self.fs.as_ref())?;
    Ok(results)
  }

  fn clean(&self, state: &mut BuildState) -> Result<(), ProjectError> {
    let mut removed = 0usize;
    for key in state.outputs() {
      self.fs.remove(key)?;
      removed += 1;
    }
    info!(removed, "removed build outputs");
    state.clear();
    Ok(())
  }

  /// Drop cached content and pending tasks.
  pub fn dispose(mut self) {
    self.graph = TaskGraph::new();
    self.fs.clear_cache();
    debug!("project disposed");
  }
}

impl fmt::Debug for Project {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Project")
      .field("config", &self.config)
      .field("registry", &self.registry)
      .field("inputs", &self.inputs.len())
      .field("tasks", &self.graph.len())
      .finish()
  }
}
