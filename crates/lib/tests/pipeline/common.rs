use std::fs;
use std::path::Path;

use forge_lib::execute::ExecuteConfig;
use forge_lib::{Command, Project, ProjectConfig, TaskResult, builtin_registry};
use tempfile::TempDir;

/// Content root in a temp directory.
pub struct Content {
  pub dir: TempDir,
}

impl Content {
  pub fn new(files: &[(&str, &str)]) -> Self {
    let content = Self {
      dir: TempDir::new().unwrap(),
    };
    for (path, text) in files {
      content.write(path, text.as_bytes());
    }
    content
  }

  pub fn root(&self) -> &Path {
    self.dir.path()
  }

  /// Write a file by logical path (leading `/` is the content root).
  pub fn write(&self, path: &str, data: &[u8]) {
    let full = self.root().join(path.trim_start_matches('/'));
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(full, data).unwrap();
  }

  pub fn exists(&self, path: &str) -> bool {
    self.root().join(path.trim_start_matches('/')).is_file()
  }

  pub fn read(&self, path: &str) -> Vec<u8> {
    fs::read(self.root().join(path.trim_start_matches('/'))).unwrap()
  }

  pub fn project(&self) -> Project {
    let mut project = Project::new(ProjectConfig::new(self.root()), builtin_registry().unwrap())
      .unwrap()
      .with_execute_config(ExecuteConfig {
        parallelism: 4,
        incremental: true,
      });
    project.scan().unwrap();
    project
  }

  /// Scan and build once.
  pub async fn build(&self) -> Vec<TaskResult> {
    let mut project = self.project();
    let results = project.build(&[Command::Build]).await.unwrap();
    project.dispose();
    results
  }
}

pub fn failures(results: &[TaskResult]) -> Vec<&TaskResult> {
  results.iter().filter(|r| !r.is_ok()).collect()
}
