//! Implementation of `forge build`, `clean`, `distclean` and `run`.
//!
//! Scans the content root, runs the requested project commands and reports
//! every task result. The process exit code is the highest task return code.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use forge_lib::execute::ExecuteConfig;
use forge_lib::report::{Summary, exit_status, summarize};
use forge_lib::{Command, Project, ProjectConfig, TaskResult, builtin_registry};

use crate::output::{OutputFormat, print_error, print_info, print_json, print_result, print_success, print_summary};

/// Options shared by every command that opens a project.
#[derive(Debug, Clone)]
pub struct BuildOptions {
  pub root: PathBuf,
  pub build_dir: Option<PathBuf>,
  pub skip_dirs: Vec<String>,
  pub jobs: Option<usize>,
  pub force: bool,
  pub output: OutputFormat,
  pub verbose: bool,
}

#[derive(Serialize)]
struct BuildReport<'a> {
  commands: Vec<&'static str>,
  results: &'a [TaskResult],
  summary: Summary,
  exit_code: i32,
}

impl BuildOptions {
  fn project_config(&self) -> Result<ProjectConfig> {
    let root = dunce::canonicalize(&self.root)
      .with_context(|| format!("Content root not found: {}", self.root.display()))?;
    let mut config = ProjectConfig::from_env(root).with_skip_dirs(self.skip_dirs.clone());
    if let Some(build_dir) = &self.build_dir {
      config = config.with_build_dir(build_dir.clone());
    }
    Ok(config)
  }

  fn execute_config(&self) -> ExecuteConfig {
    let defaults = ExecuteConfig::default();
    ExecuteConfig {
      parallelism: self.jobs.unwrap_or(defaults.parallelism),
      incremental: !self.force,
    }
  }
}

/// Run `commands` against the project and return the exit code.
pub fn cmd_build(options: &BuildOptions, commands: &[Command]) -> Result<i32> {
  let start = Instant::now();

  let registry = builtin_registry().context("Failed to register builders")?;
  let mut project = Project::new(options.project_config()?, registry)
    .context("Failed to open project")?
    .with_execute_config(options.execute_config());

  let candidates = project.scan().context("Failed to scan content root")?;
  info!(root = %project.config().root.display(), candidates, "scanned");

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let results = rt.block_on(project.build(commands)).context("Build failed")?;
  project.dispose();

  let summary = summarize(&results);
  let code = exit_status(&results);

  if options.output.is_json() {
    print_json(&BuildReport {
      commands: commands.iter().map(Command::as_str).collect(),
      results: &results,
      summary,
      exit_code: code,
    })?;
    return Ok(code);
  }

  for result in &results {
    print_result(result, options.verbose);
  }

  println!();
  if !commands.contains(&Command::Build) {
    print_success(&format!("{} complete", join_commands(commands)));
  } else if summary.total == 0 {
    print_info("Everything is up to date");
  } else if code == 0 {
    print_success("Build complete!");
  } else {
    print_error("Build failed");
  }
  print_summary(&summary, start.elapsed());

  Ok(code)
}

fn join_commands(commands: &[Command]) -> String {
  let names: Vec<&str> = commands.iter().map(Command::as_str).collect();
  let joined = names.join(", ");
  let mut chars = joined.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => joined,
  }
}
