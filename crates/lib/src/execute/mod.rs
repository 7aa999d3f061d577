//! Task execution.
//!
//! Runs the tasks of a [`TaskGraph`] in dependency order:
//! - DAG-based ordering (parents before generated children, producers before
//!   consumers)
//! - Parallel execution of independent tasks, bounded by a semaphore
//! - Failure isolation: a failed task only skips the tasks that depend on it
//! - Incremental skipping of up-to-date tasks

pub mod dag;
pub mod types;

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::error::{BuildError, CompileError};
use crate::state::BuildState;
use crate::task::{TaskGraph, TaskId, TaskResult};
use crate::util::hash::{ContentHash, task_signature};

pub use dag::ExecutionDag;
pub use types::{ExecuteConfig, ExecuteError};

/// Execute every task in `graph`.
///
/// This is the main entry point for task execution. It:
/// 1. Constructs a DAG from the task graph
/// 2. Computes parallel execution waves
/// 3. Runs tasks wave by wave, with parallelism within each wave
/// 4. Skips tasks whose dependencies failed, and up-to-date tasks when
///    `config.incremental` is set
///
/// Returns one result per task that ran, failed or was skipped because of a
/// failed dependency, in execution order (by wave, then by task id). Up-to-date
/// tasks produce no result.
pub async fn execute_tasks(
  graph: Arc<TaskGraph>,
  state: &mut BuildState,
  config: &ExecuteConfig,
) -> Result<Vec<TaskResult>, ExecuteError> {
  info!(task_count = graph.len(), "starting task execution");

  // Build the execution DAG
  let dag = ExecutionDag::from_tasks(&graph)?;

  // Get execution waves
  let waves = dag.waves()?;

  info!(wave_count = waves.len(), "computed execution waves");

  let mut results = Vec::new();
  let mut failed: HashSet<TaskId> = HashSet::new();
  let mut up_to_date = 0usize;

  // Create semaphore for parallelism control
  let semaphore = Arc::new(Semaphore::new(config.parallelism.max(1)));

  // Execute waves in order
  for (wave_idx, wave) in waves.iter().enumerate() {
    debug!(wave = wave_idx, tasks = wave.len(), "executing wave");

    let mut ready: Vec<(TaskId, ContentHash)> = Vec::new();

    for &id in wave {
      let task = graph.get(id);

      // Check if any dependency failed
      if let Some(dep) = dag.dependencies(id).into_iter().find(|dep| failed.contains(dep)) {
        let dep_task = graph.get(dep);
        warn!(task = %task, failed_dep = %dep_task, "skipping task due to failed dependency");
        failed.insert(id);
        state.invalidate(task);
        results.push(TaskResult::skipped(task, graph.origin(id), dep_task));
        continue;
      }

      let signature = task_signature(task);
      if config.incremental && state.is_up_to_date(task, &signature) {
        debug!(task = %task, "task up to date");
        up_to_date += 1;
        continue;
      }
      ready.push((id, signature));
    }

    if ready.is_empty() {
      continue;
    }

    let ids: Vec<TaskId> = ready.iter().map(|(id, _)| *id).collect();
    let outcomes = execute_wave(&graph, &ids, semaphore.clone()).await;

    // Process results
    for ((id, signature), (outcome_id, outcome)) in ready.into_iter().zip(outcomes) {
      debug_assert_eq!(id, outcome_id);
      let task = graph.get(id);
      match outcome {
        Ok(()) => {
          info!(task = %task, "task succeeded");
          state.record(task, &signature);
          results.push(TaskResult::ok(task, graph.origin(id)));
        }
        Err(e) => {
          error!(task = %task, error = %e, "task failed");
          failed.insert(id);
          state.invalidate(task);
          results.push(TaskResult::failed(task, graph.origin(id), e));
        }
      }
    }
  }

  // Execution order: a parent's failure comes before the skips it caused.
  let rank: HashMap<TaskId, usize> = waves.iter().flatten().enumerate().map(|(i, &id)| (id, i)).collect();
  results.sort_by_key(|r| r.task.and_then(|id| rank.get(&id).copied()));

  info!(
    executed = results.len(),
    failed = failed.len(),
    up_to_date,
    "task execution complete"
  );

  Ok(results)
}

/// Run one wave of tasks in parallel.
///
/// Outcomes are returned in the order of `ids`.
async fn execute_wave(
  graph: &Arc<TaskGraph>,
  ids: &[TaskId],
  semaphore: Arc<Semaphore>,
) -> Vec<(TaskId, Result<(), BuildError>)> {
  let mut join_set = JoinSet::new();

  for (slot, &id) in ids.iter().enumerate() {
    let graph = graph.clone();
    let semaphore = semaphore.clone();

    join_set.spawn(async move {
      let Ok(_permit) = semaphore.acquire_owned().await else {
        return (slot, id, Err(BuildError::Internal("worker pool closed".to_string())));
      };

      // Builders do blocking I/O and CPU work.
      let outcome = match tokio::task::spawn_blocking(move || run_task(&graph, id)).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_panic() => Err(BuildError::Internal(format!(
          "builder panicked: {}",
          panic_message(e.into_panic())
        ))),
        Err(e) => Err(BuildError::Internal(format!("builder was cancelled: {}", e))),
      };
      (slot, id, outcome)
    });
  }

  let mut outcomes: Vec<Option<(TaskId, Result<(), BuildError>)>> = ids.iter().map(|_| None).collect();
  while let Some(joined) = join_set.join_next().await {
    match joined {
      Ok((slot, id, outcome)) => outcomes[slot] = Some((id, outcome)),
      Err(e) => error!(error = %e, "execution task panicked"),
    }
  }

  ids
    .iter()
    .zip(outcomes)
    .map(|(&id, outcome)| outcome.unwrap_or_else(|| (id, Err(BuildError::Internal("task did not report".to_string())))))
    .collect()
}

/// Build one task and verify its outputs.
fn run_task(graph: &TaskGraph, id: TaskId) -> Result<(), BuildError> {
  let task = graph.get(id);
  debug!(task = %task, "building task");
  task.builder().build(task)?;

  for output in task.outputs() {
    if !output.exists() {
      return Err(CompileError::new(task.primary_input(), format!("Output '{}' not found", output)).into());
    }
  }
  Ok(())
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
  if let Some(s) = payload.downcast_ref::<&str>() {
    s.to_string()
  } else if let Some(s) = payload.downcast_ref::<String>() {
    s.clone()
  } else {
    "unknown panic".to_string()
  }
}
