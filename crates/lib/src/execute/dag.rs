//! Execution DAG for task dependency management.
//!
//! Edges run from a dependency to its dependent. A task depends on:
//! - the task it is a `product_of` (a parent writes the generated input its
//!   children read), and
//! - any task producing one of its inputs.

use std::collections::{HashMap, HashSet};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::resource::Resource;
use crate::task::{TaskGraph, TaskId};

use super::types::ExecuteError;

/// A DAG over the tasks of a [`TaskGraph`].
///
/// Provides:
/// - Topological ordering of tasks
/// - Parallel execution waves (groups of independent tasks)
/// - Dependency queries
pub struct ExecutionDag {
  /// The underlying graph.
  graph: DiGraph<TaskId, ()>,

  /// Map from task id to node index.
  nodes: HashMap<TaskId, NodeIndex>,
}

impl ExecutionDag {
  /// Build an execution DAG from a task graph.
  pub fn from_tasks(tasks: &TaskGraph) -> Result<Self, ExecuteError> {
    let mut graph = DiGraph::new();
    let mut nodes = HashMap::new();

    // First pass: one node per task, and who produces what
    let mut producers: HashMap<&Resource, TaskId> = HashMap::new();
    for task in tasks.iter() {
      nodes.insert(task.id(), graph.add_node(task.id()));
      for output in task.outputs() {
        producers.entry(output).or_insert(task.id());
      }
    }

    // Second pass: edges from dependency to dependent
    for task in tasks.iter() {
      let dependent_idx = nodes[&task.id()];

      if let Some(parent) = task.product_of()
        && let Some(&parent_idx) = nodes.get(&parent)
      {
        graph.update_edge(parent_idx, dependent_idx, ());
      }

      for input in task.inputs() {
        if let Some(&producer) = producers.get(input)
          && producer != task.id()
        {
          graph.update_edge(nodes[&producer], dependent_idx, ());
        }
      }
    }

    let dag = Self { graph, nodes };

    // Verify no cycles
    dag.verify_acyclic()?;

    Ok(dag)
  }

  /// Verify that the graph is acyclic.
  fn verify_acyclic(&self) -> Result<(), ExecuteError> {
    toposort(&self.graph, None).map_err(|_| ExecuteError::CycleDetected)?;
    Ok(())
  }

  /// Get tasks in topological order.
  ///
  /// Dependencies come before dependents.
  pub fn topological(&self) -> Result<Vec<TaskId>, ExecuteError> {
    let sorted = toposort(&self.graph, None).map_err(|_| ExecuteError::CycleDetected)?;
    Ok(sorted.into_iter().map(|idx| self.graph[idx]).collect())
  }

  /// Get tasks organized into parallel execution waves.
  ///
  /// Each wave contains tasks that can run in parallel because all their
  /// dependencies are in previous waves. Tasks within a wave are sorted by id.
  pub fn waves(&self) -> Result<Vec<Vec<TaskId>>, ExecuteError> {
    // Use Kahn's algorithm variant to compute levels
    let mut in_degree: HashMap<NodeIndex, usize> = HashMap::new();
    for idx in self.graph.node_indices() {
      in_degree.insert(idx, self.graph.neighbors_directed(idx, Direction::Incoming).count());
    }

    let mut waves: Vec<Vec<TaskId>> = Vec::new();
    let mut remaining: HashSet<NodeIndex> = self.graph.node_indices().collect();

    while !remaining.is_empty() {
      // Find nodes with no remaining dependencies
      let ready: Vec<NodeIndex> = remaining.iter().filter(|&&idx| in_degree[&idx] == 0).copied().collect();

      if ready.is_empty() {
        return Err(ExecuteError::CycleDetected);
      }

      for &idx in &ready {
        remaining.remove(&idx);

        // Decrement in-degree of dependents
        for neighbor in self.graph.neighbors_directed(idx, Direction::Outgoing) {
          if let Some(deg) = in_degree.get_mut(&neighbor) {
            *deg = deg.saturating_sub(1);
          }
        }
      }

      let mut wave: Vec<TaskId> = ready.into_iter().map(|idx| self.graph[idx]).collect();
      wave.sort();
      waves.push(wave);
    }

    Ok(waves)
  }

  /// Get the direct dependencies of a task.
  pub fn dependencies(&self, id: TaskId) -> Vec<TaskId> {
    let Some(&idx) = self.nodes.get(&id) else {
      return Vec::new();
    };

    let mut deps: Vec<TaskId> = self
      .graph
      .neighbors_directed(idx, Direction::Incoming)
      .map(|dep_idx| self.graph[dep_idx])
      .collect();
    deps.sort();
    deps
  }

  /// Check if a task has any dependencies.
  pub fn has_dependencies(&self, id: TaskId) -> bool {
    let Some(&idx) = self.nodes.get(&id) else {
      return false;
    };

    self.graph.neighbors_directed(idx, Direction::Incoming).next().is_some()
  }

  /// Get the number of tasks in the DAG.
  pub fn len(&self) -> usize {
    self.nodes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.nodes.is_empty()
  }
}
