//! Aggregation and formatting of task results.

use serde::Serialize;

use crate::consts::RC_OK;
use crate::task::{TaskResult, TaskStatus};

/// Overall exit status: the highest return code of any result, or 0.
pub fn exit_status(results: &[TaskResult]) -> i32 {
  results.iter().map(|r| r.return_code).fold(RC_OK, i32::max)
}

/// One-line description of a result.
///
/// Failures read `ERROR <origin>:<line>: <message>`; the line is omitted when
/// unknown. When the failing task belongs to a generated resource its own
/// input is appended.
pub fn format_result(result: &TaskResult) -> String {
  if result.is_ok() {
    return format!("OK {}", result.input);
  }

  let mut line = match result.line_number {
    Some(n) => format!("ERROR {}:{}: {}", result.origin, n, result.message),
    None => format!("ERROR {}: {}", result.origin, result.message),
  };
  if result.origin != result.input {
    line.push_str(&format!(" (while building {})", result.input));
  }
  line
}

/// Counts by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub total: usize,
  pub succeeded: usize,
  pub failed: usize,
  pub skipped: usize,
}

pub fn summarize(results: &[TaskResult]) -> Summary {
  let mut summary = Summary {
    total: results.len(),
    ..Summary::default()
  };
  for result in results {
    match result.status {
      TaskStatus::Succeeded => summary.succeeded += 1,
      TaskStatus::Failed => summary.failed += 1,
      TaskStatus::Skipped => summary.skipped += 1,
    }
  }
  summary
}
