//! Terminal rendering of forge build reports.
//!
//! A report is one line per task result, marked by its status, followed by a
//! summary block. With `-o json` the whole report is printed as one document.

use std::time::Duration;

use anyhow::Context;
use clap::ValueEnum;
use owo_colors::{OwoColorize, Stream};

use forge_lib::TaskResult;
use forge_lib::report::{Summary, format_result};
use forge_lib::task::TaskStatus;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Text,
  Json,
}

impl OutputFormat {
  pub fn is_json(self) -> bool {
    matches!(self, OutputFormat::Json)
  }
}

/// Status markers for result lines.
pub mod symbols {
  use forge_lib::task::TaskStatus;

  /// Task built.
  pub const SUCCESS: &str = "✓";
  /// Task failed.
  pub const ERROR: &str = "✗";
  /// Task skipped because a dependency failed.
  pub const WARNING: &str = "⚠";
  pub const INFO: &str = "•";

  pub fn for_status(status: TaskStatus) -> &'static str {
    match status {
      TaskStatus::Succeeded => SUCCESS,
      TaskStatus::Failed => ERROR,
      TaskStatus::Skipped => WARNING,
    }
  }
}

pub fn format_duration(duration: Duration) -> String {
  let secs = duration.as_secs();
  let millis = duration.subsec_millis();

  if secs >= 60 {
    format!("{}m {}s", secs / 60, secs % 60)
  } else if secs > 0 {
    format!("{}.{:02}s", secs, millis / 10)
  } else {
    format!("{}ms", millis)
  }
}

/// Print one task result. Successful tasks are only listed when `verbose`.
pub fn print_result(result: &TaskResult, verbose: bool) {
  if result.is_ok() && !verbose {
    return;
  }
  let marker = symbols::for_status(result.status);
  let line = format_result(result);
  match result.status {
    TaskStatus::Succeeded => println!("{} {}", marker.if_supports_color(Stream::Stdout, |s| s.green()), line),
    TaskStatus::Failed => println!(
      "{} {}",
      marker.if_supports_color(Stream::Stdout, |s| s.red()),
      line.if_supports_color(Stream::Stdout, |s| s.red())
    ),
    TaskStatus::Skipped => println!(
      "{} {}",
      marker.if_supports_color(Stream::Stdout, |s| s.yellow()),
      line.if_supports_color(Stream::Stdout, |s| s.yellow())
    ),
  }
}

/// Print the per-status counts and elapsed time of a build.
pub fn print_summary(summary: &Summary, elapsed: Duration) {
  print_stat("Tasks", &summary.total.to_string());
  print_stat("Succeeded", &summary.succeeded.to_string());
  print_stat("Failed", &summary.failed.to_string());
  print_stat("Skipped", &summary.skipped.to_string());
  print_stat("Duration", &format_duration(elapsed));
}

pub fn print_success(message: &str) {
  println!(
    "{} {}",
    symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()),
    message
  );
}

/// Errors go to stdout with the rest of the build report.
pub fn print_error(message: &str) {
  println!(
    "{} {}",
    symbols::ERROR.if_supports_color(Stream::Stdout, |s| s.red()),
    message.if_supports_color(Stream::Stdout, |s| s.red())
  );
}

pub fn print_info(message: &str) {
  println!(
    "{} {}",
    symbols::INFO.if_supports_color(Stream::Stdout, |s| s.blue()),
    message
  );
}

pub fn print_stat(label: &str, value: &str) {
  println!(
    "  {}: {}",
    label.if_supports_color(Stream::Stdout, |s| s.dimmed()),
    value
  );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
  let json = serde_json::to_string_pretty(value).context("Failed to serialize report")?;
  println!("{}", json);
  Ok(())
}
