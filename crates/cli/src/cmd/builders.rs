use anyhow::{Context, Result};
use serde::Serialize;

use forge_lib::builtin_registry;

use crate::output::{OutputFormat, print_json, print_stat};

#[derive(Serialize)]
struct BuilderInfo {
  name: &'static str,
  inputs: &'static [&'static str],
  output: &'static str,
  create_order: i32,
  auto_create: bool,
}

pub fn cmd_builders(output: OutputFormat) -> Result<()> {
  let registry = builtin_registry().context("Failed to register builders")?;
  let builders: Vec<BuilderInfo> = registry
    .descriptors()
    .map(|d| BuilderInfo {
      name: d.name,
      inputs: d.in_exts,
      output: d.out_ext,
      create_order: d.create_order,
      auto_create: d.auto_create,
    })
    .collect();

  if output.is_json() {
    print_json(&builders)?;
  } else {
    for builder in &builders {
      print_stat(builder.name, &format!("{} -> {}", builder.inputs.join(" "), builder.output));
    }
  }

  Ok(())
}
