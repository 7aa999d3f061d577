//! Shared test helpers for CLI integration tests.

use std::io::Cursor;
use std::path::PathBuf;

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use image::{DynamicImage, ImageOutputFormat};
use tempfile::TempDir;

pub const CAMERA: &str = r#"{"aspect_ratio": 1.0, "fov": 0.7, "near_z": 0.1, "far_z": 100.0}"#;

/// Isolated content root.
pub struct TestEnv {
  pub temp: TempDir,
}

impl TestEnv {
  pub fn empty() -> Self {
    Self {
      temp: TempDir::new().unwrap(),
    }
  }

  /// Content root, canonicalized the way the CLI does it.
  pub fn root(&self) -> PathBuf {
    let p = self.temp.path().to_path_buf();
    dunce::canonicalize(&p).unwrap_or(p)
  }

  /// Write a file relative to the content root.
  pub fn write_file(&self, relative_path: &str, content: &str) {
    self.write_bytes(relative_path, content.as_bytes());
  }

  pub fn write_bytes(&self, relative_path: &str, content: &[u8]) {
    let path = self.temp.path().join(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
  }

  /// Write `image` as a PNG file.
  pub fn write_png(&self, relative_path: &str, image: DynamicImage) {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
    self.write_bytes(relative_path, &bytes.into_inner());
  }

  pub fn exists(&self, relative_path: &str) -> bool {
    self.temp.path().join(relative_path).exists()
  }

  /// Get a pre-configured Command for the forge binary.
  ///
  /// Clears `FORGE_BUILD_DIR` and `RUST_LOG` so the host environment does not
  /// leak into tests.
  pub fn forge_cmd(&self) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("forge");
    cmd.env_remove("FORGE_BUILD_DIR");
    cmd.env_remove("RUST_LOG");
    cmd
  }

  /// `forge <subcommand> <root> [args...]`.
  pub fn run(&self, subcommand: &str, args: &[&str]) -> Command {
    let mut cmd = self.forge_cmd();
    cmd.arg(subcommand).arg(self.root()).args(args);
    cmd
  }
}

/// Game object document embedding `(id, type, data)` components.
pub fn embedded_game_object(embedded: &[(&str, &str, &str)]) -> String {
  let items: Vec<String> = embedded
    .iter()
    .map(|(id, ty, data)| {
      format!(
        "    {{\"id\": \"{}\", \"type\": \"{}\", \"data\": {}}}",
        id,
        ty,
        serde_json::to_string(data).unwrap()
      )
    })
    .collect();
  format!(
    "{{\n  \"components\": [],\n  \"embedded_components\": [\n{}\n  ]\n}}",
    items.join(",\n")
  )
}
