//! Build command integration tests.

use image::{DynamicImage, GrayAlphaImage, RgbImage};
use predicates::prelude::*;

use super::common::{CAMERA, TestEnv, embedded_game_object};

#[test]
fn build_compiles_content() {
  let env = TestEnv::empty();
  env.write_file("main/cam.camera", CAMERA);
  env.write_png("img/hero.png", DynamicImage::ImageRgb8(RgbImage::new(2, 2)));
  env.write_file("main/hero.sprite", r#"{"image": "/img/hero.png"}"#);

  env
    .run("build", &[])
    .assert()
    .success()
    .stdout(predicate::str::contains("Build complete!"));

  assert!(env.exists("build/main/cam.camerac"));
  assert!(env.exists("build/main/hero.spritec"));
  assert!(env.exists("build/img/hero.texturec"));
}

#[test]
fn second_build_is_up_to_date() {
  let env = TestEnv::empty();
  env.write_file("main/cam.camera", CAMERA);

  env.run("build", &[]).assert().success();
  env
    .run("build", &[])
    .assert()
    .success()
    .stdout(predicate::str::contains("Everything is up to date"));

  env
    .run("build", &["--force", "-v"])
    .assert()
    .success()
    .stdout(predicate::str::contains("OK /main/cam.camera"));
}

#[test]
fn compile_error_sets_exit_code() {
  let env = TestEnv::empty();
  let doc = "{\n  \"components\": [\n    {\"id\": \"s\", \"component\": \"/main/gone.camera\"}\n  ]\n}";
  env.write_file("main/hero.go", doc);

  env
    .run("build", &[])
    .assert()
    .code(1)
    .stdout(predicate::str::contains(
      "ERROR /main/hero.go:3: missing dependent resource file '/main/gone.camera'",
    ))
    .stdout(predicate::str::contains("Build failed"));
}

#[test]
fn embedded_failure_names_the_game_object() {
  let env = TestEnv::empty();
  let broken = r#"{"aspect_ratio": 1.0, "fov": 0.7, "near_z": 10.0, "far_z": 1.0}"#;
  env.write_file(
    "main/hero.go",
    &embedded_game_object(&[("ok", "camera", CAMERA), ("bad", "camera", broken)]),
  );

  env
    .run("build", &[])
    .assert()
    .code(1)
    .stdout(predicate::str::contains(
      "ERROR /main/hero.go: far_z must be greater than near_z (while building /build/main/hero_generated_1.camera)",
    ));

  assert!(env.exists("build/main/hero.goc"));
  assert!(env.exists("build/main/hero_generated_0.camerac"));
}

#[test]
fn unsupported_texture_is_reported() {
  let env = TestEnv::empty();
  env.write_png("img/ga.png", DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2)));

  env
    .run("build", &[])
    .assert()
    .code(1)
    .stdout(predicate::str::contains("ERROR /img/ga.png: unsupported color model"));
}

#[test]
fn json_report_lists_results() {
  let env = TestEnv::empty();
  env.write_file("main/a.camera", CAMERA);
  env.write_file("main/b.camera", CAMERA);

  let output = env.run("build", &["-o", "json", "-j", "1"]).output().unwrap();
  assert!(output.status.success());

  let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
  assert_eq!(report["exit_code"], 0);
  assert_eq!(report["summary"]["succeeded"], 2);
  let results = report["results"].as_array().unwrap();
  assert_eq!(results.len(), 2);
  assert_eq!(results[0]["builder"], "Camera");
  assert_eq!(results[0]["status"], "succeeded");
}

#[test]
fn skip_dir_is_not_scanned() {
  let env = TestEnv::empty();
  env.write_file("main/cam.camera", CAMERA);
  env.write_file("raw/broken.camera", "not json");

  env.run("build", &["--skip-dir", "raw"]).assert().success();

  assert!(env.exists("build/main/cam.camerac"));
  assert!(!env.exists("build/raw/broken.camerac"));
}

#[test]
fn ignore_file_is_honored() {
  let env = TestEnv::empty();
  env.write_file(".forgeignore", "raw\n");
  env.write_file("raw/broken.camera", "not json");

  env.run("build", &[]).assert().success();
}
