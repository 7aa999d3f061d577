//! Clean and distclean integration tests.

use predicates::prelude::*;

use super::common::{CAMERA, TestEnv};

#[test]
fn clean_removes_outputs() {
  let env = TestEnv::empty();
  env.write_file("main/cam.camera", CAMERA);
  env.run("build", &[]).assert().success();
  assert!(env.exists("build/main/cam.camerac"));

  env
    .run("clean", &[])
    .assert()
    .success()
    .stdout(predicate::str::contains("Clean complete"));

  assert!(!env.exists("build/main/cam.camerac"));
  assert!(env.exists("main/cam.camera"));
}

#[test]
fn distclean_removes_build_dir() {
  let env = TestEnv::empty();
  env.write_file("main/cam.camera", CAMERA);
  env.run("build", &[]).assert().success();
  env.write_file("build/stray.bin", "");

  env.run("distclean", &[]).assert().success();

  assert!(!env.exists("build"));
}

#[test]
fn run_executes_commands_in_order() {
  let env = TestEnv::empty();
  env.write_file("main/cam.camera", CAMERA);
  env.run("build", &[]).assert().success();

  // The first build is up to date; distclean then forces a full rebuild.
  env
    .run("run", &["-c", "build,distclean,build", "-v"])
    .assert()
    .success()
    .stdout(predicate::str::contains("OK /main/cam.camera"));

  assert!(env.exists("build/main/cam.camerac"));
}

#[test]
fn run_stops_after_failed_build() {
  let env = TestEnv::empty();
  env.write_file("main/cam.camera", CAMERA);
  env.write_file("main/bad.camera", "{}");

  env.run("run", &["-c", "build", "-c", "distclean"]).assert().code(1);

  assert!(env.exists("build/main/cam.camerac"));
}
