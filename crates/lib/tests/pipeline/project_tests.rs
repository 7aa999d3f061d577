use forge_lib::builder::RegistryError;
use forge_lib::builder::schema::SchemaBuilder;
use forge_lib::builder::schemas::CameraDesc;
use forge_lib::project::ConfigError;
use forge_lib::{BuilderDescriptor, BuilderEntry, BuilderRegistry, Command, Project, ProjectConfig, ProjectError};

use super::common::Content;

const CAMERA: &str = r#"{"aspect_ratio": 1.0, "fov": 0.7, "near_z": 0.1, "far_z": 100.0}"#;

#[tokio::test]
async fn unchanged_content_is_not_rebuilt() {
  let content = Content::new(&[("/main/a.camera", CAMERA), ("/main/b.camera", CAMERA)]);

  assert_eq!(content.build().await.len(), 2);
  assert!(content.build().await.is_empty());

  content.write("/main/b.camera", br#"{"aspect_ratio": 2.0, "fov": 0.7, "near_z": 0.1, "far_z": 100.0}"#);
  let results = content.build().await;
  assert_eq!(results.len(), 1);
  assert_eq!(results[0].input, "/main/b.camera");
}

#[tokio::test]
async fn open_project_sees_edits_between_builds() {
  let content = Content::new(&[("/main/a.camera", CAMERA)]);
  let mut project = content.project();

  let first = project.build(&[Command::Build]).await.unwrap();
  assert_eq!(first.len(), 1);
  assert!(first[0].is_ok());

  content.write("/main/a.camera", br#"{"aspect_ratio": 1.0, "fov": 0.7, "near_z": 10.0, "far_z": 1.0}"#);
  let second = project.build(&[Command::Build]).await.unwrap();

  assert_eq!(second.len(), 1);
  assert_eq!(second[0].message, "far_z must be greater than near_z");
}

#[tokio::test]
async fn open_project_sees_deleted_references() {
  let content = Content::new(&[
    ("/main/e.go", r#"{"components": []}"#),
    ("/main/a.factory", r#"{"prototype": "/main/e.go"}"#),
  ]);
  let mut project = content.project();
  assert_eq!(project.build(&[Command::Build]).await.unwrap().len(), 2);

  std::fs::remove_file(content.root().join("main/e.go")).unwrap();
  content.write("/main/a.factory", br#"{"prototype": "/main/e.go", "load_dynamically": true}"#);
  let second = project.build(&[Command::Build]).await.unwrap();

  assert_eq!(second.len(), 1);
  assert_eq!(second[0].input, "/main/a.factory");
  assert_eq!(second[0].message, "missing dependent resource file '/main/e.go'");
}

#[tokio::test]
async fn clean_and_distclean() {
  let content = Content::new(&[("/main/a.camera", CAMERA)]);
  let mut project = content.project();

  project.build(&[Command::Build, Command::Clean]).await.unwrap();
  assert!(!content.exists("/build/main/a.camerac"));
  assert!(content.exists("/main/a.camera"));

  project.build(&[Command::Build, Command::Distclean]).await.unwrap();
  assert!(!content.root().join("build").exists());
}

#[test]
fn duplicate_extension_is_rejected() {
  let mut registry = forge_lib::builtin_registry().unwrap();
  let before = registry.len();

  let entry = BuilderEntry::new(
    BuilderDescriptor::new("Other", &[".foo", ".camera"], ".otherc"),
    SchemaBuilder::<CameraDesc>::factory,
  );
  let err = registry.register(entry).unwrap_err();

  assert!(matches!(err, RegistryError::DuplicateExtension { ref ext, .. } if ext == ".camera"));
  assert_eq!(registry.len(), before);
  assert!(registry.resolve(".foo").is_none());
}

#[test]
fn absolute_build_dir_is_rejected() {
  let content = Content::new(&[]);
  let config = ProjectConfig::new(content.root()).with_build_dir("/tmp/forge-out");

  let err = Project::new(config, BuilderRegistry::new()).unwrap_err();

  assert!(matches!(err, ProjectError::Config(ConfigError::AbsoluteBuildDir(_))));
}

#[test]
fn missing_root_is_rejected() {
  let content = Content::new(&[]);
  let config = ProjectConfig::new(content.root().join("nope"));

  let err = Project::new(config, BuilderRegistry::new()).unwrap_err();

  assert!(matches!(err, ProjectError::Config(ConfigError::RootNotFound(_))));
}
