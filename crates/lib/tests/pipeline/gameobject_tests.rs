use forge_lib::builder::gameobject::PrototypeDesc;
use forge_lib::builder::schema::decode;
use forge_lib::report::{exit_status, format_result};

use super::common::{Content, failures};

const CAMERA_DOC: &str = r#"{"aspect_ratio": 1.0, "fov": 0.7, "near_z": 0.1, "far_z": 100.0}"#;

/// Camera documents escaped for embedding in a JSON string.
const CAMERA_PAYLOAD: &str = r#"{\"aspect_ratio\": 1.0, \"fov\": 0.7, \"near_z\": 0.1, \"far_z\": 100.0}"#;
const BROKEN_PAYLOAD: &str = r#"{\"aspect_ratio\": 1.0, \"fov\": 0.7, \"near_z\": 10.0, \"far_z\": 1.0}"#;

fn hero(embedded: &[(&str, &str, &str)]) -> String {
  let items: Vec<String> = embedded
    .iter()
    .map(|(id, ty, data)| format!("    {{\"id\": \"{}\", \"type\": \"{}\", \"data\": \"{}\"}}", id, ty, data))
    .collect();
  format!(
    "{{\n  \"components\": [],\n  \"embedded_components\": [\n{}\n  ]\n}}",
    items.join(",\n")
  )
}

#[tokio::test]
async fn embedded_components_become_tasks() {
  let doc = hero(&[
    ("cam0", "camera", CAMERA_PAYLOAD),
    ("cam1", "camera", CAMERA_PAYLOAD),
    ("cam2", "camera", CAMERA_PAYLOAD),
  ]);
  let content = Content::new(&[("/main/hero.go", &doc)]);

  let results = content.build().await;

  assert_eq!(results.len(), 4);
  assert!(failures(&results).is_empty(), "{:?}", results);
  assert_eq!(exit_status(&results), 0);
  for i in 0..3 {
    assert!(content.exists(&format!("/build/main/hero_generated_{}.camera", i)));
    assert!(content.exists(&format!("/build/main/hero_generated_{}.camerac", i)));
  }

  let compiled: PrototypeDesc = decode(&content.read("/build/main/hero.goc")).unwrap();
  assert_eq!(compiled.components.len(), 3);
  assert_eq!(compiled.components[2].component, "/main/hero_generated_2.camerac");
}

#[tokio::test]
async fn plain_game_object_builds_one_artifact() {
  let doc = r#"{"components": [{"id": "cam", "component": "/main/cam.camera"}]}"#;
  let content = Content::new(&[("/main/hero.go", doc), ("/main/cam.camera", CAMERA_DOC)]);
  let mut project = content.project();
  project.set_inputs(["/main/hero.go"]);

  let results = project.build(&[forge_lib::Command::Build]).await.unwrap();

  assert_eq!(results.len(), 1);
  assert_eq!(results[0].return_code, 0);
  assert_eq!(results[0].message, "OK");
  assert!(content.exists("/build/main/hero.goc"));
  assert!(!content.exists("/build/main/cam.camerac"));

  let compiled: PrototypeDesc = decode(&content.read("/build/main/hero.goc")).unwrap();
  assert_eq!(compiled.components[0].component, "/main/cam.camerac");
}

#[tokio::test]
async fn missing_component_file_is_reported_on_the_game_object() {
  let doc = "{\n  \"components\": [\n    {\"id\": \"s\", \"component\": \"/main/gone.camera\"}\n  ]\n}";
  let content = Content::new(&[("/main/hero.go", doc)]);

  let results = content.build().await;

  assert_eq!(results.len(), 1);
  let failed = &results[0];
  assert_eq!(failed.origin, "/main/hero.go");
  assert_eq!(failed.line_number, Some(3));
  assert_eq!(failed.return_code, 1);
  assert_eq!(
    format_result(failed),
    "ERROR /main/hero.go:3: missing dependent resource file '/main/gone.camera'"
  );
  assert!(!content.exists("/build/main/hero.goc"));
}

#[tokio::test]
async fn failed_game_object_leaves_no_generated_files() {
  let doc = hero(&[("cam", "camera", CAMERA_PAYLOAD)]).replace(
    "\"components\": []",
    "\"components\": [{\"id\": \"s\", \"component\": \"/main/gone.camera\"}]",
  );
  let content = Content::new(&[("/main/hero.go", &doc)]);

  let results = content.build().await;

  let failed = failures(&results);
  assert_eq!(failed.len(), 2);
  assert_eq!(failed[0].input, "/main/hero.go");
  assert_eq!(failed[0].message, "missing dependent resource file '/main/gone.camera'");
  assert!(failed[0].exception.is_none());
  assert!(failed[1].message.starts_with("skipped: dependency /main/hero.go failed"));
  assert!(!content.exists("/build/main/hero.goc"));
  assert!(!content.exists("/build/main/hero_generated_0.camera"));
  assert!(!content.exists("/build/main/hero_generated_0.camerac"));
}

#[tokio::test]
async fn empty_embedded_id_fails_without_children() {
  let doc = hero(&[("", "camera", CAMERA_PAYLOAD)]);
  let content = Content::new(&[("/main/hero.go", &doc)]);

  let results = content.build().await;

  assert_eq!(results.len(), 1);
  assert_eq!(results[0].message, "missing required field 'id'");
  assert!(!content.exists("/build/main/hero_generated_0.camera"));
}

#[tokio::test]
async fn generated_failure_is_attributed_to_parent() {
  let doc = hero(&[("ok", "camera", CAMERA_PAYLOAD), ("bad", "camera", BROKEN_PAYLOAD)]);
  let content = Content::new(&[("/main/hero.go", &doc)]);

  let results = content.build().await;

  assert_eq!(results.len(), 3);
  let failed = failures(&results);
  assert_eq!(failed.len(), 1);
  assert_eq!(failed[0].origin, "/main/hero.go");
  assert_eq!(failed[0].input, "/build/main/hero_generated_1.camera");
  assert_eq!(failed[0].message, "far_z must be greater than near_z");
  assert!(format_result(failed[0]).ends_with("(while building /build/main/hero_generated_1.camera)"));
}

#[tokio::test]
async fn malformed_document_reports_parse_line() {
  let content = Content::new(&[("/main/hero.go", "{\n  \"components\": [\n    oops\n  ]\n}")]);

  let results = content.build().await;

  assert_eq!(results.len(), 1);
  assert_eq!(results[0].line_number, Some(3));
}
