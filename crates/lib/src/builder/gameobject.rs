//! Game object builder.
//!
//! A game object document lists components by reference and may embed
//! component documents inline. Each embedded component is declared as its own
//! resource in the build tree (`<stem>_generated_<i>.<type>`), written when the
//! game object builds, and compiled by whatever builder handles its type. The compiled game object then refers
//! to every component, embedded or not, by compiled path.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::GENERATED_INFIX;
use crate::error::{BuildError, CompileError, read_input};
use crate::resource::Resource;
use crate::task::{Task, TaskSpec};

use super::ext::compiled_path;
use super::schema::{check_resource, encode, parse_document, with_line_of};
use super::schemas::{Point3, Quat};
use super::{Builder, BuilderDescriptor, BuilderEntry, CreateContext};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrototypeDesc {
  #[serde(default)]
  pub components: Vec<ComponentDesc>,
  #[serde(default)]
  pub embedded_components: Vec<EmbeddedComponentDesc>,
}

/// A component referenced by path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentDesc {
  #[serde(default)]
  pub id: String,
  pub component: String,
  #[serde(default)]
  pub position: Point3,
  #[serde(default)]
  pub rotation: Quat,
}

/// A component document stored inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbeddedComponentDesc {
  #[serde(default)]
  pub id: String,
  /// Extension of the embedded document, without the dot.
  #[serde(rename = "type")]
  pub component_type: String,
  pub data: String,
  #[serde(default)]
  pub position: Point3,
  #[serde(default)]
  pub rotation: Quat,
}

/// Number of embedded components a task was created with.
#[derive(Debug, Clone, Copy)]
struct EmbeddedCount(usize);

pub struct GameObjectBuilder {
  descriptor: BuilderDescriptor,
}

impl GameObjectBuilder {
  pub const DESCRIPTOR: BuilderDescriptor = BuilderDescriptor::new("GameObject", &[".go"], ".goc");

  pub fn factory(descriptor: &BuilderDescriptor) -> Arc<dyn Builder> {
    Arc::new(Self {
      descriptor: *descriptor,
    })
  }
}

/// Build-tree resource holding embedded component `index` of `input`.
pub fn generated_resource(input: &Resource, index: usize, component_type: &str) -> Resource {
  let stem = input.stem();
  let name = &stem[stem.rfind('/').map_or(0, |i| i + 1)..];
  input.output().sibling(&format!(
    "{}{}{}.{}",
    name,
    GENERATED_INFIX,
    index,
    component_type.trim_start_matches('.')
  ))
}

fn is_spawnable(embedded: &EmbeddedComponentDesc) -> bool {
  !embedded.id.is_empty() && !embedded.component_type.trim_start_matches('.').is_empty()
}

impl Builder for GameObjectBuilder {
  fn descriptor(&self) -> &BuilderDescriptor {
    &self.descriptor
  }

  fn create(&self, input: &Resource, ctx: &mut CreateContext<'_>) -> Result<TaskSpec, BuildError> {
    let mut spec = TaskSpec::new()
      .input(input.clone())
      .output(input.change_ext(self.descriptor.out_ext).output());

    // Broken documents get a plain task; `build` reports the error.
    let parsed = read_input(input)
      .ok()
      .and_then(|content| serde_json::from_slice::<PrototypeDesc>(&content).ok());
    let Some(desc) = parsed else {
      debug!(resource = %input, "unparsable game object, not spawning embedded tasks");
      return Ok(spec.data(EmbeddedCount(0)));
    };
    if !desc.embedded_components.iter().all(is_spawnable) {
      return Ok(spec.data(EmbeddedCount(0)));
    }

    // Generated payloads are only declared here; `build` writes them once the
    // document has been checked.
    for (index, embedded) in desc.embedded_components.iter().enumerate() {
      let generated = generated_resource(input, index, &embedded.component_type);
      spec = spec.output(generated.clone());
      if let Some(child) = ctx.create_task(&generated)? {
        spec = spec.spawn(child);
      }
    }

    Ok(spec.data(EmbeddedCount(desc.embedded_components.len())))
  }

  fn build(&self, task: &Task) -> Result<(), BuildError> {
    let input = task.primary_input();
    let mut desc: PrototypeDesc = parse_document(input)?;

    for component in &desc.components {
      check_resource(input, "component", &component.component)?;
    }
    for embedded in &desc.embedded_components {
      if embedded.id.is_empty() {
        let error = CompileError::new(input, "missing required field 'id'");
        return Err(with_line_of(error, input, "embedded_components").into());
      }
      if embedded.component_type.trim_start_matches('.').is_empty() {
        return Err(
          with_line_of(
            CompileError::new(input, format!("embedded component '{}' is missing required field 'type'", embedded.id)),
            input,
            &embedded.id,
          )
          .into(),
        );
      }
    }

    let declared = task.data::<EmbeddedCount>().map_or(0, |count| count.0);
    if declared != desc.embedded_components.len() {
      return Err(BuildError::Internal(format!(
        "{} changed between task creation and build ({} embedded components, {} expected)",
        input,
        desc.embedded_components.len(),
        declared
      )));
    }

    let outputs = task.outputs();
    let Some((output, generated)) = outputs.split_first() else {
      return Err(BuildError::Internal(format!("{} declares no output", task)));
    };
    for (embedded, resource) in desc.embedded_components.iter().zip(generated) {
      resource.set_content(embedded.data.as_bytes())?;
      desc.components.push(ComponentDesc {
        id: embedded.id.clone(),
        component: resource.path().to_string(),
        position: embedded.position,
        rotation: embedded.rotation,
      });
    }
    desc.embedded_components.clear();

    for component in &mut desc.components {
      component.component = compiled_path(&component.component);
    }

    output.set_content(&encode(&desc)?)?;
    Ok(())
  }
}

pub fn package() -> Vec<BuilderEntry> {
  vec![BuilderEntry::new(GameObjectBuilder::DESCRIPTOR, GameObjectBuilder::factory)]
}
