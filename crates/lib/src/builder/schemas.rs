//! Component document types compiled by [`SchemaBuilder`](super::schema::SchemaBuilder).

use serde::{Deserialize, Serialize};

use crate::error::{BuildError, CompileError};
use crate::resource::Resource;

use super::ext::replace_ext;
use super::schema::{Message, check_optional_resource, check_resource, schema_entry, with_line_of};
use super::{BuilderDescriptor, BuilderEntry};

/// Texture source extensions accepted by image references.
pub const IMAGE_EXTENSIONS: &[&str] = &[".png", ".jpg", ".jpeg", ".tga"];

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Point3 {
  #[serde(default)]
  pub x: f32,
  #[serde(default)]
  pub y: f32,
  #[serde(default)]
  pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Quat {
  #[serde(default)]
  pub x: f32,
  #[serde(default)]
  pub y: f32,
  #[serde(default)]
  pub z: f32,
  #[serde(default = "one")]
  pub w: f32,
}

impl Default for Quat {
  fn default() -> Self {
    Self {
      x: 0.0,
      y: 0.0,
      z: 0.0,
      w: 1.0,
    }
  }
}

fn one() -> f32 {
  1.0
}

fn white() -> [f32; 4] {
  [1.0, 1.0, 1.0, 1.0]
}

fn master() -> String {
  "master".to_string()
}

fn texture_path(path: &str) -> String {
  IMAGE_EXTENSIONS
    .iter()
    .map(|ext| replace_ext(path, ext, ".texturec"))
    .find(|p| p != path)
    .unwrap_or_else(|| path.to_string())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CameraDesc {
  pub aspect_ratio: f32,
  pub fov: f32,
  pub near_z: f32,
  pub far_z: f32,
  #[serde(default)]
  pub auto_aspect_ratio: bool,
}

impl Message for CameraDesc {
  fn validate(&self, input: &Resource) -> Result<(), CompileError> {
    if self.far_z <= self.near_z {
      return Err(CompileError::new(input, "far_z must be greater than near_z"));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FactoryDesc {
  #[serde(default)]
  pub prototype: String,
  #[serde(default)]
  pub load_dynamically: bool,
}

impl Message for FactoryDesc {
  fn transform(mut self, input: &Resource) -> Result<Self, BuildError> {
    check_resource(input, "prototype", &self.prototype)?;
    self.prototype = replace_ext(&self.prototype, ".go", ".goc");
    Ok(self)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionFactoryDesc {
  #[serde(default)]
  pub prototype: String,
  #[serde(default)]
  pub load_dynamically: bool,
}

impl Message for CollectionFactoryDesc {
  fn transform(mut self, input: &Resource) -> Result<Self, BuildError> {
    check_resource(input, "prototype", &self.prototype)?;
    self.prototype = replace_ext(&self.prototype, ".collection", ".collectionc");
    Ok(self)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CollectionProxyDesc {
  #[serde(default)]
  pub collection: String,
  #[serde(default)]
  pub exclude: bool,
}

impl Message for CollectionProxyDesc {
  fn transform(mut self, input: &Resource) -> Result<Self, BuildError> {
    check_resource(input, "collection", &self.collection)?;
    self.collection = replace_ext(&self.collection, ".collection", ".collectionc");
    Ok(self)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SoundDesc {
  #[serde(default)]
  pub sound: String,
  #[serde(default)]
  pub looping: bool,
  #[serde(default = "master")]
  pub group: String,
  #[serde(default = "one")]
  pub gain: f32,
}

impl Message for SoundDesc {
  fn validate(&self, input: &Resource) -> Result<(), CompileError> {
    if !(0.0..=1.0).contains(&self.gain) {
      return Err(CompileError::new(input, format!("gain {} is outside [0, 1]", self.gain)));
    }
    Ok(())
  }

  fn transform(mut self, input: &Resource) -> Result<Self, BuildError> {
    check_resource(input, "sound", &self.sound)?;
    self.sound = replace_ext(&self.sound, ".wav", ".wavc");
    self.sound = replace_ext(&self.sound, ".ogg", ".oggc");
    Ok(self)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelDesc {
  #[serde(default)]
  pub text: String,
  #[serde(default)]
  pub font: String,
  #[serde(default)]
  pub size: Point3,
  #[serde(default = "white")]
  pub color: [f32; 4],
  #[serde(default)]
  pub material: String,
}

impl Message for LabelDesc {
  fn transform(mut self, input: &Resource) -> Result<Self, BuildError> {
    check_resource(input, "font", &self.font)?;
    check_optional_resource(input, &self.material)?;
    self.font = replace_ext(&self.font, ".font", ".fontc");
    self.material = replace_ext(&self.material, ".material", ".materialc");
    Ok(self)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
  Point,
  Spot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LightDesc {
  pub id: String,
  #[serde(rename = "type")]
  pub light_type: LightType,
  #[serde(default = "white")]
  pub color: [f32; 4],
  #[serde(default = "one")]
  pub intensity: f32,
  pub range: f32,
  #[serde(default)]
  pub decay: f32,
  #[serde(default)]
  pub cone_angle: f32,
}

impl Message for LightDesc {
  fn validate(&self, input: &Resource) -> Result<(), CompileError> {
    if self.id.is_empty() {
      return Err(CompileError::new(input, "missing required field 'id'"));
    }
    if self.light_type == LightType::Spot && self.cone_angle <= 0.0 {
      return Err(CompileError::new(input, "spot lights need a positive cone_angle"));
    }
    Ok(())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
  #[default]
  Alpha,
  Add,
  Mult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpriteDesc {
  #[serde(default)]
  pub image: String,
  #[serde(default)]
  pub default_animation: String,
  #[serde(default)]
  pub material: String,
  #[serde(default)]
  pub blend_mode: BlendMode,
}

impl Message for SpriteDesc {
  fn transform(mut self, input: &Resource) -> Result<Self, BuildError> {
    check_resource(input, "image", &self.image)?;
    check_optional_resource(input, &self.material)?;
    self.image = texture_path(&self.image);
    self.material = replace_ext(&self.material, ".material", ".materialc");
    Ok(self)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sprite2Desc {
  #[serde(default)]
  pub tile_set: String,
  #[serde(default)]
  pub default_animation: String,
  #[serde(default)]
  pub blend_mode: BlendMode,
}

impl Message for Sprite2Desc {
  fn transform(mut self, input: &Resource) -> Result<Self, BuildError> {
    check_resource(input, "tile_set", &self.tile_set)?;
    self.tile_set = replace_ext(&self.tile_set, ".tilesource", ".texturesetc");
    self.tile_set = texture_path(&self.tile_set);
    Ok(self)
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Trigger {
  pub input: String,
  #[serde(default)]
  pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputBindingDesc {
  #[serde(default)]
  pub key_trigger: Vec<Trigger>,
  #[serde(default)]
  pub mouse_trigger: Vec<Trigger>,
  #[serde(default)]
  pub gamepad_trigger: Vec<Trigger>,
}

impl Message for InputBindingDesc {
  fn validate(&self, input: &Resource) -> Result<(), CompileError> {
    let triggers = self.key_trigger.iter().chain(&self.mouse_trigger).chain(&self.gamepad_trigger);
    for trigger in triggers {
      if trigger.action.is_empty() {
        return Err(with_line_of(
          CompileError::new(input, format!("trigger '{}' is missing required field 'action'", trigger.input)),
          input,
          &trigger.input,
        ));
      }
    }
    Ok(())
  }
}

/// Schema builders shipped with the crate.
pub fn package() -> Vec<BuilderEntry> {
  vec![
    schema_entry::<CameraDesc>(BuilderDescriptor::new("Camera", &[".camera"], ".camerac")),
    schema_entry::<FactoryDesc>(BuilderDescriptor::new("Factory", &[".factory"], ".factoryc")),
    schema_entry::<CollectionFactoryDesc>(BuilderDescriptor::new(
      "CollectionFactory",
      &[".collectionfactory"],
      ".collectionfactoryc",
    )),
    schema_entry::<CollectionProxyDesc>(BuilderDescriptor::new(
      "CollectionProxy",
      &[".collectionproxy"],
      ".collectionproxyc",
    )),
    schema_entry::<SoundDesc>(BuilderDescriptor::new("Sound", &[".sound"], ".soundc")),
    schema_entry::<LabelDesc>(BuilderDescriptor::new("Label", &[".label"], ".labelc")),
    schema_entry::<LightDesc>(BuilderDescriptor::new("Light", &[".light"], ".lightc")),
    schema_entry::<SpriteDesc>(BuilderDescriptor::new("Sprite", &[".sprite"], ".spritec")),
    schema_entry::<Sprite2Desc>(BuilderDescriptor::new("Sprite2", &[".sprite2"], ".sprite2c")),
    schema_entry::<InputBindingDesc>(BuilderDescriptor::new(
      "InputBinding",
      &[".input_binding"],
      ".input_bindingc",
    )),
  ]
}
