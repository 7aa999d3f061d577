//! Texture builder: decodes images into raw pixel data.

use std::sync::Arc;

use image::{ColorType, DynamicImage, ImageError};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BuildError, CompileError, read_input};
use crate::resource::Resource;
use crate::task::Task;

use super::schema::encode;
use super::schemas::IMAGE_EXTENSIONS;
use super::{Builder, BuilderDescriptor, BuilderEntry};

/// Pixel layout of a compiled texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFormat {
  Luminance,
  Rgb,
  Rgba,
}

impl TextureFormat {
  /// Format for a decoded color type, if supported.
  ///
  /// Only 1-channel grey, 3-channel color and 4-channel color with alpha are
  /// accepted. Grey with alpha has no matching layout.
  pub fn from_color_type(color: ColorType) -> Option<Self> {
    match (color.channel_count(), color.has_alpha()) {
      (1, false) => Some(Self::Luminance),
      (3, false) => Some(Self::Rgb),
      (4, true) => Some(Self::Rgba),
      _ => None,
    }
  }

  pub fn bytes_per_pixel(self) -> usize {
    match self {
      Self::Luminance => 1,
      Self::Rgb => 3,
      Self::Rgba => 4,
    }
  }
}

/// One encoded variant of a texture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureVariant {
  pub width: u32,
  pub height: u32,
  pub original_width: u32,
  pub original_height: u32,
  pub format: TextureFormat,
  pub mip_map_offset: Vec<u32>,
  pub mip_map_size: Vec<u32>,
  pub data: Vec<u8>,
}

/// Compiled texture: a list of alternative encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureImage {
  pub alternatives: Vec<TextureVariant>,
}

/// Decode `bytes` and lay them out as a single-level texture.
pub fn compile_texture(input: &Resource, bytes: &[u8]) -> Result<TextureImage, BuildError> {
  let image = image::load_from_memory(bytes).map_err(|e| match e {
    ImageError::Decoding(_) | ImageError::Unsupported(_) => {
      BuildError::Compile(CompileError::new(input, format!("failed to decode image: {}", e)))
    }
    other => BuildError::Image(other),
  })?;

  let color = image.color();
  let format = TextureFormat::from_color_type(color)
    .ok_or_else(|| CompileError::new(input, format!("unsupported color model {:?}", color)))?;

  let (width, height) = (image.width(), image.height());
  let data = pixels(image, format);
  debug!(resource = %input, width, height, ?format, "decoded texture");

  Ok(TextureImage {
    alternatives: vec![TextureVariant {
      width,
      height,
      original_width: width,
      original_height: height,
      format,
      mip_map_offset: vec![0],
      mip_map_size: vec![data.len() as u32],
      data,
    }],
  })
}

fn pixels(image: DynamicImage, format: TextureFormat) -> Vec<u8> {
  match format {
    TextureFormat::Luminance => image.into_luma8().into_raw(),
    TextureFormat::Rgb => image.into_rgb8().into_raw(),
    TextureFormat::Rgba => image.into_rgba8().into_raw(),
  }
}

pub struct TextureBuilder {
  descriptor: BuilderDescriptor,
}

impl TextureBuilder {
  pub const DESCRIPTOR: BuilderDescriptor = BuilderDescriptor::new("Texture", IMAGE_EXTENSIONS, ".texturec");

  pub fn factory(descriptor: &BuilderDescriptor) -> Arc<dyn Builder> {
    Arc::new(Self {
      descriptor: *descriptor,
    })
  }
}

impl Builder for TextureBuilder {
  fn descriptor(&self) -> &BuilderDescriptor {
    &self.descriptor
  }

  fn build(&self, task: &Task) -> Result<(), BuildError> {
    let input = task.primary_input();
    let texture = compile_texture(input, &read_input(input)?)?;
    let output = task
      .primary_output()
      .ok_or_else(|| BuildError::Internal(format!("{} declares no output", task)))?;
    output.set_content(&encode(&texture)?)?;
    Ok(())
  }
}

pub fn package() -> Vec<BuilderEntry> {
  vec![BuilderEntry::new(TextureBuilder::DESCRIPTOR, TextureBuilder::factory)]
}
