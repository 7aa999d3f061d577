use std::io::Cursor;

use forge_lib::builder::schema::decode;
use forge_lib::builder::texture::{TextureFormat, TextureImage};
use image::{DynamicImage, GrayAlphaImage, GrayImage, ImageOutputFormat, RgbImage, RgbaImage};

use super::common::{Content, failures};

fn png(image: DynamicImage) -> Vec<u8> {
  let mut bytes = Cursor::new(Vec::new());
  image.write_to(&mut bytes, ImageOutputFormat::Png).unwrap();
  bytes.into_inner()
}

#[tokio::test]
async fn textures_keep_their_color_model() {
  let content = Content::new(&[]);
  content.write("/img/grey.png", &png(DynamicImage::ImageLuma8(GrayImage::new(4, 2))));
  content.write("/img/rgb.png", &png(DynamicImage::ImageRgb8(RgbImage::new(4, 2))));
  content.write("/img/rgba.png", &png(DynamicImage::ImageRgba8(RgbaImage::new(4, 2))));

  let results = content.build().await;
  assert_eq!(results.len(), 3);
  assert!(failures(&results).is_empty(), "{:?}", results);

  for (name, format) in [
    ("grey", TextureFormat::Luminance),
    ("rgb", TextureFormat::Rgb),
    ("rgba", TextureFormat::Rgba),
  ] {
    let texture: TextureImage = decode(&content.read(&format!("/build/img/{}.texturec", name))).unwrap();
    let variant = &texture.alternatives[0];
    assert_eq!(variant.format, format);
    assert_eq!((variant.width, variant.height), (4, 2));
    assert_eq!(variant.data.len(), 8 * format.bytes_per_pixel());
  }
}

#[tokio::test]
async fn grey_alpha_is_unsupported() {
  let content = Content::new(&[]);
  content.write("/img/ga.png", &png(DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2))));

  let results = content.build().await;

  assert_eq!(results.len(), 1);
  assert!(results[0].message.starts_with("unsupported color model"), "{}", results[0].message);
  assert_eq!(results[0].return_code, 1);
}

#[tokio::test]
async fn sprite_refers_to_compiled_texture() {
  let content = Content::new(&[("/main/hero.sprite", r#"{"image": "/img/hero.png"}"#)]);
  content.write("/img/hero.png", &png(DynamicImage::ImageRgb8(RgbImage::new(1, 1))));

  let results = content.build().await;

  assert_eq!(results.len(), 2);
  assert!(failures(&results).is_empty(), "{:?}", results);
  assert!(content.exists("/build/main/hero.spritec"));
  assert!(content.exists("/build/img/hero.texturec"));
}
