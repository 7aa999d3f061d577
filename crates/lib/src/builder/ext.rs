//! Source to compiled extension mapping for component references.
//!
//! Compiled game objects refer to their components by the path of the compiled
//! file. Matching is on the exact final extension of the path, so `.sprite2`
//! never matches the `.sprite` rule and a compiled path is never rewritten a
//! second time.

use crate::resource::path_ext;

/// `(source, compiled)` extension pairs.
pub const COMPONENT_EXTENSIONS: &[(&str, &str)] = &[
  (".camera", ".camerac"),
  (".collectionproxy", ".collectionproxyc"),
  (".collisionobject", ".collisionobjectc"),
  (".emitter", ".emitterc"),
  (".particlefx", ".particlefxc"),
  (".gui", ".guic"),
  (".model", ".modelc"),
  (".script", ".scriptc"),
  (".sound", ".soundc"),
  (".wav", ".soundc"),
  (".factory", ".factoryc"),
  (".collectionfactory", ".collectionfactoryc"),
  (".light", ".lightc"),
  (".label", ".labelc"),
  (".sprite", ".spritec"),
  (".sprite2", ".sprite2c"),
  (".tilegrid", ".tilemapc"),
  (".tilemap", ".tilemapc"),
  (".spinemodel", ".spinemodelc"),
  (".input_binding", ".input_bindingc"),
  (".mesh", ".meshc"),
];

/// Compiled extension for a source extension, if it is a known component type.
pub fn compiled_ext(ext: &str) -> Option<&'static str> {
  COMPONENT_EXTENSIONS.iter().find(|(src, _)| *src == ext).map(|(_, out)| *out)
}

/// Rewrite `path` to point at its compiled counterpart.
///
/// Paths with an unknown extension are returned unchanged.
pub fn compiled_path(path: &str) -> String {
  match path_ext(path).and_then(|ext| compiled_ext(ext).map(|out| (ext, out))) {
    Some((ext, out)) => format!("{}{}", &path[..path.len() - ext.len()], out),
    None => path.to_string(),
  }
}

/// Replace the final extension `from` of `path` with `to`.
///
/// Returns `path` unchanged when its final extension is not exactly `from`.
pub fn replace_ext(path: &str, from: &str, to: &str) -> String {
  match path_ext(path) {
    Some(ext) if ext == from => format!("{}{}", &path[..path.len() - ext.len()], to),
    _ => path.to_string(),
  }
}
