use std::path::{Path, PathBuf};

use crate::{
    config::TextureConfig,
    data_structures::scene::{DiffuseSource, SceneMaterial},
};

/// A material's diffuse texture after resolution, ready to be loaded.
#[derive(Clone, Debug, PartialEq)]
pub enum TextureSource {
    /// A file inside the texture directory.
    File(PathBuf),
    /// Image bytes that shipped inside the asset.
    Embedded {
        label: String,
        bytes: Vec<u8>,
        format: Option<String>,
    },
    /// The material names no diffuse texture.
    Default(PathBuf),
}

impl TextureSource {
    pub fn label(&self) -> String {
        match self {
            TextureSource::File(path) | TextureSource::Default(path) => path.display().to_string(),
            TextureSource::Embedded { label, .. } => label.clone(),
        }
    }
}

pub fn resolve(material: &SceneMaterial, config: &TextureConfig) -> TextureSource {
    match &material.diffuse {
        Some(DiffuseSource::File(name)) => {
            TextureSource::File(resolve_texture_path(&config.directory, name))
        }
        Some(DiffuseSource::Embedded { bytes, format }) => TextureSource::Embedded {
            label: format!("{} (embedded)", material.name),
            bytes: bytes.clone(),
            format: format.clone(),
        },
        None => TextureSource::Default(config.default_texture.clone()),
    }
}

/// Maps a texture name stored in an asset to a file in `directory`.
///
/// A trailing `tif` is renamed to `png` (the converted file must already exist,
/// nothing is transcoded) and any directory prefix, Unix or Windows style, is
/// dropped.
pub fn resolve_texture_path(directory: &Path, stored_name: &str) -> PathBuf {
    let renamed = match stored_name.strip_suffix("tif") {
        Some(stem) => format!("{stem}png"),
        None => stored_name.to_string(),
    };
    let file_name = match renamed.rfind(['/', '\\']) {
        Some(separator) => &renamed[separator + 1..],
        None => renamed.as_str(),
    };
    directory.join(file_name)
}

/// Reads the bytes behind a file-backed source.
pub fn load_binary(path: &Path) -> anyhow::Result<Vec<u8>> {
    Ok(std::fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TextureConfig {
        TextureConfig {
            directory: PathBuf::from("../Textures"),
            default_texture: PathBuf::from("../Textures/pjan.png"),
        }
    }

    #[test]
    fn tif_names_become_png_basenames() {
        assert_eq!(
            resolve_texture_path(Path::new("../Textures"), "foo/bar/tex.tif"),
            PathBuf::from("../Textures/tex.png")
        );
    }

    #[test]
    fn windows_prefixes_are_stripped() {
        assert_eq!(
            resolve_texture_path(Path::new("tex"), r"C:\art\wood\planks.jpg"),
            PathBuf::from("tex/planks.jpg")
        );
    }

    #[test]
    fn bare_names_are_kept() {
        assert_eq!(
            resolve_texture_path(Path::new("tex"), "stone.png"),
            PathBuf::from("tex/stone.png")
        );
    }

    #[test]
    fn only_a_trailing_tif_is_renamed() {
        assert_eq!(
            resolve_texture_path(Path::new("tex"), "motif.tiff"),
            PathBuf::from("tex/motif.tiff")
        );
        assert_eq!(
            resolve_texture_path(Path::new("tex"), "tif/bark.tif"),
            PathBuf::from("tex/bark.png")
        );
    }

    #[test]
    fn materials_without_diffuse_use_the_default() {
        let material = SceneMaterial {
            name: "plain".into(),
            diffuse: None,
        };
        assert_eq!(
            resolve(&material, &config()),
            TextureSource::Default(PathBuf::from("../Textures/pjan.png"))
        );
    }

    #[test]
    fn file_materials_resolve_into_the_texture_dir() {
        let material = SceneMaterial {
            name: "bark".into(),
            diffuse: Some(DiffuseSource::File("/home/artist/bark.tif".into())),
        };
        assert_eq!(
            resolve(&material, &config()),
            TextureSource::File(PathBuf::from("../Textures/bark.png"))
        );
    }
}
