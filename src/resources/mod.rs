use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::data_structures::scene::Scene;

/**
 * This module contains all logic for reading meshes, materials and textures from external files.
 */
pub mod gltf_scene;
pub mod obj;
pub mod postprocess;
pub mod texture;

/// Post-processing flags applied on import. All of them are enabled by default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportOptions {
    pub triangulate: bool,
    pub flip_uvs: bool,
    pub generate_smooth_normals: bool,
    pub join_identical_vertices: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            flip_uvs: true,
            generate_smooth_normals: true,
            join_identical_vertices: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("unsupported asset format {0:?}")]
    UnsupportedFormat(String),
    #[error("failed to read OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
    #[error("failed to read glTF: {0}")]
    Gltf(#[from] gltf::Error),
    #[error("mesh {0} has no vertex positions")]
    MissingPositions(String),
    #[error("mesh {mesh} references vertex {index} but only has {count}")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        count: usize,
    },
    #[error("mesh {mesh} has {found} {attribute} for {expected} positions")]
    AttributeCountMismatch {
        mesh: String,
        attribute: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Reads an asset file into a [`Scene`], picking the importer by file extension
/// and running the post-processing steps selected in `options`.
pub fn import_scene(path: &Path, options: &ImportOptions) -> Result<Scene, ImportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let (mut scene, flip_v) = match extension.as_str() {
        // OBJ stores v with a bottom-left origin, glTF already uses top-left
        "obj" => (obj::import(path)?, true),
        "gltf" | "glb" => (gltf_scene::import(path)?, false),
        _ => return Err(ImportError::UnsupportedFormat(path.display().to_string())),
    };

    for mesh in scene.meshes.iter_mut() {
        validate(mesh)?;
        postprocess::apply(mesh, options, flip_v);
    }
    scene.assign_fallback_material();

    log::info!(
        "Imported {}: {} meshes, {} materials",
        path.display(),
        scene.meshes.len(),
        scene.materials.len()
    );
    Ok(scene)
}

fn validate(mesh: &crate::data_structures::scene::SceneMesh) -> Result<(), ImportError> {
    if mesh.positions.is_empty() {
        return Err(ImportError::MissingPositions(mesh.name.clone()));
    }
    let count = mesh.vertex_count();
    let channels = [
        ("normals", mesh.normals.as_ref().map(Vec::len)),
        (
            "texture coordinates",
            mesh.tex_coords.as_ref().map(Vec::len),
        ),
        ("colours", mesh.colors.as_ref().map(Vec::len)),
    ];
    for (attribute, found) in channels {
        if let Some(found) = found.filter(|&found| found != count) {
            return Err(ImportError::AttributeCountMismatch {
                mesh: mesh.name.clone(),
                attribute,
                expected: count,
                found,
            });
        }
    }
    if let Some(&index) = mesh.faces.iter().flatten().find(|&&i| i as usize >= count) {
        return Err(ImportError::IndexOutOfRange {
            mesh: mesh.name.clone(),
            index,
            count,
        });
    }
    Ok(())
}

/// Directory that relative paths inside `asset` are resolved against.
pub(crate) fn asset_dir(asset: &Path) -> PathBuf {
    asset
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}
