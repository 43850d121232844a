use std::path::Path;

use crate::{
    data_structures::scene::{DiffuseSource, Node, Scene, SceneMaterial, SceneMesh},
    resources::ImportError,
};

/// Reads a Wavefront OBJ (and its MTL library) into a [`Scene`].
///
/// Every OBJ object/group becomes one mesh under its own child of the root node.
/// Polygons are kept as they are; triangulation happens in post-processing.
pub fn import(path: &Path) -> Result<Scene, ImportError> {
    let (models, obj_materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            single_index: true,
            triangulate: false,
            ignore_points: true,
            ignore_lines: true,
            ..Default::default()
        },
    )?;

    // A missing or broken .mtl is not fatal: meshes fall back to the default material.
    let materials = match obj_materials {
        Ok(materials) => materials.into_iter().map(to_scene_material).collect(),
        Err(e) => {
            log::warn!(
                "Materials of {} could not be loaded ({}), using the default material",
                path.display(),
                e
            );
            Vec::new()
        }
    };

    let mut root = Node::new(
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default(),
        Vec::new(),
    );
    let meshes = models
        .into_iter()
        .enumerate()
        .map(|(idx, m)| {
            root.children.push(Node::new(m.name.clone(), vec![idx]));
            to_scene_mesh(m, materials.len())
        })
        .collect();

    Ok(Scene {
        root,
        meshes,
        materials,
    })
}

fn to_scene_material(m: tobj::Material) -> SceneMaterial {
    SceneMaterial {
        name: m.name,
        diffuse: m
            .diffuse_texture
            .filter(|name| !name.is_empty())
            .map(DiffuseSource::File),
    }
}

fn to_scene_mesh(m: tobj::Model, material_count: usize) -> SceneMesh {
    let mesh = m.mesh;
    let vertex_count = mesh.positions.len() / 3;

    let positions = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    let normals = (mesh.normals.len() == vertex_count * 3 && vertex_count > 0).then(|| {
        mesh.normals
            .chunks_exact(3)
            .map(|n| [n[0], n[1], n[2]])
            .collect()
    });
    let tex_coords = (mesh.texcoords.len() == vertex_count * 2 && vertex_count > 0).then(|| {
        mesh.texcoords
            .chunks_exact(2)
            .map(|t| [t[0], t[1]])
            .collect()
    });
    let colors = (mesh.vertex_color.len() == vertex_count * 3 && vertex_count > 0).then(|| {
        mesh.vertex_color
            .chunks_exact(3)
            .map(|c| [c[0], c[1], c[2]])
            .collect()
    });

    // Without arities every face is a triangle
    let faces = if mesh.face_arities.is_empty() {
        mesh.indices.chunks(3).map(<[u32]>::to_vec).collect()
    } else {
        let mut offset = 0;
        mesh.face_arities
            .iter()
            .map(|&arity| {
                let end = (offset + arity as usize).min(mesh.indices.len());
                let face = mesh.indices[offset..end].to_vec();
                offset = end;
                face
            })
            .collect()
    };

    // tobj reports ids into the .mtl even when it failed to load
    let material_index = mesh.material_id.filter(|&id| id < material_count);

    SceneMesh {
        name: m.name,
        positions,
        normals,
        tex_coords,
        colors,
        faces,
        material_index,
    }
}
