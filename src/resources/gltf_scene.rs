use std::path::Path;

use crate::{
    data_structures::scene::{DiffuseSource, Node, Scene, SceneMaterial, SceneMesh},
    resources::{ImportError, asset_dir},
};

/// Reads a glTF/GLB file into a [`Scene`].
///
/// Each primitive becomes its own mesh; a node pointing at a glTF mesh references
/// all of that mesh's primitives. Node transforms are not applied, the model is
/// placed as a whole through its world transform.
pub fn import(path: &Path) -> Result<Scene, ImportError> {
    let gltf = gltf::Gltf::open(path)?;
    let document = gltf.document;
    let buffers = gltf::import_buffers(&document, Some(asset_dir(path).as_path()), gltf.blob)?;

    let mut meshes = Vec::new();
    let mut primitive_meshes: Vec<Vec<usize>> = Vec::new();
    for mesh in document.meshes() {
        let mut indices = Vec::new();
        for primitive in mesh.primitives() {
            match to_scene_mesh(&mesh, &primitive, &buffers) {
                Some(scene_mesh) => {
                    indices.push(meshes.len());
                    meshes.push(scene_mesh);
                }
                None => log::warn!(
                    "Skipping primitive {} of mesh {:?}: {:?} without positions or not made of triangles",
                    primitive.index(),
                    mesh.name(),
                    primitive.mode()
                ),
            }
        }
        primitive_meshes.push(indices);
    }

    let materials = document
        .materials()
        .map(|material| to_scene_material(&material, &buffers))
        .collect();

    let root_name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    let root = match document
        .default_scene()
        .or_else(|| document.scenes().next())
    {
        Some(scene) => Node::new(root_name, Vec::new()).with_children(
            scene
                .nodes()
                .map(|node| to_node(&node, &primitive_meshes))
                .collect(),
        ),
        // a scene-less file still gets all of its meshes drawn
        None => Node::new(root_name, (0..meshes.len()).collect()),
    };

    Ok(Scene {
        root,
        meshes,
        materials,
    })
}

fn to_node(node: &gltf::Node, primitive_meshes: &[Vec<usize>]) -> Node {
    let meshes = node
        .mesh()
        .and_then(|mesh| primitive_meshes.get(mesh.index()))
        .cloned()
        .unwrap_or_default();
    Node::new(node.name().unwrap_or_default(), meshes).with_children(
        node.children()
            .map(|child| to_node(&child, primitive_meshes))
            .collect(),
    )
}

fn to_scene_mesh(
    mesh: &gltf::Mesh,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Option<SceneMesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));

    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals = reader.read_normals().map(|normals| normals.collect());
    let tex_coords = reader
        .read_tex_coords(0)
        .map(|tex_coords| tex_coords.into_f32().collect());
    let colors = reader
        .read_colors(0)
        .map(|colors| colors.into_rgb_f32().collect());
    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    let faces = match primitive.mode() {
        gltf::mesh::Mode::Triangles => indices.chunks(3).map(<[u32]>::to_vec).collect(),
        gltf::mesh::Mode::TriangleStrip => strip_to_triangles(&indices),
        gltf::mesh::Mode::TriangleFan => fan_to_triangles(&indices),
        _ => return None,
    };

    Some(SceneMesh {
        name: mesh.name().unwrap_or("unknown_mesh").to_string(),
        positions,
        normals,
        tex_coords,
        colors,
        faces,
        material_index: primitive.material().index(),
    })
}

/// Alternates the winding of every second triangle so all faces stay front facing.
pub(crate) fn strip_to_triangles(indices: &[u32]) -> Vec<Vec<u32>> {
    indices
        .windows(3)
        .enumerate()
        .map(|(i, w)| {
            if i % 2 == 0 {
                vec![w[0], w[1], w[2]]
            } else {
                vec![w[1], w[0], w[2]]
            }
        })
        .collect()
}

pub(crate) fn fan_to_triangles(indices: &[u32]) -> Vec<Vec<u32>> {
    match indices.split_first() {
        Some((&center, rest)) => rest.windows(2).map(|w| vec![center, w[0], w[1]]).collect(),
        None => Vec::new(),
    }
}

fn to_scene_material(material: &gltf::Material, buffers: &[gltf::buffer::Data]) -> SceneMaterial {
    let name = material.name().unwrap_or_default().to_string();
    let diffuse = material
        .pbr_metallic_roughness()
        .base_color_texture()
        .and_then(|info| match info.texture().source().source() {
            gltf::image::Source::View { view, mime_type } => {
                let start = view.offset();
                let end = start + view.length();
                buffers
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.get(start..end))
                    .map(|bytes| DiffuseSource::Embedded {
                        bytes: bytes.to_vec(),
                        format: mime_type.split('/').last().map(str::to_string),
                    })
            }
            gltf::image::Source::Uri { uri, .. } if uri.starts_with("data:") => {
                log::warn!(
                    "Material {} uses a data URI for its base colour, falling back to the default texture",
                    name
                );
                None
            }
            gltf::image::Source::Uri { uri, .. } => Some(DiffuseSource::File(uri.to_string())),
        });
    SceneMaterial { name, diffuse }
}
