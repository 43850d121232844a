//! Post-processing applied to freshly imported meshes.
//!
//! The steps mirror the usual importer flags and run in a fixed order:
//! triangulate, join identical vertices, generate smooth normals, flip UVs.

use std::collections::HashMap;

use cgmath::{InnerSpace, Vector3, Zero};

use crate::{data_structures::scene::SceneMesh, resources::ImportOptions};

pub fn apply(mesh: &mut SceneMesh, options: &ImportOptions, flip_v: bool) {
    if options.triangulate {
        triangulate(mesh);
    }
    if options.join_identical_vertices {
        join_identical_vertices(mesh);
    }
    if options.generate_smooth_normals && mesh.normals.is_none() {
        generate_smooth_normals(mesh);
    }
    if options.flip_uvs && flip_v {
        flip_uvs(mesh);
    }
}

/// Fans polygons into triangles. Points and lines carry no area and are dropped.
pub fn triangulate(mesh: &mut SceneMesh) {
    let mut dropped = 0;
    let faces = std::mem::take(&mut mesh.faces);
    for face in faces {
        match face.len() {
            0..=2 => dropped += 1,
            3 => mesh.faces.push(face),
            _ => {
                for i in 1..face.len() - 1 {
                    mesh.faces.push(vec![face[0], face[i], face[i + 1]]);
                }
            }
        }
    }
    if dropped > 0 {
        log::debug!(
            "Dropped {} point/line faces from mesh {} while triangulating",
            dropped,
            mesh.name
        );
    }
}

pub fn flip_uvs(mesh: &mut SceneMesh) {
    if let Some(uvs) = mesh.tex_coords.as_mut() {
        uvs.iter_mut().for_each(|uv| uv[1] = 1.0 - uv[1]);
    }
}

/// Merges vertices whose attributes are bit-identical and remaps the faces.
pub fn join_identical_vertices(mesh: &mut SceneMesh) {
    let count = mesh.vertex_count();
    let mut seen: HashMap<[u32; 11], u32> = HashMap::with_capacity(count);
    let mut remap = Vec::with_capacity(count);
    let mut kept = Vec::with_capacity(count);

    for i in 0..count {
        let key = vertex_key(mesh, i);
        let next = kept.len() as u32;
        let target = *seen.entry(key).or_insert_with(|| {
            kept.push(i);
            next
        });
        remap.push(target);
    }
    if kept.len() == count {
        return;
    }

    log::debug!(
        "Joined {} duplicate vertices in mesh {}",
        count - kept.len(),
        mesh.name
    );
    mesh.positions = gather(&mesh.positions, &kept);
    mesh.normals = mesh.normals.as_deref().map(|n| gather(n, &kept));
    mesh.tex_coords = mesh.tex_coords.as_deref().map(|uv| gather(uv, &kept));
    mesh.colors = mesh.colors.as_deref().map(|c| gather(c, &kept));
    mesh.faces
        .iter_mut()
        .flatten()
        .for_each(|index| *index = remap[*index as usize]);
}

fn gather<T: Copy>(values: &[T], kept: &[usize]) -> Vec<T> {
    kept.iter().map(|&i| values[i]).collect()
}

fn vertex_key(mesh: &SceneMesh, i: usize) -> [u32; 11] {
    let mut key = [0u32; 11];
    let position = mesh.positions[i];
    let uv = mesh.tex_coords.as_ref().map_or([0.0; 2], |uvs| uvs[i]);
    let color = mesh.colors.as_ref().map_or([0.0; 3], |colors| colors[i]);
    let normal = mesh.normals.as_ref().map_or([0.0; 3], |normals| normals[i]);
    position
        .iter()
        .chain(uv.iter())
        .chain(color.iter())
        .chain(normal.iter())
        .zip(key.iter_mut())
        .for_each(|(value, slot)| *slot = value.to_bits());
    key
}

/// Computes per-vertex normals from area-weighted face normals. Vertices sharing
/// a position share a normal, so UV seams do not show up as lighting seams.
pub fn generate_smooth_normals(mesh: &mut SceneMesh) {
    let bits = |p: [f32; 3]| p.map(f32::to_bits);
    let mut sums: HashMap<[u32; 3], Vector3<f32>> = HashMap::new();

    for face in mesh.faces.iter().filter(|face| face.len() >= 3) {
        let p0: Vector3<f32> = mesh.positions[face[0] as usize].into();
        // fan the polygon so quads work without triangulation
        let mut normal = Vector3::zero();
        for i in 1..face.len() - 1 {
            let p1: Vector3<f32> = mesh.positions[face[i] as usize].into();
            let p2: Vector3<f32> = mesh.positions[face[i + 1] as usize].into();
            normal += (p1 - p0).cross(p2 - p0);
        }
        for &index in face {
            *sums
                .entry(bits(mesh.positions[index as usize]))
                .or_insert_with(Vector3::zero) += normal;
        }
    }

    let normals = mesh
        .positions
        .iter()
        .map(|&p| match sums.get(&bits(p)) {
            Some(sum) if sum.magnitude2() > f32::EPSILON * f32::EPSILON => sum.normalize().into(),
            _ => [0.0; 3],
        })
        .collect();
    mesh.normals = Some(normals);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> SceneMesh {
        SceneMesh {
            name: "quad".into(),
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            tex_coords: Some(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.25]]),
            faces: vec![vec![0, 1, 2, 3]],
            ..Default::default()
        }
    }

    #[test]
    fn quads_are_fanned_and_lines_dropped() {
        let mut mesh = quad();
        mesh.faces.push(vec![0, 1]);
        triangulate(&mut mesh);
        assert_eq!(mesh.faces, vec![vec![0, 1, 2], vec![0, 2, 3]]);
    }

    #[test]
    fn uv_v_is_mirrored() {
        let mut mesh = quad();
        flip_uvs(&mut mesh);
        assert_eq!(mesh.tex_coords.unwrap()[3], [0.0, 0.75]);
    }

    #[test]
    fn normals_of_flat_ccw_quad_point_up_z() {
        let mut mesh = quad();
        generate_smooth_normals(&mut mesh);
        for normal in mesh.normals.unwrap() {
            assert_eq!(normal, [0.0, 0.0, 1.0]);
        }
    }

    #[test]
    fn smooth_normals_are_unit_length_on_a_corner() {
        // two faces meeting at a right angle along the x axis
        let mut mesh = SceneMesh {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [1.0, 0.0, -1.0],
            ],
            faces: vec![vec![0, 1, 2], vec![0, 1, 3]],
            ..Default::default()
        };
        generate_smooth_normals(&mut mesh);
        let normals = mesh.normals.unwrap();
        for n in &normals {
            let length = Vector3::from(*n).magnitude();
            assert!((length - 1.0).abs() < 1e-5, "normal {:?} not unit", n);
        }
        // the shared edge averages both face normals
        let shared = Vector3::from(normals[0]);
        assert!(shared.y > 0.0 && shared.z > 0.0);
    }

    #[test]
    fn unreferenced_vertices_get_zero_normals() {
        let mut mesh = quad();
        mesh.positions.push([5.0, 5.0, 5.0]);
        mesh.tex_coords.as_mut().unwrap().push([0.0, 0.0]);
        generate_smooth_normals(&mut mesh);
        assert_eq!(mesh.normals.unwrap()[4], [0.0; 3]);
    }

    #[test]
    fn joining_keeps_triangles_equivalent() {
        let mut mesh = SceneMesh {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            faces: vec![vec![0, 1, 2], vec![3, 4, 5]],
            ..Default::default()
        };
        let before: Vec<Vec<[f32; 3]>> = mesh
            .faces
            .iter()
            .map(|f| f.iter().map(|&i| mesh.positions[i as usize]).collect())
            .collect();

        join_identical_vertices(&mut mesh);

        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.faces, vec![vec![0, 1, 2], vec![0, 2, 3]]);
        let after: Vec<Vec<[f32; 3]>> = mesh
            .faces
            .iter()
            .map(|f| f.iter().map(|&i| mesh.positions[i as usize]).collect())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn vertices_differing_in_uv_are_not_joined() {
        let mut mesh = SceneMesh {
            positions: vec![[0.0; 3], [0.0; 3]],
            tex_coords: Some(vec![[0.0, 0.0], [0.5, 0.0]]),
            faces: vec![vec![0, 1, 0]],
            ..Default::default()
        };
        join_identical_vertices(&mut mesh);
        assert_eq!(mesh.positions.len(), 2);
    }

    #[test]
    fn flip_is_skipped_for_top_left_formats() {
        let mut mesh = quad();
        apply(&mut mesh, &ImportOptions::default(), false);
        assert_eq!(mesh.tex_coords.as_ref().unwrap()[3], [0.0, 0.25]);
        assert_eq!(mesh.faces.len(), 2);
        assert!(mesh.normals.is_some());
    }
}
