//! Vertex layout and mesh geometry.
//!
//! [`MeshData`] is the CPU-side result of flattening one [`SceneMesh`]; [`Mesh`]
//! is the same geometry uploaded into wgpu vertex/index buffers.

use wgpu::util::DeviceExt;

use crate::data_structures::scene::SceneMesh;

pub trait Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static>;
}

/// Interleaved vertex: position, uv, colour, normal (11 floats).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelVertex {
    pub position: [f32; 3],
    pub tex_coords: [f32; 2],
    pub color: [f32; 3],
    pub normal: [f32; 3],
}

impl ModelVertex {
    pub const FLOATS: usize = 11;
}

impl Vertex for ModelVertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<ModelVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 5]>() as wgpu::BufferAddress,
                    shader_location: 2,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 3,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

/// Geometry of one sub-mesh, ready for upload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertices: Vec<ModelVertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Flattens a scene mesh. Missing UVs become (0, 0) and missing colours
    /// (0, 0, 0). Indices are emitted face by face in source order.
    pub fn from_scene_mesh(mesh: &SceneMesh) -> Self {
        if mesh.normals.is_none() {
            log::warn!(
                "Mesh {} has no normals, lighting will be flat black. Enable normal generation on import.",
                mesh.name
            );
        }
        let vertices = (0..mesh.vertex_count())
            .map(|i| ModelVertex {
                position: mesh.positions[i],
                tex_coords: mesh
                    .tex_coords
                    .as_ref()
                    .and_then(|uvs| uvs.get(i).copied())
                    .unwrap_or_default(),
                color: mesh
                    .colors
                    .as_ref()
                    .and_then(|colors| colors.get(i).copied())
                    .unwrap_or_default(),
                normal: mesh
                    .normals
                    .as_ref()
                    .and_then(|normals| normals.get(i).copied())
                    .unwrap_or_default(),
            })
            .collect();
        let indices = mesh.faces.iter().flatten().copied().collect();

        Self {
            name: mesh.name.clone(),
            vertices,
            indices,
        }
    }

    /// The vertex buffer as plain floats, `ModelVertex::FLOATS` per vertex.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }
}

/// GPU buffers for one sub-mesh.
#[derive(Debug)]
pub struct Mesh {
    pub name: String,
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_elements: u32,
}

impl Mesh {
    pub fn new(device: &wgpu::Device, label: &str, data: &MeshData) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Vertex Buffer", label)),
            contents: bytemuck::cast_slice(&data.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Index Buffer", label)),
            contents: bytemuck::cast_slice(&data.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            name: data.name.clone(),
            vertex_buffer,
            index_buffer,
            num_elements: data.indices.len() as u32,
        }
    }
}
