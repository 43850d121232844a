use std::path::{Path, PathBuf};

use wgpu::util::DeviceExt;

use crate::{
    data_structures::{
        mesh::{ModelVertex, Vertex},
        texture::Texture,
    },
    pipelines::light::{LightUniform, ModelUniforms},
};

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("cannot read shader source {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A compiled model program and the uniform buffer that feeds it.
#[derive(Debug)]
pub struct ModelShader {
    pub render_pipeline: wgpu::RenderPipeline,
    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
}

pub fn load_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

pub fn mk_uniform_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }],
        label: Some("model_uniform_bind_group_layout"),
    })
}

#[allow(clippy::too_many_arguments)]
pub fn mk_model_shader(
    device: &wgpu::Device,
    color_format: wgpu::TextureFormat,
    uniform_layout: &wgpu::BindGroupLayout,
    texture_layout: &wgpu::BindGroupLayout,
    vertex_path: &Path,
    fragment_path: &Path,
    light: LightUniform,
) -> Result<ModelShader, ShaderError> {
    let vertex = wgpu::ShaderModuleDescriptor {
        label: Some("Model Vertex Shader"),
        source: wgpu::ShaderSource::Wgsl(load_source(vertex_path)?.into()),
    };
    let fragment = wgpu::ShaderModuleDescriptor {
        label: Some("Model Fragment Shader"),
        source: wgpu::ShaderSource::Wgsl(load_source(fragment_path)?.into()),
    };

    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Model Pipeline Layout"),
        bind_group_layouts: &[Some(uniform_layout), Some(texture_layout)],
        immediate_size: 0,
    });

    let render_pipeline = mk_render_pipeline(
        device,
        &render_pipeline_layout,
        color_format,
        Some(wgpu::BlendState {
            alpha: wgpu::BlendComponent::REPLACE,
            color: wgpu::BlendComponent::REPLACE,
        }),
        Some(Texture::DEPTH_FORMAT),
        &[ModelVertex::desc()],
        vertex,
        fragment,
    );

    // the light never changes after creation but is re-uploaded with every frame's transforms
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Model Uniform Buffer"),
        contents: bytemuck::bytes_of(&ModelUniforms {
            transform: bytemuck::Zeroable::zeroed(),
            light,
        }),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout: uniform_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
        label: Some("model_uniform_bind_group"),
    });

    Ok(ModelShader {
        render_pipeline,
        uniform_buffer,
        uniform_bind_group,
    })
}

#[allow(clippy::too_many_arguments)]
pub fn mk_render_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    color_format: wgpu::TextureFormat,
    blend: Option<wgpu::BlendState>,
    depth_format: Option<wgpu::TextureFormat>,
    vertex_layouts: &[wgpu::VertexBufferLayout],
    vertex: wgpu::ShaderModuleDescriptor,
    fragment: wgpu::ShaderModuleDescriptor,
) -> wgpu::RenderPipeline {
    let vertex = device.create_shader_module(vertex);
    let fragment = device.create_shader_module(fragment);

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        cache: None,
        label: Some("Model Render Pipeline"),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: &vertex,
            entry_point: Some("vs_main"),
            buffers: vertex_layouts,
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format: color_format,
                blend,
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: depth_format.map(|format| wgpu::DepthStencilState {
            format,
            depth_write_enabled: Some(true),
            depth_compare: Some(wgpu::CompareFunction::Less),
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview_mask: None,
    })
}
