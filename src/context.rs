//! The wgpu side of model rendering.
//!
//! [`Context`] owns the surface, device and queue and is the
//! [`RenderBackend`] models are loaded through. [`ModelPass`] wraps an open
//! render pass and is the [`DrawModel`] target models render into.

use std::{ffi::OsStr, sync::Arc};

use anyhow::Context as _;
use winit::window::Window;

use crate::{
    config::LightingConfig,
    data_structures::{
        mesh::{Mesh, MeshData},
        texture::{self, Material, Texture},
    },
    pipelines::{
        light::{LightUniform, ModelUniforms},
        model::{self, ModelShader},
    },
    render::{DrawModel, RenderBackend},
    resources::texture::{TextureSource, load_binary},
};

/// Bind group index of texture unit 0.
const TEXTURE_GROUP: u32 = 1;

#[derive(Debug)]
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub clear_colour: wgpu::Color,
    pub uniform_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    /// Plain white, bound while a mesh has no texture of its own.
    pub fallback: Material,
}

impl Context {
    pub async fn new(window: Arc<Window>, clear_colour: wgpu::Color) -> anyhow::Result<Self> {
        let size = window.inner_size();

        log::info!("WGPU setup");
        let instance = wgpu::Instance::default();
        let surface = instance
            .create_surface(window.clone())
            .context("cannot create a surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow::anyhow!("no suitable graphics adapter: {}", e))?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::Performance,
                ..Default::default()
            })
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders write linear colour and rely on an sRGB surface for the conversion.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface is not supported by the adapter")?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        let uniform_layout = model::mk_uniform_bind_group_layout(&device);
        let texture_layout = texture::diffuse_layout(&device);
        let white = Texture::create_solid_colour([255; 4], "fallback_texture", &device, &queue);
        let fallback = Material::new(&device, "fallback_texture", white, &texture_layout);

        Ok(Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            clear_colour,
            uniform_layout,
            texture_layout,
            fallback,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    /// Reconfigures the surface and depth buffer. Zero-sized requests are ignored.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        true
    }
}

impl RenderBackend for Context {
    type Mesh = Mesh;
    type Texture = Material;
    type Shader = ModelShader;

    fn create_mesh(&mut self, data: &MeshData) -> Mesh {
        Mesh::new(&self.device, &data.name, data)
    }

    fn load_texture(&mut self, source: &TextureSource) -> Option<Material> {
        let label = source.label();
        let loaded = match source {
            TextureSource::File(path) | TextureSource::Default(path) => {
                load_binary(path).and_then(|bytes| {
                    let format = path.extension().and_then(OsStr::to_str);
                    Texture::from_bytes(&self.device, &self.queue, &bytes, &label, format)
                })
            }
            TextureSource::Embedded { bytes, format, .. } => {
                Texture::from_bytes(&self.device, &self.queue, bytes, &label, format.as_deref())
            }
        };
        match loaded {
            Ok(texture) => Some(Material::new(
                &self.device,
                &label,
                texture,
                &self.texture_layout,
            )),
            Err(e) => {
                log::warn!("Cannot load texture {}: {:#}", label, e);
                None
            }
        }
    }

    fn create_shader(
        &mut self,
        vertex: &std::path::Path,
        fragment: &std::path::Path,
        lighting: &LightingConfig,
    ) -> anyhow::Result<ModelShader> {
        Ok(model::mk_model_shader(
            &self.device,
            self.config.format,
            &self.uniform_layout,
            &self.texture_layout,
            vertex,
            fragment,
            LightUniform::from(lighting),
        )?)
    }
}

/// A render pass that models draw into.
pub struct ModelPass<'a, 'pass> {
    pub pass: &'a mut wgpu::RenderPass<'pass>,
    pub queue: &'a wgpu::Queue,
    pub fallback: &'a wgpu::BindGroup,
}

impl DrawModel<Context> for ModelPass<'_, '_> {
    fn use_shader(&mut self, shader: &ModelShader) {
        self.pass.set_pipeline(&shader.render_pipeline);
        self.pass.set_bind_group(0, &shader.uniform_bind_group, &[]);
        self.pass.set_bind_group(TEXTURE_GROUP, self.fallback, &[]);
    }

    fn upload_uniforms(&mut self, shader: &ModelShader, uniforms: &ModelUniforms) {
        self.queue
            .write_buffer(&shader.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    fn bind_texture(&mut self, unit: u32, texture: &Material) {
        self.pass
            .set_bind_group(TEXTURE_GROUP + unit, &texture.bind_group, &[]);
    }

    fn unbind_texture(&mut self, unit: u32, _texture: &Material) {
        self.pass
            .set_bind_group(TEXTURE_GROUP + unit, self.fallback, &[]);
    }

    fn draw_mesh(&mut self, mesh: &Mesh) {
        // empty buffers cannot be sliced
        if mesh.num_elements == 0 {
            return;
        }
        self.pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        self.pass
            .set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.pass.draw_indexed(0..mesh.num_elements, 0, 0..1);
    }

    fn unuse_shader(&mut self, _shader: &ModelShader) {
        // pipeline state ends with the pass
    }
}
