//! The seams between a [`Model`](crate::data_structures::model::Model) and the
//! graphics API.
//!
//! A model never talks to wgpu directly. Resource creation goes through a
//! [`RenderBackend`], and the per-frame command stream goes through a
//! [`DrawModel`] target. [`crate::context::Context`] and
//! [`crate::context::ModelPass`] are the wgpu implementations; tests plug in a
//! recorder instead.

use std::path::Path;

use crate::{
    config::LightingConfig, data_structures::mesh::MeshData, pipelines::light::ModelUniforms,
    resources::texture::TextureSource,
};

/// Creates the GPU resources a model owns.
pub trait RenderBackend {
    type Mesh;
    type Texture;
    type Shader;

    fn create_mesh(&mut self, data: &MeshData) -> Self::Mesh;

    /// Returns `None` when the texture cannot be loaded. The caller keeps an
    /// empty slot and draws the affected meshes untextured.
    fn load_texture(&mut self, source: &TextureSource) -> Option<Self::Texture>;

    /// Compiles the vertex/fragment pair for a model lit by `lighting`.
    fn create_shader(
        &mut self,
        vertex: &Path,
        fragment: &Path,
        lighting: &LightingConfig,
    ) -> anyhow::Result<Self::Shader>;
}

/// Receives the per-frame commands of a model, in issue order.
pub trait DrawModel<B: RenderBackend + ?Sized> {
    fn use_shader(&mut self, shader: &B::Shader);

    fn upload_uniforms(&mut self, shader: &B::Shader, uniforms: &ModelUniforms);

    fn bind_texture(&mut self, unit: u32, texture: &B::Texture);

    fn unbind_texture(&mut self, unit: u32, texture: &B::Texture);

    fn draw_mesh(&mut self, mesh: &B::Mesh);

    fn unuse_shader(&mut self, shader: &B::Shader);
}
