//! A renderable model: the meshes, textures and shader built from one asset.
//!
//! Loading happens once, at construction. The asset is imported into a
//! [`Scene`], the node tree is walked depth first, and every referenced mesh
//! becomes one GPU mesh plus one entry in the mesh-to-texture mapping. Every
//! material becomes one texture slot. Import failures are logged and leave an
//! empty model that renders nothing.

use cgmath::{Matrix4, Vector3};

use crate::{
    camera::Camera,
    config::{LightingConfig, ModelDesc, TextureConfig},
    data_structures::{mesh::MeshData, scene::Scene},
    pipelines::light::{LightUniform, ModelUniforms},
    render::{DrawModel, RenderBackend},
    resources::{self, texture},
};

/// Texture unit the diffuse texture is bound to.
pub const DIFFUSE_UNIT: u32 = 0;

/// `translate(position) * scale(scale)`; models are never rotated.
pub fn world_transform(position: [f32; 3], scale: [f32; 3]) -> Matrix4<f32> {
    Matrix4::from_translation(Vector3::from(position))
        * Matrix4::from_nonuniform_scale(scale[0], scale[1], scale[2])
}

/// One imported asset, uploaded through a [`RenderBackend`] and drawn with its own shader.
pub struct Model<B: RenderBackend> {
    desc: ModelDesc,
    shader: B::Shader,
    light: LightUniform,
    meshes: Vec<B::Mesh>,
    textures: Vec<Option<B::Texture>>,
    mesh_to_tex: Vec<usize>,
    world: Matrix4<f32>,
}

impl<B: RenderBackend> Model<B> {
    /// Builds the shader, then imports and uploads `desc.asset`.
    ///
    /// Only a shader failure is returned as an error. An asset that cannot be
    /// imported is logged and yields a model without meshes.
    pub fn new(
        backend: &mut B,
        desc: &ModelDesc,
        lighting: &LightingConfig,
        textures: &TextureConfig,
    ) -> anyhow::Result<Self> {
        let mut model = Self::empty(backend, desc, lighting)?;
        match resources::import_scene(&desc.asset, &desc.import) {
            Ok(scene) => model.load(backend, &scene, textures),
            Err(e) => log::error!("Cannot load model {}: {}", desc.asset.display(), e),
        }
        Ok(model)
    }

    /// Like [`Model::new`], but for a scene that was already imported.
    ///
    /// Meshes without a material get the default texture.
    pub fn from_scene(
        backend: &mut B,
        desc: &ModelDesc,
        lighting: &LightingConfig,
        scene: &Scene,
        textures: &TextureConfig,
    ) -> anyhow::Result<Self> {
        let mut model = Self::empty(backend, desc, lighting)?;
        let mut scene = scene.clone();
        scene.assign_fallback_material();
        model.load(backend, &scene, textures);
        Ok(model)
    }

    fn empty(backend: &mut B, desc: &ModelDesc, lighting: &LightingConfig) -> anyhow::Result<Self> {
        let shader = backend.create_shader(&desc.vertex_shader, &desc.fragment_shader, lighting)?;
        Ok(Self {
            desc: desc.clone(),
            shader,
            light: LightUniform::from(lighting),
            meshes: Vec::new(),
            textures: Vec::new(),
            mesh_to_tex: Vec::new(),
            world: world_transform(desc.position, desc.scale),
        })
    }

    fn load(&mut self, backend: &mut B, scene: &Scene, textures: &TextureConfig) {
        for mesh_index in scene.mesh_references() {
            let Some(mesh) = scene.meshes.get(mesh_index) else {
                log::warn!(
                    "{}: node references mesh {} of {}",
                    self.desc.asset.display(),
                    mesh_index,
                    scene.meshes.len()
                );
                continue;
            };
            let data = MeshData::from_scene_mesh(mesh);
            self.meshes.push(backend.create_mesh(&data));
            // every mesh has a material once the fallback is assigned
            let slot = mesh.material_index.unwrap_or(scene.materials.len());
            self.mesh_to_tex.push(slot);
        }

        self.textures = scene
            .materials
            .iter()
            .map(|material| backend.load_texture(&texture::resolve(material, textures)))
            .collect();

        log::debug!(
            "{}: {} meshes, {} of {} textures loaded",
            self.desc.asset.display(),
            self.meshes.len(),
            self.textures.iter().flatten().count(),
            self.textures.len()
        );
    }

    /// Issues this model's commands for one frame.
    ///
    /// The camera is only borrowed for the call. A mesh whose mapped texture
    /// slot is out of range or empty is drawn without binding anything.
    pub fn render<T: DrawModel<B>>(&self, camera: &Camera, target: &mut T) {
        target.use_shader(&self.shader);
        target.upload_uniforms(
            &self.shader,
            &ModelUniforms::new(self.world, camera, self.light),
        );

        for (mesh, &tex) in self.meshes.iter().zip(&self.mesh_to_tex) {
            let texture = self.texture(tex);
            if let Some(texture) = texture {
                target.bind_texture(DIFFUSE_UNIT, texture);
            }
            target.draw_mesh(mesh);
            if let Some(texture) = texture {
                target.unbind_texture(DIFFUSE_UNIT, texture);
            }
        }

        target.unuse_shader(&self.shader);
    }

    fn texture(&self, index: usize) -> Option<&B::Texture> {
        self.textures.get(index).and_then(Option::as_ref)
    }

    pub fn desc(&self) -> &ModelDesc {
        &self.desc
    }

    pub fn shader(&self) -> &B::Shader {
        &self.shader
    }

    pub fn meshes(&self) -> &[B::Mesh] {
        &self.meshes
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn textures(&self) -> &[Option<B::Texture>] {
        &self.textures
    }

    pub fn mesh_to_tex(&self) -> &[usize] {
        &self.mesh_to_tex
    }

    pub fn world(&self) -> Matrix4<f32> {
        self.world
    }
}
