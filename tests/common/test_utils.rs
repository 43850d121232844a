#![allow(dead_code)]

use std::path::{Path, PathBuf};

use model_ngin::{
    camera::{Camera, Projection},
    config::{LightingConfig, ModelDesc, TextureConfig},
    data_structures::{mesh::MeshData, model::Model},
    pipelines::light::ModelUniforms,
    render::{DrawModel, RenderBackend},
    resources::texture::TextureSource,
};

pub(crate) fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub(crate) fn texture_config() -> TextureConfig {
    TextureConfig {
        directory: PathBuf::from("textures"),
        default_texture: PathBuf::from("textures/default.png"),
    }
}

pub(crate) fn camera() -> Camera {
    Camera::new(
        (0.0, 1.0, 5.0),
        cgmath::Deg(-90.0),
        cgmath::Deg(0.0),
        Projection::new(800, 600, cgmath::Deg(45.0), 0.1, 100.0),
    )
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RecordedShader {
    pub(crate) vertex: PathBuf,
    pub(crate) fragment: PathBuf,
    pub(crate) lighting: LightingConfig,
}

/// Keeps everything a model asks for so tests can inspect it afterwards.
/// Meshes are handed out as indices into `meshes`.
#[derive(Debug, Default)]
pub(crate) struct RecordingBackend {
    pub(crate) meshes: Vec<MeshData>,
    pub(crate) textures: Vec<TextureSource>,
    pub(crate) shaders: Vec<RecordedShader>,
    /// Texture loads for these sources fail.
    pub(crate) unreadable: Vec<TextureSource>,
    pub(crate) fail_shaders: bool,
}

impl RecordingBackend {
    pub(crate) fn load(&mut self, desc: &ModelDesc) -> Model<Self> {
        Model::new(self, desc, &LightingConfig::default(), &texture_config())
            .expect("recording shaders always compile")
    }
}

impl RenderBackend for RecordingBackend {
    type Mesh = usize;
    type Texture = TextureSource;
    type Shader = RecordedShader;

    fn create_mesh(&mut self, data: &MeshData) -> usize {
        self.meshes.push(data.clone());
        self.meshes.len() - 1
    }

    fn load_texture(&mut self, source: &TextureSource) -> Option<TextureSource> {
        self.textures.push(source.clone());
        (!self.unreadable.contains(source)).then(|| source.clone())
    }

    fn create_shader(
        &mut self,
        vertex: &Path,
        fragment: &Path,
        lighting: &LightingConfig,
    ) -> anyhow::Result<RecordedShader> {
        if self.fail_shaders {
            anyhow::bail!("cannot compile {}", vertex.display());
        }
        let shader = RecordedShader {
            vertex: vertex.to_path_buf(),
            fragment: fragment.to_path_buf(),
            lighting: *lighting,
        };
        self.shaders.push(shader.clone());
        Ok(shader)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Call {
    UseShader,
    Uniforms(ModelUniforms),
    Bind(u32, TextureSource),
    Unbind(u32, TextureSource),
    Draw(usize),
    UnuseShader,
}

#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub(crate) calls: Vec<Call>,
}

impl Recorder {
    pub(crate) fn draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Draw(_)))
            .count()
    }

    pub(crate) fn binds(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, Call::Bind(..)))
            .count()
    }

    pub(crate) fn uniforms(&self) -> Vec<ModelUniforms> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Uniforms(u) => Some(*u),
                _ => None,
            })
            .collect()
    }
}

impl DrawModel<RecordingBackend> for Recorder {
    fn use_shader(&mut self, _: &RecordedShader) {
        self.calls.push(Call::UseShader);
    }

    fn upload_uniforms(&mut self, _: &RecordedShader, uniforms: &ModelUniforms) {
        self.calls.push(Call::Uniforms(*uniforms));
    }

    fn bind_texture(&mut self, unit: u32, texture: &TextureSource) {
        self.calls.push(Call::Bind(unit, texture.clone()));
    }

    fn unbind_texture(&mut self, unit: u32, texture: &TextureSource) {
        self.calls.push(Call::Unbind(unit, texture.clone()));
    }

    fn draw_mesh(&mut self, mesh: &usize) {
        self.calls.push(Call::Draw(*mesh));
    }

    fn unuse_shader(&mut self, _: &RecordedShader) {
        self.calls.push(Call::UnuseShader);
    }
}
