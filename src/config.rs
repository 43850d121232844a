//! Viewer configuration.
//!
//! Everything the demo used to hard-code (light setup, texture locations, the
//! models to show) is a plain value here. Every section implements `Default`
//! with the built-in demo values, and a TOML file can override any subset of
//! them.
//!
//! ```toml
//! [window]
//! width = 1280
//! height = 720
//!
//! [lighting.directional]
//! ambient_intensity = 0.3
//!
//! [[models]]
//! asset = "../Models/house.obj"
//! position = [0.0, 0.0, -5.0]
//! scale = [0.1, 0.1, 0.1]
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::resources::ImportOptions;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectionalLight {
    pub colour: [f32; 3],
    pub ambient_intensity: f32,
    pub direction: [f32; 3],
    pub diffuse_intensity: f32,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            colour: [1.0, 1.0, 1.0],
            ambient_intensity: 0.2,
            direction: [0.0, 0.0, -1.0],
            diffuse_intensity: 1.2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecularLight {
    pub intensity: f32,
    pub power: f32,
}

impl Default for SpecularLight {
    fn default() -> Self {
        Self {
            intensity: 1.5,
            power: 25.0,
        }
    }
}

/// The single light every model's shader is built with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub directional: DirectionalLight,
    pub specular: SpecularLight,
}

/// Where material textures are looked up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub directory: PathBuf,
    /// Loaded for materials without a diffuse texture.
    pub default_texture: PathBuf,
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("../Textures"),
            default_texture: PathBuf::from("../Textures/pjan.png"),
        }
    }
}

/// Everything needed to construct one model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelDesc {
    pub asset: PathBuf,
    #[serde(default = "default_vertex_shader")]
    pub vertex_shader: PathBuf,
    #[serde(default = "default_fragment_shader")]
    pub fragment_shader: PathBuf,
    #[serde(default)]
    pub position: [f32; 3],
    #[serde(default = "unit_scale")]
    pub scale: [f32; 3],
    #[serde(default)]
    pub import: ImportOptions,
}

impl ModelDesc {
    pub fn new(asset: impl Into<PathBuf>) -> Self {
        Self {
            asset: asset.into(),
            vertex_shader: default_vertex_shader(),
            fragment_shader: default_fragment_shader(),
            position: [0.0; 3],
            scale: unit_scale(),
            import: ImportOptions::default(),
        }
    }

    pub fn with_shaders(
        mut self,
        vertex_shader: impl Into<PathBuf>,
        fragment_shader: impl Into<PathBuf>,
    ) -> Self {
        self.vertex_shader = vertex_shader.into();
        self.fragment_shader = fragment_shader.into();
        self
    }

    pub fn with_transform(mut self, position: [f32; 3], scale: [f32; 3]) -> Self {
        self.position = position;
        self.scale = scale;
        self
    }
}

fn default_vertex_shader() -> PathBuf {
    PathBuf::from("assets/shaders/model_vertex.wgsl")
}

fn default_fragment_shader() -> PathBuf {
    PathBuf::from("assets/shaders/model_fragment.wgsl")
}

fn unit_scale() -> [f32; 3] {
    [1.0; 3]
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_colour: [f64; 4],
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "model-ngin".to_string(),
            width: 1280,
            height: 720,
            clear_colour: [0.1, 0.1, 0.12, 1.0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    /// Degrees, 0 looks down +x and -90 down -z.
    pub yaw: f32,
    pub pitch: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 5.0],
            yaw: -90.0,
            pitch: 0.0,
            fovy: 45.0,
            znear: 0.1,
            zfar: 500.0,
            speed: 5.0,
            sensitivity: 0.4,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub textures: TextureConfig,
    pub models: Vec<ModelDesc>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            textures: TextureConfig::default(),
            models: vec![
                ModelDesc::new("../Models/model.obj")
                    .with_transform([0.0, -1.0, 0.0], [1.0, 1.0, 1.0]),
            ],
        }
    }
}

impl ViewerConfig {
    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading viewer config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("parsing viewer config {}", path.display()))
    }
}
