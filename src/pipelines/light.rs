//! Uniform data uploaded once per model per frame.

use crate::{camera::Camera, config::LightingConfig};

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformUniform {
    pub model: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub eye_position: [f32; 3],
    // Due to uniforms requiring 16 byte (4 float) spacing, we need to use a padding field here
    _padding: u32,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LightUniform {
    pub colour: [f32; 3],
    pub ambient_intensity: f32,
    pub direction: [f32; 3],
    pub diffuse_intensity: f32,
    pub specular_intensity: f32,
    pub specular_power: f32,
    _padding: [u32; 2],
}

impl From<&LightingConfig> for LightUniform {
    fn from(lighting: &LightingConfig) -> Self {
        Self {
            colour: lighting.directional.colour,
            ambient_intensity: lighting.directional.ambient_intensity,
            direction: lighting.directional.direction,
            diffuse_intensity: lighting.directional.diffuse_intensity,
            specular_intensity: lighting.specular.intensity,
            specular_power: lighting.specular.power,
            _padding: [0; 2],
        }
    }
}

/// Layout of the model shader's bind group 0.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelUniforms {
    pub transform: TransformUniform,
    pub light: LightUniform,
}

impl ModelUniforms {
    pub fn new(world: cgmath::Matrix4<f32>, camera: &Camera, light: LightUniform) -> Self {
        let eye = camera.position();
        Self {
            transform: TransformUniform {
                model: world.into(),
                view: camera.view_matrix().into(),
                projection: camera.projection_matrix().into(),
                eye_position: [eye.x, eye.y, eye.z],
                _padding: 0,
            },
            light,
        }
    }
}
