//! The model render pipeline and the uniforms it consumes.

pub mod light;
pub mod model;
