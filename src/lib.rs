//! model-ngin
//!
//! A small wgpu demo that imports 3D models (OBJ/MTL and glTF) and renders
//! them with a single directional light. Model loading goes through an
//! importer-independent scene graph, and rendering goes through backend traits
//! so the load and draw paths can be exercised without a GPU.
//!
//! High-level modules
//! - `app`: the viewer window and event loop
//! - `camera`: fly camera, projection and the input controller
//! - `config`: viewer, lighting, texture and model configuration
//! - `context`: the wgpu device/surface and its render backend
//! - `data_structures`: scene graph, meshes, textures and models
//! - `pipelines`: the model render pipeline and its uniforms
//! - `render`: the backend traits models load and draw through
//! - `resources`: asset import, post-processing and texture resolution
//!

pub mod app;
pub mod camera;
pub mod config;
pub mod context;
pub mod data_structures;
pub mod pipelines;
pub mod render;
pub mod resources;

pub use app::run;
pub use config::ViewerConfig;
pub use data_structures::model::Model;
