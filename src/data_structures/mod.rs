//! Model data: the imported scene graph, CPU/GPU meshes, textures and the
//! [`model::Model`] that ties them together.
//!
//! - `scene` is the importer-independent scene graph
//! - `mesh` holds the interleaved vertex layout and GPU mesh buffers
//! - `texture` wraps GPU textures and diffuse materials
//! - `model` loads a scene into meshes and textures and renders it

pub mod mesh;
pub mod model;
pub mod scene;
pub mod texture;
