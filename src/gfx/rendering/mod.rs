//! GPU side of the demo: meshes, per-node uniforms, pipeline and frame loop.

pub mod mesh_library;
pub mod object_uniforms;
pub mod pipeline;
pub mod render_engine;
pub mod texture_resource;

pub use mesh_library::{DrawMesh, GpuMesh, MeshLibrary, ShapeMeshes};
pub use object_uniforms::{DrawList, ObjectUniform, ObjectUniformBuffer};
pub use pipeline::PipelineConfig;
pub use render_engine::RenderEngine;
pub use texture_resource::DepthTexture;
