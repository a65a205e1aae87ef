//! # Scene
//!
//! Scene graph and the geometry its nodes refer to.
//!
//! - [`SceneGraph`] - arena of [`SceneNode`]s with cached world transforms
//! - [`MeshData`] - CPU geometry, loaded from OBJ files or built from a [`ShapeKind`]
//! - [`Vertex3D`] - the GPU vertex format

pub mod graph;
pub mod mesh;
pub mod shape;
pub mod vertex;

pub use graph::{NodeId, NodeRenderer, SceneGraph, SceneNode};
pub use mesh::{Indices, MeshData, MeshId, VertexAttributes};
pub use shape::ShapeKind;
pub use vertex::Vertex3D;
