//! # Graphics
//!
//! - [`camera`] - quaternion orbit camera, its input controller and presets
//! - [`scene`] - scene graph and mesh data
//! - [`transform`] - TRS decomposition and interpolation
//! - [`tangram`] - the seven-piece tangram scene and its assembly animation
//! - [`rendering`] - wgpu renderer

pub mod camera;
pub mod rendering;
pub mod scene;
pub mod tangram;
pub mod transform;

pub use camera::{Camera, CameraManager, Projection};
pub use rendering::RenderEngine;
pub use scene::{NodeId, SceneGraph, SceneNode};
