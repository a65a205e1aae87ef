// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Provides the uniform block abstraction the camera writes through, plus
//! binding type shorthands.

pub mod binding_types;
pub mod uniform_buffer;

// Re-export main types
pub use uniform_buffer::{uniform_block_layout, GpuUniformBlock, HostUniformBlock, UniformBlock};
