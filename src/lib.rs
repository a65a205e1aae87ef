//! Orbit camera, scene graph and tangram demo on wgpu and winit.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod wgpu_utils;

pub use app::TangramApp;
pub use config::AppConfig;
pub use error::{Error, Result};
