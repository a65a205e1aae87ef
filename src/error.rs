//! Error type shared by the whole crate.
//!
//! GPU and window-system failures end the demo: they travel up to the binary,
//! which logs them and exits. Malformed numeric input (zoom bounds, radius
//! limits, interpolation factors) is corrected in place and never shows up here.

use std::path::PathBuf;

use crate::gfx::scene::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can be returned from this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to load mesh {path:?}: {source}")]
    MeshLoad {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },
    #[error("mesh {path:?} contains no geometry")]
    EmptyMesh { path: PathBuf },
    #[error("failed to create rendering surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),
    #[error("no suitable graphics adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("failed to open graphics device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported texture formats")]
    NoSurfaceFormat,
    #[error("failed to acquire the next frame: {0}")]
    Frame(#[from] wgpu::SurfaceError),
    #[error(transparent)]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    #[error("scene node {0:?} does not exist")]
    UnknownNode(NodeId),
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    SceneCycle { parent: NodeId, child: NodeId },
}
