pub mod camera_controller;
pub mod camera_utils;
pub mod orbit_camera;
pub mod projection;

// Re-export main types
pub use camera_controller::CameraController;
pub use camera_utils::{CameraManager, CameraUniform, CAMERA_BLOCK_SIZE};
pub use orbit_camera::{Camera, CameraSettings, DragState};
pub use projection::Projection;
