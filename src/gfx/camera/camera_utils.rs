use cgmath::{Deg, Matrix4, Point3, Vector3};
use winit::event::WindowEvent;

use super::{camera_controller::CameraController, orbit_camera::Camera, projection::Projection};
use crate::wgpu_utils::UniformBlock;

/// Bytes in one column-major 4x4 `f32` matrix
pub const MATRIX_SIZE: u64 = std::mem::size_of::<[[f32; 4]; 4]>() as u64;
/// Byte offset of the view matrix inside the camera block
pub const VIEW_OFFSET: u64 = 0;
/// Byte offset of the projection matrix inside the camera block
pub const PROJECTION_OFFSET: u64 = MATRIX_SIZE;
/// Total size of the camera block
pub const CAMERA_BLOCK_SIZE: u64 = 2 * MATRIX_SIZE;

#[repr(C)]
#[derive(Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable, Debug)]
pub struct CameraUniform {
    /// World to view transform, bytes `[0, 64)` of the block.
    pub view: [[f32; 4]; 4],

    /// View to clip transform, bytes `[64, 128)` of the block.
    pub projection: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new(view: Matrix4<f32>, projection: Matrix4<f32>) -> Self {
        Self {
            view: view.into(),
            projection: projection.into(),
        }
    }
}

/// View matrices the camera can be snapped to
pub fn default_view_presets() -> Vec<Matrix4<f32>> {
    vec![
        Matrix4::look_at_rh(
            Point3::new(5.0, 5.0, 5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        ),
        Matrix4::look_at_rh(
            Point3::new(-5.0, -5.0, -5.0),
            Point3::new(0.0, 0.0, 0.0),
            Vector3::unit_y(),
        ),
    ]
}

/// Orthographic and perspective projections to toggle between
pub fn default_projection_presets(aspect: f32) -> (Projection, Projection) {
    (
        Projection::orthographic(-2.0, 2.0, -2.0, 2.0, 1.0, 10.0).with_aspect(aspect),
        Projection::perspective(Deg(30.0), aspect, 1.0, 50.0),
    )
}

/// Owns the active camera, its input controller and the view/projection presets
pub struct CameraManager<B: UniformBlock> {
    pub camera: Camera<B>,
    pub controller: CameraController,
    view_presets: Vec<Matrix4<f32>>,
    active_view: usize,
    orthographic: Projection,
    perspective: Projection,
}

impl<B: UniformBlock> CameraManager<B> {
    pub fn new(camera: Camera<B>, controller: CameraController) -> Self {
        let (orthographic, perspective) = default_projection_presets(4.0 / 3.0);
        let (orthographic, perspective) = match camera.projection() {
            Some(p @ Projection::Orthographic { .. }) => (p, perspective),
            Some(p @ Projection::Perspective { .. }) => (orthographic, p),
            None => (orthographic, perspective),
        };

        let mut manager = Self {
            camera,
            controller,
            view_presets: default_view_presets(),
            active_view: 0,
            orthographic,
            perspective,
        };
        manager.apply_active_view();
        manager
    }

    pub fn with_view_presets(mut self, presets: Vec<Matrix4<f32>>) -> Self {
        self.view_presets = presets;
        self.active_view = 0;
        self.apply_active_view();
        self
    }

    fn apply_active_view(&mut self) {
        if let Some(view) = self.view_presets.get(self.active_view) {
            self.camera.set_view_matrix(*view);
        }
    }

    /// Feeds a window event to the controller; returns true if the camera used it.
    pub fn process_event(&mut self, event: &WindowEvent) -> bool {
        self.controller.process_event(event, &mut self.camera)
    }

    /// Snaps the camera to the next view preset
    pub fn switch_view(&mut self) {
        if self.view_presets.is_empty() {
            return;
        }
        self.active_view = (self.active_view + 1) % self.view_presets.len();
        log::info!("switching to view preset {}", self.active_view);
        self.apply_active_view();
    }

    /// Swaps between the orthographic and perspective presets, remembering
    /// zoom and aspect of the one being left.
    pub fn toggle_projection(&mut self) {
        let current = self.camera.projection();
        if self.camera.is_perspective() {
            if let Some(p) = current {
                self.perspective = p;
            }
            log::info!("switching to orthographic projection");
            self.camera.set_projection(self.orthographic);
        } else {
            if let Some(p) = current {
                self.orthographic = p;
            }
            log::info!("switching to perspective projection");
            self.camera.set_projection(self.perspective);
        }
    }

    /// Keeps both presets and the live camera at the window's aspect ratio
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let aspect = width as f32 / height as f32;
        self.orthographic = self.orthographic.with_aspect(aspect);
        self.perspective = self.perspective.with_aspect(aspect);
        self.camera.resize(width, height);
    }

    pub fn active_view(&self) -> usize {
        self.active_view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::camera::CameraSettings;

    fn manager() -> CameraManager<crate::wgpu_utils::HostUniformBlock> {
        CameraManager::new(
            Camera::headless(CameraSettings::default()),
            CameraController::default(),
        )
    }

    #[test]
    fn test_uniform_matches_block_size() {
        assert_eq!(std::mem::size_of::<CameraUniform>() as u64, CAMERA_BLOCK_SIZE);
        assert_eq!(CAMERA_BLOCK_SIZE, 128);
        assert_eq!(PROJECTION_OFFSET, 64);
    }

    #[test]
    fn test_switch_view_cycles_presets() {
        let mut manager = manager();
        let presets = default_view_presets();
        assert_eq!(manager.camera.view_matrix(), presets[0]);
        manager.switch_view();
        assert_eq!(manager.active_view(), 1);
        assert_eq!(manager.camera.view_matrix(), presets[1]);
        manager.switch_view();
        assert_eq!(manager.active_view(), 0);
        assert_eq!(manager.camera.view_matrix(), presets[0]);
    }

    #[test]
    fn test_toggle_projection_remembers_zoom() {
        let mut manager = manager();
        manager.toggle_projection();
        assert!(!manager.camera.is_perspective());

        manager.camera.on_scroll(2.0);
        let zoomed = manager.camera.projection();

        manager.toggle_projection();
        assert!(manager.camera.is_perspective());
        manager.toggle_projection();
        assert_eq!(manager.camera.projection(), zoomed);
    }
}
