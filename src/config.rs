use std::path::PathBuf;

use crate::gfx::camera::CameraSettings;

/// Settings for the tangram demo window, renderer and camera
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Binding slot of the camera block inside bind group 0
    pub camera_binding: u32,
    pub camera: CameraSettings,
    /// Start in the orthographic preset instead of perspective
    pub orthographic: bool,
    pub clear_color: [f64; 4],
    /// Seconds for a full assembly run
    pub assembly_duration: f32,
    /// Optional OBJ drawn beside the tangram
    pub mesh_path: Option<PathBuf>,
    pub present_mode: wgpu::PresentMode,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Tangram".to_string(),
            width: 800,
            height: 600,
            camera_binding: 0,
            camera: CameraSettings::default(),
            orthographic: false,
            clear_color: [0.1, 0.1, 0.1, 1.0],
            assembly_duration: 1.5,
            mesh_path: None,
            present_mode: wgpu::PresentMode::AutoVsync,
        }
    }
}

impl AppConfig {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Zero dimensions are raised to one pixel
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_camera_binding(mut self, binding: u32) -> Self {
        self.camera_binding = binding;
        self
    }

    pub fn with_camera(mut self, camera: CameraSettings) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_orthographic(mut self, orthographic: bool) -> Self {
        self.orthographic = orthographic;
        self
    }

    pub fn with_clear_color(mut self, color: [f64; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn with_assembly_duration(mut self, seconds: f32) -> Self {
        self.assembly_duration = seconds;
        self
    }

    pub fn with_mesh(mut self, path: impl Into<PathBuf>) -> Self {
        self.mesh_path = Some(path.into());
        self
    }

    pub fn with_present_mode(mut self, present_mode: wgpu::PresentMode) -> Self {
        self.present_mode = present_mode;
        self
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders_override_defaults() {
        let config = AppConfig::default()
            .with_size(0, 300)
            .with_camera_binding(2)
            .with_mesh("assets/tangram.obj")
            .with_orthographic(true);

        assert_eq!((config.width, config.height), (1, 300));
        assert_eq!(config.camera_binding, 2);
        assert_eq!(config.mesh_path, Some(PathBuf::from("assets/tangram.obj")));
        assert!(config.orthographic);
        assert_eq!(config.title, "Tangram");
    }

    #[test]
    fn test_default_aspect() {
        assert!((AppConfig::default().aspect() - 4.0 / 3.0).abs() < 1e-6);
    }
}
