use cgmath::*;

use super::{
    camera_utils::{CameraUniform, CAMERA_BLOCK_SIZE, PROJECTION_OFFSET, VIEW_OFFSET},
    projection::Projection,
};
use crate::wgpu_utils::{GpuUniformBlock, HostUniformBlock, UniformBlock};

/// Tuning and limits for an orbit [`Camera`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSettings {
    /// Degrees of rotation per pixel of pointer drag
    pub rotate_sensitivity: f32,
    /// Radius change (perspective) or log zoom (orthographic) per scroll line
    pub zoom_sensitivity: f32,
    pub min_radius: f32,
    /// May be `f32::INFINITY` for an open-ended orbit
    pub max_radius: f32,
    pub initial_radius: f32,
    pub min_ortho_extent: f32,
    pub max_ortho_extent: f32,
    pub projection: Projection,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            rotate_sensitivity: 0.1,
            zoom_sensitivity: 0.1,
            min_radius: 0.5,
            max_radius: 100.0,
            initial_radius: 5.0,
            min_ortho_extent: 0.05,
            max_ortho_extent: 1000.0,
            projection: Projection::default(),
        }
    }
}

impl CameraSettings {
    pub fn with_rotate_sensitivity(mut self, degrees_per_pixel: f32) -> Self {
        self.rotate_sensitivity = degrees_per_pixel;
        self
    }

    pub fn with_zoom_sensitivity(mut self, sensitivity: f32) -> Self {
        self.zoom_sensitivity = sensitivity;
        self
    }

    pub fn with_radius_bounds(mut self, min_radius: f32, max_radius: f32) -> Self {
        self.min_radius = min_radius;
        self.max_radius = max_radius;
        self
    }

    pub fn with_initial_radius(mut self, radius: f32) -> Self {
        self.initial_radius = radius;
        self
    }

    pub fn with_ortho_extent_bounds(mut self, min_extent: f32, max_extent: f32) -> Self {
        self.min_ortho_extent = min_extent;
        self.max_ortho_extent = max_extent;
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    /// Corrects degenerate limits instead of rejecting them.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        (self.min_radius, self.max_radius) =
            sanitized_bounds("radius", self.min_radius, self.max_radius, defaults.min_radius, defaults.max_radius);
        (self.min_ortho_extent, self.max_ortho_extent) = sanitized_bounds(
            "orthographic extent",
            self.min_ortho_extent,
            self.max_ortho_extent,
            defaults.min_ortho_extent,
            defaults.max_ortho_extent,
        );

        if !self.initial_radius.is_finite() {
            self.initial_radius = defaults.initial_radius;
        }
        if !self.rotate_sensitivity.is_finite() {
            self.rotate_sensitivity = defaults.rotate_sensitivity;
        }
        if !self.zoom_sensitivity.is_finite() {
            self.zoom_sensitivity = defaults.zoom_sensitivity;
        }
        self
    }
}

/// Orders a `[min, max]` pair and keeps the minimum finite and positive.
///
/// A NaN maximum means unbounded. A maximum left below the corrected minimum
/// falls back to `default_max`, or to unbounded if that is too small as well.
fn sanitized_bounds(what: &str, mut min: f32, mut max: f32, default_min: f32, default_max: f32) -> (f32, f32) {
    if max.is_nan() {
        max = f32::INFINITY;
    }
    if min > max {
        log::warn!("{} bounds [{}, {}] reversed", what, min, max);
        std::mem::swap(&mut min, &mut max);
    }
    if !(min.is_finite() && min > 0.0) {
        log::warn!("invalid minimum {} {}, using {}", what, min, default_min);
        min = default_min;
    }
    if max < min {
        log::warn!("maximum {} {} below minimum {}", what, max, min);
        max = if default_max >= min { default_max } else { f32::INFINITY };
    }
    (min, max)
}

/// Pointer interaction state of the orbit camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { last_x: f64, last_y: f64 },
}

/// Orbit camera looking at the world origin
///
/// The camera sits at `radius` along its local `+Z` axis (forward is `-Z`,
/// up is `+Y`, both rotated by `orientation`). View and projection are
/// mirrored into a 128-byte uniform block: view at bytes `[0, 64)`,
/// projection at `[64, 128)`, both column-major `f32`.
pub struct Camera<B: UniformBlock = GpuUniformBlock> {
    block: B,
    settings: CameraSettings,
    orientation: Quaternion<f32>,
    radius: f32,
    position: Point3<f32>,
    view: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
    projection: Option<Projection>,
    perspective: bool,
    drag: DragState,
}

impl Camera<HostUniformBlock> {
    /// Camera backed by host memory instead of a GPU buffer
    pub fn headless(settings: CameraSettings) -> Self {
        Camera::new(HostUniformBlock::new(CAMERA_BLOCK_SIZE), settings)
    }
}

impl Camera<GpuUniformBlock> {
    /// Allocates the camera block on the GPU and binds it at `binding`.
    ///
    /// `layout` must describe a single uniform buffer at that binding.
    pub fn with_gpu(
        device: &wgpu::Device,
        queue: std::sync::Arc<wgpu::Queue>,
        layout: &wgpu::BindGroupLayout,
        binding: u32,
        settings: CameraSettings,
    ) -> Self {
        let block = GpuUniformBlock::new(device, queue, layout, binding, CAMERA_BLOCK_SIZE, "Camera");
        Camera::new(block, settings)
    }
}

impl<B: UniformBlock> Camera<B> {
    pub fn new(block: B, settings: CameraSettings) -> Self {
        debug_assert!(block.size() >= CAMERA_BLOCK_SIZE);

        let settings = settings.sanitized();
        let projection = settings.projection;
        let mut camera = Self {
            block,
            settings,
            orientation: Quaternion::new(1.0, 0.0, 0.0, 0.0),
            radius: settings
                .initial_radius
                .clamp(settings.min_radius, settings.max_radius),
            position: Point3::origin(), // Will be derived in `recompute_view_matrix()`.
            view: Matrix4::identity(),
            projection_matrix: projection.to_matrix(),
            projection: Some(projection),
            perspective: projection.is_perspective(),
            drag: DragState::Idle,
        };
        camera.upload_projection();
        camera.recompute_view_matrix();
        camera
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.view
    }

    /// Replaces the view matrix and re-derives the orbit state from it.
    ///
    /// Orientation comes from the camera-to-world rotation, the radius from the
    /// eye's distance to the origin (clamped), so later drags and scrolls
    /// continue from the imposed view. A singular matrix is stored and
    /// uploaded but leaves the orbit state untouched.
    pub fn set_view_matrix(&mut self, view: Matrix4<f32>) {
        self.view = view;

        match view.invert() {
            Some(camera_to_world) => {
                let axes = [
                    camera_to_world.x.truncate(),
                    camera_to_world.y.truncate(),
                    camera_to_world.z.truncate(),
                ];
                if axes.iter().all(|axis| axis.magnitude2() > f32::EPSILON) {
                    let rotation =
                        Matrix3::from_cols(axes[0].normalize(), axes[1].normalize(), axes[2].normalize());
                    self.orientation = Quaternion::from(rotation).normalize();
                }

                let eye = camera_to_world.w.truncate();
                self.position = Point3::from_vec(eye);
                self.radius = self.clamp_radius(eye.magnitude());
            }
            None => log::warn!("view matrix is not invertible, keeping previous orbit state"),
        }

        self.upload_view();
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.projection_matrix
    }

    /// Replaces the projection matrix and its mode flag.
    ///
    /// The projection parameters are recovered from the matrix so zooming and
    /// resizing keep working.
    pub fn set_projection_matrix(&mut self, projection: Matrix4<f32>, is_perspective: bool) {
        self.projection_matrix = projection;
        self.perspective = is_perspective;
        self.projection = Projection::from_matrix(&projection, is_perspective);
        if self.projection.is_none() {
            log::warn!("projection parameters cannot be recovered; zoom and resize disabled");
        }
        self.upload_projection();
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = Some(projection);
        self.perspective = projection.is_perspective();
        self.projection_matrix = projection.to_matrix();
        self.upload_projection();
    }

    pub fn projection(&self) -> Option<Projection> {
        self.projection
    }

    pub fn is_perspective(&self) -> bool {
        self.perspective
    }

    /// Pointer drag state machine.
    ///
    /// The first call with the button down only records the reference
    /// position. Each later call rotates by the delta since the previous one:
    /// yaw about world `+Y` on the left, pitch about local `+X` on the right.
    /// Releasing the button returns to idle and forgets the reference.
    pub fn on_pointer_drag(&mut self, button_down: bool, x: f64, y: f64) {
        if !button_down {
            self.drag = DragState::Idle;
            return;
        }
        if !(x.is_finite() && y.is_finite()) {
            return;
        }

        let (last_x, last_y) = match self.drag {
            DragState::Idle => {
                self.drag = DragState::Dragging { last_x: x, last_y: y };
                return;
            }
            DragState::Dragging { last_x, last_y } => (last_x, last_y),
        };
        self.drag = DragState::Dragging { last_x: x, last_y: y };

        // Screen y grows downwards
        let dx = (x - last_x) as f32;
        let dy = (last_y - y) as f32;
        if dx == 0.0 && dy == 0.0 {
            return;
        }

        let sensitivity = self.settings.rotate_sensitivity;
        let yaw = Quaternion::from_axis_angle(Vector3::unit_y(), Deg(-dx * sensitivity));
        let pitch = Quaternion::from_axis_angle(Vector3::unit_x(), Deg(-dy * sensitivity));
        self.orientation = (yaw * self.orientation * pitch).normalize();

        self.recompute_view_matrix();
    }

    /// Zooms by `delta_y` scroll lines; positive values zoom in.
    ///
    /// Perspective cameras move along the view axis within the radius bounds.
    /// Orthographic cameras keep their radius and rescale the view volume.
    pub fn on_scroll(&mut self, delta_y: f32) {
        if !delta_y.is_finite() {
            log::warn!("ignoring non-finite scroll delta {}", delta_y);
            return;
        }

        let zoom = -delta_y * self.settings.zoom_sensitivity;
        if self.perspective {
            self.radius = self.clamp_radius(self.radius + zoom);
            log::debug!("camera radius {}", self.radius);
            self.recompute_view_matrix();
        } else if let Some(projection) = self.projection {
            self.set_projection(projection.zoomed(
                zoom.exp(),
                self.settings.min_ortho_extent,
                self.settings.max_ortho_extent,
            ));
        }
    }

    /// Rebuilds the view matrix from orientation and radius and uploads it.
    pub fn recompute_view_matrix(&mut self) {
        let forward = self.orientation * -Vector3::unit_z();
        let up = self.orientation * Vector3::unit_y();

        self.position = Point3::from_vec(-forward * self.radius);
        self.view = Matrix4::look_at_rh(self.position, Point3::origin(), up);
        self.upload_view();
    }

    /// Adapts the projection to a new framebuffer size; zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        if let Some(projection) = self.projection {
            self.set_projection(projection.with_aspect(width as f32 / height as f32));
        }
    }

    /// Back to the canonical orientation and the configured radius
    pub fn reset(&mut self) {
        self.orientation = Quaternion::new(1.0, 0.0, 0.0, 0.0);
        self.radius = self.clamp_radius(self.settings.initial_radius);
        self.drag = DragState::Idle;
        self.recompute_view_matrix();
    }

    pub fn orientation(&self) -> Quaternion<f32> {
        self.orientation
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragState::Dragging { .. })
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn block(&self) -> &B {
        &self.block
    }

    /// CPU copy of what the uniform block holds
    pub fn uniform(&self) -> CameraUniform {
        CameraUniform::new(self.view, self.projection_matrix)
    }

    fn clamp_radius(&self, radius: f32) -> f32 {
        radius.clamp(self.settings.min_radius, self.settings.max_radius)
    }

    fn upload_view(&mut self) {
        let view: [[f32; 4]; 4] = self.view.into();
        self.block.write(VIEW_OFFSET, bytemuck::bytes_of(&view));
    }

    fn upload_projection(&mut self) {
        let projection: [[f32; 4]; 4] = self.projection_matrix.into();
        self.block.write(PROJECTION_OFFSET, bytemuck::bytes_of(&projection));
    }
}
