use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};

use super::orbit_camera::Camera;
use crate::wgpu_utils::UniformBlock;

/// Pixel scroll deltas (touchpads) are scaled down to wheel lines
const PIXELS_PER_LINE: f32 = 100.0;

/// Translates winit pointer events into orbit camera calls
///
/// Left-button drags rotate, the wheel zooms. The controller only tracks the
/// button and cursor; rotation state lives in the camera's drag state machine.
#[derive(Debug, Default)]
pub struct CameraController {
    is_mouse_pressed: bool,
    cursor: Option<(f64, f64)>,
}

impl CameraController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the event was consumed by the camera
    pub fn process_event<B: UniformBlock>(&mut self, event: &WindowEvent, camera: &mut Camera<B>) -> bool {
        match event {
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.is_mouse_pressed = *state == ElementState::Pressed;
                if !self.is_mouse_pressed {
                    let (x, y) = self.cursor.unwrap_or_default();
                    camera.on_pointer_drag(false, x, y);
                }
                true
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Some((position.x, position.y));
                camera.on_pointer_drag(self.is_mouse_pressed, position.x, position.y);
                self.is_mouse_pressed
            }
            WindowEvent::CursorLeft { .. } => {
                // Button releases outside the window are never delivered
                self.is_mouse_pressed = false;
                self.cursor = None;
                camera.on_pointer_drag(false, 0.0, 0.0);
                false
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
                };
                camera.on_scroll(lines);
                true
            }
            _ => false,
        }
    }

    /// Returns true while the drag button is held
    pub fn is_rotating(&self) -> bool {
        self.is_mouse_pressed
    }
}
