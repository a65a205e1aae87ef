use std::sync::Arc;
use std::time::Instant;

use cgmath::{Matrix4, Vector3};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::gfx::{
    camera::{camera_utils::default_projection_presets, CameraController, CameraManager},
    rendering::{GpuMesh, MeshLibrary, RenderEngine},
    scene::{MeshData, SceneGraph, SceneNode},
    tangram::{build_scene, AssemblyAnimation},
};
use crate::wgpu_utils::GpuUniformBlock;

/// Where the optional OBJ mesh sits relative to the tangram
const MESH_OFFSET: [f32; 3] = [2.5, 0.0, 0.0];
const MESH_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

/// Window, renderer and input loop of the tangram demo
pub struct TangramApp {
    event_loop: EventLoop<()>,
    app_state: AppState,
}

struct AppState {
    config: AppConfig,
    mesh_data: Option<MeshData>,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    error: Option<Error>,
    last_frame: Option<Instant>,
}

/// Everything that needs a device, created once the window exists.
///
/// Fields drop in order, so GPU buffers go before the engine and its device.
struct GpuState {
    meshes: MeshLibrary,
    camera_manager: CameraManager<GpuUniformBlock>,
    graph: SceneGraph,
    animation: AssemblyAnimation,
    render_engine: RenderEngine,
}

impl TangramApp {
    /// Creates the event loop and loads the configured OBJ mesh, if any.
    pub fn new(config: AppConfig) -> Result<Self> {
        let event_loop = EventLoop::new()?;
        let mesh_data = config
            .mesh_path
            .as_ref()
            .map(MeshData::load_obj)
            .transpose()?;

        Ok(Self {
            event_loop,
            app_state: AppState {
                config,
                mesh_data,
                window: None,
                gpu: None,
                error: None,
                last_frame: None,
            },
        })
    }

    /// Runs until the window closes. Initialisation and GPU failures end the
    /// loop and are returned.
    pub fn run(mut self) -> Result<()> {
        self.event_loop.set_control_flow(ControlFlow::Poll);
        self.event_loop.run_app(&mut self.app_state)?;

        match self.app_state.error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppState {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = Arc::new(
            event_loop.create_window(
                WindowAttributes::default()
                    .with_title(self.config.title.clone())
                    .with_inner_size(PhysicalSize::new(self.config.width, self.config.height)),
            )?,
        );
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let render_engine = pollster::block_on(RenderEngine::new(window, width, height, &self.config))?;

        let mut meshes = MeshLibrary::new();
        let shapes = meshes.upload_shapes(render_engine.device());

        let mut graph = SceneGraph::new();
        let tangram = build_scene(&mut graph, |shape| shapes.get(shape))?;

        if let Some(data) = self.mesh_data.take() {
            let mesh = meshes.add(GpuMesh::upload(render_engine.device(), &data, "obj"));
            let node = graph.add_node(
                SceneNode::with_mesh("obj", mesh, MESH_COLOR)
                    .with_local_transform(Matrix4::from_translation(Vector3::from(MESH_OFFSET))),
            );
            graph.update_world_transform(node)?;
        }

        let aspect = width.max(1) as f32 / height.max(1) as f32;
        let (orthographic, _) = default_projection_presets(aspect);
        let mut settings = self.config.camera;
        settings.projection = if self.config.orthographic {
            orthographic
        } else {
            settings.projection.with_aspect(aspect)
        };
        let camera = render_engine.create_camera(settings);
        let camera_manager = CameraManager::new(camera, CameraController::new());

        let animation = AssemblyAnimation::new(tangram, self.config.assembly_duration);

        log::info!("controls: drag to orbit, scroll to zoom, C view, P projection, Space assemble, Esc quit");
        self.gpu = Some(GpuState {
            meshes,
            camera_manager,
            graph,
            animation,
            render_engine,
        });
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{}", error);
        self.error = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(error) = self.init(event_loop) {
            self.fail(event_loop, error);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(gpu) = self.gpu.as_mut() else {
            return;
        };

        if gpu.camera_manager.process_event(&event) {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => match key_code {
                KeyCode::Escape => event_loop.exit(),
                KeyCode::KeyC => gpu.camera_manager.switch_view(),
                KeyCode::KeyP => gpu.camera_manager.toggle_projection(),
                KeyCode::Space => gpu.animation.toggle(),
                _ => (),
            },
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                gpu.camera_manager.resize(width, height);
                gpu.render_engine.resize(width, height);
            }
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = self
                    .last_frame
                    .replace(now)
                    .map(|last| now.duration_since(last).as_secs_f32())
                    .unwrap_or(0.0);

                if gpu.animation.advance(dt) {
                    if let Err(error) = gpu.animation.apply(&mut gpu.graph) {
                        log::warn!("assembly animation: {}", error);
                    }
                }

                let result = gpu
                    .render_engine
                    .render(&gpu.camera_manager.camera, &gpu.graph, &gpu.meshes);
                if let Err(error) = result {
                    self.fail(event_loop, error);
                }
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
