//! wgpu renderer for scene graphs of flat-coloured meshes.
//!
//! Owns the surface, device, depth buffer and the single tangram pipeline.
//! Bind group 0 holds the camera block at the configured binding slot, bind
//! group 1 the per-node model matrix and colour.

use std::sync::Arc;

use super::mesh_library::{DrawMesh, MeshLibrary};
use super::object_uniforms::{DrawList, ObjectUniformBuffer};
use super::pipeline::{create_pipeline, PipelineConfig};
use super::texture_resource::DepthTexture;
use crate::config::AppConfig;
use crate::error::{Error, Result};
use crate::gfx::camera::{Camera, CameraSettings};
use crate::gfx::scene::SceneGraph;
use crate::wgpu_utils::{uniform_block_layout, GpuUniformBlock};

pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: DepthTexture,
    camera_layout: wgpu::BindGroupLayout,
    camera_binding: u32,
    object_uniforms: ObjectUniformBuffer,
    pipeline: wgpu::RenderPipeline,
    draw_list: DrawList,
    clear_color: wgpu::Color,
}

impl RenderEngine {
    /// Creates a render engine for the given window.
    ///
    /// Uncaptured device errors after this point are logged and end the
    /// process.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        app_config: &AppConfig,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Tangram Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        device.on_uncaptured_error(Box::new(|error: wgpu::Error| {
            log::error!("fatal GPU error: {}", error);
            std::process::exit(1);
        }));

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .ok_or(Error::NoSurfaceFormat)?;

        let present_mode = if surface_capabilities.present_modes.contains(&app_config.present_mode) {
            app_config.present_mode
        } else {
            log::warn!("present mode {:?} unsupported, using Fifo", app_config.present_mode);
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = DepthTexture::new(&device, &config, "depth_texture");
        let camera_layout = uniform_block_layout(&device, app_config.camera_binding, "Camera Layout");
        let object_uniforms = ObjectUniformBuffer::new(&device);

        let shader_source = include_str!("tangram.wgsl")
            .replace("{{camera_binding}}", &app_config.camera_binding.to_string());
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Tangram Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_source.into()),
        });

        // Both faces of the flat pieces are visible from the orbit
        let pipeline = create_pipeline(
            &device,
            &shader,
            &PipelineConfig::default()
                .with_label("Tangram Pipeline")
                .with_bind_group_layouts(vec![&camera_layout, object_uniforms.layout()])
                .with_cull_mode(None)
                .with_depth_format(DepthTexture::FORMAT)
                .with_color_format(format),
        );

        let [r, g, b, a] = app_config.clear_color;
        log::info!(
            "render engine ready: {}x{} {:?}, camera at binding {}",
            config.width,
            config.height,
            format,
            app_config.camera_binding
        );

        Ok(RenderEngine {
            surface,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            depth_texture,
            camera_layout,
            camera_binding: app_config.camera_binding,
            object_uniforms,
            pipeline,
            draw_list: DrawList::default(),
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Creates an orbit camera whose block is bound where the pipeline expects it
    pub fn create_camera(&self, settings: CameraSettings) -> Camera<GpuUniformBlock> {
        Camera::with_gpu(
            &self.device,
            self.queue.clone(),
            &self.camera_layout,
            self.camera_binding,
            settings,
        )
    }

    /// Draws every tree of `graph` and presents the frame.
    ///
    /// A lost or outdated surface is reconfigured and the frame skipped.
    pub fn render(&mut self, camera: &Camera<GpuUniformBlock>, graph: &SceneGraph, meshes: &MeshLibrary) -> Result<()> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("surface lost or outdated, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out waiting for the next frame");
                return Ok(());
            }
            Err(error) => return Err(error.into()),
        };
        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        self.draw_list.clear();
        graph.draw_all(&mut self.draw_list);
        self.object_uniforms
            .write(&self.device, &self.queue, &self.draw_list.uniforms);

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.pipeline);
            render_pass.set_bind_group(0, camera.block().bind_group(), &[]);

            for (index, mesh_id) in self.draw_list.meshes.iter().enumerate() {
                let Some(mesh) = meshes.get(*mesh_id) else {
                    log::warn!("skipping draw of unknown mesh {:?}", mesh_id);
                    continue;
                };
                render_pass.set_bind_group(1, self.object_uniforms.bind_group(), &[self.object_uniforms.offset(index)]);
                render_pass.draw_mesh(mesh);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    /// Reconfigures the surface and depth buffer; zero sizes are ignored
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = DepthTexture::new(&self.device, &self.config, "depth_texture");
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}
