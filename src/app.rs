//! Window, event loop and per-frame rendering.
//!
//! [`run_with_config`] opens a window, builds the GPU context, the triangle
//! program and its vertex array, then renders continuously until the window is
//! closed. Every frame clears the screen, uploads the elapsed time and the
//! model matrix, and draws the triangle.

use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::error::{Error, Result};
use crate::gpu::GpuContext;
use crate::shader::{FrameUniforms, ShaderProgram};
use crate::transform::Transform;
use crate::vertex::{TRIANGLE, VertexArray};

/// Application settings.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub clear_color: wgpu::Color,
    /// Model transform of the triangle at time zero.
    pub transform: Transform,
    /// Extra rotation about Z added per second of elapsed time.
    pub spin_degrees_per_sec: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Hello Triangle".to_string(),
            width: 1080,
            height: 720,
            clear_color: wgpu::Color {
                r: 0.3,
                g: 0.4,
                b: 0.9,
                a: 1.0,
            },
            transform: Transform::default(),
            spin_degrees_per_sec: 0.0,
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn clear_color(mut self, r: f64, g: f64, b: f64, a: f64) -> Self {
        self.clear_color = wgpu::Color { r, g, b, a };
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn spin(mut self, degrees_per_sec: f32) -> Self {
        self.spin_degrees_per_sec = degrees_per_sec;
        self
    }

    /// The model transform at `time` seconds.
    ///
    /// The accumulated spin is wrapped to `[0, 360)` degrees so long runs keep
    /// full f32 precision.
    pub fn transform_at(&self, time: f32) -> Transform {
        let spin_degrees = (self.spin_degrees_per_sec * time).rem_euclid(360.0);
        let spin = Vec3::new(0.0, 0.0, spin_degrees);
        self.transform.rotation(self.transform.rotation + spin)
    }
}

/// Run the application with default settings.
pub fn run() -> Result<()> {
    run_with_config(AppConfig::default())
}

/// Run the application until its window is closed.
///
/// Returns the first error hit while creating the window, GPU context or
/// shader program, or a fatal surface error during rendering.
pub fn run_with_config(config: AppConfig) -> Result<()> {
    log::info!("initializing");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TriangleApp {
        config,
        running: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    log::info!("shutting down");
    match app.error.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct TriangleApp {
    config: AppConfig,
    running: Option<Running>,
    error: Option<Error>,
}

impl TriangleApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: Error) {
        log::error!("{err}");
        self.error = Some(err);
        self.running = None;
        event_loop.exit();
    }
}

/// Everything that exists once the window is up.
struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    program: ShaderProgram,
    triangle: VertexArray,
    start_time: Instant,
}

impl Running {
    fn new(event_loop: &ActiveEventLoop, config: &AppConfig) -> Result<Self> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let program = ShaderProgram::triangle(&gpu.device, gpu.config.format)?;
        let triangle = VertexArray::new(&gpu.device, &TRIANGLE);

        Ok(Self {
            window,
            gpu,
            program,
            triangle,
            start_time: Instant::now(),
        })
    }

    fn render(&mut self, config: &AppConfig) -> Result<()> {
        let output = match self.gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("surface timed out; skipping frame");
                return Ok(());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(Error::SurfaceOutOfMemory),
            Err(err) => {
                log::warn!("surface error: {err}; reconfiguring");
                self.gpu.reconfigure();
                return Ok(());
            }
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let time = self.start_time.elapsed().as_secs_f32();
        let model = config.transform_at(time).model_matrix();
        self.program
            .set_uniforms(&self.gpu.queue, &FrameUniforms::new(model, time));

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Triangle Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.program.bind(&mut render_pass);
            self.triangle.draw(&mut render_pass);
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

impl ApplicationHandler for TriangleApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() || self.error.is_some() {
            return;
        }

        match Running::new(event_loop, &self.config) {
            Ok(running) => {
                running.window.request_redraw();
                self.running = Some(running);
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("close requested");
                self.running = None;
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                running.gpu.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = running.render(&self.config) {
                    self.fail(event_loop, err);
                    return;
                }
                running.window.request_redraw();
            }
            _ => (),
        }
    }
}
