//! Shader compilation and the triangle's render program.
//!
//! Each stage is compiled from its own WGSL source. Sources are checked with
//! naga on the CPU first; compilation and linking on the device then
//! run inside a validation error scope, so a bad shader comes back as a
//! [`ShaderError`] carrying the driver's message instead of a silently
//! invalid object.
//!
//! # Uniforms
//!
//! Both stages see the same block at `@group(0) @binding(0)`:
//!
//! ```wgsl
//! struct FrameUniforms {
//!     model: mat4x4<f32>,
//!     time: f32,
//! }
//! @group(0) @binding(0) var<uniform> u: FrameUniforms;
//! ```

use std::fmt;

use glam::Mat4;

use crate::error::ShaderError;
use crate::vertex::Vertex;

/// Source of the built-in vertex stage.
pub const TRIANGLE_VERTEX_SHADER: &str = include_str!("shaders/triangle_vert.wgsl");
/// Source of the built-in fragment stage.
pub const TRIANGLE_FRAGMENT_SHADER: &str = include_str!("shaders/triangle_frag.wgsl");

const VERTEX_ENTRY: &str = "vs_main";
const FRAGMENT_ENTRY: &str = "fs_main";

/// The pipeline stage a shader source is compiled for.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Per-frame uniforms uploaded before each draw.
///
/// The layout matches WGSL uniform alignment: a 64-byte matrix followed by
/// the time, rounded up to 80 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameUniforms {
    /// Model matrix, column-major.
    pub model: [[f32; 4]; 4],
    /// Elapsed time in seconds since the app started.
    pub time: f32,
    _padding: [f32; 3],
}

impl FrameUniforms {
    pub fn new(model: Mat4, time: f32) -> Self {
        Self {
            model: model.to_cols_array_2d(),
            time,
            _padding: [0.0; 3],
        }
    }
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, 0.0)
    }
}

/// Runs `f` inside a validation error scope and returns the captured error message, if any.
fn with_validation<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<String>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error.map(|e| e.to_string()))
}

/// Parses and validates WGSL on the CPU with naga.
///
/// Reports the same class of errors as the driver, but needs no device.
pub fn validate_wgsl(stage: ShaderStage, source: &str) -> Result<(), ShaderError> {
    use wgpu::naga;

    let module = naga::front::wgsl::parse_str(source).map_err(|err| ShaderError::Compile {
        stage,
        log: err.emit_to_string(source),
    })?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    )
    .validate(&module)
    .map_err(|err| ShaderError::Compile {
        stage,
        log: err.emit_to_string(source),
    })?;

    Ok(())
}

/// Compiles a single WGSL shader stage.
///
/// The source is validated with [`validate_wgsl`] first, so syntax and type
/// errors come back with a source-annotated log.
pub fn compile_shader(
    device: &wgpu::Device,
    stage: ShaderStage,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderError> {
    if let Err(err) = validate_wgsl(stage, source) {
        log::error!("{err}");
        return Err(err);
    }

    let label = format!("Triangle {stage} Shader");
    let (module, error) = with_validation(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });

    match error {
        Some(log) => {
            log::error!("{stage} shader compilation error: {log}");
            Err(ShaderError::Compile { stage, log })
        }
        None => {
            log::debug!("compiled {stage} shader");
            Ok(module)
        }
    }
}

/// A linked vertex + fragment program with its uniform buffer.
pub struct ShaderProgram {
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

impl ShaderProgram {
    /// Compiles both stages and links them into a render pipeline targeting `format`.
    ///
    /// The vertex stage must define `vs_main` reading [`Vertex::LAYOUT`]; the
    /// fragment stage must define `fs_main`.
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self, ShaderError> {
        let vertex = compile_shader(device, ShaderStage::Vertex, vertex_source)?;
        let fragment = compile_shader(device, ShaderStage::Fragment, fragment_source)?;

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Frame Uniforms"),
            size: std::mem::size_of::<FrameUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Frame Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Frame Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Triangle Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let (pipeline, error) = with_validation(device, || {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some("Triangle Pipeline"),
                layout: Some(&pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &vertex,
                    entry_point: Some(VERTEX_ENTRY),
                    buffers: &[Vertex::LAYOUT],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &fragment,
                    entry_point: Some(FRAGMENT_ENTRY),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: Some(wgpu::BlendState::REPLACE),
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState {
                    topology: wgpu::PrimitiveTopology::TriangleList,
                    ..Default::default()
                },
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        });

        if let Some(log) = error {
            log::error!("failed to link shader program: {log}");
            return Err(ShaderError::Link { log });
        }
        log::debug!("linked triangle shader program");

        Ok(Self {
            pipeline,
            uniform_buffer,
            bind_group,
        })
    }

    /// Builds the program from the built-in triangle shaders.
    pub fn triangle(device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Self, ShaderError> {
        Self::new(device, format, TRIANGLE_VERTEX_SHADER, TRIANGLE_FRAGMENT_SHADER)
    }

    /// Uploads this frame's uniforms.
    pub fn set_uniforms(&self, queue: &wgpu::Queue, uniforms: &FrameUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Binds the pipeline and its uniforms to `render_pass`.
    pub fn bind(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_pipeline(&self.pipeline);
        render_pass.set_bind_group(0, &self.bind_group, &[]);
    }
}
