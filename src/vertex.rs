//! Interleaved vertex data and its GPU upload.
//!
//! # Vertex Layout
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//! | color     | Float32x4 | 12     | 1               |

use wgpu::util::DeviceExt;

/// A vertex with a position and an RGBA color, 28 bytes.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Position in model space.
    pub position: [f32; 3],
    /// Linear RGBA color.
    pub color: [f32; 4],
}

impl Vertex {
    /// The vertex buffer layout matching the fields of [`Vertex`].
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[
            // position
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            },
            // color
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };

    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

/// The triangle drawn by the application: red, green and blue corners.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex::new([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0, 1.0]), // bottom left
    Vertex::new([0.5, -0.5, 0.0], [0.0, 1.0, 0.0, 1.0]),  // bottom right
    Vertex::new([0.0, 0.5, 0.0], [0.0, 0.0, 1.0, 1.0]),   // top center
];

/// A vertex buffer uploaded once and drawn as a triangle list.
pub struct VertexArray {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl VertexArray {
    /// Uploads `vertices` into a new vertex buffer.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Array"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            vertex_count: vertices.len() as u32,
        }
    }

    /// Binds the buffer to slot 0 and draws every vertex.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass) {
        render_pass.set_vertex_buffer(0, self.buffer.slice(..));
        render_pass.draw(0..self.vertex_count, 0..1);
    }
}
