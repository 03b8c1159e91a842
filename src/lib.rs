//! # Hello Triangle
//!
//! A minimal wgpu application that draws one animated triangle, plus a small
//! library of 4x4 transforms for building model matrices.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hello_triangle::*;
//!
//! fn main() -> Result<()> {
//!     init_logging(LoggingConfig::default());
//!
//!     let config = AppConfig::new()
//!         .transform(Transform::new().uniform_scale(0.8))
//!         .spin(45.0);
//!
//!     run_with_config(config)
//! }
//! ```
//!
//! ## Model matrices
//!
//! ```
//! use hello_triangle::{Transform, Vec3, transform};
//!
//! let model = Transform::new()
//!     .position(Vec3::new(0.25, 0.0, 0.0))
//!     .rotation(Vec3::new(0.0, 0.0, 45.0))
//!     .model_matrix();
//!
//! assert_eq!(Transform::default().model_matrix(), transform::identity());
//! ```

mod app;
mod error;
mod gpu;
pub mod logging;
pub mod shader;
pub mod texture;
pub mod transform;
mod vertex;

pub use app::{AppConfig, run, run_with_config};
pub use error::{Error, Result, ShaderError, TextureError};
pub use gpu::GpuContext;
pub use logging::{LoggingConfig, init_logging};
pub use shader::{FrameUniforms, ShaderProgram, ShaderStage, compile_shader};
pub use texture::{FilterMode, Texture, TextureOptions, WrapMode};
pub use transform::Transform;
pub use vertex::{TRIANGLE, Vertex, VertexArray};

// Re-export glam math types for convenience
pub use glam::{Mat4, Vec3, Vec4};
