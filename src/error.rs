use crate::shader::ShaderStage;

/// Errors produced while setting up or running the application.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reported no supported formats")]
    NoSurfaceFormat,

    #[error("surface ran out of memory")]
    SurfaceOutOfMemory,

    #[error(transparent)]
    Shader(#[from] ShaderError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

/// Shader compile and link failures, carrying the driver's info log.
#[derive(thiserror::Error, Debug)]
pub enum ShaderError {
    #[error("{stage} shader compilation error: {log}")]
    Compile { stage: ShaderStage, log: String },

    #[error("failed to link shader program: {log}")]
    Link { log: String },
}

#[derive(thiserror::Error, Debug)]
pub enum TextureError {
    #[error("failed to read image {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has zero width or height")]
    EmptyImage,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
