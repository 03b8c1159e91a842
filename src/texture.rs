//! Image loading into sampled GPU textures.
//!
//! Images are decoded with the `image` crate, converted to RGBA8, flipped so
//! that row 0 is the bottom of the picture, and uploaded with a full mip chain
//! built on the CPU.

use std::path::Path;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::error::TextureError;

/// How texture coordinates outside `[0, 1]` are resolved.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirrorRepeat,
    ClampToEdge,
}

impl From<WrapMode> for wgpu::AddressMode {
    fn from(mode: WrapMode) -> Self {
        match mode {
            WrapMode::Repeat => wgpu::AddressMode::Repeat,
            WrapMode::MirrorRepeat => wgpu::AddressMode::MirrorRepeat,
            WrapMode::ClampToEdge => wgpu::AddressMode::ClampToEdge,
        }
    }
}

/// Magnification/minification filter. `Linear` also blends between mip levels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    Nearest,
    #[default]
    Linear,
}

impl From<FilterMode> for wgpu::FilterMode {
    fn from(mode: FilterMode) -> Self {
        match mode {
            FilterMode::Nearest => wgpu::FilterMode::Nearest,
            FilterMode::Linear => wgpu::FilterMode::Linear,
        }
    }
}

/// Options applied when loading a texture.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureOptions {
    pub wrap: WrapMode,
    pub filter: FilterMode,
    /// Flip rows so the first row in memory is the bottom of the image.
    pub flip_vertically: bool,
}

impl Default for TextureOptions {
    fn default() -> Self {
        Self {
            wrap: WrapMode::Repeat,
            filter: FilterMode::Linear,
            flip_vertically: true,
        }
    }
}

/// Decodes an encoded image (PNG, JPEG, ...) into RGBA8.
pub fn decode_rgba(bytes: &[u8], flip_vertically: bool) -> Result<RgbaImage, TextureError> {
    let mut img = image::load_from_memory(bytes)?.to_rgba8();
    if img.width() == 0 || img.height() == 0 {
        return Err(TextureError::EmptyImage);
    }
    if flip_vertically {
        imageops::flip_vertical_in_place(&mut img);
    }
    Ok(img)
}

/// Reads and decodes the image file at `path` into RGBA8.
pub fn load_rgba(path: impl AsRef<Path>, flip_vertically: bool) -> Result<RgbaImage, TextureError> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| TextureError::Io {
        path: path.display().to_string(),
        source,
    })?;
    decode_rgba(&bytes, flip_vertically)
}

/// Number of mip levels down to 1x1 for a `width` x `height` image.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// Builds every mip level of `base`, starting with `base` itself.
///
/// Each level halves both dimensions (never below 1) until 1x1.
pub fn mip_chain(base: &RgbaImage) -> Vec<RgbaImage> {
    let count = mip_level_count(base.width(), base.height());
    let mut levels = Vec::with_capacity(count as usize);
    levels.push(base.clone());

    for _ in 1..count {
        let prev = &levels[levels.len() - 1];
        let width = (prev.width() / 2).max(1);
        let height = (prev.height() / 2).max(1);
        let next = imageops::resize(prev, width, height, FilterType::Triangle);
        levels.push(next);
    }

    levels
}

/// A GPU texture with its view and sampler.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
    pub mip_level_count: u32,
}

impl Texture {
    /// Uploads a decoded image and all its mip levels.
    pub fn from_rgba(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        image: &RgbaImage,
        label: &str,
        options: TextureOptions,
    ) -> Result<Self, TextureError> {
        use wgpu::util::DeviceExt;

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyImage);
        }

        let levels = mip_chain(image);
        let mip_level_count = levels.len() as u32;
        // Layer-major order: one layer, mips from largest to smallest.
        let data: Vec<u8> = levels.iter().flat_map(|l| l.as_raw().iter().copied()).collect();

        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let address_mode = options.wrap.into();
        let filter = options.filter.into();
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: address_mode,
            address_mode_v: address_mode,
            address_mode_w: address_mode,
            mag_filter: filter,
            min_filter: filter,
            mipmap_filter: filter,
            ..Default::default()
        });

        log::debug!("uploaded texture '{label}' {width}x{height} with {mip_level_count} mips");

        Ok(Self {
            texture,
            view,
            sampler,
            width,
            height,
            mip_level_count,
        })
    }

    /// Load a texture from an image file.
    pub fn from_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
        options: TextureOptions,
    ) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = load_rgba(path, options.flip_vertically)?;
        Self::from_rgba(device, queue, &image, &path.display().to_string(), options)
    }

    /// Load a texture from embedded bytes.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
        options: TextureOptions,
    ) -> Result<Self, TextureError> {
        let image = decode_rgba(bytes, options.flip_vertically)?;
        Self::from_rgba(device, queue, &image, label, options)
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn sampler(&self) -> &wgpu::Sampler {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::headless_device;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn encode_png(img: &RgbaImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    /// 2x2 image: top row red, bottom row blue.
    fn two_rows() -> RgbaImage {
        RgbaImage::from_fn(2, 2, |_, y| {
            if y == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        })
    }

    #[test]
    fn decode_flips_rows_when_asked() {
        let png = encode_png(&two_rows());

        let flipped = decode_rgba(&png, true).unwrap();
        assert_eq!(*flipped.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
        assert_eq!(*flipped.get_pixel(1, 1), Rgba([255, 0, 0, 255]));

        let upright = decode_rgba(&png, false).unwrap();
        assert_eq!(upright, two_rows());
    }

    #[test]
    fn decode_rejects_garbage() {
        let result = decode_rgba(b"definitely not an image", true);
        assert!(matches!(result, Err(TextureError::Decode(_))));
    }

    #[test]
    fn mip_level_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(300, 20), 9);
        assert_eq!(mip_level_count(0, 0), 1);
    }

    #[test]
    fn mip_chain_halves_down_to_one_pixel() {
        let base = RgbaImage::from_pixel(8, 2, Rgba([10, 20, 30, 255]));
        let sizes: Vec<_> = mip_chain(&base).iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, vec![(8, 2), (4, 1), (2, 1), (1, 1)]);
    }

    #[test]
    fn mip_chain_keeps_solid_color() {
        let base = RgbaImage::from_pixel(4, 4, Rgba([200, 100, 50, 255]));
        let last = mip_chain(&base).pop().unwrap();
        assert_eq!(*last.get_pixel(0, 0), Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn wrap_and_filter_map_to_wgpu() {
        assert_eq!(wgpu::AddressMode::from(WrapMode::Repeat), wgpu::AddressMode::Repeat);
        assert_eq!(
            wgpu::AddressMode::from(WrapMode::ClampToEdge),
            wgpu::AddressMode::ClampToEdge
        );
        assert_eq!(wgpu::FilterMode::from(FilterMode::Nearest), wgpu::FilterMode::Nearest);
    }

    #[test]
    fn uploads_every_mip_level() {
        let Some((device, queue)) = headless_device() else {
            eprintln!("no GPU adapter available; skipping");
            return;
        };

        let image = RgbaImage::from_pixel(16, 8, Rgba([255, 255, 255, 255]));
        let texture =
            Texture::from_rgba(&device, &queue, &image, "test", TextureOptions::default()).unwrap();
        assert_eq!((texture.width, texture.height), (16, 8));
        assert_eq!(texture.mip_level_count, 5);
    }

    fn temp_png(name: &str, img: &RgbaImage) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("hello-triangle-{}-{name}.png", std::process::id()));
        std::fs::write(&path, encode_png(img)).unwrap();
        path
    }

    #[test]
    fn load_reports_missing_file() {
        let path = std::env::temp_dir().join("hello-triangle-does-not-exist.png");
        match load_rgba(&path, true) {
            Err(TextureError::Io { path: reported, source }) => {
                assert_eq!(reported, path.display().to_string());
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected an io error, got {other:?}"),
        }
    }

    #[test]
    fn load_reads_and_flips_file() {
        let path = temp_png("rows", &two_rows());

        let loaded = load_rgba(&path, true);
        std::fs::remove_file(&path).unwrap();

        let loaded = loaded.unwrap();
        assert_eq!(loaded.dimensions(), (2, 2));
        assert_eq!(*loaded.get_pixel(0, 0), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn load_rejects_non_image_file() {
        let path = std::env::temp_dir().join(format!("hello-triangle-{}-text.png", std::process::id()));
        std::fs::write(&path, b"plain text").unwrap();

        let result = load_rgba(&path, false);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(TextureError::Decode(_))));
    }

    #[test]
    fn file_and_bytes_loaders_upload() {
        let Some((device, queue)) = headless_device() else {
            eprintln!("no GPU adapter available; skipping");
            return;
        };

        let image = RgbaImage::from_pixel(4, 4, Rgba([0, 128, 255, 255]));
        let path = temp_png("upload", &image);
        let from_file = Texture::from_file(&device, &queue, &path, TextureOptions::default());
        std::fs::remove_file(&path).unwrap();
        let from_file = from_file.unwrap();
        assert_eq!((from_file.width, from_file.height, from_file.mip_level_count), (4, 4, 3));

        let options = TextureOptions {
            wrap: WrapMode::ClampToEdge,
            filter: FilterMode::Nearest,
            flip_vertically: false,
        };
        let from_bytes =
            Texture::from_bytes(&device, &queue, &encode_png(&image), "bytes", options).unwrap();

        // The view and sampler are what a material binds.
        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Texture Test Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });
        let _bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Texture Test Bind Group"),
            layout: &layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(from_bytes.view()),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(from_bytes.sampler()),
                },
            ],
        });
    }

    #[test]
    fn missing_file_fails_before_upload() {
        let Some((device, queue)) = headless_device() else {
            eprintln!("no GPU adapter available; skipping");
            return;
        };

        let path = std::env::temp_dir().join("hello-triangle-missing-upload.png");
        let result = Texture::from_file(&device, &queue, &path, TextureOptions::default());
        assert!(matches!(result, Err(TextureError::Io { .. })));
    }
}
