//! Pure Rust codec backed by the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, BMP, GIF) | `image::ImageReader` with content sniffing |
//! | Normalize pixels | `DynamicImage::into_rgba8` |
//! | Encode (PNG, BMP, GIF) | `ImageBuffer::save_with_format` |
//! | Encode (JPEG) | alpha dropped via `DynamicImage::to_rgb8`, then `save_with_format` |

use super::backend::{CodecError, ImageCodec, SaveFormat, SourceImage};
use image::{DynamicImage, ImageFormat, ImageReader, RgbaImage};
use std::path::Path;

/// Extensions the viewer opens and lists as siblings (compared lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif"];

/// Whether `path` has one of the [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn is_supported_image(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Codec using the `image` crate's pure Rust decoders and encoders.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn image_format(format: SaveFormat) -> ImageFormat {
    match format {
        SaveFormat::Png => ImageFormat::Png,
        SaveFormat::Jpeg => ImageFormat::Jpeg,
        SaveFormat::Bmp => ImageFormat::Bmp,
        SaveFormat::Gif => ImageFormat::Gif,
    }
}

/// Load and decode an image from disk, sniffing the format from content so a
/// misnamed file still opens.
fn load_image(path: &Path) -> Result<DynamicImage, CodecError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| CodecError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

impl ImageCodec for RustCodec {
    fn decode(&self, path: &Path) -> Result<SourceImage, CodecError> {
        let img = load_image(path)?;
        let file_size = std::fs::metadata(path).ok().map(|m| m.len());
        Ok(SourceImage::new(img.into_rgba8(), path, file_size))
    }

    fn encode(
        &self,
        raster: &RgbaImage,
        path: &Path,
        format: SaveFormat,
    ) -> Result<(), CodecError> {
        let encode_err = |e: image::ImageError| CodecError::Encode {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        if format.supports_alpha() {
            raster
                .save_with_format(path, image_format(format))
                .map_err(encode_err)
        } else {
            DynamicImage::ImageRgba8(raster.clone())
                .to_rgb8()
                .save_with_format(path, image_format(format))
                .map_err(encode_err)
        }
    }
}
