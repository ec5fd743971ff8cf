//! Image codec trait and shared raster types.
//!
//! The [`ImageCodec`] trait defines the two operations the viewer needs from
//! the outside world: decode a file into a [`SourceImage`] and encode a raster
//! back to disk. The core never looks at file formats beyond that.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_backend::RustCodec), built on the `image` crate.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("Failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
}

/// Pixel size of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// A decoded image and where it came from.
///
/// Immutable once built; a new load replaces it wholesale.
#[derive(Debug, Clone)]
pub struct SourceImage {
    pixels: RgbaImage,
    path: PathBuf,
    file_size: Option<u64>,
}

impl SourceImage {
    pub fn new(pixels: RgbaImage, path: impl Into<PathBuf>, file_size: Option<u64>) -> Self {
        Self {
            pixels,
            path: path.into(),
            file_size,
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file on disk, when known.
    pub fn file_size(&self) -> Option<u64> {
        self.file_size
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.pixels.width(),
            height: self.pixels.height(),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Output container for saved images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Jpeg,
    Bmp,
    Gif,
}

impl SaveFormat {
    /// Pick a format from the output file extension. Unknown or missing
    /// extensions fall back to PNG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => SaveFormat::Jpeg,
            "bmp" => SaveFormat::Bmp,
            "gif" => SaveFormat::Gif,
            _ => SaveFormat::Png,
        }
    }

    /// Whether the container keeps an alpha channel.
    pub fn supports_alpha(self) -> bool {
        !matches!(self, SaveFormat::Jpeg)
    }
}

/// Trait for image decode/encode backends.
///
/// Kept minimal so the [`session`](crate::session) can be tested against an
/// in-memory mock instead of real files.
pub trait ImageCodec {
    /// Decode the file at `path`.
    fn decode(&self, path: &Path) -> Result<SourceImage, CodecError>;

    /// Encode `raster` into `path` using `format`.
    fn encode(&self, raster: &RgbaImage, path: &Path, format: SaveFormat)
    -> Result<(), CodecError>;
}
