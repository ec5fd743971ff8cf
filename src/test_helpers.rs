//! Shared test utilities for the lightbox unit tests.
//!
//! Raster builders with predictable pixels plus small on-disk fixture helpers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let img = gradient(4, 2);
//! assert_ne!(img.get_pixel(0, 0), img.get_pixel(3, 1));
//!
//! let tmp = sibling_dir(&[("a.png", 4, 4), ("b.png", 8, 2)]);
//! ```

use image::{Rgba, RgbaImage};
use std::path::Path;
use tempfile::TempDir;

// =========================================================================
// Rasters
// =========================================================================

/// Every pixel the same color.
pub fn solid(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(color))
}

/// Opaque image where every pixel has a distinct color: red ramps along x,
/// green along y, each spanning the full 0..=255 range.
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    let ramp = |i: u32, n: u32| (i * 255 / (n - 1).max(1)) as u8;
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([ramp(x, width), ramp(y, height), 0, 255])
    })
}

/// Opaque black/white checkerboard with square cells of `cell` pixels.
/// The top-left cell is black.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / cell + y / cell) % 2 == 0 {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

// =========================================================================
// Files
// =========================================================================

/// Write a `width`×`height` gradient PNG to `path`.
pub fn write_png(path: &Path, width: u32, height: u32) {
    gradient(width, height)
        .save_with_format(path, image::ImageFormat::Png)
        .unwrap();
}

/// Temp directory holding one gradient PNG per `(name, width, height)`.
pub fn sibling_dir(files: &[(&str, u32, u32)]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for (name, width, height) in files {
        write_png(&tmp.path().join(name), *width, *height);
    }
    tmp
}
