//! Image handling: decode/encode and display compositing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, BMP, GIF) |
//! | **Encode** | `ImageBuffer::save_with_format` |
//! | **Prescale** (zoom < 1) | `imageops::resize` with Catmull-Rom |
//! | **Compose** | bicubic inverse mapping, rows in parallel via rayon |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for fit/scale/rotation math (unit testable)
//! - **Parameters**: Viewport, background and color adjustment types
//! - **Backend**: [`ImageCodec`] trait + [`RustCodec`]
//! - **Compositor**: [`compose`] turns a source image and transform into a
//!   [`DisplayRaster`]

pub mod backend;
mod calculations;
pub mod compositor;
mod params;
pub mod rust_backend;

pub use backend::{CodecError, Dimensions, ImageCodec, SaveFormat, SourceImage};
pub use calculations::{
    centering_offset, compute_fit_zoom, prescale_dimensions, rotation_basis, scaled_size,
};
pub use compositor::{DisplayRaster, compose};
pub use params::{Background, ColorAdjust, Viewport};
pub use rust_backend::{RustCodec, SUPPORTED_EXTENSIONS, is_supported_image};
