//! Display compositing: source image + transform → viewport-sized raster.
//!
//! Every destination pixel is inverse-mapped into source space and sampled
//! with a Catmull-Rom bicubic kernel. Steps, in order:
//!
//! 1. Fill a viewport-sized canvas with the background color.
//! 2. Scale the source by `zoom` and center it (offsets go negative on
//!    overflow, so large images spill evenly off both edges).
//! 3. Rotate the whole scene about the viewport center.
//! 4. Apply `in * contrast + brightness` to RGB while sampling, then blend
//!    over the background. One pass, one clamp at the end.
//!
//! Downscaling (`zoom < 1`) first band-limits the source with
//! `imageops::resize` so a bicubic point sample does not alias.
//!
//! Rows are rendered in parallel with rayon. Each pixel depends only on the
//! inputs, so the result is identical to a sequential render.

use super::backend::SourceImage;
use super::calculations::{centering_offset, prescale_dimensions, rotation_basis, scaled_size};
use super::params::{Background, ColorAdjust, Viewport};
use crate::transform::TransformState;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use rayon::prelude::*;
use std::borrow::Cow;

/// A composed, display-ready raster of exactly viewport size.
///
/// Disposable: the session replaces it wholesale whenever the viewport,
/// source, or transform changes.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRaster {
    pixels: RgbaImage,
}

impl DisplayRaster {
    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
}

/// Geometry shared by every pixel of one compose call.
struct Mapping {
    center: (f32, f32),
    offset: (f32, f32),
    scaled: (f32, f32),
    /// Sampler pixels per display pixel on each axis.
    step: (f32, f32),
    sin: f32,
    cos: f32,
}

impl Mapping {
    /// Map a display pixel center to sampler coordinates, or `None` when it
    /// falls outside the drawn image.
    #[inline]
    fn source_point(&self, px: u32, py: u32) -> Option<(f32, f32)> {
        let dx = px as f32 + 0.5 - self.center.0;
        let dy = py as f32 + 0.5 - self.center.1;

        // Inverse of a clockwise rotation in y-down screen space
        let u = self.center.0 + self.cos * dx + self.sin * dy;
        let v = self.center.1 - self.sin * dx + self.cos * dy;

        let lx = u - self.offset.0;
        let ly = v - self.offset.1;
        if lx < 0.0 || ly < 0.0 || lx >= self.scaled.0 || ly >= self.scaled.1 {
            return None;
        }
        Some((lx * self.step.0 - 0.5, ly * self.step.1 - 0.5))
    }
}

/// Compose `source` into a new viewport-sized raster.
///
/// Pure: `source` is never modified and identical inputs always produce
/// pixel-identical output.
pub fn compose(
    source: &SourceImage,
    transform: &TransformState,
    viewport: Viewport,
    background: Background,
) -> DisplayRaster {
    let zoom = transform.zoom();
    let scaled = scaled_size(source.width(), source.height(), zoom);
    let offset = centering_offset(viewport.size(), scaled);
    let (sin, cos) = rotation_basis(transform.normalized_rotation());

    let sampler: Cow<'_, RgbaImage> = if zoom < 1.0 {
        let (w, h) = prescale_dimensions(source.width(), source.height(), zoom);
        Cow::Owned(imageops::resize(source.pixels(), w, h, FilterType::CatmullRom))
    } else {
        Cow::Borrowed(source.pixels())
    };

    let mapping = Mapping {
        center: (viewport.width() as f32 / 2.0, viewport.height() as f32 / 2.0),
        offset,
        scaled,
        step: (
            sampler.width() as f32 / scaled.0,
            sampler.height() as f32 / scaled.1,
        ),
        sin,
        cos,
    };
    let adjust = ColorAdjust {
        brightness: transform.brightness(),
        contrast: transform.contrast(),
    };
    let bg = background.0.map(f32::from);

    log::trace!(
        "compose {}x{} → {}x{} zoom={zoom:.4} rot={:.1}",
        source.width(),
        source.height(),
        viewport.width(),
        viewport.height(),
        transform.normalized_rotation()
    );

    let (width, height) = viewport.size();
    let mut canvas = RgbaImage::from_pixel(width, height, background.to_rgba());
    let row_len = width as usize * 4;
    let buffer: &mut [u8] = &mut canvas;

    buffer
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(py, row)| {
            for px in 0..width {
                let Some((sx, sy)) = mapping.source_point(px, py as u32) else {
                    continue;
                };
                let sample = sample_bicubic(&sampler, sx, sy);
                let alpha = sample[3] / 255.0;
                let i = px as usize * 4;
                for c in 0..3 {
                    // Premultiplied color through the affine transform, then
                    // source-over onto the opaque background
                    let value =
                        adjust.apply_premultiplied(sample[c], alpha) + bg[c] * (1.0 - alpha);
                    row[i + c] = value.round().clamp(0.0, 255.0) as u8;
                }
                row[i + 3] = 255;
            }
        });

    DisplayRaster { pixels: canvas }
}

/// Catmull-Rom weights for the four taps around fractional offset `t`.
#[inline]
fn catmull_rom(t: f32) -> [f32; 4] {
    let t2 = t * t;
    let t3 = t2 * t;
    [
        -0.5 * t3 + t2 - 0.5 * t,
        1.5 * t3 - 2.5 * t2 + 1.0,
        -1.5 * t3 + 2.0 * t2 + 0.5 * t,
        0.5 * t3 - 0.5 * t2,
    ]
}

/// Bicubic sample at `(x, y)` in pixel-center coordinates, edges clamped.
///
/// Returns premultiplied `[r, g, b, a]` in `0.0..=255.0`, with kernel
/// overshoot clipped so color never exceeds alpha.
fn sample_bicubic(image: &RgbaImage, x: f32, y: f32) -> [f32; 4] {
    let max_x = image.width() as i64 - 1;
    let max_y = image.height() as i64 - 1;
    let x0 = x.floor();
    let y0 = y.floor();
    let wx = catmull_rom(x - x0);
    let wy = catmull_rom(y - y0);
    let (x0, y0) = (x0 as i64, y0 as i64);

    let mut acc = [0.0f32; 4];
    for (j, weight_y) in wy.iter().enumerate() {
        if *weight_y == 0.0 {
            continue;
        }
        let row = (y0 - 1 + j as i64).clamp(0, max_y) as u32;
        for (i, weight_x) in wx.iter().enumerate() {
            let weight = weight_x * weight_y;
            if weight == 0.0 {
                continue;
            }
            let col = (x0 - 1 + i as i64).clamp(0, max_x) as u32;
            let p = image.get_pixel(col, row).0;
            let a = p[3] as f32;
            let premul = a / 255.0;
            acc[0] += p[0] as f32 * premul * weight;
            acc[1] += p[1] as f32 * premul * weight;
            acc[2] += p[2] as f32 * premul * weight;
            acc[3] += a * weight;
        }
    }

    let alpha = acc[3].clamp(0.0, 255.0);
    [
        acc[0].clamp(0.0, alpha),
        acc[1].clamp(0.0, alpha),
        acc[2].clamp(0.0, alpha),
        alpha,
    ]
}
