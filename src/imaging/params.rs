//! Parameter types for the display pipeline.
//!
//! These structs describe *what* to draw, not *how*. They are the interface
//! between the [`session`](crate::session) (which owns the state) and the
//! [`compositor`](super::compositor) (which does the pixel work).
//!
//! ## Types
//!
//! - [`Viewport`]: Pixel size of the drawing surface. Zero dimensions are bumped to 1.
//! - [`Background`]: Opaque canvas color, parsed from `#rrggbb`.
//! - [`ColorAdjust`]: Brightness offset + contrast multiplier applied during sampling.

use image::Rgba;
use std::fmt;

/// Pixel size of the surface the display raster is composed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
///
/// Only constructible through [`Viewport::new`], so both sides are at least 1.
pub struct Viewport {
    width: u32,
    height: u32,
}

impl Viewport {
    /// Minimized windows report 0×0; the pipeline always works on at least 1×1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
        }
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn height(self) -> u32 {
        self.height
    }

    pub fn size(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Opaque background color of the display canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Background(pub [u8; 3]);

impl Background {
    pub const WHITE: Background = Background([0xff, 0xff, 0xff]);

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse(value: &str) -> Option<Self> {
        let hex = value.strip_prefix('#').unwrap_or(value);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self([channel(0)?, channel(2)?, channel(4)?]))
    }

    pub fn to_rgba(self) -> Rgba<u8> {
        let [r, g, b] = self.0;
        Rgba([r, g, b, 0xff])
    }
}

impl fmt::Display for Background {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

/// Affine color transform: `out = in * contrast + brightness * 255`.
///
/// Applied to RGB only; alpha passes through.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAdjust {
    pub brightness: f32,
    pub contrast: f32,
}

impl ColorAdjust {
    pub const NEUTRAL: ColorAdjust = ColorAdjust {
        brightness: 0.0,
        contrast: 1.0,
    };

    /// Apply to one opaque channel value in `0.0..=255.0` space. Not clamped;
    /// the compositor clamps once after blending.
    #[inline]
    pub fn apply(self, value: f32) -> f32 {
        self.apply_premultiplied(value, 1.0)
    }

    /// Apply to a channel premultiplied by `alpha` (`0.0..=1.0`). The offset
    /// is scaled by alpha too, so fully transparent pixels stay untouched.
    #[inline]
    pub fn apply_premultiplied(self, value: f32, alpha: f32) -> f32 {
        value * self.contrast + self.brightness * 255.0 * alpha
    }
}

impl Default for ColorAdjust {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_bumps_zero_to_one() {
        let vp = Viewport::new(0, 0);
        assert_eq!(vp.size(), (1, 1));
    }

    #[test]
    fn background_parses_hex() {
        assert_eq!(Background::parse("#ffffff"), Some(Background::WHITE));
        assert_eq!(Background::parse("1e1e1e"), Some(Background([0x1e, 0x1e, 0x1e])));
        assert_eq!(Background::parse("#FfA500"), Some(Background([0xff, 0xa5, 0x00])));
    }

    #[test]
    fn background_rejects_malformed() {
        assert_eq!(Background::parse("#fff"), None);
        assert_eq!(Background::parse("#gggggg"), None);
        assert_eq!(Background::parse(""), None);
        assert_eq!(Background::parse("#ééé"), None);
    }

    #[test]
    fn background_display_roundtrips() {
        let bg = Background([0x0a, 0xb0, 0xff]);
        assert_eq!(bg.to_string(), "#0ab0ff");
        assert_eq!(Background::parse(&bg.to_string()), Some(bg));
    }

    #[test]
    fn color_adjust_neutral_is_identity() {
        assert_eq!(ColorAdjust::NEUTRAL.apply(128.0), 128.0);
    }

    #[test]
    fn color_adjust_offset_scales_with_alpha() {
        let adjust = ColorAdjust {
            brightness: 0.5,
            contrast: 1.0,
        };
        assert_eq!(adjust.apply_premultiplied(0.0, 0.0), 0.0);
        assert_eq!(adjust.apply_premultiplied(50.0, 0.5), 50.0 + 63.75);
    }

    #[test]
    fn color_adjust_combines_contrast_and_brightness() {
        let adjust = ColorAdjust {
            brightness: 0.1,
            contrast: 2.0,
        };
        assert_eq!(adjust.apply(100.0), 200.0 + 25.5);
    }
}
