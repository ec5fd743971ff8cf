//! Pure geometry for the display pipeline.
//!
//! All functions here are pure and testable without any I/O or images.

/// Zoom that fits an image entirely inside a viewport.
///
/// Compares aspect ratios: an image relatively wider than the viewport is
/// constrained by width, otherwise by height. The scaled image touches exactly
/// one pair of viewport edges and never overflows the other.
///
/// Callers must not pass zero dimensions.
///
/// # Examples
/// ```
/// # use lightbox::imaging::compute_fit_zoom;
/// // 2:1 image into a 4:3 viewport is width-bound
/// assert_eq!(compute_fit_zoom(4000, 2000, 800, 600), 0.2);
///
/// // 1:2 image into the same viewport is height-bound
/// assert_eq!(compute_fit_zoom(1000, 2000, 800, 600), 0.3);
/// ```
pub fn compute_fit_zoom(image_w: u32, image_h: u32, viewport_w: u32, viewport_h: u32) -> f32 {
    let image_aspect = image_w as f64 / image_h as f64;
    let viewport_aspect = viewport_w as f64 / viewport_h as f64;

    if image_aspect > viewport_aspect {
        (viewport_w as f64 / image_w as f64) as f32
    } else {
        (viewport_h as f64 / image_h as f64) as f32
    }
}

/// Size of the image after scaling, in fractional pixels.
pub fn scaled_size(width: u32, height: u32, zoom: f32) -> (f32, f32) {
    (width as f32 * zoom, height as f32 * zoom)
}

/// Top-left corner that centers a scaled image in the viewport.
///
/// Negative when the scaled image is larger than the viewport; the overflow is
/// split evenly between both sides.
pub fn centering_offset(viewport: (u32, u32), scaled: (f32, f32)) -> (f32, f32) {
    (
        (viewport.0 as f32 - scaled.0) / 2.0,
        (viewport.1 as f32 - scaled.1) / 2.0,
    )
}

/// `(sin, cos)` of a rotation in degrees.
///
/// Quarter turns return exact values so that rotated renders stay
/// pixel-aligned instead of picking up `1e-8` drift from `f32::sin_cos`.
pub fn rotation_basis(degrees: f32) -> (f32, f32) {
    let normalized = degrees.rem_euclid(360.0);
    if normalized == 0.0 {
        (0.0, 1.0)
    } else if normalized == 90.0 {
        (1.0, 0.0)
    } else if normalized == 180.0 {
        (0.0, -1.0)
    } else if normalized == 270.0 {
        (-1.0, 0.0)
    } else {
        normalized.to_radians().sin_cos()
    }
}

/// Whole-pixel size used when band-limiting a source before downscaled
/// sampling. Never smaller than 1×1.
pub fn prescale_dimensions(width: u32, height: u32, zoom: f32) -> (u32, u32) {
    let (w, h) = scaled_size(width, height, zoom);
    ((w.round() as u32).max(1), (h.round() as u32).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // compute_fit_zoom tests
    // =========================================================================

    #[test]
    fn fit_wide_image_is_width_bound() {
        // 4000x2000 (2.0) into 800x600 (1.33) → 800 / 4000
        assert_eq!(compute_fit_zoom(4000, 2000, 800, 600), 0.2);
    }

    #[test]
    fn fit_tall_image_is_height_bound() {
        // 1000x2000 (0.5) into 800x600 (1.33) → 600 / 2000
        assert_eq!(compute_fit_zoom(1000, 2000, 800, 600), 0.3);
    }

    #[test]
    fn fit_same_aspect_uses_height() {
        // Equal ratios are not "wider", so the height branch applies
        assert_eq!(compute_fit_zoom(400, 300, 800, 600), 2.0);
    }

    #[test]
    fn fit_small_image_scales_up() {
        assert_eq!(compute_fit_zoom(100, 50, 800, 600), 8.0);
    }

    #[test]
    fn fit_result_never_overflows() {
        for (iw, ih) in [(4000, 2000), (1000, 2000), (333, 777), (1920, 1080)] {
            let zoom = compute_fit_zoom(iw, ih, 800, 600);
            let (w, h) = scaled_size(iw, ih, zoom);
            assert!(w <= 800.0 + 1e-3, "{iw}x{ih} width {w}");
            assert!(h <= 600.0 + 1e-3, "{iw}x{ih} height {h}");
        }
    }

    // =========================================================================
    // offset / rotation tests
    // =========================================================================

    #[test]
    fn centering_offset_inside_viewport() {
        assert_eq!(centering_offset((800, 600), (400.0, 200.0)), (200.0, 200.0));
    }

    #[test]
    fn centering_offset_negative_on_overflow() {
        assert_eq!(centering_offset((800, 600), (1000.0, 800.0)), (-100.0, -100.0));
    }

    #[test]
    fn rotation_basis_quarter_turns_are_exact() {
        assert_eq!(rotation_basis(0.0), (0.0, 1.0));
        assert_eq!(rotation_basis(90.0), (1.0, 0.0));
        assert_eq!(rotation_basis(180.0), (0.0, -1.0));
        assert_eq!(rotation_basis(-90.0), (-1.0, 0.0));
        assert_eq!(rotation_basis(720.0), (0.0, 1.0));
    }

    #[test]
    fn rotation_basis_arbitrary_angle() {
        let (s, c) = rotation_basis(45.0);
        assert!((s - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
        assert!((c - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn prescale_never_collapses_to_zero() {
        assert_eq!(prescale_dimensions(4000, 2000, 0.2), (800, 400));
        assert_eq!(prescale_dimensions(3, 3, 0.1), (1, 1));
    }
}
