//! Display transform state: zoom, rotation, color adjustment, fit mode.
//!
//! [`TransformState`] is plain data. It never triggers recomposition on its
//! own; the [`session`](crate::session) decides when a mutation needs a new
//! display raster.
//!
//! ## Clamping
//!
//! The setters here are the only place zoom is bounded. Wheel steps, fit
//! computations, and continuous zoom all write through [`TransformState::set_zoom`]
//! and [`TransformState::set_target_zoom`], so `zoom` and `target_zoom` stay in
//! `[MIN_ZOOM, MAX_ZOOM]` after every public mutation. Out-of-range requests are
//! clamped to the nearest bound, never rejected.
//!
//! Rotation is unbounded: quarter turns accumulate (`450.0` is legal) and the
//! renderer normalizes with [`TransformState::normalized_rotation`].

/// Smallest zoom factor (10%).
pub const MIN_ZOOM: f32 = 0.1;
/// Largest zoom factor (500%).
pub const MAX_ZOOM: f32 = 5.0;

/// Brightness offset bounds, as a fraction of full channel scale.
pub const MIN_BRIGHTNESS: f32 = -1.0;
pub const MAX_BRIGHTNESS: f32 = 1.0;

/// Contrast multiplier bounds.
pub const MIN_CONTRAST: f32 = 0.0;
pub const MAX_CONTRAST: f32 = 4.0;

const QUARTER_TURN: f32 = 90.0;

/// Clamp a zoom request into the supported range.
pub fn clamp_zoom(zoom: f32) -> f32 {
    if zoom.is_nan() {
        return 1.0;
    }
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

/// The full set of display transforms for the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformState {
    zoom: f32,
    target_zoom: f32,
    rotation: f32,
    brightness: f32,
    contrast: f32,
    fit_to_window: bool,
}

impl Default for TransformState {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            target_zoom: 1.0,
            rotation: 0.0,
            brightness: 0.0,
            contrast: 1.0,
            fit_to_window: false,
        }
    }
}

impl TransformState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zoom currently used for rendering.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = clamp_zoom(zoom);
    }

    /// Zoom the animation is converging on.
    pub fn target_zoom(&self) -> f32 {
        self.target_zoom
    }

    pub fn set_target_zoom(&mut self, zoom: f32) {
        self.target_zoom = clamp_zoom(zoom);
    }

    /// Set both zoom and target at once, skipping any animation.
    pub fn jump_to(&mut self, zoom: f32) {
        self.set_target_zoom(zoom);
        self.zoom = self.target_zoom;
    }

    /// Make the rendered zoom exactly equal the target.
    pub fn snap_to_target(&mut self) {
        self.zoom = self.target_zoom;
    }

    /// Distance between rendered zoom and target.
    pub fn zoom_gap(&self) -> f32 {
        (self.target_zoom - self.zoom).abs()
    }

    /// Raw accumulated rotation in degrees. May exceed ±360.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Rotation folded into `[0, 360)`.
    pub fn normalized_rotation(&self) -> f32 {
        self.rotation.rem_euclid(360.0)
    }

    pub fn rotate_left(&mut self) {
        self.rotation -= QUARTER_TURN;
    }

    pub fn rotate_right(&mut self) {
        self.rotation += QUARTER_TURN;
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    pub fn set_brightness(&mut self, brightness: f32) {
        if brightness.is_finite() {
            self.brightness = brightness.clamp(MIN_BRIGHTNESS, MAX_BRIGHTNESS);
        }
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn set_contrast(&mut self, contrast: f32) {
        if contrast.is_finite() {
            self.contrast = contrast.clamp(MIN_CONTRAST, MAX_CONTRAST);
        }
    }

    /// Restore neutral brightness (0) and contrast (1).
    pub fn reset_adjustments(&mut self) {
        self.brightness = 0.0;
        self.contrast = 1.0;
    }

    /// True when brightness and contrast leave pixels unchanged.
    pub fn is_color_neutral(&self) -> bool {
        self.brightness == 0.0 && self.contrast == 1.0
    }

    pub fn fit_to_window(&self) -> bool {
        self.fit_to_window
    }

    pub fn set_fit_to_window(&mut self, fit: bool) {
        self.fit_to_window = fit;
    }
}
