//! Viewer configuration module.
//!
//! Handles loading and validating `lightbox.toml`. Absent keys keep their
//! stock values, so a config file only needs the keys it wants to change.
//!
//! ## Config File Location
//!
//! `lightbox.toml` in the working directory, or any file passed with
//! `--config`. A missing file means stock defaults.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [view]
//! width = 800               # Headless viewport width in pixels
//! height = 600              # Headless viewport height in pixels
//! fit_to_window = false     # Start in fit-to-window mode
//! dark_mode = false         # Start with the dark background
//!
//! [zoom]
//! damping = 0.2             # Fraction of the remaining gap closed per frame
//! epsilon = 0.001           # Gap below which the animation stops
//! wheel_zoom_in = 1.1       # Target multiplier per wheel notch up
//! wheel_zoom_out = 0.9      # Target multiplier per wheel notch down
//! continuous_factor = 1.05  # Target multiplier per held-key tick
//! frame_interval_ms = 16    # Animation frame interval (~60 Hz)
//! hold_interval_ms = 50     # Held-key interval (~20 Hz)
//!
//! [colors]
//! light = "#ffffff"         # Canvas background
//! dark = "#1e1e1e"          # Canvas background in dark mode
//!
//! [processing]
//! max_processes = 4         # Compose threads (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! ```toml
//! # Only slow the animation down
//! [zoom]
//! damping = 0.1
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::animation::AnimationSettings;
use crate::imaging::Background;
use crate::session::SessionSettings;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "lightbox.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Viewer configuration loaded from `lightbox.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Initial viewport and display modes.
    pub view: ViewConfig,
    /// Zoom steps and animation timing.
    pub zoom: ZoomConfig,
    /// Canvas background colors.
    pub colors: ColorConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl ViewerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.view.width == 0 || self.view.height == 0 {
            return Err(ConfigError::Validation(
                "view.width and view.height must be non-zero".into(),
            ));
        }
        let zoom = &self.zoom;
        if !(zoom.damping > 0.0 && zoom.damping <= 1.0) {
            return Err(ConfigError::Validation(
                "zoom.damping must be in (0, 1]".into(),
            ));
        }
        if !(zoom.epsilon > 0.0) {
            return Err(ConfigError::Validation(
                "zoom.epsilon must be positive".into(),
            ));
        }
        if !(zoom.wheel_zoom_in > 1.0) {
            return Err(ConfigError::Validation(
                "zoom.wheel_zoom_in must be greater than 1".into(),
            ));
        }
        if !(zoom.wheel_zoom_out > 0.0 && zoom.wheel_zoom_out < 1.0) {
            return Err(ConfigError::Validation(
                "zoom.wheel_zoom_out must be in (0, 1)".into(),
            ));
        }
        if !(zoom.continuous_factor > 1.0) {
            return Err(ConfigError::Validation(
                "zoom.continuous_factor must be greater than 1".into(),
            ));
        }
        if zoom.frame_interval_ms == 0 || zoom.hold_interval_ms == 0 {
            return Err(ConfigError::Validation(
                "zoom intervals must be non-zero".into(),
            ));
        }
        self.colors.light()?;
        self.colors.dark()?;
        Ok(())
    }

    /// Everything a [`ViewerSession`](crate::session::ViewerSession) needs
    /// from the config.
    pub fn session_settings(&self) -> Result<SessionSettings, ConfigError> {
        Ok(SessionSettings {
            animation: self.zoom.animation_settings(),
            wheel_zoom_in: self.zoom.wheel_zoom_in,
            wheel_zoom_out: self.zoom.wheel_zoom_out,
            light: self.colors.light()?,
            dark: self.colors.dark()?,
            fit_to_window: self.view.fit_to_window,
            dark_mode: self.view.dark_mode,
        })
    }
}

/// Initial viewport and display modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    /// Viewport width used by the headless renderer.
    pub width: u32,
    /// Viewport height used by the headless renderer.
    pub height: u32,
    /// Start with fit-to-window enabled.
    pub fit_to_window: bool,
    /// Start with the dark background.
    pub dark_mode: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            fit_to_window: false,
            dark_mode: false,
        }
    }
}

/// Zoom steps and animation timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    /// Fraction of the remaining zoom gap closed per frame tick.
    pub damping: f32,
    /// Zoom gap below which the animation snaps and stops.
    pub epsilon: f32,
    /// Target multiplier for a wheel notch toward the user.
    pub wheel_zoom_in: f32,
    /// Target multiplier for a wheel notch away from the user.
    pub wheel_zoom_out: f32,
    /// Target multiplier per hold tick while a zoom key is held.
    pub continuous_factor: f32,
    /// Frame ticker interval in milliseconds.
    pub frame_interval_ms: u64,
    /// Hold ticker interval in milliseconds.
    pub hold_interval_ms: u64,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            damping: 0.2,
            epsilon: 0.001,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            continuous_factor: 1.05,
            frame_interval_ms: 16,
            hold_interval_ms: 50,
        }
    }
}

impl ZoomConfig {
    pub fn animation_settings(&self) -> AnimationSettings {
        AnimationSettings {
            damping: self.damping,
            epsilon: self.epsilon,
            continuous_factor: self.continuous_factor,
            frame_interval: Duration::from_millis(self.frame_interval_ms),
            hold_interval: Duration::from_millis(self.hold_interval_ms),
        }
    }
}

/// Canvas background colors as `#rrggbb`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode background.
    pub light: String,
    /// Dark mode background.
    pub dark: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: "#ffffff".to_string(),
            dark: "#1e1e1e".to_string(),
        }
    }
}

impl ColorConfig {
    pub fn light(&self) -> Result<Background, ConfigError> {
        parse_color("colors.light", &self.light)
    }

    pub fn dark(&self) -> Result<Background, ConfigError> {
        parse_color("colors.dark", &self.dark)
    }
}

fn parse_color(key: &str, value: &str) -> Result<Background, ConfigError> {
    Background::parse(value).ok_or_else(|| {
        ConfigError::Validation(format!("{key} must be a #rrggbb color, got {value:?}"))
    })
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of threads used to compose display rows.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Loading
// =============================================================================

/// Parse config text. Every section is `#[serde(default)]`, so absent keys
/// keep their stock values; unknown keys are an error.
pub fn parse_config(text: &str) -> Result<ViewerConfig, ConfigError> {
    Ok(toml::from_str(text)?)
}

/// Load and validate the config at `path`. A missing file yields the stock
/// defaults.
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let config = match fs::read_to_string(path) {
        Ok(text) => {
            log::debug!("loaded config from {}", path.display());
            parse_config(&text)?
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => ViewerConfig::default(),
        Err(e) => return Err(e.into()),
    };
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `lightbox.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Lightbox Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# View
# ---------------------------------------------------------------------------
[view]
# Viewport size used when rendering without a window.
width = 800
height = 600

# Start with the image scaled to fit the viewport.
fit_to_window = false

# Start with the dark canvas background.
dark_mode = false

# ---------------------------------------------------------------------------
# Zoom
# ---------------------------------------------------------------------------
[zoom]
# Fraction of the remaining zoom gap closed per animation frame, in (0, 1].
damping = 0.2

# The animation snaps to its target once closer than this.
epsilon = 0.001

# Target multipliers per mouse wheel notch.
wheel_zoom_in = 1.1
wheel_zoom_out = 0.9

# Target multiplier per tick while a zoom key is held.
continuous_factor = 1.05

# Ticker intervals in milliseconds.
frame_interval_ms = 16    # ~60 Hz
hold_interval_ms = 50     # ~20 Hz

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
light = "#ffffff"
dark = "#1e1e1e"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum threads used to compose the display.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
