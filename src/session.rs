//! Viewer session: the single owner of all viewing state.
//!
//! A [`ViewerSession`] holds the source image, its transform, the current
//! display raster, the sibling set, and the zoom animator. Input arrives as
//! [`ViewerEvent`]s through [`ViewerSession::handle`], which is the only place
//! state changes. After every mutation that affects the picture the session
//! recomposes the display raster; the caller presents it.
//!
//! ## Event effects
//!
//! | Event | Transform | Display |
//! |---|---|---|
//! | `Open`, `NavigatePrev/Next` | fit applied at once if fit mode is on | rebuilt |
//! | `NavigatePrev/Next` past a corrupt file | skipped, next decodable sibling opened | rebuilt |
//! | `ZoomWheel`, `ActualSize`, `ZoomTo` | target moved, fit mode cleared | per frame tick |
//! | `ToggleFitToWindow` | on: animate to fit; off: flag cleared | per frame tick |
//! | `ZoomKeyDown/Up` | continuous zoom, fit mode cleared | per frame tick |
//! | `RotateLeft/Right` | ±90° | rebuilt |
//! | `AdjustBrightness/Contrast`, `ResetAdjustments` | color changed | rebuilt |
//! | `Resized` | fit re-applied at once if fit mode is on | rebuilt |
//! | `ToggleDarkMode` | none | rebuilt |
//! | `Save` | none | none |
//!
//! A failed load or save leaves every piece of state as it was.

use crate::animation::{AnimationSettings, TickKind, Ticker, ZoomAnimator, ZoomDirection, ZoomPhase};
use crate::imaging::{
    Background, CodecError, DisplayRaster, ImageCodec, SaveFormat, SourceImage, Viewport,
    compose, compute_fit_zoom,
};
use crate::siblings::{Direction, SiblingSet};
use crate::transform::TransformState;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to load {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

#[derive(Error, Debug)]
pub enum SaveError {
    #[error("No image loaded")]
    NoImage,
    #[error("Failed to save {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: CodecError,
    },
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Save(#[from] SaveError),
}

/// Input to the session, as delivered by a window layer or the CLI.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    Open(PathBuf),
    /// Save a copy of the source image; format follows the extension.
    Save(PathBuf),
    RotateLeft,
    RotateRight,
    ActualSize,
    /// Animate to an explicit zoom level (clamped).
    ZoomTo(f32),
    ToggleFitToWindow,
    NavigatePrev,
    NavigateNext,
    /// Mouse wheel; only the sign matters.
    ZoomWheel(i32),
    ZoomKeyDown(ZoomDirection),
    ZoomKeyUp(ZoomDirection),
    ToggleDarkMode,
    Resized(Viewport),
    AdjustBrightness(f32),
    AdjustContrast(f32),
    ResetAdjustments,
    Tick(TickKind),
}

/// Tunables a session is created with. See [`crate::config`] for the file
/// they usually come from.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSettings {
    pub animation: AnimationSettings,
    pub wheel_zoom_in: f32,
    pub wheel_zoom_out: f32,
    pub light: Background,
    pub dark: Background,
    /// Initial fit-to-window mode.
    pub fit_to_window: bool,
    /// Initial dark mode.
    pub dark_mode: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            animation: AnimationSettings::default(),
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            light: Background::WHITE,
            dark: Background([0x1e, 0x1e, 0x1e]),
            fit_to_window: false,
            dark_mode: false,
        }
    }
}

/// Snapshot for a status bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusInfo {
    pub width: u32,
    pub height: u32,
    /// Current zoom as a whole percentage.
    pub zoom_percent: u32,
    pub file_name: String,
    /// Size on disk in bytes, when known.
    pub file_size: Option<u64>,
}

pub struct ViewerSession<C: ImageCodec, T: Ticker> {
    codec: C,
    source: Option<SourceImage>,
    transform: TransformState,
    display: Option<DisplayRaster>,
    siblings: SiblingSet,
    animator: ZoomAnimator<T>,
    viewport: Viewport,
    dark_mode: bool,
    settings: SessionSettings,
}

impl<C: ImageCodec, T: Ticker> ViewerSession<C, T> {
    /// Create an empty session. `frame` and `hold` drive the zoom animation.
    pub fn new(codec: C, frame: T, hold: T, viewport: Viewport, settings: SessionSettings) -> Self {
        let mut transform = TransformState::new();
        transform.set_fit_to_window(settings.fit_to_window);
        Self {
            codec,
            source: None,
            transform,
            display: None,
            siblings: SiblingSet::default(),
            animator: ZoomAnimator::new(settings.animation, frame, hold),
            viewport,
            dark_mode: settings.dark_mode,
            settings,
        }
    }

    /// Apply one event. Returns true when the display raster was rebuilt.
    pub fn handle(&mut self, event: ViewerEvent) -> Result<bool, SessionError> {
        log::trace!("event {event:?}");
        let redraw = match event {
            ViewerEvent::Open(path) => self.open(&path)?,
            ViewerEvent::Save(path) => {
                self.save(&path)?;
                false
            }
            ViewerEvent::RotateLeft => {
                self.transform.rotate_left();
                self.refresh()
            }
            ViewerEvent::RotateRight => {
                self.transform.rotate_right();
                self.refresh()
            }
            ViewerEvent::ActualSize => {
                self.transform.set_fit_to_window(false);
                self.animator.request(&mut self.transform, 1.0);
                false
            }
            ViewerEvent::ZoomTo(zoom) => {
                self.transform.set_fit_to_window(false);
                self.animator.request(&mut self.transform, zoom);
                false
            }
            ViewerEvent::ToggleFitToWindow => self.toggle_fit(),
            ViewerEvent::NavigatePrev => self.navigate(Direction::Prev)?,
            ViewerEvent::NavigateNext => self.navigate(Direction::Next)?,
            ViewerEvent::ZoomWheel(delta) => {
                self.wheel(delta);
                false
            }
            ViewerEvent::ZoomKeyDown(direction) => {
                self.transform.set_fit_to_window(false);
                self.animator.key_down(direction);
                false
            }
            ViewerEvent::ZoomKeyUp(direction) => {
                self.animator.key_up(direction);
                false
            }
            ViewerEvent::ToggleDarkMode => {
                self.dark_mode = !self.dark_mode;
                self.refresh()
            }
            ViewerEvent::Resized(viewport) => {
                self.viewport = viewport;
                self.apply_fit_now();
                self.refresh()
            }
            ViewerEvent::AdjustBrightness(delta) => {
                self.transform
                    .set_brightness(self.transform.brightness() + delta);
                self.refresh()
            }
            ViewerEvent::AdjustContrast(delta) => {
                self.transform.set_contrast(self.transform.contrast() + delta);
                self.refresh()
            }
            ViewerEvent::ResetAdjustments => {
                self.transform.reset_adjustments();
                self.refresh()
            }
            ViewerEvent::Tick(kind) => {
                self.animator.tick(kind, &mut self.transform) && self.refresh()
            }
        };
        Ok(redraw)
    }

    /// Load `path`, replacing the current image only on success.
    fn open(&mut self, path: &Path) -> Result<bool, LoadError> {
        let source = self
            .codec
            .decode(path)
            .map_err(|source| LoadError::Decode {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!(
            "Loaded {} ({}x{})",
            path.display(),
            source.width(),
            source.height()
        );

        self.animator.cancel();
        self.transform.snap_to_target();
        self.siblings = SiblingSet::scan(path);
        self.source = Some(source);
        self.apply_fit_now();
        Ok(self.refresh())
    }

    fn save(&self, path: &Path) -> Result<(), SaveError> {
        let source = self.source.as_ref().ok_or(SaveError::NoImage)?;
        self.encode(source.pixels(), path)
    }

    /// Write the current display raster (what the user sees) to `path`.
    pub fn save_display(&self, path: &Path) -> Result<(), SaveError> {
        let display = self.display.as_ref().ok_or(SaveError::NoImage)?;
        self.encode(display.pixels(), path)
    }

    fn encode(&self, raster: &image::RgbaImage, path: &Path) -> Result<(), SaveError> {
        let format = SaveFormat::from_path(path);
        self.codec
            .encode(raster, path, format)
            .map_err(|source| SaveError::Encode {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Saved {} as {format:?}", path.display());
        Ok(())
    }

    /// Open the nearest sibling in `direction` that decodes. Files that fail
    /// are skipped; if none decode, the first failure is returned and the
    /// session is left as it was.
    fn navigate(&mut self, direction: Direction) -> Result<bool, LoadError> {
        if self.source.is_none() {
            return Ok(false);
        }
        let candidates: Vec<PathBuf> = self
            .siblings
            .walk(direction)
            .map(Path::to_path_buf)
            .collect();
        if candidates.is_empty() {
            log::warn!("No sibling images to navigate to");
            return Ok(false);
        }

        let mut first_error = None;
        for path in candidates {
            match self.open(&path) {
                Ok(redraw) => return Ok(redraw),
                Err(e) => {
                    log::warn!("Skipping {e}");
                    first_error.get_or_insert(e);
                }
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(false),
        }
    }

    fn wheel(&mut self, delta: i32) {
        let factor = match delta.signum() {
            1 => self.settings.wheel_zoom_in,
            -1 => self.settings.wheel_zoom_out,
            _ => return,
        };
        self.transform.set_fit_to_window(false);
        let target = self.transform.target_zoom() * factor;
        self.animator.request(&mut self.transform, target);
    }

    fn toggle_fit(&mut self) -> bool {
        let fit = !self.transform.fit_to_window();
        self.transform.set_fit_to_window(fit);
        if let Some(zoom) = self.fit_zoom().filter(|_| fit) {
            self.animator.request(&mut self.transform, zoom);
        }
        false
    }

    /// Zoom that fits the current image in the viewport.
    fn fit_zoom(&self) -> Option<f32> {
        let source = self.source.as_ref()?;
        Some(compute_fit_zoom(
            source.width(),
            source.height(),
            self.viewport.width(),
            self.viewport.height(),
        ))
    }

    /// In fit mode, jump straight to the fit zoom with no animation.
    fn apply_fit_now(&mut self) {
        if !self.transform.fit_to_window() {
            return;
        }
        if let Some(zoom) = self.fit_zoom() {
            self.animator.cancel();
            self.transform.jump_to(zoom);
        }
    }

    /// Recompose the display raster from the current state. With no image
    /// loaded the previous raster (if any) is kept and nothing happens.
    pub fn refresh(&mut self) -> bool {
        let Some(source) = &self.source else {
            return false;
        };
        self.display = Some(compose(
            source,
            &self.transform,
            self.viewport,
            self.background(),
        ));
        true
    }

    pub fn status(&self) -> Option<StatusInfo> {
        let source = self.source.as_ref()?;
        Some(StatusInfo {
            width: source.width(),
            height: source.height(),
            zoom_percent: (self.transform.zoom() * 100.0).round() as u32,
            file_name: source
                .path()
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            file_size: source.file_size(),
        })
    }

    pub fn display(&self) -> Option<&DisplayRaster> {
        self.display.as_ref()
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn transform(&self) -> &TransformState {
        &self.transform
    }

    pub fn siblings(&self) -> &SiblingSet {
        &self.siblings
    }

    pub fn animator(&self) -> &ZoomAnimator<T> {
        &self.animator
    }

    pub fn phase(&self) -> ZoomPhase {
        self.animator.phase()
    }

    /// True when no ticker is running.
    pub fn is_idle(&self) -> bool {
        self.animator.is_idle()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub fn background(&self) -> Background {
        if self.dark_mode {
            self.settings.dark
        } else {
            self.settings.light
        }
    }
}
