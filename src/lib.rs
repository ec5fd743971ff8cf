//! # Lightbox
//!
//! The core of a desktop image viewer: load an image, show it zoomed, rotated
//! and color-adjusted in a viewport, step through the other images in its
//! directory, and save a copy. Window creation, menus and dialogs belong to the
//! host; this crate owns the state and produces display-ready rasters.
//!
//! # Architecture: Events In, Rasters Out
//!
//! ```text
//! window / CLI ──ViewerEvent──▶ ViewerSession ──compose──▶ DisplayRaster
//!                                  │    ▲
//!                        start/stop│    │Tick(kind)
//!                                  ▼    │
//!                                 Ticker (thread or manual)
//! ```
//!
//! All state lives in one [`session::ViewerSession`]. Every input, including
//! animation ticks, arrives through [`session::ViewerSession::handle`] on the
//! caller's thread. Tickers never touch state; they only post tick messages.
//! After each mutation that changes the picture the session recomposes the
//! display raster from scratch.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`transform`] | Zoom/rotation/color state with the single zoom clamp |
//! | [`animation`] | Zoom animation state machine and the [`animation::Ticker`] seam |
//! | [`imaging`] | Fit math, codec trait + `image`-crate codec, bicubic compositor |
//! | [`siblings`] | Sorted, wrapping list of images in the current directory |
//! | [`session`] | Event handling, load/save, recomposition, status |
//! | [`config`] | `lightbox.toml` loading, validation, merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Damped Zoom
//!
//! Zoom changes never jump. A request moves `target_zoom`; each frame tick
//! closes a fixed fraction of the gap, and the animation snaps and stops once
//! the gap is below epsilon. Holding a zoom key keeps nudging the target on a
//! slower ticker, so the same damping loop produces smooth continuous zoom.
//! Fit-to-window on load and on resize is the exception: it applies at once.
//!
//! ## Injected Tickers
//!
//! The animator only needs `start`, `stop` and `is_running`. Tests and the
//! headless renderer drive it with [`animation::ManualTicker`] and synthetic
//! ticks; a windowed host uses [`animation::ThreadTicker`], which posts
//! run-stamped ticks into the host's event channel. The host forwards a tick
//! only when [`animation::ZoomAnimator::accepts`] it, so ticks queued before a
//! restart are dropped.
//!
//! ## One Compose Pass
//!
//! Scale, centering, rotation and the brightness/contrast transform happen in
//! a single inverse-mapped pass with one clamp at the end, so brightness and
//! contrast never see an already-clipped intermediate.

pub mod animation;
pub mod config;
pub mod imaging;
pub mod output;
pub mod session;
pub mod siblings;
pub mod transform;

#[cfg(test)]
pub(crate) mod test_helpers;
