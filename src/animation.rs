//! Zoom animation state machine.
//!
//! Two independent tick sources drive zoom:
//!
//! | Ticker | Rate | Each tick |
//! |---|---|---|
//! | frame | ~60 Hz | `zoom += (target - zoom) * damping` |
//! | hold | ~20 Hz | `target *= factor` (or `/= factor`), clamped |
//!
//! A discrete request (wheel, shortcut, fit) moves the target once and starts
//! the frame ticker. Holding a zoom key starts the hold ticker, which keeps
//! nudging the target while the frame ticker chases it. Releasing the key stops
//! only the hold ticker; the frame ticker runs until zoom converges.
//!
//! ```text
//!              request(target)               gap < epsilon
//!   Idle ─────────────────────────▶ Animating ──────────────▶ Idle
//!    │                                 ▲  │
//!    │ key_down                 key_up │  │ key_down
//!    ▼                                 │  ▼
//!   ContinuousZooming ◀────────────────┴──┘
//! ```
//!
//! Tickers are injected through the [`Ticker`] trait so tests (and the
//! headless CLI) can drive the machine with synthetic ticks. All mutation
//! happens on the caller's thread; [`ThreadTicker`] only posts [`ThreadTick`]
//! messages into a channel.

use crate::transform::TransformState;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::JoinHandle;
use std::time::Duration;

/// Which tick source fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    /// Interpolation step toward the target.
    Frame,
    /// Continuous-zoom nudge of the target.
    Hold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Observable state of the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomPhase {
    Idle,
    Animating,
    ContinuousZooming(ZoomDirection),
}

/// A cancellable periodic tick source.
///
/// `start` on a running ticker and `stop` on a stopped one are no-ops.
pub trait Ticker {
    fn start(&mut self, interval: Duration);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Ticker with no clock: the owner delivers ticks by hand.
///
/// Counts real transitions so tests can assert that start/stop were not
/// repeated.
#[derive(Debug, Default)]
pub struct ManualTicker {
    running: bool,
    interval: Option<Duration>,
    starts: usize,
    stops: usize,
}

impl ManualTicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval requested by the most recent start.
    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn starts(&self) -> usize {
        self.starts
    }

    pub fn stops(&self) -> usize {
        self.stops
    }
}

impl Ticker for ManualTicker {
    fn start(&mut self, interval: Duration) {
        if !self.running {
            self.running = true;
            self.interval = Some(interval);
            self.starts += 1;
        }
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

/// Tick posted by a [`ThreadTicker`], stamped with the run that sent it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadTick {
    pub kind: TickKind,
    pub run: u64,
}

/// Ticker backed by a background thread that sends a [`ThreadTick`] into an
/// event channel every interval.
///
/// Stopping flips a flag and detaches the thread; it exits at its next wake-up
/// without sending. Ticks already queued may still arrive after `stop`, and
/// after a restart they carry the previous run number, so the event loop
/// checks [`ThreadTicker::is_current`] before delivering them.
pub struct ThreadTicker {
    kind: TickKind,
    sender: Sender<ThreadTick>,
    run: u64,
    active: Option<(Arc<AtomicBool>, JoinHandle<()>)>,
}

impl ThreadTicker {
    pub fn new(kind: TickKind, sender: Sender<ThreadTick>) -> Self {
        Self {
            kind,
            sender,
            run: 0,
            active: None,
        }
    }

    /// True when `tick` was sent by the run that is active right now.
    pub fn is_current(&self, tick: ThreadTick) -> bool {
        self.active.is_some() && tick.kind == self.kind && tick.run == self.run
    }
}

impl Ticker for ThreadTicker {
    fn start(&mut self, interval: Duration) {
        if self.active.is_some() {
            return;
        }
        self.run += 1;
        let stopped = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopped);
        let sender = self.sender.clone();
        let tick = ThreadTick {
            kind: self.kind,
            run: self.run,
        };
        let handle = std::thread::spawn(move || {
            loop {
                std::thread::sleep(interval);
                if flag.load(Ordering::Acquire) || sender.send(tick).is_err() {
                    break;
                }
            }
        });
        self.active = Some((stopped, handle));
    }

    fn stop(&mut self) {
        if let Some((stopped, _handle)) = self.active.take() {
            stopped.store(true, Ordering::Release);
        }
    }

    fn is_running(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Tuning for the animator. Defaults match a 60 Hz frame ticker and a 20 Hz
/// hold ticker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationSettings {
    /// Fraction of the remaining gap closed per frame tick.
    pub damping: f32,
    /// Gap below which zoom counts as converged.
    pub epsilon: f32,
    /// Target multiplier per hold tick while zooming in.
    pub continuous_factor: f32,
    pub frame_interval: Duration,
    pub hold_interval: Duration,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            damping: 0.2,
            epsilon: 0.001,
            continuous_factor: 1.05,
            frame_interval: Duration::from_millis(16),
            hold_interval: Duration::from_millis(50),
        }
    }
}

/// Drives `TransformState::zoom` toward `target_zoom`.
pub struct ZoomAnimator<T: Ticker> {
    settings: AnimationSettings,
    frame: T,
    hold: T,
    held: Option<ZoomDirection>,
}

impl<T: Ticker> ZoomAnimator<T> {
    pub fn new(settings: AnimationSettings, frame: T, hold: T) -> Self {
        Self {
            settings,
            frame,
            hold,
            held: None,
        }
    }

    pub fn settings(&self) -> &AnimationSettings {
        &self.settings
    }

    pub fn frame_ticker(&self) -> &T {
        &self.frame
    }

    pub fn hold_ticker(&self) -> &T {
        &self.hold
    }

    pub fn phase(&self) -> ZoomPhase {
        match self.held {
            Some(direction) => ZoomPhase::ContinuousZooming(direction),
            None if self.frame.is_running() => ZoomPhase::Animating,
            None => ZoomPhase::Idle,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase() == ZoomPhase::Idle
    }

    /// Set a new (clamped) target and start animating toward it.
    ///
    /// Returns whether the frame ticker is running afterwards. A target that is
    /// already reached leaves the animator as it was.
    pub fn request(&mut self, state: &mut TransformState, target: f32) -> bool {
        state.set_target_zoom(target);
        self.ensure_frame_running(state);
        self.frame.is_running()
    }

    /// Begin continuous zoom. Key repeat for the held direction is ignored;
    /// the opposite direction takes over.
    pub fn key_down(&mut self, direction: ZoomDirection) {
        if self.held == Some(direction) {
            return;
        }
        log::debug!("continuous zoom {direction:?} started");
        self.held = Some(direction);
        self.hold.start(self.settings.hold_interval);
    }

    /// End continuous zoom. The frame ticker keeps settling on the last target.
    pub fn key_up(&mut self, direction: ZoomDirection) {
        if self.held != Some(direction) {
            return;
        }
        log::debug!("continuous zoom {direction:?} released");
        self.held = None;
        self.hold.stop();
    }

    /// Advance one tick. Returns true when `zoom` changed and the display
    /// raster must be rebuilt.
    pub fn tick(&mut self, kind: TickKind, state: &mut TransformState) -> bool {
        match kind {
            TickKind::Frame => self.frame_tick(state),
            TickKind::Hold => {
                self.hold_tick(state);
                false
            }
        }
    }

    /// Stop everything, leaving zoom wherever it is.
    pub fn cancel(&mut self) {
        self.held = None;
        self.hold.stop();
        self.frame.stop();
    }

    fn frame_tick(&mut self, state: &mut TransformState) -> bool {
        if !self.frame.is_running() {
            return false;
        }
        let target = state.target_zoom();
        let before = state.zoom();
        if state.zoom_gap() >= self.settings.epsilon {
            state.set_zoom(before + (target - before) * self.settings.damping);
        }
        if state.zoom_gap() < self.settings.epsilon {
            state.snap_to_target();
            self.frame.stop();
            log::debug!("zoom settled at {:.4}", state.zoom());
        }
        log::trace!("frame tick zoom {before:.4} → {:.4}", state.zoom());
        state.zoom() != before
    }

    fn hold_tick(&mut self, state: &mut TransformState) {
        let Some(direction) = self.held else {
            return;
        };
        if !self.hold.is_running() {
            return;
        }
        let factor = match direction {
            ZoomDirection::In => self.settings.continuous_factor,
            ZoomDirection::Out => self.settings.continuous_factor.recip(),
        };
        state.set_target_zoom(state.target_zoom() * factor);
        self.ensure_frame_running(state);
    }

    fn ensure_frame_running(&mut self, state: &TransformState) {
        if state.zoom_gap() >= self.settings.epsilon && !self.frame.is_running() {
            log::debug!(
                "zoom animation {:.4} → {:.4}",
                state.zoom(),
                state.target_zoom()
            );
            self.frame.start(self.settings.frame_interval);
        }
    }
}

impl ZoomAnimator<ThreadTicker> {
    /// Whether a tick pulled off the channel belongs to a live run of the
    /// matching ticker. Leftovers from a stopped or restarted run are not.
    pub fn accepts(&self, tick: ThreadTick) -> bool {
        match tick.kind {
            TickKind::Frame => self.frame.is_current(tick),
            TickKind::Hold => self.hold.is_current(tick),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{MAX_ZOOM, MIN_ZOOM};

    fn animator() -> ZoomAnimator<ManualTicker> {
        ZoomAnimator::new(
            AnimationSettings::default(),
            ManualTicker::new(),
            ManualTicker::new(),
        )
    }

    /// Deliver frame ticks until idle; returns the number of ticks used.
    fn settle(anim: &mut ZoomAnimator<ManualTicker>, state: &mut TransformState) -> usize {
        let mut ticks = 0;
        while anim.frame_ticker().is_running() {
            anim.tick(TickKind::Frame, state);
            ticks += 1;
            assert!(ticks < 1000, "animation never converged");
        }
        ticks
    }

    // =========================================================================
    // Discrete requests
    // =========================================================================

    #[test]
    fn starts_idle() {
        let anim = animator();
        assert_eq!(anim.phase(), ZoomPhase::Idle);
        assert!(!anim.frame_ticker().is_running());
    }

    #[test]
    fn request_starts_frame_ticker_at_frame_rate() {
        let mut anim = animator();
        let mut state = TransformState::new();
        assert!(anim.request(&mut state, 2.0));
        assert_eq!(anim.phase(), ZoomPhase::Animating);
        assert_eq!(
            anim.frame_ticker().interval(),
            Some(Duration::from_millis(16))
        );
        // Zoom itself only moves on ticks
        assert_eq!(state.zoom(), 1.0);
        assert_eq!(state.target_zoom(), 2.0);
    }

    #[test]
    fn request_for_current_zoom_stays_idle() {
        let mut anim = animator();
        let mut state = TransformState::new();
        assert!(!anim.request(&mut state, 1.0));
        assert_eq!(anim.phase(), ZoomPhase::Idle);
        assert_eq!(anim.frame_ticker().starts(), 0);
    }

    #[test]
    fn request_target_is_clamped() {
        let mut anim = animator();
        let mut state = TransformState::new();
        for z in [0.0, 0.01, 0.3, 4.99, 7.0, 1e6] {
            anim.request(&mut state, z);
            assert_eq!(state.target_zoom(), z.clamp(MIN_ZOOM, MAX_ZOOM));
        }
    }

    #[test]
    fn first_tick_closes_damping_fraction_of_gap() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.request(&mut state, 2.0);
        assert!(anim.tick(TickKind::Frame, &mut state));
        assert!((state.zoom() - 1.2).abs() < 1e-6);
        assert!(anim.tick(TickKind::Frame, &mut state));
        assert!((state.zoom() - 1.36).abs() < 1e-6);
    }

    #[test]
    fn converges_and_stops_exactly_once() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.request(&mut state, 2.0);

        let ticks = settle(&mut anim, &mut state);

        // 0.8^n < 0.001 first holds at n = 31
        assert_eq!(ticks, 31);
        assert!((state.zoom() - state.target_zoom()).abs() < 0.001);
        assert_eq!(state.zoom(), 2.0);
        assert_eq!(anim.phase(), ZoomPhase::Idle);
        assert_eq!(anim.frame_ticker().starts(), 1);
        assert_eq!(anim.frame_ticker().stops(), 1);

        // Stale ticks and repeated cancels change nothing
        assert!(!anim.tick(TickKind::Frame, &mut state));
        anim.cancel();
        anim.cancel();
        assert_eq!(anim.frame_ticker().stops(), 1);
    }

    #[test]
    fn retarget_mid_animation_keeps_single_ticker() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.request(&mut state, 3.0);
        for _ in 0..5 {
            anim.tick(TickKind::Frame, &mut state);
        }
        anim.request(&mut state, 0.5);
        assert_eq!(anim.frame_ticker().starts(), 1);

        settle(&mut anim, &mut state);
        assert_eq!(state.zoom(), 0.5);
    }

    // =========================================================================
    // Continuous zoom
    // =========================================================================

    #[test]
    fn key_down_starts_hold_ticker_only() {
        let mut anim = animator();
        anim.key_down(ZoomDirection::In);
        assert_eq!(anim.phase(), ZoomPhase::ContinuousZooming(ZoomDirection::In));
        assert!(anim.hold_ticker().is_running());
        assert_eq!(
            anim.hold_ticker().interval(),
            Some(Duration::from_millis(50))
        );
        assert!(!anim.frame_ticker().is_running());
    }

    #[test]
    fn key_repeat_is_ignored() {
        let mut anim = animator();
        anim.key_down(ZoomDirection::In);
        anim.key_down(ZoomDirection::In);
        assert_eq!(anim.hold_ticker().starts(), 1);
    }

    #[test]
    fn hold_tick_nudges_target_and_starts_frame_ticker() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.key_down(ZoomDirection::In);

        assert!(!anim.tick(TickKind::Hold, &mut state));
        assert!((state.target_zoom() - 1.05).abs() < 1e-6);
        assert_eq!(state.zoom(), 1.0);
        assert!(anim.frame_ticker().is_running());
    }

    #[test]
    fn hold_out_divides_target() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.key_down(ZoomDirection::Out);
        anim.tick(TickKind::Hold, &mut state);
        assert!((state.target_zoom() - 1.0 / 1.05).abs() < 1e-6);
    }

    #[test]
    fn hold_target_respects_bounds() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.key_down(ZoomDirection::In);
        for _ in 0..200 {
            anim.tick(TickKind::Hold, &mut state);
            anim.tick(TickKind::Frame, &mut state);
        }
        assert_eq!(state.target_zoom(), MAX_ZOOM);
        assert!(state.zoom() <= MAX_ZOOM);
    }

    #[test]
    fn release_stops_hold_but_damping_still_converges() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.key_down(ZoomDirection::In);
        for _ in 0..10 {
            anim.tick(TickKind::Hold, &mut state);
            anim.tick(TickKind::Frame, &mut state);
            anim.tick(TickKind::Frame, &mut state);
            anim.tick(TickKind::Frame, &mut state);
        }
        let last_target = state.target_zoom();
        assert!(state.zoom_gap() > 0.001, "still chasing the target");

        anim.key_up(ZoomDirection::In);
        assert!(!anim.hold_ticker().is_running());
        assert_eq!(anim.phase(), ZoomPhase::Animating);

        // Stale hold ticks after release are ignored
        anim.tick(TickKind::Hold, &mut state);
        assert_eq!(state.target_zoom(), last_target);

        settle(&mut anim, &mut state);
        assert_eq!(state.zoom(), last_target);
        assert_eq!(anim.phase(), ZoomPhase::Idle);
    }

    #[test]
    fn releasing_other_direction_is_ignored() {
        let mut anim = animator();
        anim.key_down(ZoomDirection::In);
        anim.key_up(ZoomDirection::Out);
        assert_eq!(anim.phase(), ZoomPhase::ContinuousZooming(ZoomDirection::In));
    }

    #[test]
    fn switching_direction_reuses_hold_ticker() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.key_down(ZoomDirection::In);
        anim.key_down(ZoomDirection::Out);
        assert_eq!(anim.phase(), ZoomPhase::ContinuousZooming(ZoomDirection::Out));
        assert_eq!(anim.hold_ticker().starts(), 1);

        anim.tick(TickKind::Hold, &mut state);
        assert!(state.target_zoom() < 1.0);
    }

    #[test]
    fn cancel_stops_both_tickers() {
        let mut anim = animator();
        let mut state = TransformState::new();
        anim.key_down(ZoomDirection::In);
        anim.tick(TickKind::Hold, &mut state);
        anim.cancel();
        assert_eq!(anim.phase(), ZoomPhase::Idle);
        assert!(!anim.hold_ticker().is_running());
        assert!(!anim.frame_ticker().is_running());
    }

    // =========================================================================
    // Tickers
    // =========================================================================

    #[test]
    fn manual_ticker_start_stop_are_idempotent() {
        let mut ticker = ManualTicker::new();
        ticker.stop();
        assert_eq!(ticker.stops(), 0);
        ticker.start(Duration::from_millis(5));
        ticker.start(Duration::from_millis(9));
        assert_eq!(ticker.starts(), 1);
        assert_eq!(ticker.interval(), Some(Duration::from_millis(5)));
        ticker.stop();
        ticker.stop();
        assert_eq!(ticker.stops(), 1);
    }

    #[test]
    fn thread_ticker_posts_ticks_until_stopped() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut ticker = ThreadTicker::new(TickKind::Hold, tx);
        ticker.start(Duration::from_millis(1));
        assert!(ticker.is_running());

        let tick = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(tick, ThreadTick { kind: TickKind::Hold, run: 1 });
        assert!(ticker.is_current(tick));

        ticker.stop();
        ticker.stop();
        assert!(!ticker.is_running());
        assert!(!ticker.is_current(tick));
    }

    #[test]
    fn restarted_thread_ticker_rejects_queued_ticks_from_old_run() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut ticker = ThreadTicker::new(TickKind::Frame, tx);
        ticker.start(Duration::from_millis(1));
        let first = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        ticker.stop();
        ticker.start(Duration::from_millis(1));

        assert_eq!(first.run, 1);
        assert!(!ticker.is_current(first));

        let live = std::iter::from_fn(|| rx.recv_timeout(Duration::from_secs(2)).ok())
            .find(|tick| tick.run == 2)
            .unwrap();
        assert!(ticker.is_current(live));
        ticker.stop();
    }

    #[test]
    fn thread_animator_accepts_only_live_runs() {
        let (tx, rx) = std::sync::mpsc::channel();
        let mut animator = ZoomAnimator::new(
            AnimationSettings {
                frame_interval: Duration::from_millis(1),
                ..Default::default()
            },
            ThreadTicker::new(TickKind::Frame, tx.clone()),
            ThreadTicker::new(TickKind::Hold, tx),
        );
        let mut state = TransformState::new();
        animator.request(&mut state, 2.0);
        let tick = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(animator.accepts(tick));

        animator.cancel();
        assert!(!animator.accepts(tick));
        assert!(!animator.accepts(ThreadTick { kind: TickKind::Hold, run: 0 }));
    }
}
